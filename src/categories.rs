//! Default category lists.

use std::path::Path;

use crate::traits::CategorySource;

const BUILTIN_CATEGORIES: &str = include_str!("../data/default_categories.txt");
const BUILTIN_HIGH_RISK_CATEGORIES: &str = include_str!("../data/default_high_risk_categories.txt");

/// Category lists held in memory, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticCategorySource {
    categories: Vec<String>,
    high_risk_categories: Vec<String>,
}

impl StaticCategorySource {
    pub fn new(categories: Vec<String>, high_risk_categories: Vec<String>) -> Self {
        Self {
            categories,
            high_risk_categories,
        }
    }

    /// The lists shipped in `data/`.
    pub fn builtin() -> Self {
        Self::new(
            parse_list(BUILTIN_CATEGORIES),
            parse_list(BUILTIN_HIGH_RISK_CATEGORIES),
        )
    }

    /// Reads each configured file, falling back to the built-in list for
    /// any path that is not set.
    pub fn load(
        categories_file: Option<&str>,
        high_risk_categories_file: Option<&str>,
    ) -> anyhow::Result<Self> {
        let builtin = Self::builtin();
        let categories = match categories_file {
            Some(path) => read_list(path)?,
            None => builtin.categories,
        };
        let high_risk_categories = match high_risk_categories_file {
            Some(path) => read_list(path)?,
            None => builtin.high_risk_categories,
        };
        tracing::info!(
            "Loaded {} categories and {} high-risk categories",
            categories.len(),
            high_risk_categories.len()
        );
        Ok(Self::new(categories, high_risk_categories))
    }
}

impl CategorySource for StaticCategorySource {
    fn default_categories(&self) -> Vec<String> {
        self.categories.clone()
    }

    fn default_high_risk_categories(&self) -> Vec<String> {
        self.high_risk_categories.clone()
    }
}

fn read_list(path: impl AsRef<Path>) -> anyhow::Result<Vec<String>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| {
        anyhow::anyhow!("Error reading category list {}: {}", path.display(), e)
    })?;
    let list = parse_list(&raw);
    if list.is_empty() {
        anyhow::bail!("Category list {} is empty", path.display());
    }
    Ok(list)
}

/// One entry per line; entries trimmed, blank lines dropped.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
