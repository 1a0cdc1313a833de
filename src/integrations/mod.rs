//! External service integrations.

pub mod services {
    pub use crate::services::*;
}

pub mod metadata_scraper {
    pub use crate::metadata_scraper::*;
}

pub mod categories {
    pub use crate::categories::*;
}
