// Pipeline stages and shared errors/models
pub mod enrichment {
    pub use crate::enrichment::*;
}

pub mod stages {
    pub use crate::adverse_media::*;
    pub use crate::classifier::*;
    pub use crate::field_filter::*;
    pub use crate::input::*;
    pub use crate::whois::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
