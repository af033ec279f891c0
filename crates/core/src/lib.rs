pub mod error;
pub mod models;
pub mod traits;
pub mod types;
pub mod utils;

pub use error::{KbError, Result};
pub use models::{
    Factor, FactorDescription, FactorGroup, FactorTaxonomy, Measure, MeasureIndex,
    MeasureSummary, Paper, PaperMeasureLink, LINKS_KEY,
};
pub use traits::SchemaCheck;
pub use types::{ConclusionSign, Replicable, Style};
