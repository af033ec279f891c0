pub mod catalog;
pub mod engine;
pub mod summary;

pub use catalog::FactorCatalog;
pub use engine::{
    FactorListing, FactorLookup, IndexKey, MeasureListing, PaperSummary, QueryEngine,
};
pub use summary::CollectionSummary;
