pub mod batch;
pub mod factor;
pub mod measure;
pub mod paper;
pub mod relation;
pub mod report;
pub mod schema;

pub use batch::Validator;
pub use factor::check_taxonomy;
pub use measure::{check_measure, check_measure_filing};
pub use paper::check_paper;
pub use relation::check_relations;
pub use report::{Findings, ValidationResult, ValidationSummary};
#[cfg(feature = "json-schema")]
pub use schema::JsonSchema;
pub use schema::SchemaSet;
