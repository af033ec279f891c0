use serde_json::Value;

/// Optional structural validation layered on top of the field-level checks.
///
/// Implementations return every violation found; an empty list means the
/// document conforms.
pub trait SchemaCheck: Send + Sync {
    fn name(&self) -> &str;
    fn check(&self, document: &Value) -> Vec<String>;
}
