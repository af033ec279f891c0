pub mod layout;
pub mod loader;
pub mod writer;

pub use layout::DocumentStore;
pub use loader::{load_json, load_optional, load_value};
pub use writer::write_json_atomic;
