pub mod builder;
pub mod persist;

pub use builder::{rebuild, IndexStats, PaperIndex};
pub use persist::{build_from_store, load_index, write_index, IndexBuild};
