pub mod analyze;
pub mod model;

// Re-export commonly used types/functions for consumers
pub use analyze::{analyze, Analysis, Edge, EdgeKind, Line, Report};
pub use model::{load_source, load_sources, Source};
