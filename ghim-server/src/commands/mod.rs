//! CLI command implementations

pub mod export;
pub mod serve;

pub use export::ExportArgs;
pub use serve::ServeArgs;
