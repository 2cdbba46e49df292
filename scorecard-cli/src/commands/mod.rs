//! CLI command implementations

pub mod pr;
pub mod repo;
pub mod search;

pub use pr::PrCommand;
pub use repo::RepoCommand;
pub use search::SearchArgs;
