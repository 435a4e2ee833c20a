pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod notion;
pub mod tools;

pub use error::Error;
pub use model::bug::Bug;
pub use notion::NotionClient;
