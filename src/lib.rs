pub mod answer;
pub mod config;
pub mod error;
pub mod migrate;
pub mod model;
pub mod navigation;
pub mod persist;
pub mod repository;
pub mod session;
pub mod store;

pub use error::{Error, Result};
pub use repository::Repository;
