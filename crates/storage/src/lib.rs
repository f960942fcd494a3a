#![forbid(unsafe_code)]

pub mod http;
pub mod repository;

pub use http::{HttpConfig, HttpInitError, HttpRepository};
pub use repository::{InMemoryRepository, Storage, StorageError};
