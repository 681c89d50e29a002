//! Milvus transport implementations.

pub mod mock;
pub mod rest;

pub use mock::{MockCall, MockClient};
pub use rest::RestClient;
