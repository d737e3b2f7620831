pub mod adapters;
pub mod core;
pub mod error;
pub mod utils;

#[cfg(any(test, feature = "mocks"))]
pub mod memory;
