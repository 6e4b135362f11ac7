//! Data ingestion module - fetch, decode, parse and normalize listing datasets

pub mod decode;
pub mod fetch;
pub mod normalize;
pub mod parse;
pub mod types;
pub mod utils;

pub use fetch::{DatasetSource, HttpDatasetSource};
pub use normalize::normalize;
pub use types::*;
