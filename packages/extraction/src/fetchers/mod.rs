//! Page fetcher implementations.
//!
//! - `HttpFetcher` - plain HTTP GET with HTML reduction
//! - `MockFetcher` - canned pages for tests

mod http;
mod mock;

pub use http::HttpFetcher;
pub use mock::MockFetcher;

pub use crate::traits::fetcher::{PageFetcher, RawPage};
