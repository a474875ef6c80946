//! Centralized error handling for the channel harvester
//!
//! # Error Categories
//!
//! - **Feed Errors**: provider connectivity and decoding, always downgraded to an empty feed
//! - **Persistence Errors**: reading the previous catalog, writing outputs; fatal for the run
//! - **Configuration Errors**: invalid configuration values or rule patterns
//!
//! # Usage
//!
//! ```rust
//! use channel_harvester::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Ok("success".to_string())
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for feed provider Results
pub type FeedResult<T> = Result<T, FeedError>;

/// Convenience type alias for persistence Results
pub type PersistenceResult<T> = Result<T, PersistenceError>;
