//! Continuous scanner for GitHub Actions runs waiting on deployment approval.
//!
//! [`services::monitor::Monitor`] ties the pieces together: the repository
//! inventory, the environment cache, the rate limiter and the worker pool.

pub mod config;
pub mod enums;
pub mod errors;
pub mod helpers;
pub mod logger;
pub mod services;
pub mod structs;
pub mod traits;
pub mod workers;
