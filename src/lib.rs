//! National site browser library
//!
//! Exposes the cache, lookup and session modules for use by the binary and
//! integration tests.

pub mod cache;
pub mod cli;
pub mod data;
pub mod lookup;
pub mod session;
