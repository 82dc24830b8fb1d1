//! Test doubles and fixtures shared by unit and integration tests.
//!
//! Kept in the library so `tests/` can drive the engine against scripted
//! transports without any network.

pub mod builders;
pub mod stubs;
