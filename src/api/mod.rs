//! API route definitions
//!
//! A thin REST adapter over [LookupService](crate::services::LookupService).
//! Errors are returned as `{ "error": "..." }`.

pub mod health;
pub mod lookup;
