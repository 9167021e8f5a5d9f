//! Castfinder - "who's in this" cast lookups backed by TMDB
//!
//! Resolves a movie or TV title to a deduplicated, enriched cast roster and
//! serves title search, both behind a TTL cache and per-caller rate limiting.

pub mod api;
pub mod app;
pub mod config;
pub mod services;
