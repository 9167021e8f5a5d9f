//! Metadata provider seam
//!
//! The lookup engine talks to the provider only through [MetadataSource],
//! so the TMDB client can be swapped for an in-memory source in tests.

use async_trait::async_trait;

use super::error::UpstreamError;
use super::models::{CreditRecord, PersonDetail, SearchPage, TitleRef};

#[async_trait]
pub trait MetadataSource: Send + Sync + 'static {
    /// Multi-search across movies, TV and people.
    async fn search_multi(&self, query: &str, page: u32) -> Result<SearchPage, UpstreamError>;

    /// Cast credits for a title. `language` adds an explicit language parameter.
    async fn credits(
        &self,
        title: TitleRef,
        language: Option<&str>,
    ) -> Result<Vec<CreditRecord>, UpstreamError>;

    /// Cast across every season of a TV show.
    async fn aggregate_credits(&self, tv_id: u64) -> Result<Vec<CreditRecord>, UpstreamError>;

    /// Cast credits for one season of a TV show.
    async fn season_credits(
        &self,
        tv_id: u64,
        season_number: u32,
    ) -> Result<Vec<CreditRecord>, UpstreamError>;

    /// Number of seasons a TV show has.
    async fn season_count(&self, tv_id: u64) -> Result<u32, UpstreamError>;

    async fn person_detail(&self, person_id: u64) -> Result<PersonDetail, UpstreamError>;
}
