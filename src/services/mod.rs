//! Cast resolution and enrichment services

pub mod cache;
pub mod credits;
pub mod enricher;
pub mod error;
pub mod fanout;
pub mod lookup;
pub mod models;
pub mod provider;
pub mod rate_limiter;
pub mod tmdb;

pub use cache::ResultCache;
pub use credits::CreditAggregator;
pub use enricher::PersonEnricher;
pub use error::{LookupError, UpstreamError};
pub use lookup::{LookupOptions, LookupService, LookupStores};
pub use models::{
    CastRequest, CreditRecord, EnrichedActor, Gender, MediaType, PersonDetail, SearchResponse,
    SearchResult, TitleRef,
};
pub use provider::MetadataSource;
pub use rate_limiter::{AdmissionConfig, SlidingWindowLimiter};
pub use tmdb::{TmdbClient, TmdbConfig};
