//! Lookup orchestration
//!
//! [LookupService] answers the two caller-facing operations:
//! - `search`: validate, admit, serve from cache or run a provider multi-search
//! - `cast`: validate, admit, aggregate credits, enrich every person
//!
//! The admission limiter and caches are built once at startup and handed in
//! through [LookupStores], so every instance (and every test) owns its state.

use std::sync::Arc;

use tracing::{debug, info};

use super::cache::{ResultCache, search_key};
use super::credits::CreditAggregator;
use super::enricher::PersonEnricher;
use super::error::LookupError;
use super::models::{
    CastRequest, EnrichedActor, MediaType, SearchPage, SearchResponse, SearchResult, TitleRef,
    parse_year,
};
use super::provider::MetadataSource;
use super::rate_limiter::SlidingWindowLimiter;

/// Process-wide state shared by all lookups
#[derive(Clone)]
pub struct LookupStores {
    pub limiter: Arc<SlidingWindowLimiter>,
    pub search_cache: Arc<ResultCache<SearchResponse>>,
    /// `None` turns cast result caching off
    pub cast_cache: Option<Arc<ResultCache<Vec<EnrichedActor>>>>,
}

/// Presentation settings for lookups
#[derive(Debug, Clone)]
pub struct LookupOptions {
    /// Prefix for provider-relative image paths
    pub image_base_url: String,
    /// Language for the extra localized movie credits call
    pub credits_language: Option<String>,
}

pub struct LookupService {
    source: Arc<dyn MetadataSource>,
    aggregator: CreditAggregator,
    enricher: PersonEnricher,
    stores: LookupStores,
    image_base_url: String,
}

impl LookupService {
    pub fn new(
        source: Arc<dyn MetadataSource>,
        stores: LookupStores,
        options: LookupOptions,
    ) -> Self {
        Self {
            aggregator: CreditAggregator::new(source.clone(), options.credits_language),
            enricher: PersonEnricher::new(source.clone(), options.image_base_url.clone()),
            source,
            stores,
            image_base_url: options.image_base_url,
        }
    }

    /// Search movies and TV shows by title.
    pub async fn search(
        &self,
        caller: &str,
        query: &str,
        page: u32,
    ) -> Result<SearchResponse, LookupError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LookupError::validation("Search query is required"));
        }
        if page == 0 {
            return Err(LookupError::validation("Page must be 1 or greater"));
        }

        self.admit(caller)?;

        let key = search_key(query, page);
        if let Some(cached) = self.stores.search_cache.get(&key) {
            debug!(query, page, "Search served from cache");
            return Ok(cached);
        }

        let upstream = self.source.search_multi(query, page).await?;
        let response = build_search_response(upstream, &self.image_base_url);
        self.stores.search_cache.put(key, response.clone());

        info!(
            query,
            page,
            results = response.results.len(),
            total_results = response.total_results,
            "Search completed"
        );
        Ok(response)
    }

    /// Full enriched cast for a title.
    pub async fn cast(
        &self,
        caller: &str,
        request: CastRequest,
    ) -> Result<Vec<EnrichedActor>, LookupError> {
        let title = validate_cast_request(&request)?;
        self.admit(caller)?;

        let movie_year = request.year.as_deref().and_then(parse_year);
        let key = cast_key(title, movie_year);

        if let Some(cache) = &self.stores.cast_cache
            && let Some(cached) = cache.get(&key)
        {
            debug!(title_id = title.id, media_type = %title.media_type, "Cast served from cache");
            return Ok(cached);
        }

        let roster = self.aggregator.roster(title).await?;
        let actors = self.enricher.enrich(roster, movie_year).await;

        if let Some(cache) = &self.stores.cast_cache {
            cache.put(key, actors.clone());
        }

        info!(
            title_id = title.id,
            media_type = %title.media_type,
            actors = actors.len(),
            "Cast lookup completed"
        );
        Ok(actors)
    }

    fn admit(&self, caller: &str) -> Result<(), LookupError> {
        if self.stores.limiter.check(caller) {
            Ok(())
        } else {
            Err(LookupError::RateLimited)
        }
    }
}

fn validate_cast_request(request: &CastRequest) -> Result<TitleRef, LookupError> {
    match (request.id, request.media_type) {
        (Some(id), Some(media_type)) if id > 0 => Ok(TitleRef { id, media_type }),
        _ => Err(LookupError::validation("Movie ID and media type are required")),
    }
}

fn cast_key(title: TitleRef, movie_year: Option<i32>) -> String {
    match movie_year {
        Some(year) => format!("{}-{}-{}", title.media_type, title.id, year),
        None => format!("{}-{}", title.media_type, title.id),
    }
}

/// Keep movie and TV hits, normalize titles and absolutize poster paths.
pub fn build_search_response(page: SearchPage, image_base_url: &str) -> SearchResponse {
    let results = page
        .hits
        .into_iter()
        .filter_map(|hit| {
            let media_type = MediaType::from_provider(&hit.media_type)?;
            Some(SearchResult {
                id: hit.id,
                title: non_empty(hit.title)
                    .or(non_empty(hit.name))
                    .unwrap_or_default(),
                media_type,
                poster_path: non_empty(hit.poster_path)
                    .map(|p| format!("{}{}", image_base_url, p)),
                release_date: hit.release_date,
                first_air_date: hit.first_air_date,
                overview: hit.overview,
                vote_average: hit.vote_average,
            })
        })
        .collect();

    SearchResponse {
        results,
        total_results: page.total_results,
        total_pages: page.total_pages,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
