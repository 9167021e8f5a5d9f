//! In-memory metadata source shared by the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use castfinder::services::cache::ResultCache;
use castfinder::services::models::{SearchHit, SearchPage, parse_date};
use castfinder::services::{
    AdmissionConfig, CreditRecord, Gender, LookupOptions, LookupService, LookupStores,
    MetadataSource, PersonDetail, SlidingWindowLimiter, TitleRef, UpstreamError,
};

pub const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";

type Outcome<T> = Result<T, UpstreamError>;

/// Canned provider responses. Anything not configured answers 404.
#[derive(Default)]
pub struct StubSource {
    pub search: Option<Outcome<SearchPage>>,
    pub credits: HashMap<u64, Outcome<Vec<CreditRecord>>>,
    pub localized_credits: HashMap<u64, Outcome<Vec<CreditRecord>>>,
    pub aggregate: HashMap<u64, Outcome<Vec<CreditRecord>>>,
    pub season_counts: HashMap<u64, u32>,
    pub seasons: HashMap<(u64, u32), Outcome<Vec<CreditRecord>>>,
    pub people: HashMap<u64, Outcome<PersonDetail>>,
    /// Time every person lookup takes before answering
    pub person_delay: Option<Duration>,
    pub calls: AtomicUsize,
    pub(crate) in_flight: AtomicUsize,
    pub(crate) peak_in_flight: AtomicUsize,
}

/// Marks one season or person call as running until dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl StubSource {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Register a person with a detail record derived from the id.
    pub fn with_person(mut self, person_id: u64, popularity: f64) -> Self {
        let detail = person(person_id, popularity);
        self.people.insert(person_id, Ok(detail));
        self
    }

    /// Most season or person calls that were running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn start_flight(&self) -> InFlight<'_> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        InFlight(&self.in_flight)
    }

    fn answer<T: Clone>(outcome: Option<&Outcome<T>>) -> Outcome<T> {
        outcome.cloned().unwrap_or_else(|| Err(not_found()))
    }
}

#[async_trait]
impl MetadataSource for StubSource {
    async fn search_multi(&self, _query: &str, _page: u32) -> Result<SearchPage, UpstreamError> {
        self.record_call();
        Self::answer(self.search.as_ref())
    }

    async fn credits(
        &self,
        title: TitleRef,
        language: Option<&str>,
    ) -> Result<Vec<CreditRecord>, UpstreamError> {
        self.record_call();
        match language {
            Some(_) => Self::answer(self.localized_credits.get(&title.id)),
            None => Self::answer(self.credits.get(&title.id)),
        }
    }

    async fn aggregate_credits(&self, tv_id: u64) -> Result<Vec<CreditRecord>, UpstreamError> {
        self.record_call();
        Self::answer(self.aggregate.get(&tv_id))
    }

    async fn season_credits(
        &self,
        tv_id: u64,
        season_number: u32,
    ) -> Result<Vec<CreditRecord>, UpstreamError> {
        self.record_call();
        let _flight = self.start_flight();
        // Let later seasons finish first so ordering never depends on timing
        let delay = u64::from(10 - season_number.min(10));
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Self::answer(self.seasons.get(&(tv_id, season_number)))
    }

    async fn season_count(&self, tv_id: u64) -> Result<u32, UpstreamError> {
        self.record_call();
        let count = self.season_counts.get(&tv_id).copied();
        count.ok_or_else(not_found)
    }

    async fn person_detail(&self, person_id: u64) -> Result<PersonDetail, UpstreamError> {
        self.record_call();
        let _flight = self.start_flight();
        if let Some(delay) = self.person_delay {
            tokio::time::sleep(delay).await;
        }
        Self::answer(self.people.get(&person_id))
    }
}

pub fn not_found() -> UpstreamError {
    UpstreamError::from_status(
        404,
        Some("The resource you requested could not be found.".to_string()),
    )
}

pub fn credit(person_id: u64, character: &str, order: Option<i32>) -> CreditRecord {
    CreditRecord {
        person_id,
        name: format!("Person {}", person_id),
        character: Some(character.to_string()),
        order,
        profile_path: Some(format!("/p{}.jpg", person_id)),
    }
}

pub fn person(person_id: u64, popularity: f64) -> PersonDetail {
    PersonDetail {
        person_id,
        birth_date: parse_date("1974-11-11"),
        popularity,
        gender: if person_id % 2 == 0 {
            Gender::Female
        } else {
            Gender::Male
        },
        known_for_department: "Acting".to_string(),
    }
}

pub fn search_hit(id: u64, media_type: &str, title: &str, poster: Option<&str>) -> SearchHit {
    SearchHit {
        id,
        media_type: media_type.to_string(),
        title: Some(title.to_string()),
        poster_path: poster.map(str::to_string),
        ..Default::default()
    }
}

pub fn stores(admission: AdmissionConfig, cache_cast: bool) -> LookupStores {
    let ttl = Duration::from_secs(300);
    LookupStores {
        limiter: Arc::new(SlidingWindowLimiter::new(admission)),
        search_cache: Arc::new(ResultCache::new(ttl)),
        cast_cache: cache_cast.then(|| Arc::new(ResultCache::new(ttl))),
    }
}

/// Lookup service over `source` with default admission limits and no cast cache.
pub fn service(source: Arc<StubSource>) -> LookupService {
    service_with(source, AdmissionConfig::default(), false, None)
}

pub fn service_with(
    source: Arc<StubSource>,
    admission: AdmissionConfig,
    cache_cast: bool,
    credits_language: Option<&str>,
) -> LookupService {
    LookupService::new(
        source,
        stores(admission, cache_cast),
        LookupOptions {
            image_base_url: IMAGE_BASE.to_string(),
            credits_language: credits_language.map(str::to_string),
        },
    )
}
