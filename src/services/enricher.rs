//! Person enrichment
//!
//! Attaches biographical and popularity detail to every roster entry.
//! Lookups run concurrently and the batch waits for all of them. A person
//! whose lookup fails is left out of the result.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{debug, warn};

use super::fanout::settle_all;
use super::models::{CreditRecord, EnrichedActor};
use super::provider::MetadataSource;

pub struct PersonEnricher {
    source: Arc<dyn MetadataSource>,
    image_base_url: String,
}

impl PersonEnricher {
    pub fn new(source: Arc<dyn MetadataSource>, image_base_url: String) -> Self {
        Self {
            source,
            image_base_url,
        }
    }

    /// Enrich `roster`, stamping every actor with `movie_year`.
    pub async fn enrich(
        &self,
        roster: Vec<CreditRecord>,
        movie_year: Option<i32>,
    ) -> Vec<EnrichedActor> {
        let requested = roster.len();

        let source = &self.source;
        let lookups = settle_all(roster, |credit| source.person_detail(credit.person_id));
        let outcomes = lookups.await;

        let mut actors: Vec<EnrichedActor> = outcomes
            .into_iter()
            .filter_map(|(credit, result)| match result {
                Ok(detail) => Some(EnrichedActor::merge(
                    credit,
                    detail,
                    movie_year,
                    &self.image_base_url,
                )),
                Err(e) => {
                    warn!(
                        person_id = credit.person_id,
                        name = %credit.name,
                        error = %e,
                        "Person lookup failed, dropping cast member"
                    );
                    None
                }
            })
            .collect();

        sort_actors(&mut actors);
        debug!(requested, enriched = actors.len(), "Enriched cast");
        actors
    }
}

/// Billing order ascending, then popularity descending. Stable.
pub fn sort_actors(actors: &mut [EnrichedActor]) {
    actors.sort_by(|a, b| {
        a.order.cmp(&b.order).then_with(|| {
            b.popularity
                .partial_cmp(&a.popularity)
                .unwrap_or(Ordering::Equal)
        })
    });
}
