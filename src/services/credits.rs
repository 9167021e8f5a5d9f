//! Credit aggregation
//!
//! Builds one deduplicated cast roster for a title from every credit
//! endpoint the provider offers for it. Movies use the title credits (plus a
//! language-tagged variant when configured). TV shows additionally pull the
//! aggregate credits and each season's credits, because the primary TV
//! credits only list the latest season's regulars.
//!
//! Only the primary credits call is allowed to fail the lookup. Every other
//! source is best-effort and contributes nothing when it fails.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use super::error::UpstreamError;
use super::fanout::settle_all;
use super::models::{CreditRecord, MediaType, TitleRef};
use super::provider::MetadataSource;

pub struct CreditAggregator {
    source: Arc<dyn MetadataSource>,
    language: Option<String>,
}

impl CreditAggregator {
    /// `language`, when set, adds a second movie credits call carrying it.
    pub fn new(source: Arc<dyn MetadataSource>, language: Option<String>) -> Self {
        Self { source, language }
    }

    /// Deduplicated roster for `title`, most prominent credit first.
    pub async fn roster(&self, title: TitleRef) -> Result<Vec<CreditRecord>, UpstreamError> {
        let sources = match title.media_type {
            MediaType::Movie => self.movie_sources(title).await?,
            MediaType::Tv => self.tv_sources(title).await?,
        };

        let total: usize = sources.iter().map(Vec::len).sum();
        let roster = dedup_by_person(sources.into_iter().flatten());
        debug!(
            title_id = title.id,
            media_type = %title.media_type,
            credits = total,
            roster = roster.len(),
            "Aggregated credits"
        );
        Ok(roster)
    }

    async fn movie_sources(
        &self,
        title: TitleRef,
    ) -> Result<Vec<Vec<CreditRecord>>, UpstreamError> {
        let (primary, localized) = tokio::join!(
            self.source.credits(title, None),
            self.localized_credits(title)
        );
        Ok(vec![primary?, localized])
    }

    async fn tv_sources(&self, title: TitleRef) -> Result<Vec<Vec<CreditRecord>>, UpstreamError> {
        let (primary, aggregate, seasons) = tokio::join!(
            self.source.credits(title, None),
            self.source.aggregate_credits(title.id),
            self.season_sources(title.id)
        );

        let aggregate = aggregate.unwrap_or_else(|e| {
            warn!(tv_id = title.id, error = %e, "Aggregate credits unavailable, skipping");
            Vec::new()
        });

        let mut sources = Vec::with_capacity(seasons.len() + 2);
        sources.push(primary?);
        sources.push(aggregate);
        sources.extend(seasons);
        Ok(sources)
    }

    async fn localized_credits(&self, title: TitleRef) -> Vec<CreditRecord> {
        let Some(language) = self.language.as_deref() else {
            return Vec::new();
        };

        match self.source.credits(title, Some(language)).await {
            Ok(credits) => credits,
            Err(e) => {
                warn!(title_id = title.id, language, error = %e, "Localized credits unavailable");
                Vec::new()
            }
        }
    }

    /// Credits for seasons `1..=season_count`, fetched concurrently.
    async fn season_sources(&self, tv_id: u64) -> Vec<Vec<CreditRecord>> {
        let season_count = match self.source.season_count(tv_id).await {
            Ok(count) => count,
            Err(e) => {
                warn!(tv_id, error = %e, "Could not read season count, skipping season credits");
                return Vec::new();
            }
        };

        settle_all(1..=season_count, |season| {
            self.source.season_credits(tv_id, season)
        })
        .await
        .into_iter()
        .filter_map(|(season, result)| match result {
            Ok(credits) => Some(credits),
            Err(e) => {
                warn!(tv_id, season, error = %e, "Season credits failed, skipping season");
                None
            }
        })
        .collect()
    }
}

/// Collapse credits to one entry per person.
///
/// The entry with the lowest effective order wins, an equal order keeps the
/// one seen first. The roster comes back sorted by effective order, stable
/// with respect to first appearance.
pub fn dedup_by_person<I>(credits: I) -> Vec<CreditRecord>
where
    I: IntoIterator<Item = CreditRecord>,
{
    let mut positions: HashMap<u64, usize> = HashMap::new();
    let mut roster: Vec<CreditRecord> = Vec::new();

    for credit in credits {
        match positions.get(&credit.person_id) {
            Some(&pos) => {
                if credit.effective_order() < roster[pos].effective_order() {
                    roster[pos] = credit;
                }
            }
            None => {
                positions.insert(credit.person_id, roster.len());
                roster.push(credit);
            }
        }
    }

    roster.sort_by_key(CreditRecord::effective_order);
    roster
}
