//! TMDB (The Movie Database) API client for search and cast metadata
//!
//! Every endpoint takes the API key as a query parameter. Image paths in
//! responses are relative and need the configured image base URL.
//!
//! Requests are paced through [RateLimitedClient] but never retried: a
//! failed call surfaces as an [UpstreamError] and the caller decides whether
//! it is fatal.

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::error::UpstreamError;
use super::models::{
    CreditRecord, Gender, PersonDetail, SearchHit, SearchPage, TitleRef, UNKNOWN_DEPARTMENT,
    parse_date,
};
use super::provider::MetadataSource;
use super::rate_limiter::{RateLimitConfig, RateLimitedClient};

/// Connection settings for [TmdbClient]
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub api_key: String,
    pub base_url: String,
    /// Sent with searches, and with the extra localized credits call
    pub language: Option<String>,
    pub requests_per_second: u32,
}

/// TMDB API client
pub struct TmdbClient {
    client: RateLimitedClient,
    base_url: String,
    api_key: String,
    language: Option<String>,
}

/// Multi-search page from TMDB
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMultiSearchResult {
    #[serde(default)]
    pub results: Vec<TmdbMultiItem>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

/// One multi-search hit (movie, tv or person)
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMultiItem {
    pub id: u64,
    #[serde(default)]
    pub media_type: String,
    pub title: Option<String>,
    pub name: Option<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub overview: Option<String>,
    pub vote_average: Option<f64>,
}

/// Title credits from TMDB (`/movie/{id}/credits`, `/tv/{id}/credits`,
/// `/tv/{id}/season/{n}/credits`)
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCastMember {
    pub id: u64,
    pub name: String,
    pub character: Option<String>,
    pub order: Option<i32>,
    pub profile_path: Option<String>,
}

/// Aggregate TV credits, one entry per person across all seasons
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbAggregateCredits {
    #[serde(default)]
    pub cast: Vec<TmdbAggregateCastMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbAggregateCastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<TmdbRole>,
    pub order: Option<i32>,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbRole {
    pub character: Option<String>,
}

/// The part of `/tv/{id}` the cast lookup needs
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbTvDetails {
    pub number_of_seasons: Option<u32>,
}

/// Person details from TMDB
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPerson {
    pub id: u64,
    pub birthday: Option<String>,
    pub popularity: Option<f64>,
    pub gender: Option<u8>,
    pub known_for_department: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbErrorBody {
    status_message: Option<String>,
}

impl From<TmdbMultiItem> for SearchHit {
    fn from(item: TmdbMultiItem) -> Self {
        Self {
            id: item.id,
            media_type: item.media_type,
            title: item.title,
            name: item.name,
            poster_path: item.poster_path,
            release_date: item.release_date,
            first_air_date: item.first_air_date,
            overview: item.overview,
            vote_average: item.vote_average,
        }
    }
}

impl From<TmdbCastMember> for CreditRecord {
    fn from(member: TmdbCastMember) -> Self {
        Self {
            person_id: member.id,
            name: member.name,
            character: member.character.filter(|c| !c.is_empty()),
            order: member.order,
            profile_path: member.profile_path,
        }
    }
}

impl From<TmdbAggregateCastMember> for CreditRecord {
    fn from(member: TmdbAggregateCastMember) -> Self {
        let character = member
            .roles
            .into_iter()
            .filter_map(|r| r.character)
            .find(|c| !c.is_empty());

        Self {
            person_id: member.id,
            name: member.name,
            character,
            order: member.order,
            profile_path: member.profile_path,
        }
    }
}

impl From<TmdbPerson> for PersonDetail {
    fn from(person: TmdbPerson) -> Self {
        Self {
            person_id: person.id,
            birth_date: person.birthday.as_deref().and_then(parse_date),
            popularity: person.popularity.filter(|p| *p >= 0.0).unwrap_or(0.0),
            gender: person.gender.map(Gender::from).unwrap_or_default(),
            known_for_department: person
                .known_for_department
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| UNKNOWN_DEPARTMENT.to_string()),
        }
    }
}

impl TmdbClient {
    pub fn new(config: TmdbConfig) -> reqwest::Result<Self> {
        let client = RateLimitedClient::new(
            "tmdb",
            RateLimitConfig {
                requests_per_second: config.requests_per_second,
                burst_size: config.requests_per_second,
            },
        )?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            language: config.language.filter(|l| !l.is_empty()),
        })
    }

    /// GET `path` with the API key plus `params`, decoding the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let url = format!("{}{}", self.base_url, path);
        let mut query: Vec<(&str, &str)> = vec![("api_key", self.api_key.as_str())];
        query.extend(params.iter().map(|(k, v)| (*k, v.as_str())));

        let response = self.client.get_with_query(&url, &query).await.map_err(|e| {
            warn!(path, error = %e, "TMDB request failed");
            UpstreamError::transport()
        })?;

        let status = response.status();
        if !status.is_success() {
            let provider_message = response
                .json::<TmdbErrorBody>()
                .await
                .ok()
                .and_then(|body| body.status_message);
            let status = status.as_u16();
            debug!(path, status, "TMDB returned an error status");
            return Err(UpstreamError::from_status(status, provider_message));
        }

        response.json::<T>().await.map_err(|e| {
            warn!(path, error = %e, "Failed to parse TMDB response");
            UpstreamError::transport()
        })
    }

    async fn cast_list(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<CreditRecord>, UpstreamError> {
        let credits: TmdbCredits = self.get_json(path, params).await?;
        Ok(credits.cast.into_iter().map(CreditRecord::from).collect())
    }
}

#[async_trait]
impl MetadataSource for TmdbClient {
    async fn search_multi(&self, query: &str, page: u32) -> Result<SearchPage, UpstreamError> {
        debug!(query, page, "Searching TMDB");

        let mut params = vec![
            ("query", query.trim().to_string()),
            ("page", page.to_string()),
            ("include_adult", "false".to_string()),
        ];
        if let Some(language) = &self.language {
            params.push(("language", language.clone()));
        }

        let result: TmdbMultiSearchResult = self.get_json("/search/multi", &params).await?;
        Ok(SearchPage {
            hits: result.results.into_iter().map(SearchHit::from).collect(),
            total_results: result.total_results,
            total_pages: result.total_pages,
        })
    }

    async fn credits(
        &self,
        title: TitleRef,
        language: Option<&str>,
    ) -> Result<Vec<CreditRecord>, UpstreamError> {
        let path = format!("/{}/{}/credits", title.media_type, title.id);
        let params: Vec<(&str, String)> = language
            .map(|l| vec![("language", l.to_string())])
            .unwrap_or_default();
        self.cast_list(&path, &params).await
    }

    async fn aggregate_credits(&self, tv_id: u64) -> Result<Vec<CreditRecord>, UpstreamError> {
        let path = format!("/tv/{}/aggregate_credits", tv_id);
        let credits: TmdbAggregateCredits = self.get_json(&path, &[]).await?;
        Ok(credits.cast.into_iter().map(CreditRecord::from).collect())
    }

    async fn season_credits(
        &self,
        tv_id: u64,
        season_number: u32,
    ) -> Result<Vec<CreditRecord>, UpstreamError> {
        let path = format!("/tv/{}/season/{}/credits", tv_id, season_number);
        self.cast_list(&path, &[]).await
    }

    async fn season_count(&self, tv_id: u64) -> Result<u32, UpstreamError> {
        let details: TmdbTvDetails = self.get_json(&format!("/tv/{}", tv_id), &[]).await?;
        Ok(details.number_of_seasons.unwrap_or(0))
    }

    async fn person_detail(&self, person_id: u64) -> Result<PersonDetail, UpstreamError> {
        let person: TmdbPerson = self.get_json(&format!("/person/{}", person_id), &[]).await?;
        Ok(PersonDetail::from(person))
    }
}
