//! Request-scoped data model for title search and cast lookups.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// Billing position given to credits the provider did not rank.
///
/// Anything without an explicit `order` sorts after every ranked credit.
pub const UNBILLED_ORDER: i32 = 999;

/// Department reported when the provider has none for a person.
pub const UNKNOWN_DEPARTMENT: &str = "Unknown";

/// Kind of title at the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }

    /// Parse a provider `media_type` value. People and other kinds yield `None`.
    pub fn from_provider(value: &str) -> Option<Self> {
        match value {
            "movie" => Some(Self::Movie),
            "tv" => Some(Self::Tv),
            _ => None,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A title identified by provider id and media type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TitleRef {
    pub id: u64,
    pub media_type: MediaType,
}

/// One source's claim that a person appears in a title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditRecord {
    pub person_id: u64,
    pub name: String,
    pub character: Option<String>,
    /// Billing prominence, lower is more prominent
    pub order: Option<i32>,
    pub profile_path: Option<String>,
}

impl CreditRecord {
    /// Billing rank with unranked credits pushed to [UNBILLED_ORDER].
    pub fn effective_order(&self) -> i32 {
        self.order.unwrap_or(UNBILLED_ORDER)
    }
}

/// Person gender as reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum Gender {
    #[default]
    Unknown,
    Female,
    Male,
}

impl From<u8> for Gender {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Female,
            2 => Self::Male,
            _ => Self::Unknown,
        }
    }
}

impl From<Gender> for u8 {
    fn from(gender: Gender) -> Self {
        match gender {
            Gender::Unknown => 0,
            Gender::Female => 1,
            Gender::Male => 2,
        }
    }
}

/// Biographical and popularity detail for one person
#[derive(Debug, Clone, PartialEq)]
pub struct PersonDetail {
    pub person_id: u64,
    pub birth_date: Option<NaiveDate>,
    pub popularity: f64,
    pub gender: Gender,
    pub known_for_department: String,
}

/// A credit merged with the person's detail, ready for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedActor {
    pub id: u64,
    pub name: String,
    pub role: Option<String>,
    #[serde(rename = "birthYear")]
    pub birth_year: Option<i32>,
    #[serde(rename = "movieYear")]
    pub movie_year: Option<i32>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    pub profile_path: Option<String>,
    pub order: i32,
    pub popularity: f64,
    pub gender: Gender,
    pub known_for_department: String,
}

impl EnrichedActor {
    /// Merge a credit with its person detail.
    ///
    /// `image_base_url` is prepended to the profile path when one exists.
    pub fn merge(
        credit: CreditRecord,
        detail: PersonDetail,
        movie_year: Option<i32>,
        image_base_url: &str,
    ) -> Self {
        let order = credit.effective_order();
        let image_url = credit
            .profile_path
            .as_deref()
            .filter(|path| !path.is_empty())
            .map(|path| format!("{}{}", image_base_url, path));

        Self {
            id: credit.person_id,
            name: credit.name,
            role: credit.character,
            birth_year: detail.birth_date.map(|d| d.year()),
            movie_year,
            image_url,
            profile_path: credit.profile_path,
            order,
            popularity: detail.popularity,
            gender: detail.gender,
            known_for_department: detail.known_for_department,
        }
    }
}

/// A movie or TV search hit, normalized for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: u64,
    pub title: String,
    pub media_type: MediaType,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub overview: Option<String>,
    pub vote_average: Option<f64>,
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub total_results: u32,
    pub total_pages: u32,
}

/// Raw multi-search hit as the provider returns it, before filtering
#[derive(Debug, Clone, Default)]
pub struct SearchHit {
    pub id: u64,
    pub media_type: String,
    pub title: Option<String>,
    pub name: Option<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub overview: Option<String>,
    pub vote_average: Option<f64>,
}

/// Raw multi-search page
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub hits: Vec<SearchHit>,
    pub total_results: u32,
    pub total_pages: u32,
}

/// Cast lookup request as received from callers.
///
/// Fields are optional so that missing values can be rejected as a
/// validation failure instead of a deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastRequest {
    pub id: Option<u64>,
    pub media_type: Option<MediaType>,
    #[serde(default, deserialize_with = "year_text")]
    pub year: Option<String>,
}

/// Accept the release year as either `"2010"` or `2010`.
fn year_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Year {
        Text(String),
        Number(i64),
    }

    Ok(match Option::<Year>::deserialize(deserializer)? {
        Some(Year::Text(text)) => Some(text),
        Some(Year::Number(year)) => Some(year.to_string()),
        None => None,
    })
}

/// Parse a release year such as `"2010"` or `"2010-07-16"`.
pub fn parse_year(value: &str) -> Option<i32> {
    value
        .trim()
        .split('-')
        .next()
        .and_then(|y| y.parse().ok())
        .filter(|y| *y > 0)
}

/// Parse a provider date (`YYYY-MM-DD`). Empty or malformed dates yield `None`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}
