//! Search and cast lookup REST endpoints

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    Json, Router,
    extract::{
        ConnectInfo, FromRequestParts, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::AppState;
use crate::services::{CastRequest, LookupError};

/// Identity used for per-caller rate limiting: the peer IP address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for CallerId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let caller = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Ok(Self(caller))
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for LookupError {
    fn into_response(self) -> Response {
        let status = match &self {
            LookupError::Validation(_) => StatusCode::BAD_REQUEST,
            LookupError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            LookupError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Search movies and TV shows
async fn search(
    State(state): State<AppState>,
    CallerId(caller): CallerId,
    params: Result<Query<SearchQuery>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "Rejected search parameters");
            return LookupError::validation("Invalid search parameters").into_response();
        }
    };

    let query = params.query.unwrap_or_default();
    let page = params.page.unwrap_or(1);

    match state.lookup.search(&caller, &query, page).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Full enriched cast for a title
async fn movie_cast(
    State(state): State<AppState>,
    CallerId(caller): CallerId,
    body: Result<Json<CastRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "Rejected cast request body");
            return LookupError::validation("Invalid request body").into_response();
        }
    };

    match state.lookup.cast(&caller, body).await {
        Ok(actors) => Json(actors).into_response(),
        Err(e) => e.into_response(),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/search", get(search))
        .route("/movie-cast", post(movie_cast))
}
