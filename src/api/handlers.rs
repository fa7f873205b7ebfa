use axum::{extract::State, http::StatusCode, response::Html, Extension, Json};
use rand::{rngs::StdRng, SeedableRng};
use serde_json::{json, Value};

use crate::{
    db::{session::MOVIES_KEY, Session, SessionId},
    error::{AppError, AppResult},
    models::MovieList,
    services::{genre_sampler, recommendations},
};

use super::{views, AppState};

/// Extracts movie ids from a form body such as `movies=27&movies=38`
///
/// Pieces are split on `&`; the field name before `=` is ignored and the
/// value parsed as an id. Empty pieces are skipped.
pub fn parse_movie_ids(body: &str) -> AppResult<Vec<u64>> {
    body.split('&')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(|piece| {
            let value = piece.split_once('=').map_or(piece, |(_, value)| value).trim();
            value
                .parse::<u64>()
                .map_err(|_| AppError::InvalidInput(format!("Invalid movie id: {:?}", value)))
        })
        .collect()
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Home page: the curated movie set, sampled once per session
pub async fn home(
    State(state): State<AppState>,
    Extension(session_id): Extension<SessionId>,
) -> AppResult<Html<String>> {
    let session = Session::new(state.sessions.clone(), session_id);

    let movies = match session.get::<MovieList>(MOVIES_KEY).await? {
        Some(movies) if !movies.is_empty() => {
            tracing::debug!(session_id = %session_id, movies = movies.len(), "Movie list cache hit");
            movies
        }
        _ => {
            tracing::info!(
                session_id = %session_id,
                store = state.sessions.name(),
                "Movie list cache miss"
            );
            let mut rng = StdRng::from_entropy();
            let movies = genre_sampler::get_movies(state.catalog.as_ref(), &mut rng).await?;
            session.set(MOVIES_KEY, &movies).await?;
            movies
        }
    };

    Ok(Html(views::render_home(&movies, &state.poster_base_url)))
}

/// Recommendations page for the movies submitted from the home page form
pub async fn show_recommended(
    State(state): State<AppState>,
    body: String,
) -> AppResult<Html<String>> {
    let ids = parse_movie_ids(&body)?;

    tracing::info!(ids = ?ids, "Processing recommendation request");

    let candidates =
        recommendations::get_recommended_movies_by_ids(state.catalog.as_ref(), &ids).await?;

    let mut rng = StdRng::from_entropy();
    let picked = recommendations::sample_eight(&candidates, &mut rng);

    Ok(Html(views::render_recommendations(
        &picked,
        &state.poster_base_url,
    )))
}
