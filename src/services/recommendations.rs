use crate::{
    error::AppResult,
    models::Movie,
    services::catalog::{fetch_results, recommendations_path, MovieCatalog, QueryParams},
};
use rand::{seq::index, Rng};

/// Number of movies shown on the recommendations page
pub const RECOMMENDATION_COUNT: usize = 8;

/// Merges the catalog's recommendation lists for each of `ids`
///
/// Order follows `ids`, then catalog order within each list. Movies
/// recommended for more than one source id appear once per source.
pub async fn get_recommended_movies_by_ids(
    catalog: &dyn MovieCatalog,
    ids: &[u64],
) -> AppResult<Vec<Movie>> {
    let mut recommendations = Vec::new();

    for id in ids {
        let results = fetch_results(catalog, &recommendations_path(*id), QueryParams::new()).await?;
        tracing::debug!(movie_id = id, results = results.len(), "Recommendations fetched");
        recommendations.extend(results);
    }

    tracing::info!(
        source_ids = ids.len(),
        merged = recommendations.len(),
        "Recommendations merged"
    );

    Ok(recommendations)
}

/// Picks [`RECOMMENDATION_COUNT`] distinct positions at random, in draw order
///
/// With fewer candidates than that, every candidate is returned in random
/// order.
pub fn sample_eight<R: Rng>(recommendations: &[Movie], rng: &mut R) -> Vec<Movie> {
    let amount = RECOMMENDATION_COUNT.min(recommendations.len());

    if amount < RECOMMENDATION_COUNT {
        tracing::warn!(
            available = recommendations.len(),
            "Fewer recommendations than requested"
        );
    }

    index::sample(rng, recommendations.len(), amount)
        .into_iter()
        .map(|i| recommendations[i].clone())
        .collect()
}
