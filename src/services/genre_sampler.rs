use crate::{
    error::AppResult,
    models::{Movie, MovieList},
    services::catalog::{fetch_genres, fetch_results, MovieCatalog, QueryParams, PATH_DISCOVER_MOVIE},
};
use chrono::{Months, NaiveDate, Utc};
use rand::Rng;

/// New movies collected per genre
pub const PICKS_PER_GENRE: usize = 3;
/// Random draws allowed per genre, repeats included
pub const DRAWS_PER_GENRE: usize = 6;

const MIN_VOTE_COUNT: u32 = 3000;
const MIN_VOTE_AVERAGE: &str = "7";
const MAX_VOTE_AVERAGE: &str = "10";
const MIN_AGE_MONTHS: u32 = 24;

/// Latest release date a candidate may have, given today's date
pub fn release_cutoff(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_months(Months::new(MIN_AGE_MONTHS))
        .unwrap_or(NaiveDate::MIN)
}

/// Discover query for well-rated, established movies of one genre
pub fn discover_query(genre_id: u64, today: NaiveDate) -> QueryParams {
    vec![
        ("sort_by".to_string(), "vote_average.desc".to_string()),
        ("vote_count.gte".to_string(), MIN_VOTE_COUNT.to_string()),
        ("with_genres".to_string(), genre_id.to_string()),
        (
            "release_date.lte".to_string(),
            release_cutoff(today).format("%Y-%m-%d").to_string(),
        ),
        ("vote_average.gte".to_string(), MIN_VOTE_AVERAGE.to_string()),
        ("vote_average.lte".to_string(), MAX_VOTE_AVERAGE.to_string()),
    ]
}

/// Draws up to [`PICKS_PER_GENRE`] movies not yet in `movies`
///
/// Each draw picks a uniformly random candidate, with replacement. A draw that
/// hits an id already collected is wasted but still spends one of the
/// [`DRAWS_PER_GENRE`] draws. Returns how many movies were added.
pub fn sample_genre<R: Rng>(
    candidates: &[Movie],
    movies: &mut MovieList,
    rng: &mut R,
) -> usize {
    if candidates.is_empty() {
        return 0;
    }

    let mut added = 0;
    let mut draws = 0;

    while added < PICKS_PER_GENRE && draws < DRAWS_PER_GENRE {
        let pick = &candidates[rng.gen_range(0..candidates.len())];
        if !movies.contains(pick.id) {
            movies.insert(pick.clone());
            added += 1;
        }
        draws += 1;
    }

    added
}

/// Builds the curated starter set: a few random top-rated movies per genre
///
/// Genres are visited in catalog order. Any catalog failure aborts the whole
/// call.
pub async fn get_movies<R: Rng + Send>(
    catalog: &dyn MovieCatalog,
    rng: &mut R,
) -> AppResult<MovieList> {
    let today = Utc::now().date_naive();
    let genres = fetch_genres(catalog).await?.genres;

    tracing::info!(genres = genres.len(), "Sampling movies per genre");

    let mut movies = MovieList::new();

    for genre in &genres {
        let candidates =
            fetch_results(catalog, PATH_DISCOVER_MOVIE, discover_query(genre.id, today)).await?;
        let added = sample_genre(&candidates, &mut movies, rng);

        tracing::debug!(
            genre_id = genre.id,
            genre = %genre.name,
            candidates = candidates.len(),
            added,
            "Genre sampled"
        );
    }

    tracing::info!(movies = movies.len(), "Movie list built");

    Ok(movies)
}
