use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A movie as returned by the catalog
///
/// Only the id is interpreted locally. Every other catalog field (title,
/// poster path, vote average, ...) is kept verbatim in `details` and
/// serialized back out unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: u64,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Curated movie set cached in the user's session
///
/// Keyed by movie id: inserting an id already present replaces that entry in
/// place. Otherwise movies keep insertion order, so the list reads genre by
/// genre. Serialized as a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Movie>", into = "Vec<Movie>")]
pub struct MovieList {
    movies: Vec<Movie>,
}

impl MovieList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: u64) -> Option<&Movie> {
        self.movies.iter().find(|m| m.id == id)
    }

    /// Adds `movie`, returning the entry it replaced if its id was present
    pub fn insert(&mut self, movie: Movie) -> Option<Movie> {
        match self.movies.iter_mut().find(|m| m.id == movie.id) {
            Some(existing) => Some(std::mem::replace(existing, movie)),
            None => {
                self.movies.push(movie);
                None
            }
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.movies.iter().map(|m| m.id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Movie> {
        self.movies.iter()
    }
}

impl From<Vec<Movie>> for MovieList {
    fn from(movies: Vec<Movie>) -> Self {
        movies.into_iter().collect()
    }
}

impl From<MovieList> for Vec<Movie> {
    fn from(list: MovieList) -> Self {
        list.movies
    }
}

impl FromIterator<Movie> for MovieList {
    fn from_iter<I: IntoIterator<Item = Movie>>(iter: I) -> Self {
        let mut list = MovieList::new();
        for movie in iter {
            list.insert(movie);
        }
        list
    }
}

impl<'a> IntoIterator for &'a MovieList {
    type Item = &'a Movie;
    type IntoIter = std::slice::Iter<'a, Movie>;

    fn into_iter(self) -> Self::IntoIter {
        self.movies.iter()
    }
}

impl Movie {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            details: Map::new(),
        }
    }

    /// Sets a passthrough catalog field
    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.get(key).and_then(Value::as_str)
    }

    /// Display title, falling back to the original title
    pub fn title(&self) -> &str {
        self.detail_str("title")
            .or_else(|| self.detail_str("original_title"))
            .unwrap_or("Untitled")
    }

    pub fn poster_path(&self) -> Option<&str> {
        self.detail_str("poster_path")
    }

    pub fn overview(&self) -> Option<&str> {
        self.detail_str("overview").filter(|o| !o.is_empty())
    }

    pub fn vote_average(&self) -> Option<f64> {
        self.details.get("vote_average").and_then(Value::as_f64)
    }

    /// Four-digit year taken from `release_date` (YYYY-MM-DD)
    pub fn release_year(&self) -> Option<&str> {
        self.detail_str("release_date")
            .and_then(|date| date.get(..4))
            .filter(|year| year.chars().all(|c| c.is_ascii_digit()))
    }
}

/// One page of movie results (discover and recommendations endpoints)
#[derive(Debug, Clone, Deserialize)]
pub struct ResultsPage {
    pub results: Vec<Movie>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub total_results: Option<u64>,
}
