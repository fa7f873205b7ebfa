use serde::{Deserialize, Serialize};

/// Catalog genre, used only as an iteration key while sampling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Response body of `genre/movie/list`
#[derive(Debug, Clone, Deserialize)]
pub struct GenreList {
    pub genres: Vec<Genre>,
}
