pub mod genre;
pub mod movie;

pub use genre::{Genre, GenreList};
pub use movie::{Movie, MovieList, ResultsPage};
