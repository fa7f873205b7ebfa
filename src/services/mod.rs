pub mod catalog;
pub mod genre_sampler;
pub mod recommendations;

pub use catalog::{MovieCatalog, TmdbClient};
