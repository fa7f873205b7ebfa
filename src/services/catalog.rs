/// Movie catalog client
///
/// Thin wrapper over The Movie Database REST API. Every request is a single
/// GET against `<host>/<version>/<path>?<query>&api_key=<key>`, decoded as
/// JSON. No retries; failures propagate to the caller.
use crate::{
    error::{AppError, AppResult},
    models::{GenreList, Movie, ResultsPage},
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const PATH_GENRE_LIST: &str = "genre/movie/list";
pub const PATH_DISCOVER_MOVIE: &str = "discover/movie";

/// Path of the recommendation list for one movie
pub fn recommendations_path(movie_id: u64) -> String {
    format!("movie/{}/recommendations", movie_id)
}

/// Ordered query parameters, excluding the API key
pub type QueryParams = Vec<(String, String)>;

/// Source of catalog data
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Issues a GET for `path` with `query` and returns the decoded JSON body
    async fn fetch(&self, path: &str, query: QueryParams) -> AppResult<Value>;
}

/// Fetches and decodes a catalog response into `T`
pub async fn fetch_as<T: DeserializeOwned>(
    catalog: &dyn MovieCatalog,
    path: &str,
    query: QueryParams,
) -> AppResult<T> {
    let body = catalog.fetch(path, query).await?;
    Ok(serde_json::from_value(body)?)
}

/// Fetches the `results` array of a paged movie endpoint
pub async fn fetch_results(
    catalog: &dyn MovieCatalog,
    path: &str,
    query: QueryParams,
) -> AppResult<Vec<Movie>> {
    let page: ResultsPage = fetch_as(catalog, path, query).await?;

    tracing::debug!(
        path = %path,
        returned = page.results.len(),
        total = ?page.total_results,
        "Catalog page decoded"
    );

    Ok(page.results)
}

/// Fetches the full genre list in catalog order
pub async fn fetch_genres(catalog: &dyn MovieCatalog) -> AppResult<GenreList> {
    fetch_as(catalog, PATH_GENRE_LIST, QueryParams::new()).await
}

#[derive(Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    api_host: String,
    api_version: String,
    api_key: String,
}

impl TmdbClient {
    pub fn new(api_host: String, api_version: String, api_key: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_host,
            api_version,
            api_key,
        }
    }

    /// Builds the full request URL
    ///
    /// Parameters keep their given order and are percent-encoded; `api_key`
    /// always comes last.
    pub fn build_url(&self, path: &str, query: &[(String, String)]) -> String {
        let mut url = format!(
            "{}/{}/{}?",
            self.api_host.trim_end_matches('/'),
            self.api_version.trim_matches('/'),
            path.trim_start_matches('/')
        );

        for (key, value) in query {
            url.push_str(&urlencoding::encode(key));
            url.push('=');
            url.push_str(&urlencoding::encode(value));
            url.push('&');
        }

        url.push_str("api_key=");
        url.push_str(&urlencoding::encode(&self.api_key));
        url
    }
}

#[async_trait::async_trait]
impl MovieCatalog for TmdbClient {
    async fn fetch(&self, path: &str, query: QueryParams) -> AppResult<Value> {
        let url = self.build_url(path, &query);

        let response = self.http_client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(path = %path, status = %status, "Catalog request rejected");
            return Err(AppError::ExternalApi(format!(
                "Catalog API returned status {}: {}",
                status, body
            )));
        }

        let body: Value = response.json().await?;

        tracing::info!(path = %path, params = query.len(), "Catalog request completed");

        Ok(body)
    }
}
