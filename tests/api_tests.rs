use std::collections::HashMap;
use std::time::Duration;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use axum::http::{header, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use movie_recommender::{
    api::{create_router, AppState},
    db::{session::MOVIES_KEY, MemorySessionStore, SessionId, SessionStore},
    error::{AppError, AppResult},
    services::catalog::{MovieCatalog, QueryParams},
};

/// In-process catalog serving canned responses and recording every request
#[derive(Default)]
struct FakeCatalog {
    genres: Vec<(u64, &'static str)>,
    discover: HashMap<u64, Vec<u64>>,
    recommendations: HashMap<u64, Vec<u64>>,
    fail: bool,
    calls: AtomicUsize,
    paths: Mutex<Vec<String>>,
}

impl FakeCatalog {
    fn with_genres() -> Self {
        Self {
            genres: vec![(28, "Action"), (18, "Drama"), (99, "Documentary")],
            discover: HashMap::from([
                (28, (100..140).collect()),
                (18, (200..240).collect()),
                (99, vec![]),
            ]),
            ..Default::default()
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

fn results(ids: &[u64]) -> Value {
    json!({
        "page": 1,
        "results": ids
            .iter()
            .map(|id| json!({
                "id": id,
                "title": format!("Movie {}", id),
                "poster_path": format!("/poster{}.jpg", id),
                "vote_average": 7.5
            }))
            .collect::<Vec<_>>()
    })
}

#[async_trait::async_trait]
impl MovieCatalog for FakeCatalog {
    async fn fetch(&self, path: &str, query: QueryParams) -> AppResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.paths.lock().unwrap().push(path.to_string());

        if self.fail {
            return Err(AppError::ExternalApi("Catalog API returned status 503".to_string()));
        }

        if path == "genre/movie/list" {
            let genres: Vec<Value> = self
                .genres
                .iter()
                .map(|(id, name)| json!({ "id": id, "name": name }))
                .collect();
            return Ok(json!({ "genres": genres }));
        }

        if path == "discover/movie" {
            let genre = query
                .iter()
                .find(|(k, _)| k == "with_genres")
                .and_then(|(_, v)| v.parse::<u64>().ok())
                .unwrap_or_default();
            let ids = self.discover.get(&genre).cloned().unwrap_or_default();
            return Ok(results(&ids));
        }

        let movie_id = path
            .strip_prefix("movie/")
            .and_then(|rest| rest.strip_suffix("/recommendations"))
            .and_then(|id| id.parse::<u64>().ok());

        match movie_id.and_then(|id| self.recommendations.get(&id)) {
            Some(ids) => Ok(results(ids)),
            None => Err(AppError::ExternalApi(format!(
                "Catalog API returned status 404 Not Found: {}",
                path
            ))),
        }
    }
}

const SESSION_TTL: Duration = Duration::from_secs(3600);

fn create_test_server(catalog: Arc<FakeCatalog>) -> TestServer {
    create_test_server_with_sessions(catalog, Arc::new(MemorySessionStore::new(SESSION_TTL)))
}

fn create_test_server_with_sessions(
    catalog: Arc<FakeCatalog>,
    sessions: Arc<dyn SessionStore>,
) -> TestServer {
    let state = AppState::new(
        catalog,
        sessions,
        "http://image.tmdb.org/t/p/w185/".to_string(),
    );
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

/// Movie ids rendered on a page, in page order
fn rendered_ids(html: &str) -> Vec<u64> {
    html.split(r#"data-id=""#)
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .filter_map(|id| id.parse().ok())
        .collect()
}

fn session_cookie(set_cookie: &HeaderValue) -> HeaderValue {
    let pair = set_cookie
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();
    HeaderValue::from_str(&pair).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(Arc::new(FakeCatalog::default()));
    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_home_samples_each_genre() {
    let catalog = Arc::new(FakeCatalog::with_genres());
    let server = create_test_server(catalog.clone());

    let response = server.get("/").await;
    response.assert_status_ok();

    // One genre list request, then one discover request per genre
    assert_eq!(catalog.call_count(), 4);
    assert_eq!(
        catalog.paths(),
        vec!["genre/movie/list", "discover/movie", "discover/movie", "discover/movie"]
    );

    let ids = rendered_ids(&response.text());
    let action = ids.iter().filter(|id| (100..140).contains(*id)).count();
    let drama = ids.iter().filter(|id| (200..240).contains(*id)).count();
    assert!((1..=3).contains(&action));
    assert!((1..=3).contains(&drama));
    assert_eq!(ids.len(), action + drama);
}

#[tokio::test]
async fn test_home_served_from_session_on_revisit() {
    let catalog = Arc::new(FakeCatalog::with_genres());
    let server = create_test_server(catalog.clone());

    let first = server.get("/").await;
    first.assert_status_ok();
    let cookie = session_cookie(first.headers().get(header::SET_COOKIE).unwrap());
    let calls_after_first = catalog.call_count();

    let second = server.get("/").add_header(header::COOKIE, cookie).await;
    second.assert_status_ok();

    assert_eq!(catalog.call_count(), calls_after_first);
    assert_eq!(rendered_ids(&second.text()), rendered_ids(&first.text()));
    assert!(second.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_home_without_cookie_starts_new_session() {
    let catalog = Arc::new(FakeCatalog::with_genres());
    let server = create_test_server(catalog.clone());

    server.get("/").await.assert_status_ok();
    server.get("/").await.assert_status_ok();

    assert_eq!(catalog.call_count(), 8);
}

#[tokio::test]
async fn test_home_with_empty_list_is_resampled() {
    let catalog = Arc::new(FakeCatalog {
        genres: vec![(99, "Documentary")],
        ..Default::default()
    });
    let server = create_test_server(catalog.clone());

    let first = server.get("/").await;
    first.assert_status_ok();
    assert!(rendered_ids(&first.text()).is_empty());
    let cookie = session_cookie(first.headers().get(header::SET_COOKIE).unwrap());

    server
        .get("/")
        .add_header(header::COOKIE, cookie)
        .await
        .assert_status_ok();

    assert_eq!(catalog.call_count(), 4);
}

#[tokio::test]
async fn test_home_lists_picks_in_genre_order() {
    let catalog = Arc::new(FakeCatalog {
        genres: vec![(18, "Drama"), (28, "Action")],
        discover: HashMap::from([(18, (900..940).collect()), (28, (100..140).collect())]),
        ..Default::default()
    });
    let server = create_test_server(catalog);

    let response = server.get("/").await;
    response.assert_status_ok();

    let ids = rendered_ids(&response.text());
    let drama = ids.iter().take_while(|id| (900..940).contains(*id)).count();
    assert!(drama >= 1);
    assert!(ids[drama..].iter().all(|id| (100..140).contains(id)));
    assert!(ids.len() > drama);
}

#[tokio::test]
async fn test_home_expired_session_is_resampled() {
    let catalog = Arc::new(FakeCatalog::with_genres());
    let sessions = Arc::new(MemorySessionStore::new(Duration::ZERO));
    let server = create_test_server_with_sessions(catalog.clone(), sessions);

    let first = server.get("/").await;
    first.assert_status_ok();
    let cookie = session_cookie(first.headers().get(header::SET_COOKIE).unwrap());

    server
        .get("/")
        .add_header(header::COOKIE, cookie)
        .await
        .assert_status_ok();

    assert_eq!(catalog.call_count(), 8);
}

#[tokio::test]
async fn test_expired_sessions_do_not_accumulate() {
    let catalog = Arc::new(FakeCatalog::with_genres());
    let sessions = Arc::new(MemorySessionStore::new(Duration::ZERO));
    let server = create_test_server_with_sessions(catalog, sessions.clone());

    for _ in 0..20 {
        server.get("/").await.assert_status_ok();
    }

    assert_eq!(sessions.session_count().await, 1);
}

#[tokio::test]
async fn test_home_with_corrupt_session_value_is_resampled() {
    let catalog = Arc::new(FakeCatalog::with_genres());
    let sessions = Arc::new(MemorySessionStore::new(SESSION_TTL));
    let session_id = SessionId::new();
    sessions
        .set(session_id, MOVIES_KEY, json!("garbage"))
        .await
        .unwrap();
    let server = create_test_server_with_sessions(catalog.clone(), sessions.clone());

    let cookie = HeaderValue::from_str(&format!("movie_session={}", session_id)).unwrap();
    let response = server.get("/").add_header(header::COOKIE, cookie).await;
    response.assert_status_ok();

    assert_eq!(catalog.call_count(), 4);
    assert!(!rendered_ids(&response.text()).is_empty());
    let stored = sessions.get(session_id, MOVIES_KEY).await.unwrap().unwrap();
    assert!(stored.is_array());
}

#[tokio::test]
async fn test_home_catalog_failure_is_bad_gateway() {
    let catalog = Arc::new(FakeCatalog {
        fail: true,
        ..Default::default()
    });
    let server = create_test_server(catalog);

    let response = server.get("/").await;
    response.assert_status(StatusCode::BAD_GATEWAY);

    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_show_recommended_requests_each_submitted_id() {
    let catalog = Arc::new(FakeCatalog {
        recommendations: HashMap::from([
            (27, (1..=6).collect()),
            (38, (7..=12).collect()),
        ]),
        ..Default::default()
    });
    let server = create_test_server(catalog.clone());

    let response = server.post("/show/").text("movie0=27&movie0=38").await;
    response.assert_status_ok();

    assert_eq!(
        catalog.paths(),
        vec!["movie/27/recommendations", "movie/38/recommendations"]
    );

    let ids = rendered_ids(&response.text());
    assert_eq!(ids.len(), 8);
    for id in &ids {
        assert!((1..=12).contains(id));
    }
}

#[tokio::test]
async fn test_show_recommended_with_few_results() {
    let catalog = Arc::new(FakeCatalog {
        recommendations: HashMap::from([(550, vec![1, 2, 3])]),
        ..Default::default()
    });
    let server = create_test_server(catalog);

    let response = server.post("/show/").text("movies=550").await;
    response.assert_status_ok();

    let mut ids = rendered_ids(&response.text());
    ids.sort();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_show_recommended_rejects_bad_ids() {
    let catalog = Arc::new(FakeCatalog::default());
    let server = create_test_server(catalog.clone());

    let response = server.post("/show/").text("movies=abc").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(catalog.call_count(), 0);
}

#[tokio::test]
async fn test_show_recommended_unknown_movie_is_bad_gateway() {
    let server = create_test_server(Arc::new(FakeCatalog::default()));

    let response = server.post("/show/").text("movies=1").await;
    response.assert_status(StatusCode::BAD_GATEWAY);
}
