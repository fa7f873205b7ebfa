use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// The Movie Database API key, appended to every catalog request
    pub tmdb_api_key: String,

    /// The Movie Database API host
    #[serde(default = "default_tmdb_api_host")]
    pub tmdb_api_host: String,

    /// The Movie Database API version path segment
    #[serde(default = "default_tmdb_api_version")]
    pub tmdb_api_version: String,

    /// Prefix joined with a movie's `poster_path` when rendering pages
    #[serde(default = "default_poster_base_url")]
    pub poster_base_url: String,

    /// Redis connection URL. Sessions are kept in process memory when unset.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Lifetime of a Redis-backed session, in seconds
    #[serde(default = "default_session_ttl")]
    pub session_ttl: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_host() -> String {
    "https://api.themoviedb.org".to_string()
}

fn default_tmdb_api_version() -> String {
    "3".to_string()
}

fn default_poster_base_url() -> String {
    "http://image.tmdb.org/t/p/w185/".to_string()
}

fn default_session_ttl() -> u64 {
    86400
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_iter(std::env::vars())
    }

    /// Load configuration from an explicit set of variables
    pub fn from_iter<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars).map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
