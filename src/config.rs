use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "genogate")]
#[command(about = "Genomic data API gateway")]
pub struct Config {
    /// Host address to bind to
    #[arg(long, env = "GENOGATE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "GENOGATE_PORT", default_value = "8080")]
    pub port: u16,

    /// Base URL of the search backend (e.g., http://solr:8983/solr)
    #[arg(long, env = "GENOGATE_SOLR_URL", default_value = "http://localhost:8983/solr")]
    pub solr_url: String,

    /// External URL of this API, substituted into track store URLs
    #[arg(long, env = "GENOGATE_API_URL")]
    pub api_url: Option<String>,

    /// URL of the static content host (browser configs, color schemes)
    #[arg(long, env = "GENOGATE_CONTENT_URL", default_value = "https://www.bv-brc.org")]
    pub content_url: String,

    /// Directory containing taxonomy tree files ({taxon_id}.json)
    #[arg(long, env = "GENOGATE_TREE_DIR", default_value = "./trees")]
    pub tree_dir: PathBuf,

    /// Default row count when a query sets no limit
    #[arg(long, env = "GENOGATE_DEFAULT_ROWS", default_value = "25")]
    pub default_rows: usize,

    /// Hard cap on rows per query page
    #[arg(long, env = "GENOGATE_MAX_ROWS", default_value = "25000")]
    pub max_rows: usize,

    /// Backend request timeout in seconds
    #[arg(long, env = "GENOGATE_BACKEND_TIMEOUT", default_value = "30")]
    pub backend_timeout: u64,

    /// Sustained requests per second allowed per client IP
    #[arg(long, env = "GENOGATE_RATE_PER_SECOND", default_value = "10")]
    pub rate_per_second: u64,

    /// Burst size allowed per client IP
    #[arg(long, env = "GENOGATE_RATE_BURST", default_value = "50")]
    pub rate_burst: u32,

    /// Enable CORS for all origins
    #[arg(long, env = "GENOGATE_CORS", default_value = "true")]
    pub cors: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn effective_api_url(&self) -> String {
        self.api_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            host: "0.0.0.0".to_string(),
            port: 8080,
            solr_url: "http://localhost:8983/solr".to_string(),
            api_url: None,
            content_url: "https://www.bv-brc.org".to_string(),
            tree_dir: PathBuf::from("./trees"),
            default_rows: 25,
            max_rows: 25000,
            backend_timeout: 30,
            rate_per_second: 10,
            rate_burst: 50,
            cors: true,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_effective_api_url_default() {
        let config = base_config();
        assert_eq!(config.effective_api_url(), "http://0.0.0.0:8080");
    }

    #[test]
    fn test_effective_api_url_custom() {
        let config = Config {
            api_url: Some("https://www.bv-brc.org/api".to_string()),
            ..base_config()
        };
        assert_eq!(config.effective_api_url(), "https://www.bv-brc.org/api");
    }

    #[test]
    fn test_effective_api_url_custom_port() {
        let config = Config {
            host: "localhost".to_string(),
            port: 3001,
            ..base_config()
        };
        assert_eq!(config.effective_api_url(), "http://localhost:3001");
    }
}
