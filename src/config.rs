use std::path::PathBuf;

use clap::Parser;

use handle_errors::Error;

/// Command line arguments. These win over `setup.toml` and the
/// `ECORAN_`-prefixed environment.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about = "Client engine for the Ecoran quiz service")]
struct Args {
    /// Which errors we want to log (info, warn or error)
    #[clap(short, long)]
    log_level: Option<String>,
    /// Base URL of the remote quiz API
    #[clap(long)]
    api_base_url: Option<String>,
    /// File the persisted filter criteria are written to
    #[clap(long)]
    storage_path: Option<PathBuf>,
    /// Title filter to search with before printing the result page
    #[clap(long)]
    title: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub log_level: String,
    pub api_base_url: String,
    pub storage_path: PathBuf,
    pub google_client_id: String,
    pub google_redirect_uri: String,
    pub search_title: Option<String>,
}

impl Config {
    pub fn new() -> Result<Config, Error> {
        dotenv::dotenv().ok();
        let args = Args::parse();

        let file = config::Config::builder()
            .add_source(config::File::with_name("setup").required(false))
            .add_source(config::Environment::with_prefix("ECORAN"))
            .build()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        Ok(Config {
            log_level: args
                .log_level
                .or_else(|| file.get("log_level").ok())
                .unwrap_or_else(|| "warn".to_string()),
            api_base_url: args
                .api_base_url
                .or_else(|| file.get("api_base_url").ok())
                .unwrap_or_else(|| "http://localhost:8080".to_string()),
            storage_path: args
                .storage_path
                .or_else(|| file.get("storage_path").ok())
                .unwrap_or_else(|| PathBuf::from(".ecoran/filters.json")),
            google_client_id: file.get("google_client_id").unwrap_or_default(),
            google_redirect_uri: file
                .get("google_redirect_uri")
                .unwrap_or_else(|_| "http://localhost:3000/auth/callback".to_string()),
            search_title: args.title,
        })
    }
}
