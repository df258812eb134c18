use anyhow::Result;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub advisor: AdvisorConfig,
    pub sources: SourcesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

/// Generative advisor (Groq) settings. An empty API key disables the advisor
/// entirely; every consumer falls back to its deterministic path.
#[derive(Debug, Clone, Deserialize)]
pub struct AdvisorConfig {
    pub groq_api_key: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

/// Registry endpoints. Base URLs are configurable so tests can point the
/// clients at a local mock server.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    pub pubmed_search_url: String,
    pub pubmed_fetch_url: String,
    pub pubmed_timeout_secs: u64,
    pub clinicaltrials_url: String,
    pub clinicaltrials_timeout_secs: u64,
    pub patentsview_url: String,
    pub patentsview_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:5173,http://127.0.0.1:5173".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            advisor: AdvisorConfig {
                groq_api_key: env::var("GROQ_API_KEY").unwrap_or_default(),
                model: env::var("GROQ_MODEL")
                    .unwrap_or_else(|_| "llama-3.1-70b-versatile".to_string()),
                temperature: env::var("GROQ_TEMPERATURE")
                    .unwrap_or_else(|_| "0".to_string())
                    .parse()?,
                timeout_secs: env::var("GROQ_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()?,
            },
            sources: SourcesConfig {
                pubmed_search_url: env::var("PUBMED_SEARCH_URL").unwrap_or_else(|_| {
                    "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi".to_string()
                }),
                pubmed_fetch_url: env::var("PUBMED_FETCH_URL").unwrap_or_else(|_| {
                    "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi".to_string()
                }),
                pubmed_timeout_secs: env::var("PUBMED_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()?,
                clinicaltrials_url: env::var("CLINICALTRIALS_URL").unwrap_or_else(|_| {
                    "https://clinicaltrials.gov/api/query/study_fields".to_string()
                }),
                clinicaltrials_timeout_secs: env::var("CLINICALTRIALS_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()?,
                patentsview_url: env::var("PATENTSVIEW_URL")
                    .unwrap_or_else(|_| "https://api.patentsview.org/patents/query".to_string()),
                patentsview_timeout_secs: env::var("PATENTSVIEW_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()?,
            },
        })
    }
}
