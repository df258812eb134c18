//! PubMed E-utilities client
//!
//! Two-step fetch: `esearch` (JSON) resolves the molecule to a handful of
//! PMIDs, then `efetch` (XML) pulls each article. The efetch payload is a
//! large XML document of which only four fields matter, so they are lifted
//! with anchored regexes rather than a full XML parse.

use std::time::Duration;

use chrono::{Datelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::SourcesConfig;
use crate::sources::LiteratureSource;

const MAX_PUBMED_IDS: usize = 5;
const SEARCH_WINDOW_YEARS: i32 = 25;
const USER_AGENT: &str = "Mozilla/5.0 (research-bot)";

#[derive(Debug, Clone)]
pub struct PubmedArticle {
    pub pmid: String,
    pub title: String,
    pub abstract_text: String,
    pub journal: String,
    pub year: Option<i32>,
}

pub struct PubmedClient {
    client: Client,
    search_url: String,
    fetch_url: String,
}

#[derive(Deserialize)]
struct EsearchEnvelope {
    #[serde(default)]
    esearchresult: EsearchResult,
}

#[derive(Deserialize, Default)]
struct EsearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<ArticleTitle[^>]*>(.*?)</ArticleTitle>").expect("title regex"));
static ABSTRACT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<AbstractText[^>]*>(.*?)</AbstractText>").expect("abstract regex")
});
static JOURNAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<Journal>.*?<Title>(.*?)</Title>").expect("journal regex"));
static YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<PubDate>.*?<Year>(\d{4})</Year>").expect("year regex"));

impl PubmedClient {
    pub fn new(config: &SourcesConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.pubmed_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            search_url: config.pubmed_search_url.clone(),
            fetch_url: config.pubmed_fetch_url.clone(),
        }
    }

    async fn fetch_ids(&self, molecule: &str) -> Vec<String> {
        let current_year = Utc::now().year();
        let response = self
            .client
            .get(&self.search_url)
            .query(&[
                ("db", "pubmed"),
                ("term", molecule),
                ("retmax", &MAX_PUBMED_IDS.to_string()),
                ("retmode", "json"),
                ("datetype", "pdat"),
                ("mindate", &(current_year - SEARCH_WINDOW_YEARS).to_string()),
                ("maxdate", &current_year.to_string()),
            ])
            .send()
            .await;

        let envelope: EsearchEnvelope = match response {
            Ok(res) if res.status().is_success() => match res.json().await {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(error = %e, "PubMed esearch decode failed");
                    return Vec::new();
                }
            },
            Ok(res) => {
                warn!(status = %res.status(), "PubMed esearch returned error status");
                return Vec::new();
            }
            Err(e) => {
                warn!(error = %e, "PubMed esearch request failed");
                return Vec::new();
            }
        };

        envelope
            .esearchresult
            .idlist
            .into_iter()
            .take(MAX_PUBMED_IDS)
            .collect()
    }

    async fn fetch_article(&self, pmid: &str) -> Option<PubmedArticle> {
        let response = self
            .client
            .get(&self.fetch_url)
            .query(&[("db", "pubmed"), ("id", pmid), ("retmode", "xml")])
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            return None;
        }
        let body = response.text().await.ok()?;

        let title = TITLE_RE.captures(&body)?.get(1)?.as_str().trim().to_string();
        let abstract_text = ABSTRACT_RE
            .captures_iter(&body)
            .filter_map(|cap| cap.get(1))
            .map(|m| m.as_str().trim())
            .collect::<Vec<_>>()
            .join(" ");
        let journal = JOURNAL_RE
            .captures(&body)
            .and_then(|cap| cap.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();
        let year = YEAR_RE
            .captures(&body)
            .and_then(|cap| cap.get(1))
            .and_then(|m| m.as_str().parse().ok());

        Some(PubmedArticle {
            pmid: pmid.to_string(),
            title,
            abstract_text,
            journal,
            year,
        })
    }
}

#[async_trait::async_trait]
impl LiteratureSource for PubmedClient {
    async fn fetch_articles(&self, molecule: &str) -> Vec<PubmedArticle> {
        let ids = self.fetch_ids(molecule).await;
        debug!(molecule, id_count = ids.len(), "PubMed id lookup complete");

        let mut articles = Vec::new();
        for pmid in &ids {
            if let Some(article) = self.fetch_article(pmid).await {
                articles.push(article);
            }
        }
        articles
    }
}
