//! PatentsView query API client

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::SourcesConfig;
use crate::sources::PatentRegistrySource;

const USER_AGENT: &str = "Mozilla/5.0 (research-bot)";

#[derive(Debug, Clone)]
pub struct RawPatent {
    pub number: Option<String>,
    pub title: Option<String>,
    pub date: Option<String>,
    pub assignee: Option<String>,
    pub url: Option<String>,
}

#[derive(Deserialize)]
struct PatentsEnvelope {
    #[serde(default)]
    patents: Vec<PatentEntry>,
}

#[derive(Deserialize)]
struct PatentEntry {
    patent_number: Option<String>,
    patent_title: Option<String>,
    patent_date: Option<String>,
    #[serde(default)]
    assignees: Vec<AssigneeEntry>,
}

#[derive(Deserialize)]
struct AssigneeEntry {
    assignee_organization: Option<String>,
    assignee_last_name: Option<String>,
}

pub struct PatentsViewClient {
    client: Client,
    api_url: String,
}

impl PatentsViewClient {
    pub fn new(config: &SourcesConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.patentsview_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_url: config.patentsview_url.clone(),
        }
    }
}

#[async_trait::async_trait]
impl PatentRegistrySource for PatentsViewClient {
    async fn fetch_patents(&self, molecule: &str, limit: usize) -> Vec<RawPatent> {
        if molecule.is_empty() {
            return Vec::new();
        }

        let query = serde_json::json!({ "_text_any": { "patent_title": molecule } });
        let fields = serde_json::json!([
            "patent_number",
            "patent_title",
            "patent_date",
            "assignees"
        ]);
        let options = serde_json::json!({ "page": 1, "per_page": limit });

        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("q", query.to_string()),
                ("f", fields.to_string()),
                ("o", options.to_string()),
            ])
            .send()
            .await;

        let envelope: PatentsEnvelope = match response {
            Ok(res) if res.status().is_success() => match res.json().await {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(error = %e, "PatentsView response decode failed");
                    return Vec::new();
                }
            },
            Ok(res) => {
                warn!(status = %res.status(), "PatentsView returned error status");
                return Vec::new();
            }
            Err(e) => {
                warn!(error = %e, "PatentsView request failed");
                return Vec::new();
            }
        };

        let patents: Vec<RawPatent> = envelope
            .patents
            .into_iter()
            .map(|entry| {
                let assignee = entry.assignees.first().and_then(|a| {
                    a.assignee_organization
                        .clone()
                        .or_else(|| a.assignee_last_name.clone())
                });
                let url = entry
                    .patent_number
                    .as_ref()
                    .map(|number| format!("https://patentsview.org/patent/{number}"));
                RawPatent {
                    number: entry.patent_number,
                    title: entry.patent_title,
                    date: entry.patent_date,
                    assignee,
                    url,
                }
            })
            .collect();

        debug!(molecule, patent_count = patents.len(), "PatentsView fetch complete");
        patents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(server: &mockito::Server) -> SourcesConfig {
        SourcesConfig {
            pubmed_search_url: server.url(),
            pubmed_fetch_url: server.url(),
            pubmed_timeout_secs: 5,
            clinicaltrials_url: server.url(),
            clinicaltrials_timeout_secs: 5,
            patentsview_url: format!("{}/patents/query", server.url()),
            patentsview_timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn test_fetch_patents_maps_assignee_and_url() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Regex("/patents/query.*".into()))
            .with_status(200)
            .with_body(
                r#"{"patents": [
                    {"patent_number": "US123", "patent_title": "Aspirin formulation",
                     "patent_date": "2019-01-01",
                     "assignees": [{"assignee_organization": "Bayer AG", "assignee_last_name": null}]},
                    {"patent_number": "US456", "patent_title": "Other use", "patent_date": null,
                     "assignees": [{"assignee_organization": null, "assignee_last_name": "Smith"}]}
                ]}"#,
            )
            .create_async()
            .await;

        let client = PatentsViewClient::new(&config_for(&server));
        let patents = client.fetch_patents("aspirin", 5).await;
        assert_eq!(patents.len(), 2);
        assert_eq!(patents[0].assignee.as_deref(), Some("Bayer AG"));
        assert_eq!(
            patents[0].url.as_deref(),
            Some("https://patentsview.org/patent/US123")
        );
        assert_eq!(patents[1].assignee.as_deref(), Some("Smith"));
    }

    #[tokio::test]
    async fn test_error_status_yields_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Regex("/patents/query.*".into()))
            .with_status(500)
            .create_async()
            .await;

        let client = PatentsViewClient::new(&config_for(&server));
        assert!(client.fetch_patents("aspirin", 5).await.is_empty());
    }
}
