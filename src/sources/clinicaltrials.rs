//! ClinicalTrials.gov study_fields client
//!
//! The registry returns every field as either a scalar or a list depending
//! on the study, so raw records keep `ScalarOrList` values and normalization
//! happens in the clinical agent.

use std::time::Duration;

use chrono::{Datelike, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::SourcesConfig;
use crate::sources::TrialsRegistrySource;

const MAX_TRIALS: usize = 15;
const POSTED_WINDOW_YEARS: i32 = 50;
const USER_AGENT: &str = "Mozilla/5.0 (research-bot)";

const STUDY_FIELDS: &[&str] = &[
    "NCTId",
    "BriefTitle",
    "OfficialTitle",
    "Condition",
    "Phase",
    "OverallStatus",
    "BriefSummary",
    "EnrollmentCount",
    "StartDate",
    "LocationCountry",
    "LeadSponsorName",
];

/// A registry field value that may arrive as a scalar or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScalarOrList {
    Scalar(String),
    List(Vec<String>),
}

impl ScalarOrList {
    /// First non-empty value, mirroring how the registry's list fields are
    /// read.
    pub fn first(&self) -> Option<&str> {
        match self {
            ScalarOrList::Scalar(s) => (!s.is_empty()).then_some(s.as_str()),
            ScalarOrList::List(items) => items
                .iter()
                .map(|s| s.as_str())
                .find(|s| !s.is_empty()),
        }
    }
}

/// Convenience accessor for optional list-or-scalar fields.
pub fn first_value(field: &Option<ScalarOrList>) -> Option<&str> {
    field.as_ref().and_then(|value| value.first())
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawTrial {
    #[serde(rename = "NCTId", default)]
    pub nct_id: Option<ScalarOrList>,
    #[serde(rename = "BriefTitle", default)]
    pub brief_title: Option<ScalarOrList>,
    #[serde(rename = "OfficialTitle", default)]
    pub official_title: Option<ScalarOrList>,
    #[serde(rename = "Condition", default)]
    pub condition: Option<ScalarOrList>,
    #[serde(rename = "Phase", default)]
    pub phase: Option<ScalarOrList>,
    #[serde(rename = "OverallStatus", default)]
    pub overall_status: Option<ScalarOrList>,
    #[serde(rename = "BriefSummary", default)]
    pub brief_summary: Option<ScalarOrList>,
    #[serde(rename = "EnrollmentCount", default)]
    pub enrollment_count: Option<ScalarOrList>,
    #[serde(rename = "StartDate", default)]
    pub start_date: Option<ScalarOrList>,
    #[serde(rename = "LocationCountry", default)]
    pub location_country: Option<ScalarOrList>,
    #[serde(rename = "LeadSponsorName", default)]
    pub lead_sponsor: Option<ScalarOrList>,
}

#[derive(Deserialize)]
struct StudyFieldsEnvelope {
    #[serde(rename = "StudyFieldsResponse", default)]
    response: Option<StudyFieldsResponse>,
}

#[derive(Deserialize, Default)]
struct StudyFieldsResponse {
    #[serde(rename = "StudyFields", default)]
    study_fields: Vec<RawTrial>,
}

pub struct ClinicalTrialsClient {
    client: Client,
    api_url: String,
}

impl ClinicalTrialsClient {
    pub fn new(config: &SourcesConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.clinicaltrials_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_url: config.clinicaltrials_url.clone(),
        }
    }
}

#[async_trait::async_trait]
impl TrialsRegistrySource for ClinicalTrialsClient {
    async fn fetch_trials(&self, molecule: &str, disease: Option<&str>) -> Vec<RawTrial> {
        if molecule.is_empty() {
            return Vec::new();
        }

        let current_year = Utc::now().year();
        let mut expr = molecule.to_string();
        if let Some(disease) = disease {
            expr = format!("{molecule} {disease}");
        }
        let expr = format!(
            "({expr}) AND (FIRSTPOSTEDDATE:[{}-01-01 TO {current_year}-12-31])",
            current_year - POSTED_WINDOW_YEARS
        );

        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("expr", expr.as_str()),
                ("fields", &STUDY_FIELDS.join(",")),
                ("min_rnk", "1"),
                ("max_rnk", &MAX_TRIALS.to_string()),
                ("fmt", "json"),
            ])
            .send()
            .await;

        let envelope: StudyFieldsEnvelope = match response {
            Ok(res) if res.status().is_success() => match res.json().await {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(error = %e, "ClinicalTrials response decode failed");
                    return Vec::new();
                }
            },
            Ok(res) => {
                warn!(status = %res.status(), "ClinicalTrials returned error status");
                return Vec::new();
            }
            Err(e) => {
                warn!(error = %e, "ClinicalTrials request failed");
                return Vec::new();
            }
        };

        let trials = envelope
            .response
            .map(|r| r.study_fields)
            .unwrap_or_default();
        debug!(molecule, trial_count = trials.len(), "ClinicalTrials fetch complete");
        trials
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
            clinicaltrials_url: format!("{}/study_fields", server.url()),
            clinicaltrials_timeout_secs: 5,
            patentsview_url: server.url(),
            patentsview_timeout_secs: 5,
        }
    }

    #[test]
    fn test_first_value_is_exported_at_module_root() {
        // Callers reach this through `crate::sources`, not the submodule.
        let field = Some(ScalarOrList::Scalar("NCT01".to_string()));
        assert_eq!(crate::sources::first_value(&field), Some("NCT01"));
        assert_eq!(crate::sources::first_value(&None), None);
    }

    #[test]
    fn test_scalar_or_list_first() {
        let scalar = ScalarOrList::Scalar("one".to_string());
        assert_eq!(scalar.first(), Some("one"));

        let list = ScalarOrList::List(vec!["".to_string(), "two".to_string()]);
        assert_eq!(list.first(), Some("two"));

        let empty = ScalarOrList::List(Vec::new());
        assert_eq!(empty.first(), None);
    }

    #[tokio::test]
    async fn test_fetch_trials_parses_list_fields() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Regex("/study_fields.*".into()))
            .with_status(200)
            .with_body(
                r#"{"StudyFieldsResponse": {"StudyFields": [
                    {"NCTId": ["NCT01"], "BriefTitle": ["A study"], "OverallStatus": "Completed"}
                ]}}"#,
            )
            .create_async()
            .await;

        let client = ClinicalTrialsClient::new(&config_for(&server));
        let trials = client.fetch_trials("aspirin", Some("obesity")).await;
        assert_eq!(trials.len(), 1);
        assert_eq!(first_value(&trials[0].nct_id), Some("NCT01"));
        assert_eq!(first_value(&trials[0].overall_status), Some("Completed"));
        assert_eq!(first_value(&trials[0].phase), None);
    }

    #[tokio::test]
    async fn test_transport_error_yields_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Regex("/study_fields.*".into()))
            .with_status(503)
            .create_async()
            .await;

        let client = ClinicalTrialsClient::new(&config_for(&server));
        assert!(client.fetch_trials("aspirin", None).await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_molecule_short_circuits() {
        let server = mockito::Server::new_async().await;
        let client = ClinicalTrialsClient::new(&config_for(&server));
        assert!(client.fetch_trials("", None).await.is_empty());
    }
}
