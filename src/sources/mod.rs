//! External registry collaborators
//!
//! Each client is a blocking, bounded-timeout fetch that returns an empty
//! list on any transport or decode failure. Upstream errors never escape
//! this module; the agents treat "empty" and "failed" identically and
//! descend to their next fallback tier.

pub mod clinicaltrials;
pub mod patentsview;
pub mod pubmed;

pub use clinicaltrials::{first_value, ClinicalTrialsClient, RawTrial, ScalarOrList};
pub use patentsview::{PatentsViewClient, RawPatent};
pub use pubmed::{PubmedArticle, PubmedClient};

use async_trait::async_trait;

#[async_trait]
pub trait LiteratureSource: Send + Sync {
    async fn fetch_articles(&self, molecule: &str) -> Vec<PubmedArticle>;
}

#[async_trait]
pub trait TrialsRegistrySource: Send + Sync {
    async fn fetch_trials(&self, molecule: &str, disease: Option<&str>) -> Vec<RawTrial>;
}

#[async_trait]
pub trait PatentRegistrySource: Send + Sync {
    async fn fetch_patents(&self, molecule: &str, limit: usize) -> Vec<RawPatent>;
}

/// Source double returning fixed records, for tests.
#[derive(Default)]
pub struct StubSources {
    pub articles: Vec<PubmedArticle>,
    pub trials: Vec<RawTrial>,
    pub patents: Vec<RawPatent>,
}

#[async_trait]
impl LiteratureSource for StubSources {
    async fn fetch_articles(&self, _molecule: &str) -> Vec<PubmedArticle> {
        self.articles.clone()
    }
}

#[async_trait]
impl TrialsRegistrySource for StubSources {
    async fn fetch_trials(&self, _molecule: &str, _disease: Option<&str>) -> Vec<RawTrial> {
        self.trials.clone()
    }
}

#[async_trait]
impl PatentRegistrySource for StubSources {
    async fn fetch_patents(&self, _molecule: &str, _limit: usize) -> Vec<RawPatent> {
        self.patents.clone()
    }
}
