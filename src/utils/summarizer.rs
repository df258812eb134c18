//! Advisor-backed fact summarization.
//!
//! Every agent payload funnels its human-readable `summary` through this
//! helper. The fallback string is returned verbatim whenever the fact list is
//! empty, no advisor is configured, the advisor call fails, or the advisor
//! returns an empty completion.

use std::sync::Arc;

use tracing::warn;

use crate::llm::Advisor;

const MAX_FACTS: usize = 8;

pub async fn summarize_with_advisor(
    advisor: Option<&Arc<dyn Advisor>>,
    topic: &str,
    facts: &[String],
    fallback: &str,
) -> String {
    let fact_list: Vec<&str> = facts
        .iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .take(MAX_FACTS)
        .collect();

    if fact_list.is_empty() {
        return fallback.to_string();
    }

    let Some(advisor) = advisor else {
        return fallback.to_string();
    };

    let bullet_list = fact_list
        .iter()
        .map(|fact| format!("- {fact}"))
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = format!(
        "You are an expert pharmaceutical analyst. Summarize the findings for {topic}.\n\
         Craft 2-3 concise sentences referencing the facts below without inventing new data.\n\
         Facts:\n{bullet_list}"
    );

    match advisor.complete(&prompt).await {
        Ok(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                fallback.to_string()
            } else {
                trimmed.to_string()
            }
        }
        Err(e) => {
            warn!(topic, error = %e, "Advisor summarization failed, keeping fallback");
            fallback.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::StubAdvisor;

    #[tokio::test]
    async fn test_empty_facts_return_fallback() {
        let advisor: Arc<dyn Advisor> = Arc::new(StubAdvisor::replying("should not be called"));
        let out = summarize_with_advisor(
            Some(&advisor),
            "aspirin",
            &["".to_string(), "   ".to_string()],
            "fallback text",
        )
        .await;
        assert_eq!(out, "fallback text");
    }

    #[tokio::test]
    async fn test_missing_advisor_returns_fallback() {
        let out =
            summarize_with_advisor(None, "aspirin", &["fact".to_string()], "fallback text").await;
        assert_eq!(out, "fallback text");
    }

    #[tokio::test]
    async fn test_advisor_error_returns_fallback() {
        let advisor: Arc<dyn Advisor> = Arc::new(StubAdvisor::failing());
        let out = summarize_with_advisor(
            Some(&advisor),
            "aspirin",
            &["fact".to_string()],
            "fallback text",
        )
        .await;
        assert_eq!(out, "fallback text");
    }

    #[tokio::test]
    async fn test_blank_completion_returns_fallback() {
        let advisor: Arc<dyn Advisor> = Arc::new(StubAdvisor::replying("   "));
        let out = summarize_with_advisor(
            Some(&advisor),
            "aspirin",
            &["fact".to_string()],
            "fallback text",
        )
        .await;
        assert_eq!(out, "fallback text");
    }

    #[tokio::test]
    async fn test_advisor_text_is_trimmed() {
        let advisor: Arc<dyn Advisor> = Arc::new(StubAdvisor::replying("  a tight summary \n"));
        let out = summarize_with_advisor(
            Some(&advisor),
            "aspirin",
            &["fact".to_string()],
            "fallback text",
        )
        .await;
        assert_eq!(out, "a tight summary");
    }
}
