use async_trait::async_trait;

use crate::types::{AppError, AppResult};

/// A generative-model completion capability. Implementations are expected to
/// fail loudly (the callers own the degrade policy).
#[async_trait]
pub trait Advisor: Send + Sync {
    async fn complete(&self, prompt: &str) -> AppResult<String>;
}

/// Scriptable advisor double for tests.
pub struct StubAdvisor {
    script: std::sync::Mutex<Vec<String>>,
    repeat: Option<String>,
    fail: bool,
}

impl StubAdvisor {
    /// Always returns the same completion.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            script: std::sync::Mutex::new(Vec::new()),
            repeat: Some(text.into()),
            fail: false,
        }
    }

    /// Always fails.
    pub fn failing() -> Self {
        Self {
            script: std::sync::Mutex::new(Vec::new()),
            repeat: None,
            fail: true,
        }
    }

    /// Returns the given completions in order, then fails.
    pub fn scripted(replies: Vec<String>) -> Self {
        let mut script = replies;
        script.reverse();
        Self {
            script: std::sync::Mutex::new(script),
            repeat: None,
            fail: false,
        }
    }
}

#[async_trait]
impl Advisor for StubAdvisor {
    async fn complete(&self, _prompt: &str) -> AppResult<String> {
        if self.fail {
            return Err(AppError::Advisor("stub advisor failure".to_string()));
        }
        if let Some(reply) = self.script.lock().expect("stub script lock").pop() {
            return Ok(reply);
        }
        match &self.repeat {
            Some(text) => Ok(text.clone()),
            None => Err(AppError::Advisor("stub script exhausted".to_string())),
        }
    }
}
