//! Assistants v2: threads, messages and runs.

use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde_json::json;

use super::{OpenAiClient, OpenAiError};
use crate::config::PollPolicy;

#[derive(Debug, Deserialize)]
struct Created {
    id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Run {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub last_error: Option<RunError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunError {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    #[serde(default)]
    data: Vec<ThreadMessage>,
}

#[derive(Debug, Deserialize)]
struct ThreadMessage {
    role: String,
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    value: String,
}

impl OpenAiClient {
    fn beta(&self, method: Method, path: &str, key: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .bearer_auth(key)
            .header("OpenAI-Beta", "assistants=v2")
            .timeout(self.config.request_timeout())
    }

    pub async fn create_thread(&self, key: &str) -> Result<String, OpenAiError> {
        let resp = self
            .beta(Method::POST, "/threads", key)
            .json(&json!({}))
            .send()
            .await?;
        let created: Created = Self::check(resp).await?.json().await?;
        Ok(created.id)
    }

    pub async fn add_message(&self, key: &str, thread_id: &str, content: &str) -> Result<(), OpenAiError> {
        let resp = self
            .beta(Method::POST, &format!("/threads/{}/messages", thread_id), key)
            .json(&json!({ "role": "user", "content": content }))
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    pub async fn create_run(&self, key: &str, thread_id: &str, assistant_id: &str) -> Result<String, OpenAiError> {
        let resp = self
            .beta(Method::POST, &format!("/threads/{}/runs", thread_id), key)
            .json(&json!({ "assistant_id": assistant_id }))
            .send()
            .await?;
        let created: Created = Self::check(resp).await?.json().await?;
        Ok(created.id)
    }

    pub async fn get_run(&self, key: &str, thread_id: &str, run_id: &str) -> Result<Run, OpenAiError> {
        let resp = self
            .beta(Method::GET, &format!("/threads/{}/runs/{}", thread_id, run_id), key)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    /// Text of the newest assistant message in the thread.
    pub async fn latest_reply(&self, key: &str, thread_id: &str) -> Result<String, OpenAiError> {
        let resp = self
            .beta(Method::GET, &format!("/threads/{}/messages", thread_id), key)
            .send()
            .await?;
        let list: MessageList = Self::check(resp).await?.json().await?;
        let reply = list
            .data
            .into_iter()
            .find(|m| m.role == "assistant")
            .map(|m| join_text(&m.content))
            .unwrap_or_default();

        if reply.is_empty() {
            return Err(OpenAiError::EmptyResponse);
        }
        Ok(reply)
    }

    /// Run `assistant_id` on a fresh thread holding `input` and wait for it.
    pub async fn run_assistant(
        &self,
        key: &str,
        assistant_id: &str,
        input: &str,
        poll: PollPolicy,
    ) -> Result<String, OpenAiError> {
        let thread_id = self.create_thread(key).await?;
        self.add_message(key, &thread_id, input).await?;
        let run_id = self.create_run(key, &thread_id, assistant_id).await?;
        tracing::debug!(thread = %thread_id, run = %run_id, "Assistant run started");

        self.wait_for_run(key, &thread_id, &run_id, poll).await?;
        self.latest_reply(key, &thread_id).await
    }

    async fn wait_for_run(
        &self,
        key: &str,
        thread_id: &str,
        run_id: &str,
        poll: PollPolicy,
    ) -> Result<(), OpenAiError> {
        for attempt in 1..=poll.max_attempts {
            tokio::time::sleep(poll.interval()).await;

            let run = self.get_run(key, thread_id, run_id).await?;
            tracing::debug!(run = %run.id, attempt, status = %run.status, "Polled assistant run");

            match run.status.as_str() {
                "completed" => return Ok(()),
                "failed" | "cancelled" | "expired" | "incomplete" => {
                    let message = run
                        .last_error
                        .map(|e| e.message)
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| "Unknown error".to_string());
                    return Err(OpenAiError::RunFailed {
                        status: run.status,
                        message,
                    });
                }
                _ => continue,
            }
        }
        Err(OpenAiError::RunTimedOut(poll.max_attempts))
    }
}

fn join_text(parts: &[ContentPart]) -> String {
    parts
        .iter()
        .filter(|p| p.kind == "text")
        .filter_map(|p| p.text.as_ref().map(|t| t.value.as_str()))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
