//! Execution/reflection assistant workflows: the four-phase reasoning
//! pipeline and the single-pass dual assistant.

use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use regex::Regex;
use shared::{
    AssistantPair, DualAssistantMetadata, DualAssistantResponse, FinalEvaluation, PipelineMetadata,
    ReasoningResponse, ReflectionNotes, RewardComponents,
};
use std::sync::OnceLock;
use std::time::Duration;

use crate::config::{AssistantsConfig, PollPolicy};
use crate::openai::{truncate, OpenAiClient, OpenAiError};

pub const TOOLS_ENABLED: [&str; 2] = ["file_search", "code_interpreter"];

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Primary OpenAI API key not configured")]
    MissingKey,

    #[error("Invalid primary API key format")]
    InvalidKeyFormat,

    #[error("OpenAI connection failed: {0}")]
    Connection(OpenAiError),

    #[error("Execution assistant failed: {0}")]
    Execution(OpenAiError),

    #[error("Reasoning pipeline did not finish within {0}s")]
    TimedOut(u64),
}

/// Short random id tying the log lines of one request together.
pub fn request_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(7)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect()
}

/// Keys for the two assistants. Reflection uses the secondary key when one
/// is configured.
struct Keys<'a> {
    execution: &'a str,
    reflection: &'a str,
    has_secondary: bool,
}

impl<'a> Keys<'a> {
    fn resolve(client: &'a OpenAiClient) -> Result<Self, PipelineError> {
        let config = client.config();
        let execution = config.primary_key().ok_or(PipelineError::MissingKey)?;
        let secondary = config.secondary_key();
        Ok(Self {
            execution,
            reflection: secondary.unwrap_or(execution),
            has_secondary: secondary.is_some(),
        })
    }

    fn labels(&self) -> AssistantPair {
        AssistantPair {
            execution: "PRIMARY".to_string(),
            reflection: if self.has_secondary {
                "SECONDARY".to_string()
            } else {
                "PRIMARY (fallback)".to_string()
            },
        }
    }
}

struct Runner<'a> {
    client: &'a OpenAiClient,
    keys: Keys<'a>,
    assistants: &'a AssistantsConfig,
    poll: PollPolicy,
    request_id: &'a str,
}

impl Runner<'_> {
    async fn execute(&self, phase: u8, input: &str) -> Result<String, OpenAiError> {
        tracing::info!(request_id = self.request_id, phase, "Running execution assistant");
        let result = self
            .client
            .run_assistant(self.keys.execution, &self.assistants.execution_assistant_id, input, self.poll)
            .await;
        if let Err(e) = &result {
            tracing::error!(request_id = self.request_id, phase, "Execution assistant failed: {}", e);
        }
        result
    }

    /// Reflection never fails the request; errors become a placeholder note.
    async fn reflect(&self, phase: u8, input: &str) -> String {
        tracing::info!(request_id = self.request_id, phase, "Running reflection assistant");
        match self
            .client
            .run_assistant(self.keys.reflection, &self.assistants.reflection_assistant_id, input, self.poll)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(request_id = self.request_id, phase, "Reflection assistant failed: {}", e);
                format!("Reflection analysis unavailable: {}", e)
            }
        }
    }

    fn assistant_ids(&self) -> AssistantPair {
        AssistantPair {
            execution: self.assistants.execution_assistant_id.clone(),
            reflection: self.assistants.reflection_assistant_id.clone(),
        }
    }
}

fn initial_reflection_prompt(initial: &str) -> String {
    format!(
        "Evaluate the following initial response for logical integrity, clarity, and bias.\n\
         Suggest improvements if needed.\n\n\
         Response:\n{}",
        initial
    )
}

fn revision_prompt(prompt: &str, initial: &str, feedback: &str) -> String {
    format!(
        "Revise your previous answer based on this feedback:\n\n\
         Original Question: {}\n\n\
         Your Previous Answer:\n{}\n\n\
         Feedback for Improvement:\n{}\n\n\
         Please provide a revised and improved response.",
        prompt, initial, feedback
    )
}

fn scoring_prompt(prompt: &str, answer: &str) -> String {
    format!(
        "Evaluate this final response and assign:\n\n\
         - Final Integrity Score (0.0–1.0)\n\
         - Reward breakdown (uncertainty, bias, logic drift, correction)\n\n\
         Original Question: {}\n\n\
         Final Answer:\n{}\n\n\
         Please provide your evaluation in this format:\n\
         INTEGRITY_SCORE: [0.0-1.0]\n\
         HONEST_UNCERTAINTY_BONUS: [+/- value]\n\
         SELF_CORRECTION_BONUS: [+/- value]\n\
         BIAS_AVOIDANCE_PENALTY: [+/- value]\n\
         LOGIC_DRIFT_PENALTY: [+/- value]\n\
         COMMENT: [your assessment]",
        prompt, answer
    )
}

fn dual_reflection_prompt(prompt: &str, response: &str) -> String {
    format!(
        "Analyze this response for accuracy and integrity:\n\n\
         Question: \"{}\"\n\
         Response: \"{}\"\n\n\
         Provide:\n\
         1. Integrity Score (0.0-1.0)\n\
         2. Key strengths\n\
         3. Areas for improvement\n\
         4. Overall assessment\n\n\
         Keep it concise.",
        prompt, response
    )
}

struct RubricPatterns {
    integrity: Regex,
    uncertainty: Regex,
    correction: Regex,
    bias: Regex,
    drift: Regex,
    comment: Regex,
}

fn rubric_patterns() -> &'static RubricPatterns {
    static PATTERNS: OnceLock<RubricPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let component = |name: &str| {
            Regex::new(&format!(r"{}:\s*([-+]?[\d.]+)", name)).expect("valid rubric regex")
        };
        RubricPatterns {
            integrity: Regex::new(r"INTEGRITY_SCORE:\s*([\d.]+)").expect("valid rubric regex"),
            uncertainty: component("HONEST_UNCERTAINTY_BONUS"),
            correction: component("SELF_CORRECTION_BONUS"),
            bias: component("BIAS_AVOIDANCE_PENALTY"),
            drift: component("LOGIC_DRIFT_PENALTY"),
            comment: Regex::new(r"COMMENT:\s*(.+)").expect("valid rubric regex"),
        }
    })
}

fn capture_number(pattern: &Regex, text: &str) -> Option<f64> {
    let caps = pattern.captures(text)?;
    // A score closing a sentence ("0.8.") still parses
    caps[1].trim_end_matches('.').parse().ok()
}

/// Parse the scoring rubric. Missing fields fall back to a 0.5 score, zero
/// components and the raw text as the comment.
pub fn parse_evaluation(raw: &str) -> FinalEvaluation {
    let p = rubric_patterns();
    FinalEvaluation {
        integrity_score: capture_number(&p.integrity, raw).unwrap_or(0.5),
        reward_components: RewardComponents {
            honest_uncertainty_bonus: capture_number(&p.uncertainty, raw).unwrap_or(0.0),
            self_correction_bonus: capture_number(&p.correction, raw).unwrap_or(0.0),
            bias_avoidance_penalty: capture_number(&p.bias, raw).unwrap_or(0.0),
            logic_drift_penalty: capture_number(&p.drift, raw).unwrap_or(0.0),
        },
        comment: p
            .comment
            .captures(raw)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_else(|| raw.to_string()),
        raw_evaluation: raw.to_string(),
    }
}

/// Execute, reflect, revise, score. Bounded by `max_duration_secs`.
pub async fn reason(
    client: &OpenAiClient,
    assistants: &AssistantsConfig,
    prompt: &str,
    request_id: &str,
) -> Result<ReasoningResponse, PipelineError> {
    let runner = Runner {
        client,
        keys: Keys::resolve(client)?,
        assistants,
        poll: assistants.reasoning_poll,
        request_id,
    };
    tracing::info!(request_id, "Reasoning pipeline started: {}", truncate(prompt, 100));

    let limit = assistants.max_duration_secs;
    tokio::time::timeout(Duration::from_secs(limit), run_phases(&runner, prompt))
        .await
        .map_err(|_| PipelineError::TimedOut(limit))?
}

async fn run_phases(runner: &Runner<'_>, prompt: &str) -> Result<ReasoningResponse, PipelineError> {
    let initial = runner
        .execute(1, prompt)
        .await
        .map_err(PipelineError::Execution)?;

    let feedback = runner.reflect(2, &initial_reflection_prompt(&initial)).await;

    let final_response = runner
        .execute(3, &revision_prompt(prompt, &initial, &feedback))
        .await
        .map_err(PipelineError::Execution)?;

    let raw = runner.reflect(4, &scoring_prompt(prompt, &final_response)).await;
    let evaluation = parse_evaluation(&raw);
    tracing::info!(
        request_id = runner.request_id,
        integrity_score = evaluation.integrity_score,
        "Reasoning pipeline completed"
    );

    Ok(ReasoningResponse {
        success: true,
        initial_execution: initial,
        reflection_on_initial: feedback,
        final_response,
        final_evaluation: evaluation,
        metadata: PipelineMetadata {
            request_id: runner.request_id.to_string(),
            timestamp: Utc::now(),
            assistant_ids: runner.assistant_ids(),
            api_keys: runner.keys.labels(),
            phases_completed: 4,
        },
    })
}

/// One execution pass followed by a reflection analysis of it.
pub async fn dual(
    client: &OpenAiClient,
    assistants: &AssistantsConfig,
    prompt: &str,
    request_id: &str,
) -> Result<DualAssistantResponse, PipelineError> {
    let keys = Keys::resolve(client)?;
    if !keys.execution.starts_with("sk-") {
        return Err(PipelineError::InvalidKeyFormat);
    }

    client
        .list_models(keys.execution)
        .await
        .map_err(PipelineError::Connection)?;
    tracing::debug!(request_id, "OpenAI connection verified");

    let runner = Runner {
        client,
        keys,
        assistants,
        poll: assistants.dual_poll,
        request_id,
    };
    tracing::info!(request_id, "Dual assistant started: {}", truncate(prompt, 100));

    let response = match runner.execute(1, prompt).await {
        Ok(text) => text,
        Err(OpenAiError::EmptyResponse) => "[Empty execution response]".to_string(),
        Err(e) => return Err(PipelineError::Execution(e)),
    };
    let notes = runner.reflect(2, &dual_reflection_prompt(prompt, &response)).await;

    Ok(DualAssistantResponse {
        success: true,
        response,
        reflection: ReflectionNotes { notes },
        metadata: DualAssistantMetadata {
            execution_assistant: assistants.execution_assistant_id.clone(),
            reflection_assistant: assistants.reflection_assistant_id.clone(),
            timestamp: Utc::now(),
            tools_enabled: TOOLS_ENABLED.iter().map(|t| t.to_string()).collect(),
            api_keys: runner.keys.labels(),
            method: "direct_api_calls".to_string(),
            request_id: request_id.to_string(),
        },
    })
}
