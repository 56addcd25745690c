//! Model request/response payloads.
//!
//! These are plain data: the game core builds requests, the models crate
//! moves them over the wire or answers them offline.

use serde::{Deserialize, Serialize};

use crate::ModelTask;

/// Input for one model call, tagged by task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "camelCase")]
pub enum ModelRequest {
    /// Continue a chat. `past_user_inputs` and `generated_responses` hold
    /// the earlier exchange(s), oldest first.
    Conversational {
        past_user_inputs: Vec<String>,
        generated_responses: Vec<String>,
        text: String,
    },
    /// Extract an answer to `question` from `context`.
    QuestionAnswering { question: String, context: String },
    /// Predict the word hidden behind the mask token in `text`.
    FillMask { text: String, top_k: u32 },
    /// Continue `prompt`. The output includes the prompt.
    TextGeneration {
        prompt: String,
        max_new_tokens: u32,
        seed: u32,
    },
}

impl ModelRequest {
    pub fn task(&self) -> ModelTask {
        match self {
            ModelRequest::Conversational { .. } => ModelTask::Conversational,
            ModelRequest::QuestionAnswering { .. } => ModelTask::QuestionAnswering,
            ModelRequest::FillMask { .. } => ModelTask::FillMask,
            ModelRequest::TextGeneration { .. } => ModelTask::TextGeneration,
        }
    }
}

/// One fill-mask prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillCandidate {
    /// Input sentence with the mask replaced by `token_str`.
    pub sequence: String,
    pub token_str: String,
    pub score: f32,
}

/// Output of one model call, tagged by task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "camelCase")]
pub enum ModelOutput {
    Conversational { generated_text: String },
    QuestionAnswering {
        answer: String,
        score: f32,
        start: usize,
        end: usize,
    },
    /// Best candidate first.
    FillMask { candidates: Vec<FillCandidate> },
    TextGeneration { generated_text: String },
}

impl ModelOutput {
    pub fn task(&self) -> ModelTask {
        match self {
            ModelOutput::Conversational { .. } => ModelTask::Conversational,
            ModelOutput::QuestionAnswering { .. } => ModelTask::QuestionAnswering,
            ModelOutput::FillMask { .. } => ModelTask::FillMask,
            ModelOutput::TextGeneration { .. } => ModelTask::TextGeneration,
        }
    }
}
