//! Question and answer payloads.
//!
//! A [`Question`] arrives fully formed from the host; topic loading and
//! shape normalization happen client-side before broadcast.

use serde::{Deserialize, Serialize};

/// A prompt with an ordered list of options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub options: Vec<QuestionOption>,
}

impl Question {
    /// Builds a two-option question, the common preference format.
    pub fn either_or(
        text: impl Into<String>,
        first: QuestionOption,
        second: QuestionOption,
    ) -> Self {
        Self {
            text: text.into(),
            options: vec![first, second],
        }
    }
}

/// One selectable option of a [`Question`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub text: String,
    pub value: String,
    /// Optional image reference (URL or asset path).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl QuestionOption {
    pub fn new(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: value.into(),
            image: None,
        }
    }
}

/// What a client sends when choosing an option.
///
/// `text` and `index` default when omitted; only `value` takes part in
/// pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSubmission {
    #[serde(default)]
    pub text: String,
    pub value: String,
    #[serde(default)]
    pub index: usize,
}

impl AnswerSubmission {
    pub fn new(
        text: impl Into<String>,
        value: impl Into<String>,
        index: usize,
    ) -> Self {
        Self {
            text: text.into(),
            value: value.into(),
            index,
        }
    }
}

/// One row of the reveal payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealEntry {
    pub player_name: String,
    pub answer: AnswerSubmission,
}
