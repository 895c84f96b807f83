use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{QuestionImage, Subject};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PracticeQuestion {
    pub question: String,
    pub answer: String,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub diagnosis: String,
    pub core_concept: String,
    /// Order is significant; steps are presented as numbered.
    pub solution_steps: Vec<String>,
    pub practice_question: PracticeQuestion,
}

/// What the student handed in for analysis.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Submission {
    pub subject: Subject,
    pub question_text: String,
    pub question_image: Option<QuestionImage>,
}

impl Submission {
    pub fn new(subject: Subject, question_text: impl Into<String>) -> Self {
        Self {
            subject,
            question_text: question_text.into(),
            question_image: None,
        }
    }

    pub fn with_image(mut self, image: QuestionImage) -> Self {
        self.question_image = Some(image);
        self
    }

    /// At least one of text or image must carry content. An image whose
    /// payload decodes to nothing counts as no image.
    pub fn has_content(&self) -> bool {
        !self.question_text.trim().is_empty()
            || self
                .question_image
                .as_ref()
                .is_some_and(|image| image.decoded_len() > 0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub subject: Subject,
    #[serde(default)]
    pub question_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_image: Option<QuestionImage>,
    pub result: AnalysisResult,
}

impl AnalysisRecord {
    pub fn new(
        id: String,
        timestamp: DateTime<Utc>,
        submission: Submission,
        result: AnalysisResult,
    ) -> Self {
        Self {
            id,
            timestamp,
            subject: submission.subject,
            question_text: submission.question_text,
            question_image: submission.question_image,
            result,
        }
    }

    /// One-line preview used in history listings.
    pub fn preview(&self, max_chars: usize) -> String {
        let text = self.question_text.trim();
        let source = if text.is_empty() {
            if self.question_image.is_some() {
                "[photo question]"
            } else {
                "[empty question]"
            }
        } else {
            text
        };

        let single_line: String = source.split_whitespace().collect::<Vec<_>>().join(" ");
        if single_line.chars().count() <= max_chars {
            single_line
        } else {
            let truncated: String = single_line.chars().take(max_chars).collect();
            format!("{truncated}…")
        }
    }
}
