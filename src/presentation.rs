//! Terminal rendering of session state and history.

use std::fmt::Write as _;

use serde::Serialize;

use crate::{
    models::{AnalysisRecord, AnalysisResult, VocabularyResult},
    session::RevealSet,
};

/// Toggles for the analysis view. Both start hidden for every new result.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReveal {
    pub show_steps: bool,
    pub show_answer: bool,
}

impl AnalysisReveal {
    pub fn toggle_steps(&mut self) {
        self.show_steps = !self.show_steps;
    }

    pub fn toggle_answer(&mut self) {
        self.show_answer = !self.show_answer;
    }

    pub fn hide_all(&mut self) {
        *self = Self::default();
    }
}

pub fn render_analysis(result: &AnalysisResult, reveal: AnalysisReveal) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Core concept: {}", result.core_concept);
    let _ = writeln!(out);
    let _ = writeln!(out, "Diagnosis");
    let _ = writeln!(out, "  {}", result.diagnosis);
    let _ = writeln!(out);

    let _ = writeln!(out, "Solution ({} steps)", result.solution_steps.len());
    if reveal.show_steps {
        for (index, step) in result.solution_steps.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", index + 1, step);
        }
    } else {
        let _ = writeln!(out, "  [hidden; pass --reveal-steps to show]");
    }
    let _ = writeln!(out);

    let practice = &result.practice_question;
    let _ = writeln!(out, "Practice question");
    let _ = writeln!(out, "  {}", practice.question);
    if reveal.show_answer {
        let _ = writeln!(out, "  Answer: {}", practice.answer);
        if !practice.explanation.trim().is_empty() {
            let _ = writeln!(out, "  Why: {}", practice.explanation);
        }
    } else {
        let _ = writeln!(out, "  Answer: [hidden; pass --reveal-answer to show]");
    }

    out
}

pub fn render_vocabulary(result: &VocabularyResult, reveal: &RevealSet) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Topic: {} ({} cards)", result.topic, result.words.len());
    for (index, entry) in result.words.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(out, "[{}] {}  {}", index + 1, entry.word, entry.pronunciation);
        if reveal.is_revealed(index) {
            let _ = writeln!(out, "    {}", entry.definition);
            let _ = writeln!(out, "    e.g. {}", entry.example);
        } else {
            let _ = writeln!(out, "    ...");
        }
    }
    out
}

pub fn render_history(records: &[AnalysisRecord]) -> String {
    if records.is_empty() {
        return "No saved analyses yet.\n".to_string();
    }

    let mut out = String::new();
    for record in records {
        let _ = writeln!(
            out,
            "{:<15} {}  {:<9}  {}",
            record.id,
            record.timestamp.format("%Y-%m-%d %H:%M"),
            record.subject.as_str(),
            record.preview(48)
        );
    }
    out
}
