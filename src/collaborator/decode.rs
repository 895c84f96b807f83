use crate::models::{AnalysisResult, VocabularyResult};

use super::error::DecodeError;

/// Strips a surrounding Markdown code fence, which some models add even when
/// asked for raw JSON.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn require_text(value: &str, field: &'static str) -> Result<(), DecodeError> {
    if value.trim().is_empty() {
        Err(DecodeError::EmptyField(field))
    } else {
        Ok(())
    }
}

pub fn decode_analysis(content: &str) -> Result<AnalysisResult, DecodeError> {
    let result: AnalysisResult = serde_json::from_str(strip_code_fence(content))?;

    require_text(&result.diagnosis, "diagnosis")?;
    require_text(&result.core_concept, "coreConcept")?;
    if result.solution_steps.iter().all(|step| step.trim().is_empty()) {
        return Err(DecodeError::EmptyList("solutionSteps"));
    }
    let practice = &result.practice_question;
    require_text(&practice.question, "practiceQuestion.question")?;
    require_text(&practice.answer, "practiceQuestion.answer")?;

    Ok(result)
}

pub fn decode_vocabulary(content: &str) -> Result<VocabularyResult, DecodeError> {
    let result: VocabularyResult = serde_json::from_str(strip_code_fence(content))?;

    if result.words.is_empty() {
        return Err(DecodeError::EmptyList("words"));
    }
    for entry in &result.words {
        require_text(&entry.word, "words.word")?;
        require_text(&entry.definition, "words.definition")?;
    }

    Ok(result)
}
