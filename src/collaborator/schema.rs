//! Response schemas sent with each `generateContent` request.
//!
//! Every property is listed under `required`; the decoder in
//! [`super::decode`] enforces the same shape on the way back.

use serde_json::{json, Value};

pub fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "diagnosis": {
                "type": "STRING",
                "description": "Why the student most likely got this question wrong."
            },
            "coreConcept": {
                "type": "STRING",
                "description": "Name of the key concept the question tests."
            },
            "solutionSteps": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Ordered, step-by-step solution."
            },
            "practiceQuestion": {
                "type": "OBJECT",
                "properties": {
                    "question": { "type": "STRING" },
                    "answer": { "type": "STRING" },
                    "explanation": { "type": "STRING" }
                },
                "required": ["question", "answer", "explanation"]
            }
        },
        "required": ["diagnosis", "coreConcept", "solutionSteps", "practiceQuestion"]
    })
}

pub fn vocabulary_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "topic": { "type": "STRING" },
            "words": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "word": { "type": "STRING" },
                        "pronunciation": {
                            "type": "STRING",
                            "description": "IPA transcription."
                        },
                        "definition": { "type": "STRING" },
                        "example": {
                            "type": "STRING",
                            "description": "One natural example sentence."
                        }
                    },
                    "required": ["word", "pronunciation", "definition", "example"]
                }
            }
        },
        "required": ["topic", "words"]
    })
}
