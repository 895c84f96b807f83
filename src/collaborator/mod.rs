//! Boundary to the generative AI service.
//!
//! Everything that crosses this boundary is decoded into typed values or
//! rejected with a [`ServiceError`]; sessions never see raw JSON.

pub mod client;
pub mod decode;
pub mod error;
pub mod prompts;
pub mod schema;

use async_trait::async_trait;

use crate::models::{AnalysisResult, Submission, VocabularyResult};

pub use client::GeminiClient;
pub use error::{DecodeError, ServiceError};

#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze(&self, submission: &Submission) -> Result<AnalysisResult, ServiceError>;
}

#[async_trait]
pub trait VocabularyService: Send + Sync {
    async fn generate_vocabulary(&self, topic: &str) -> Result<VocabularyResult, ServiceError>;
}
