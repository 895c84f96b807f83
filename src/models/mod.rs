pub mod analysis;
pub mod image;
pub mod subject;
pub mod vocabulary;

pub use analysis::{AnalysisRecord, AnalysisResult, PracticeQuestion, Submission};
pub use image::QuestionImage;
pub use subject::Subject;
pub use vocabulary::{VocabularyEntry, VocabularyResult};
