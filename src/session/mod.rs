pub mod analysis;
pub mod state;
pub mod vocabulary;

pub use analysis::{AnalysisSession, AnalysisState};
pub use state::{SessionState, SessionStatus, SubmitOutcome};
pub use vocabulary::{RevealSet, VocabularySession, VocabularyState};
