use std::{collections::BTreeSet, sync::Arc};

use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    collaborator::VocabularyService,
    log_info, log_warn,
    models::VocabularyResult,
};

use super::{SessionState, SubmitOutcome};

const ENABLE_LOGS: bool = true;

/// Indices of flashcards currently flipped to their definition.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RevealSet {
    card_count: usize,
    revealed: BTreeSet<usize>,
}

impl RevealSet {
    pub fn new(card_count: usize) -> Self {
        Self {
            card_count,
            revealed: BTreeSet::new(),
        }
    }

    pub fn card_count(&self) -> usize {
        self.card_count
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.len()
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed.contains(&index)
    }

    pub fn is_full(&self) -> bool {
        self.revealed.len() == self.card_count
    }

    /// Flips one card. Indices past the end are ignored.
    pub fn toggle(&mut self, index: usize) {
        if index >= self.card_count {
            return;
        }
        if !self.revealed.remove(&index) {
            self.revealed.insert(index);
        }
    }

    /// All-or-nothing: reveals every card unless every card is already revealed.
    pub fn toggle_all(&mut self) {
        if self.is_full() {
            self.revealed.clear();
        } else {
            self.revealed = (0..self.card_count).collect();
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyState {
    pub session: SessionState<VocabularyResult>,
    /// Topic of the latest submit.
    pub topic: String,
    pub reveal: RevealSet,
}

#[derive(Clone)]
pub struct VocabularySession {
    state: Arc<Mutex<VocabularyState>>,
    service: Arc<dyn VocabularyService>,
}

impl VocabularySession {
    pub fn new(service: Arc<dyn VocabularyService>) -> Self {
        Self {
            state: Arc::new(Mutex::new(VocabularyState::default())),
            service,
        }
    }

    pub async fn snapshot(&self) -> VocabularyState {
        self.state.lock().await.clone()
    }

    /// Requests flashcards for `topic`. A blank topic or a request already in
    /// flight is rejected without touching the state.
    pub async fn submit(&self, topic: &str) -> SubmitOutcome<VocabularyResult> {
        let topic = topic.trim();
        if topic.is_empty() {
            return SubmitOutcome::Rejected;
        }

        let ticket = {
            let mut guard = self.state.lock().await;
            let Some(ticket) = guard.session.begin_request() else {
                return SubmitOutcome::Rejected;
            };
            guard.topic = topic.to_string();
            guard.reveal = RevealSet::default();
            ticket
        };

        let response = self.service.generate_vocabulary(topic).await;

        let mut guard = self.state.lock().await;
        match response {
            Ok(result) => {
                let card_count = result.len();
                if !guard.session.complete(ticket, result.clone()) {
                    return SubmitOutcome::Superseded;
                }
                guard.reveal = RevealSet::new(card_count);
                log_info!("Generated {} flashcards for '{}'", card_count, topic);
                SubmitOutcome::Succeeded(result)
            }
            Err(err) => {
                log_warn!("Vocabulary request for '{}' failed: {}", topic, err);
                let message = err.user_message();
                if guard.session.fail(ticket, message.clone()) {
                    SubmitOutcome::Failed(message)
                } else {
                    SubmitOutcome::Superseded
                }
            }
        }
    }

    pub async fn toggle(&self, index: usize) -> RevealSet {
        let mut guard = self.state.lock().await;
        guard.reveal.toggle(index);
        guard.reveal.clone()
    }

    pub async fn toggle_all(&self) -> RevealSet {
        let mut guard = self.state.lock().await;
        guard.reveal.toggle_all();
        guard.reveal.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::ServiceError;
    use crate::models::vocabulary::fixtures::sample_vocabulary;
    use crate::session::SessionStatus;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedVocabulary {
        count: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl VocabularyService for FixedVocabulary {
        async fn generate_vocabulary(
            &self,
            topic: &str,
        ) -> Result<VocabularyResult, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(sample_vocabulary(topic, self.count))
        }
    }

    struct Unreachable;

    #[async_trait]
    impl VocabularyService for Unreachable {
        async fn generate_vocabulary(
            &self,
            _topic: &str,
        ) -> Result<VocabularyResult, ServiceError> {
            Err(ServiceError::EmptyResponse)
        }
    }

    /// Succeeds with six cards except for the topic "offline".
    struct Flaky;

    #[async_trait]
    impl VocabularyService for Flaky {
        async fn generate_vocabulary(
            &self,
            topic: &str,
        ) -> Result<VocabularyResult, ServiceError> {
            if topic == "offline" {
                Err(ServiceError::EmptyResponse)
            } else {
                Ok(sample_vocabulary(topic, 6))
            }
        }
    }

    fn session_with(count: usize) -> (VocabularySession, Arc<FixedVocabulary>) {
        let service = Arc::new(FixedVocabulary {
            count,
            calls: AtomicUsize::new(0),
        });
        (VocabularySession::new(service.clone()), service)
    }

    #[test]
    fn toggle_all_on_six_cards() {
        let mut reveal = RevealSet::new(6);
        reveal.toggle_all();
        assert_eq!(reveal.revealed_count(), 6);
        reveal.toggle_all();
        assert_eq!(reveal.revealed_count(), 0);
    }

    #[test]
    fn toggle_all_fills_partial_set() {
        let mut reveal = RevealSet::new(4);
        reveal.toggle(1);
        reveal.toggle_all();
        assert!(reveal.is_full());
    }

    #[test]
    fn toggle_flips_single_card_and_ignores_out_of_range() {
        let mut reveal = RevealSet::new(3);
        reveal.toggle(2);
        assert!(reveal.is_revealed(2));
        reveal.toggle(2);
        assert!(!reveal.is_revealed(2));
        reveal.toggle(3);
        assert_eq!(reveal.revealed_count(), 0);
    }

    #[tokio::test]
    async fn blank_topic_is_rejected_without_calling_service() {
        let (session, service) = session_with(5);
        assert_eq!(session.submit("   ").await, SubmitOutcome::Rejected);
        assert_eq!(session.snapshot().await.session.status, SessionStatus::Idle);
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn success_resets_reveal_set() {
        let (session, _) = session_with(6);
        assert!(matches!(
            session.submit("Weather").await,
            SubmitOutcome::Succeeded(_)
        ));
        let reveal = session.toggle_all().await;
        assert_eq!(reveal.revealed_count(), 6);

        session.submit("Travel").await;
        let state = session.snapshot().await;
        assert_eq!(state.session.status, SessionStatus::Succeeded);
        assert_eq!(state.topic, "Travel");
        assert_eq!(state.reveal.revealed_count(), 0);
        assert_eq!(state.reveal.card_count(), 6);
    }

    #[tokio::test]
    async fn failed_request_leaves_no_cards_to_reveal() {
        let session = VocabularySession::new(Arc::new(Flaky));
        session.submit("Weather").await;
        assert_eq!(session.toggle_all().await.revealed_count(), 6);

        assert!(matches!(
            session.submit("offline").await,
            SubmitOutcome::Failed(_)
        ));
        let state = session.snapshot().await;
        assert!(state.session.result.is_none());
        assert_eq!(state.reveal, RevealSet::default());

        let reveal = session.toggle_all().await;
        assert_eq!(reveal.card_count(), 0);
        assert_eq!(reveal.revealed_count(), 0);
        assert!(!session.toggle(2).await.is_revealed(2));
    }

    #[tokio::test]
    async fn failure_carries_user_message() {
        let session = VocabularySession::new(Arc::new(Unreachable));
        let outcome = session.submit("Weather").await;
        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        let state = session.snapshot().await;
        assert_eq!(state.session.status, SessionStatus::Failed);
        assert!(state.session.error.is_some());
    }
}
