use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    collaborator::AnalysisService,
    history::HistoryManager,
    log_info, log_warn,
    models::{AnalysisRecord, AnalysisResult, QuestionImage, Subject, Submission},
    presentation::AnalysisReveal,
};

use super::{SessionState, SubmitOutcome};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisState {
    pub session: SessionState<AnalysisResult>,
    /// Subject applied to the next submit.
    pub selected_subject: Subject,
    /// Inputs behind the result currently shown (or being requested).
    pub question_text: String,
    pub question_image: Option<QuestionImage>,
    /// History id of the result currently shown.
    pub record_id: Option<String>,
    pub reveal: AnalysisReveal,
}

#[derive(Clone)]
pub struct AnalysisSession {
    state: Arc<Mutex<AnalysisState>>,
    service: Arc<dyn AnalysisService>,
    history: Arc<HistoryManager>,
}

impl AnalysisSession {
    pub fn new(service: Arc<dyn AnalysisService>, history: Arc<HistoryManager>) -> Self {
        Self {
            state: Arc::new(Mutex::new(AnalysisState::default())),
            service,
            history,
        }
    }

    pub async fn snapshot(&self) -> AnalysisState {
        self.state.lock().await.clone()
    }

    pub async fn select_subject(&self, subject: Subject) {
        self.state.lock().await.selected_subject = subject;
    }

    /// Sends the question to the collaborator. Requires text or an image and
    /// no request already in flight; otherwise nothing changes.
    ///
    /// A successful result is always recorded in history, even when the view
    /// has moved on to another entry in the meantime.
    pub async fn submit(
        &self,
        question_text: &str,
        question_image: Option<QuestionImage>,
    ) -> SubmitOutcome<AnalysisRecord> {
        let (ticket, submission) = {
            let mut guard = self.state.lock().await;
            let submission = Submission {
                subject: guard.selected_subject,
                question_text: question_text.to_string(),
                question_image,
            };
            if !submission.has_content() {
                return SubmitOutcome::Rejected;
            }
            let Some(ticket) = guard.session.begin_request() else {
                return SubmitOutcome::Rejected;
            };
            guard.question_text = submission.question_text.clone();
            guard.question_image = submission.question_image.clone();
            guard.record_id = None;
            guard.reveal.hide_all();
            (ticket, submission)
        };

        let response = self.service.analyze(&submission).await;

        match response {
            Ok(result) => {
                let record = self.history.record(submission, result.clone());
                log_info!("Saved analysis {} ({})", record.id, record.subject);

                let mut guard = self.state.lock().await;
                if guard.session.complete(ticket, result) {
                    guard.record_id = Some(record.id.clone());
                    SubmitOutcome::Succeeded(record)
                } else {
                    SubmitOutcome::Superseded
                }
            }
            Err(err) => {
                log_warn!("Analysis request failed: {}", err);
                let message = err.user_message();
                let mut guard = self.state.lock().await;
                if guard.session.fail(ticket, message.clone()) {
                    SubmitOutcome::Failed(message)
                } else {
                    SubmitOutcome::Superseded
                }
            }
        }
    }

    /// Replays a stored record straight into `Succeeded` without a request.
    pub async fn show_record(&self, record: &AnalysisRecord) {
        let mut guard = self.state.lock().await;
        guard.session.assign(record.result.clone());
        guard.selected_subject = record.subject;
        guard.question_text = record.question_text.clone();
        guard.question_image = record.question_image.clone();
        guard.record_id = Some(record.id.clone());
        guard.reveal.hide_all();
    }

    /// Looks `id` up in history and replays it; `None` if it is not there.
    pub async fn load_record(&self, id: &str) -> Option<AnalysisRecord> {
        let record = self.history.get(id)?;
        self.show_record(&record).await;
        Some(record)
    }

    pub async fn toggle_steps(&self) -> AnalysisReveal {
        let mut guard = self.state.lock().await;
        guard.reveal.toggle_steps();
        guard.reveal
    }

    pub async fn toggle_answer(&self) -> AnalysisReveal {
        let mut guard = self.state.lock().await;
        guard.reveal.toggle_answer();
        guard.reveal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::{DecodeError, ServiceError};
    use crate::models::analysis::fixtures::sample_result;
    use crate::session::SessionStatus;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    struct Tutor {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AnalysisService for Tutor {
        async fn analyze(&self, submission: &Submission) -> Result<AnalysisResult, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(sample_result(submission.subject.label()))
        }
    }

    /// Fails the way a response without `practiceQuestion` does.
    struct Truncated;

    #[async_trait]
    impl AnalysisService for Truncated {
        async fn analyze(&self, _submission: &Submission) -> Result<AnalysisResult, ServiceError> {
            let err = crate::collaborator::decode::decode_analysis(
                r#"{"diagnosis":"d","coreConcept":"c","solutionSteps":["s"]}"#,
            )
            .unwrap_err();
            assert!(matches!(err, DecodeError::Json(_)));
            Err(err.into())
        }
    }

    /// Holds the response until released so tests can act mid-request.
    struct Gated {
        release: Arc<Notify>,
        started: Arc<Notify>,
    }

    #[async_trait]
    impl AnalysisService for Gated {
        async fn analyze(&self, _submission: &Submission) -> Result<AnalysisResult, ServiceError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(sample_result("late"))
        }
    }

    fn history() -> Arc<HistoryManager> {
        Arc::new(HistoryManager::load(Box::new(MemoryStore::new())))
    }

    fn tutor_session() -> (AnalysisSession, Arc<Tutor>, Arc<HistoryManager>) {
        let service = Arc::new(Tutor {
            calls: AtomicUsize::new(0),
        });
        let history = history();
        (
            AnalysisSession::new(service.clone(), history.clone()),
            service,
            history,
        )
    }

    #[tokio::test]
    async fn empty_submission_never_leaves_current_state() {
        let (session, service, history) = tutor_session();
        assert_eq!(session.submit("  \n", None).await, SubmitOutcome::Rejected);
        assert_eq!(session.snapshot().await.session.status, SessionStatus::Idle);

        session.submit("What is 3 * 4?", None).await;
        assert_eq!(session.submit("", None).await, SubmitOutcome::Rejected);
        let state = session.snapshot().await;
        assert_eq!(state.session.status, SessionStatus::Succeeded);
        assert_eq!(state.question_text, "What is 3 * 4?");
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn success_is_shown_and_recorded_with_selected_subject() {
        let (session, _, history) = tutor_session();
        session.select_subject(Subject::Chemistry).await;
        let image = QuestionImage::from_bytes("image/jpeg", b"jpeg");

        let record = match session.submit("", Some(image.clone())).await {
            SubmitOutcome::Succeeded(record) => record,
            other => panic!("expected success, got {other:?}"),
        };

        assert_eq!(record.subject, Subject::Chemistry);
        assert_eq!(record.question_image, Some(image));
        assert_eq!(history.records(), vec![record.clone()]);

        let state = session.snapshot().await;
        assert_eq!(state.session.result, Some(record.result));
        assert_eq!(state.record_id, Some(record.id));
    }

    #[tokio::test]
    async fn response_missing_practice_question_fails_without_history() {
        let history = history();
        let session = AnalysisSession::new(Arc::new(Truncated), history.clone());

        let outcome = session.submit("Solve x + 1 = 2", None).await;
        assert!(matches!(outcome, SubmitOutcome::Failed(_)));

        let state = session.snapshot().await;
        assert_eq!(state.session.status, SessionStatus::Failed);
        assert!(state.session.result.is_none());
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn loading_history_replays_without_calling_service() {
        let (session, service, history) = tutor_session();
        let stored = history.record(
            Submission::new(Subject::English, "Choose the right tense"),
            sample_result("tenses"),
        );

        let loaded = session.load_record(&stored.id).await.unwrap();
        assert_eq!(loaded, stored);
        assert!(session.load_record("missing").await.is_none());

        let state = session.snapshot().await;
        assert_eq!(state.session.status, SessionStatus::Succeeded);
        assert_eq!(state.selected_subject, Subject::English);
        assert_eq!(state.question_text, "Choose the right tense");
        assert_eq!(state.session.result, Some(stored.result));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn second_submit_while_requesting_is_rejected() {
        let release = Arc::new(Notify::new());
        let started = Arc::new(Notify::new());
        let service = Arc::new(Gated {
            release: release.clone(),
            started: started.clone(),
        });
        let session = AnalysisSession::new(service, history());

        let in_flight = {
            let session = session.clone();
            tokio::spawn(async move { session.submit("first", None).await })
        };
        started.notified().await;

        assert_eq!(session.submit("second", None).await, SubmitOutcome::Rejected);
        assert_eq!(
            session.snapshot().await.session.status,
            SessionStatus::Requesting
        );

        release.notify_one();
        assert!(matches!(
            in_flight.await.unwrap(),
            SubmitOutcome::Succeeded(_)
        ));
    }

    #[tokio::test]
    async fn stale_response_is_recorded_but_not_shown() {
        let release = Arc::new(Notify::new());
        let started = Arc::new(Notify::new());
        let history = history();
        let service = Arc::new(Gated {
            release: release.clone(),
            started: started.clone(),
        });
        let session = AnalysisSession::new(service, history.clone());
        let replay = history.record(
            Submission::new(Subject::Math, "old question"),
            sample_result("old"),
        );

        let in_flight = {
            let session = session.clone();
            tokio::spawn(async move { session.submit("new question", None).await })
        };
        started.notified().await;
        session.show_record(&replay).await;
        release.notify_one();

        assert_eq!(in_flight.await.unwrap(), SubmitOutcome::Superseded);
        let state = session.snapshot().await;
        assert_eq!(state.record_id, Some(replay.id.clone()));
        assert_eq!(state.session.result, Some(replay.result));
        assert_eq!(history.len(), 2);
        assert_eq!(history.records()[0].question_text, "new question");
    }

    #[tokio::test]
    async fn reveal_resets_on_new_result() {
        let (session, _, _) = tutor_session();
        session.submit("first", None).await;
        session.toggle_steps().await;
        let reveal = session.toggle_answer().await;
        assert!(reveal.show_steps && reveal.show_answer);

        session.submit("second", None).await;
        assert_eq!(session.snapshot().await.reveal, AnalysisReveal::default());
    }

    #[tokio::test]
    async fn empty_image_alone_is_rejected() {
        let (session, service, history) = tutor_session();
        let blank = QuestionImage::from_bytes("image/png", b"");
        assert_eq!(session.submit("  ", Some(blank)).await, SubmitOutcome::Rejected);
        assert_eq!(session.snapshot().await.session.status, SessionStatus::Idle);
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
        assert!(history.is_empty());
    }
}
