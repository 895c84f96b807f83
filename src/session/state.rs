use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    Idle,
    Requesting,
    Succeeded,
    Failed,
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Idle
    }
}

/// What a submit call ended in, from the caller's point of view.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<T> {
    /// Guard failed (empty input or a request already in flight); nothing changed.
    Rejected,
    Succeeded(T),
    Failed(String),
    /// The view moved on while the request was in flight, so the response was
    /// not shown.
    Superseded,
}

/// Request lifecycle shared by the analysis and vocabulary flows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState<T> {
    pub status: SessionStatus,
    pub result: Option<T>,
    pub error: Option<String>,
    /// Bumped by every submit and every direct assignment; a response is only
    /// applied when its ticket still matches.
    #[serde(skip)]
    epoch: u64,
    #[serde(skip)]
    pending: Option<u64>,
}

impl<T> Default for SessionState<T> {
    fn default() -> Self {
        Self {
            status: SessionStatus::Idle,
            result: None,
            error: None,
            epoch: 0,
            pending: None,
        }
    }
}

impl<T> SessionState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_requesting(&self) -> bool {
        self.status == SessionStatus::Requesting
    }

    /// Moves to `Requesting` and hands out a ticket, or `None` while a request
    /// is already outstanding.
    pub fn begin_request(&mut self) -> Option<u64> {
        if self.is_requesting() {
            return None;
        }
        self.epoch += 1;
        self.pending = Some(self.epoch);
        self.status = SessionStatus::Requesting;
        self.result = None;
        self.error = None;
        Some(self.epoch)
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.pending == Some(ticket)
    }

    /// Returns `false` and leaves the state alone when the ticket is stale.
    pub fn complete(&mut self, ticket: u64, result: T) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.pending = None;
        self.status = SessionStatus::Succeeded;
        self.result = Some(result);
        self.error = None;
        true
    }

    pub fn fail(&mut self, ticket: u64, message: String) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.pending = None;
        self.status = SessionStatus::Failed;
        self.result = None;
        self.error = Some(message);
        true
    }

    /// Shows an externally supplied result without a request, orphaning any
    /// request still in flight.
    pub fn assign(&mut self, result: T) {
        self.epoch += 1;
        self.pending = None;
        self.status = SessionStatus::Succeeded;
        self.result = Some(result);
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_request_cycle() {
        let mut state: SessionState<u32> = SessionState::new();
        assert_eq!(state.status, SessionStatus::Idle);

        let ticket = state.begin_request().unwrap();
        assert_eq!(state.status, SessionStatus::Requesting);
        assert!(state.begin_request().is_none());

        assert!(state.complete(ticket, 7));
        assert_eq!(state.status, SessionStatus::Succeeded);
        assert_eq!(state.result, Some(7));

        let ticket = state.begin_request().unwrap();
        assert!(state.result.is_none());
        assert!(state.fail(ticket, "boom".to_string()));
        assert_eq!(state.status, SessionStatus::Failed);
        assert_eq!(state.error.as_deref(), Some("boom"));

        assert!(state.begin_request().is_some());
    }

    #[test]
    fn assignment_orphans_in_flight_request() {
        let mut state: SessionState<u32> = SessionState::new();
        let ticket = state.begin_request().unwrap();
        state.assign(1);

        assert!(!state.complete(ticket, 2));
        assert!(!state.fail(ticket, "late".to_string()));
        assert_eq!(state.result, Some(1));
        assert_eq!(state.status, SessionStatus::Succeeded);
    }

    #[test]
    fn snapshot_serializes_without_bookkeeping() {
        let mut state: SessionState<u32> = SessionState::new();
        state.assign(5);
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["status"], "succeeded");
        assert_eq!(value["result"], 5);
        assert!(value.get("epoch").is_none());
    }
}
