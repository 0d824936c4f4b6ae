//! Deterministic [`SigningService`] test double: every outcome is
//! whatever the test pre-registered, no real threshold-signing math.

use super::{PendingSignRequest, SignStatus, SigningError, SigningService, Vote};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Default)]
struct State {
    statuses: HashMap<String, SignStatus>,
    pending: Vec<PendingSignRequest>,
    accepted_votes: Vec<(String, Vote, String, String)>,
}

pub struct FakeSigningService {
    next_key: AtomicU64,
    state: Mutex<State>,
}

impl Default for FakeSigningService {
    fn default() -> Self {
        FakeSigningService {
            next_key: AtomicU64::new(1),
            state: Mutex::new(State::default()),
        }
    }
}

impl FakeSigningService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_sign_status(&self, key_id: &str, status: SignStatus) {
        self.state.lock().unwrap().statuses.insert(key_id.to_owned(), status);
    }

    pub fn push_pending(&self, req: PendingSignRequest) {
        self.state.lock().unwrap().pending.push(req);
    }

    pub fn accepted_votes(&self) -> Vec<(String, Vote, String, String)> {
        self.state.lock().unwrap().accepted_votes.clone()
    }
}

#[async_trait]
impl SigningService for FakeSigningService {
    async fn do_sign_one(&self, msg_hash: &str, msg_context: &str) -> Result<String, SigningError> {
        let key_id = format!("key-{}", self.next_key.fetch_add(1, Ordering::SeqCst));
        self.state.lock().unwrap().statuses.insert(
            key_id.clone(),
            SignStatus::Completed { rsv: vec![format!("rsv-{msg_hash}-{msg_context}")] },
        );
        Ok(key_id)
    }

    async fn get_sign_status(&self, key_id: &str) -> Result<SignStatus, SigningError> {
        self.state
            .lock()
            .unwrap()
            .statuses
            .get(key_id)
            .cloned()
            .ok_or(SigningError::GetSignStatusFailed)
    }

    async fn get_cur_node_sign_info(&self) -> Result<Vec<PendingSignRequest>, SigningError> {
        Ok(self.state.lock().unwrap().pending.clone())
    }

    async fn do_accept_sign(
        &self,
        key_id: &str,
        vote: Vote,
        msg_hash: &str,
        msg_context: &str,
    ) -> Result<(), SigningError> {
        self.state.lock().unwrap().accepted_votes.push((
            key_id.to_owned(),
            vote,
            msg_hash.to_owned(),
            msg_context.to_owned(),
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn do_sign_one_then_get_sign_status_completes_with_one_rsv() {
        let svc = FakeSigningService::new();
        let key_id = svc.do_sign_one("hash", "ctx").await.unwrap();
        match svc.get_sign_status(&key_id).await.unwrap() {
            SignStatus::Completed { rsv } => assert_eq!(rsv.len(), 1),
            SignStatus::Pending => panic!("expected completed"),
        }
    }
}
