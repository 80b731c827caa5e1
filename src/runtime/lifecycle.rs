//! Per-request bookkeeping owned by the runtime

use tokio_util::sync::CancellationToken;

/// Tracks the one outstanding request.
///
/// The token aborts the provider call; `committed` guards the assistant
/// message so a reveal that completes and a cancel that races it can never
/// both append.
#[derive(Debug)]
pub struct RequestLifecycle {
    request_id: u64,
    cancel: CancellationToken,
    committed: bool,
}

impl RequestLifecycle {
    pub fn new(request_id: u64) -> Self {
        Self {
            request_id,
            cancel: CancellationToken::new(),
            committed: false,
        }
    }

    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Claim the right to append the assistant message. True exactly once.
    pub fn try_commit(&mut self) -> bool {
        !std::mem::replace(&mut self.committed, true)
    }
}

impl Drop for RequestLifecycle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
