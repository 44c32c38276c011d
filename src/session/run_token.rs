use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Correlation id attached to one pipeline run's log lines
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Creates a new random run ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ticket handed to each search; only the most recently issued one may publish results
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunToken {
    pub sequence: u64,
    pub run_id: RunId,
}

/// Monotonic issuer of run tokens
///
/// Also records which run, if any, currently holds the loading flag. Zero means none.
#[derive(Debug, Default)]
pub struct RunTokens {
    latest: AtomicU64,
    loading: AtomicU64,
}

impl RunTokens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a token that supersedes every earlier one
    pub fn issue(&self) -> RunToken {
        let sequence = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        RunToken {
            sequence,
            run_id: RunId::new(),
        }
    }

    pub fn is_latest(&self, token: &RunToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.sequence
    }

    /// Issues a token and marks its run as loading until the returned guard drops
    pub fn begin(&self) -> (RunToken, LoadingGuard<'_>) {
        let token = self.issue();
        self.loading.store(token.sequence, Ordering::SeqCst);
        let guard = LoadingGuard {
            loading: &self.loading,
            sequence: token.sequence,
        };
        (token, guard)
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst) != 0
    }

    /// Invalidates every outstanding token without starting a run
    pub fn supersede_all(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
        self.loading.store(0, Ordering::SeqCst);
    }
}

/// Clears the loading flag when its run ends, including when the run is cancelled
///
/// A guard only clears the flag while its own run still holds it, so a superseded run
/// never clears the flag of the run that replaced it.
#[derive(Debug)]
pub struct LoadingGuard<'a> {
    loading: &'a AtomicU64,
    sequence: u64,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let _ = self
            .loading
            .compare_exchange(self.sequence, 0, Ordering::SeqCst, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_increase_monotonically() {
        let tokens = RunTokens::new();
        let first = tokens.issue();
        let second = tokens.issue();

        assert!(second.sequence > first.sequence);
        assert_ne!(first.run_id, second.run_id);
    }

    #[test]
    fn test_only_latest_token_is_current() {
        let tokens = RunTokens::new();
        let first = tokens.issue();
        assert!(tokens.is_latest(&first));

        let second = tokens.issue();
        assert!(!tokens.is_latest(&first));
        assert!(tokens.is_latest(&second));
    }

    #[test]
    fn test_loading_cleared_when_guard_drops() {
        let tokens = RunTokens::new();
        let (_, guard) = tokens.begin();
        assert!(tokens.is_loading());

        drop(guard);

        assert!(!tokens.is_loading());
    }

    #[test]
    fn test_superseded_guard_keeps_newer_run_loading() {
        let tokens = RunTokens::new();
        let (_, stale) = tokens.begin();
        let (_, latest) = tokens.begin();

        drop(stale);
        assert!(tokens.is_loading());

        drop(latest);
        assert!(!tokens.is_loading());
    }

    #[test]
    fn test_supersede_all_invalidates_outstanding() {
        let tokens = RunTokens::new();
        let token = tokens.issue();

        tokens.supersede_all();

        assert!(!tokens.is_latest(&token));
        assert!(!tokens.is_loading());
    }
}
