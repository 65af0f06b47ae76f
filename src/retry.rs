//! Status-driven retry loop.
//!
//! The first attempt always runs. After each completed attempt (including
//! its memory release) the status decides whether another one follows. No
//! backoff is applied between attempts.

use crate::engine::{EngineResponse, Gateway};
use crate::options::RetryPolicy;

/// Attempt bookkeeping for one logical request.
#[derive(Debug)]
pub struct RetryState<'a> {
    policy: &'a RetryPolicy,
    attempts: u32,
}

impl<'a> RetryState<'a> {
    pub fn new(policy: &'a RetryPolicy) -> Self {
        Self { policy, attempts: 0 }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Stamp a finished attempt on `response` and report whether to go again.
    pub fn record(&mut self, response: &mut EngineResponse) -> bool {
        response.retry_count = self.attempts;
        self.attempts += 1;
        self.policy.should_retry(self.attempts, response.status)
    }
}

/// Submit `payload` until the policy stops retrying; return the last reply.
///
/// After the last allowed attempt the final reply comes back as-is, error
/// status included. There is no separate "retries exhausted" error.
pub async fn execute_with_retry(gateway: &Gateway, payload: &str, policy: &RetryPolicy) -> EngineResponse {
    let mut state = RetryState::new(policy);
    loop {
        let mut response = gateway.submit(payload.to_owned()).await;
        if !state.record(&mut response) {
            return response;
        }
        tracing::debug!(
            "Retrying after status {} (attempt {} of {})",
            response.status,
            state.attempts(),
            policy.max_count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ScriptedEngine;
    use std::sync::Arc;

    async fn run(engine: &Arc<ScriptedEngine>, policy: RetryPolicy) -> EngineResponse {
        let gateway = Gateway::new(engine.clone());
        execute_with_retry(&gateway, "{}", &policy).await
    }

    #[tokio::test]
    async fn test_disabled_retry_runs_once() {
        let engine = Arc::new(ScriptedEngine::always(503, ""));
        let response = run(&engine, RetryPolicy::disabled()).await;

        assert_eq!(engine.request_count(), 1);
        assert_eq!(response.status, 503);
        assert_eq!(response.retry_count, 0);
    }

    #[tokio::test]
    async fn test_always_retryable_stops_at_max_count() {
        let engine = Arc::new(ScriptedEngine::always(503, ""));
        let policy = RetryPolicy { enabled: true, max_count: 3, status_codes: vec![503] };
        let response = run(&engine, policy).await;

        assert_eq!(engine.request_count(), 3);
        assert_eq!(response.retry_count, 2);
        assert_eq!(response.status, 503);
    }

    #[tokio::test]
    async fn test_empty_status_set_runs_once() {
        let engine = Arc::new(ScriptedEngine::always(500, ""));
        let policy = RetryPolicy { enabled: true, max_count: 10, status_codes: vec![] };
        run(&engine, policy).await;

        assert_eq!(engine.request_count(), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let engine = Arc::new(
            ScriptedEngine::new()
                .then_reply(503, "busy")
                .then_reply(503, "busy")
                .then_reply(200, "done"),
        );
        let policy = RetryPolicy { enabled: true, max_count: 3, status_codes: vec![503] };
        let response = run(&engine, policy).await;

        assert_eq!(response.status, 200);
        assert_eq!(response.body, "done");
        assert_eq!(response.retry_count, 2);
        assert_eq!(engine.release_count(), 3);
    }

    #[tokio::test]
    async fn test_engine_fault_is_retryable_when_listed() {
        let engine = Arc::new(ScriptedEngine::new().then_fault("timeout").then_reply(200, ""));
        let policy = RetryPolicy { enabled: true, max_count: 3, status_codes: vec![0] };
        let response = run(&engine, policy).await;

        assert_eq!(response.status, 200);
        assert_eq!(response.retry_count, 1);
    }

    #[tokio::test]
    async fn test_zero_max_count_still_runs_once() {
        let engine = Arc::new(ScriptedEngine::always(503, ""));
        let policy = RetryPolicy { enabled: true, max_count: 0, status_codes: vec![503] };
        run(&engine, policy).await;

        assert_eq!(engine.request_count(), 1);
    }
}
