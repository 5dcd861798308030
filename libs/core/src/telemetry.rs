//! Counters emitted by the prompt lifecycle.
//!
//! Recording goes through the `metrics` facade; without an installed recorder
//! every call is a no-op.

use metrics::counter;

pub const PROMPT_STARTED: &str = "dialogs_prompt_started_total";
pub const PROMPT_RETRY: &str = "dialogs_prompt_retry_total";
pub const PROMPT_COMPLETED: &str = "dialogs_prompt_completed_total";
pub const OAUTH_INVOKE_RESPONSE: &str = "dialogs_oauth_invoke_response_total";
pub const OAUTH_TIMEOUT: &str = "dialogs_oauth_timeout_total";

pub fn record_prompt_started(kind: &'static str) {
    counter!(PROMPT_STARTED, "kind" => kind).increment(1);
}

pub fn record_prompt_retry(kind: &'static str) {
    counter!(PROMPT_RETRY, "kind" => kind).increment(1);
}

/// `outcome` is `recognized`, `invalid_message` or `timeout`.
pub fn record_prompt_completed(kind: &'static str, outcome: &'static str) {
    counter!(PROMPT_COMPLETED, "kind" => kind, "outcome" => outcome).increment(1);
}

pub fn record_oauth_invoke_response(operation: &str, status: u16) {
    counter!(
        OAUTH_INVOKE_RESPONSE,
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

pub fn record_oauth_timeout(connection_name: &str) {
    counter!(OAUTH_TIMEOUT, "connection_name" => connection_name.to_string()).increment(1);
}
