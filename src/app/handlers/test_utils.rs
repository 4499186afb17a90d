//! Shared test utilities for handler modules

use crate::config::AppConfig;

/// State pointed at a closed local port so stray requests fail fast
#[cfg(test)]
pub fn create_test_state() -> crate::app::State {
    crate::app::State::with_config(AppConfig {
        backend_url: "http://127.0.0.1:9".to_string(),
        request_timeout_secs: 1,
        enable_audit_log: false,
        ..AppConfig::default()
    })
    .0
}
