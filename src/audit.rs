/// Audit trail of create requests sent to the backend
///
/// Every attempt is recorded, successful or not, one JSON object per line.
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

use crate::core::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    CreateAddressObject,
    CreateServiceObject,
    CreateAddressGroup,
    CreateServiceGroup,
    CreateRule,
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub event_type: EventType,
    pub success: bool,
    /// Request summary (name, backend, location, ...)
    pub details: serde_json::Value,
    pub error: Option<String>,
}

impl AuditEvent {
    pub fn new(
        event_type: EventType,
        success: bool,
        details: serde_json::Value,
        error: Option<String>,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now(),
            event_type,
            success,
            details,
            error,
        }
    }

    /// Builds the event for a finished create call
    pub fn for_create(
        event_type: EventType,
        backend: &str,
        details: serde_json::Value,
        outcome: &Result<String>,
    ) -> Self {
        let mut details = details;
        if let serde_json::Value::Object(map) = &mut details {
            map.insert("backend".into(), backend.into());
            if let Ok(created) = outcome {
                map.insert("created".into(), created.as_str().into());
            }
        }
        Self::new(
            event_type,
            outcome.is_ok(),
            details,
            outcome.as_ref().err().map(ToString::to_string),
        )
    }
}

/// Audit log writer
pub struct AuditLog {
    log_path: PathBuf,
}

impl AuditLog {
    /// Opens `<state dir>/audit.log`
    ///
    /// # Errors
    ///
    /// Returns `Err` if state directory cannot be determined
    pub fn new() -> std::io::Result<Self> {
        let mut log_path = crate::utils::get_state_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "State directory not found")
        })?;
        log_path.push("audit.log");

        Ok(Self { log_path })
    }

    pub fn at(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Appends an event as one JSON line
    ///
    /// # Errors
    ///
    /// Returns `Err` if file cannot be opened or written
    pub async fn log(&self, event: &AuditEvent) -> std::io::Result<()> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.sync_all().await?;

        Ok(())
    }
}

/// Records a create call; a write failure is only logged
pub async fn log_create(
    enabled: bool,
    event_type: EventType,
    backend: &str,
    details: serde_json::Value,
    outcome: &Result<String>,
) {
    if !enabled {
        return;
    }
    if let Ok(audit) = AuditLog::new() {
        let event = AuditEvent::for_create(event_type, backend, details, outcome);
        if let Err(e) = audit.log(&event).await {
            tracing::warn!("Failed to write audit log: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Error;

    #[test]
    fn test_create_success_event() {
        let event = AuditEvent::for_create(
            EventType::CreateAddressObject,
            "http://127.0.0.1:8000",
            serde_json::json!({"name": "web-01"}),
            &Ok("web-01".to_string()),
        );

        assert!(event.success);
        assert!(event.error.is_none());
        assert_eq!(event.details["created"], "web-01");
        assert_eq!(event.details["backend"], "http://127.0.0.1:8000");
    }

    #[test]
    fn test_create_failure_event() {
        let event = AuditEvent::for_create(
            EventType::CreateRule,
            "http://127.0.0.1:8000",
            serde_json::json!({"name": "allow-web"}),
            &Err(Error::transport("Failed to create rule: boom", Some(500))),
        );

        assert!(!event.success);
        assert!(event.error.as_deref().unwrap().contains("boom"));
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("create_rule"));
    }

    #[tokio::test]
    async fn test_log_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.log");
        let audit = AuditLog::at(path.clone());

        for name in ["a", "b"] {
            let event = AuditEvent::new(
                EventType::CreateServiceGroup,
                true,
                serde_json::json!({ "name": name }),
                None,
            );
            audit.log(&event).await.unwrap();
        }

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        let events: Vec<AuditEvent> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].details["name"], "b");
        assert_eq!(events[0].event_type, EventType::CreateServiceGroup);
    }
}
