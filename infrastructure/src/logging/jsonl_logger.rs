//! JSONL file writer for discussion events.
//!
//! Each [`DiscussionEvent`] is serialized as a single JSON line with a
//! `type` field and `timestamp`, appended to the file via a buffered writer.

use roundtable_application::{DiscussionEvent, EventSubscriber};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Event subscriber that appends one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every line and on
/// `Drop`.
pub struct JsonlEventLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlEventLogger {
    /// Open (or create) the log at `path`, appending to existing content.
    ///
    /// Creates parent directories as needed. Returns `None` if the file
    /// cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty())
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create event log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open event log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSubscriber for JsonlEventLogger {
    fn on_event(&self, event: &DiscussionEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let record = match serde_json::to_value(event) {
            Ok(serde_json::Value::Object(mut map)) => {
                map.insert(
                    "timestamp".to_string(),
                    serde_json::Value::String(timestamp),
                );
                serde_json::Value::Object(map)
            }
            Ok(other) => serde_json::json!({
                "type": event.kind().as_str(),
                "timestamp": timestamp,
                "data": other,
            }),
            Err(e) => {
                warn!(kind = %event.kind(), error = %e, "Could not serialize event");
                return;
            }
        };

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlEventLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_application::EventBus;
    use roundtable_domain::{
        AgentId, AgentMessage, AgentPersona, DiscussionId, PersonaRole, RoleProfile,
    };
    use std::sync::Arc;

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let logger = JsonlEventLogger::new(&path).unwrap();

        let id = DiscussionId::new("d1");
        let writer = AgentPersona::new(
            "writer",
            "Writer",
            RoleProfile::for_role(PersonaRole::Writer),
            "p",
        );
        logger.on_event(&DiscussionEvent::DiscussionStarted {
            discussion_id: id.clone(),
            topic: "Glacier port".to_string(),
            participants: vec![AgentId::new("writer")],
        });
        logger.on_event(&DiscussionEvent::AgentSpoke {
            discussion_id: id,
            message: AgentMessage::from_agent(&writer, "Fog everywhere"),
        });
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert!(line.get("timestamp").is_some());
            assert_eq!(line["discussion_id"], "d1");
        }
        assert_eq!(lines[0]["type"], "discussionStarted");
        assert_eq!(lines[0]["topic"], "Glacier port");
        assert_eq!(lines[1]["type"], "agentSpoke");
        assert_eq!(lines[1]["message"]["content"], "Fog everywhere");
    }

    #[test]
    fn test_appends_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("events.jsonl");
        for _ in 0..2 {
            let logger = JsonlEventLogger::new(&path).unwrap();
            logger.on_event(&DiscussionEvent::DiscussionPaused {
                discussion_id: DiscussionId::new("d1"),
            });
        }
        assert_eq!(read_lines(&path).len(), 2);
    }

    #[test]
    fn test_subscribes_to_bus() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bus.jsonl");
        let logger = Arc::new(JsonlEventLogger::new(&path).unwrap());

        let bus = EventBus::new();
        bus.subscribe_shared(None, logger.clone());
        bus.publish(&DiscussionEvent::DiscussionResumed {
            discussion_id: DiscussionId::new("d1"),
        });
        drop(bus);
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines[0]["type"], "discussionResumed");
    }

    #[test]
    fn test_unwritable_path_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file cannot be used as a directory
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        assert!(JsonlEventLogger::new(blocker.join("events.jsonl")).is_none());
    }
}
