use std::fs::{File, OpenOptions};
use std::io::Write;

use chrono::Utc;
use serde_json::{Value, json};
use tracing::warn;

/// How status bodies are written to the traffic log.
pub enum MessageLogMode {
    /// Every poll body in full.
    Full,
    /// Full body once, then only the paths that changed.
    Diffed,
}

pub(crate) struct MessageLogger {
    mode: MessageLogMode,
    file: File,
    previous_status: Option<Value>,
}

impl MessageLogger {
    pub fn new(mode: MessageLogMode, path: &str) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            mode,
            file,
            previous_status: None,
        })
    }

    pub fn log_command(&mut self, route: &str, body: Option<&Value>) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "cmd",
            "route": route,
            "body": body,
        });
        self.write_line(&entry);
    }

    pub fn log_status(&mut self, body: &Value) {
        match self.mode {
            MessageLogMode::Full => {
                let entry = json!({
                    "ts": Utc::now().to_rfc3339(),
                    "dir": "status",
                    "body": body,
                });
                self.write_line(&entry);
            }
            MessageLogMode::Diffed => match self.previous_status.take() {
                None => {
                    let entry = json!({
                        "ts": Utc::now().to_rfc3339(),
                        "dir": "status",
                        "full": true,
                        "body": body,
                    });
                    self.write_line(&entry);
                    self.previous_status = Some(body.clone());
                }
                Some(prev) => {
                    let mut changes = Vec::new();
                    diff_json(&prev, body, "", &mut changes);

                    let change_entries: Vec<Value> = changes
                        .iter()
                        .map(|(path, old, new)| json!({ "path": path, "old": old, "new": new }))
                        .collect();

                    let entry = json!({
                        "ts": Utc::now().to_rfc3339(),
                        "dir": "status",
                        "changes": change_entries,
                    });
                    self.write_line(&entry);
                    self.previous_status = Some(body.clone());
                }
            },
        }
    }

    pub fn log_fetch_error(&mut self, detail: &str) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "status",
            "error": detail,
        });
        self.write_line(&entry);
    }

    fn write_line(&mut self, entry: &Value) {
        if let Ok(line) = serde_json::to_string(entry)
            && let Err(e) = writeln!(self.file, "{line}")
        {
            warn!("failed to write log entry: {e}");
        }
    }
}

fn diff_json(
    previous: &Value,
    current: &Value,
    path_prefix: &str,
    changes: &mut Vec<(String, Value, Value)>,
) {
    match (previous, current) {
        (Value::Object(prev_map), Value::Object(curr_map)) => {
            for (key, curr_val) in curr_map {
                let path = if path_prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{path_prefix}.{key}")
                };
                match prev_map.get(key) {
                    Some(prev_val) => diff_json(prev_val, curr_val, &path, changes),
                    None => changes.push((path, Value::Null, curr_val.clone())),
                }
            }
        }
        (prev, curr) if prev != curr => {
            changes.push((path_prefix.to_string(), prev.clone(), curr.clone()));
        }
        _ => {}
    }
}
