//! Flat host rows and CSV writing
//!
//! Projects each raw host record onto a fixed column set and serializes the
//! lot to a CSV file. Missing fields become empty strings (or zero for the
//! numeric scores); the projection never fails on a malformed record.

use std::path::Path;

use serde::Serialize;
use vectra_domain::{HostRecord, Result, VectraError};

/// One CSV row. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostRow {
    pub id: String,
    pub name: String,
    pub sensor: String,
    pub last_source: String,
    pub ip_address: String,
    pub state: String,
    pub last_modified: String,
    pub last_detection_timestamp: String,
    pub threat: i64,
    pub certainty: i64,
    pub privilege_level: String,
    pub privilege_category: String,
    /// Semicolon-joined `type:value` pairs
    pub host_artifact_set: String,
    /// Comma-joined tag list
    pub tags: String,
}

impl HostRow {
    /// Flatten a raw host record.
    #[must_use]
    pub fn project(host: &HostRecord) -> Self {
        Self {
            id: text(host, "id"),
            name: text(host, "name"),
            sensor: sensor(host),
            last_source: text(host, "last_source"),
            ip_address: text(host, "ip"),
            state: text(host, "state"),
            last_modified: text(host, "last_modified"),
            last_detection_timestamp: text(host, "last_detection_timestamp"),
            threat: score(host, "threat"),
            certainty: score(host, "certainty"),
            privilege_level: text(host, "privilege_level"),
            privilege_category: text(host, "privilege_category"),
            host_artifact_set: artifacts(host),
            tags: tags(host),
        }
    }
}

/// String rendering of a field; empty when absent or null.
fn text(host: &HostRecord, key: &str) -> String {
    match host.get(key) {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// `sensor_name` with fallback to the older `sensor` field.
fn sensor(host: &HostRecord) -> String {
    let by_name = text(host, "sensor_name");
    if by_name.is_empty() {
        text(host, "sensor")
    } else {
        by_name
    }
}

fn score(host: &HostRecord, key: &str) -> i64 {
    host.get(key).and_then(serde_json::Value::as_i64).unwrap_or(0)
}

fn artifacts(host: &HostRecord) -> String {
    let Some(entries) = host.get("host_artifact_set").and_then(|v| v.as_array()) else {
        return String::new();
    };

    entries
        .iter()
        .map(|artifact| {
            let kind = artifact
                .get("type")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown");
            let value = artifact
                .get("value")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown");
            format!("{kind}:{value}")
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn tags(host: &HostRecord) -> String {
    let Some(entries) = host.get("tags").and_then(|v| v.as_array()) else {
        return String::new();
    };

    entries
        .iter()
        .filter_map(|tag| tag.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Write all hosts to a CSV file with a header row.
///
/// # Errors
/// Returns `VectraError::Export` when there is nothing to write and
/// `VectraError::Io` when the file cannot be produced.
pub fn write_csv(path: &Path, hosts: &[HostRecord]) -> Result<usize> {
    if hosts.is_empty() {
        return Err(VectraError::Export("no host data to write".to_string()));
    }

    let mut writer =
        csv::Writer::from_path(path).map_err(|e| VectraError::Io(e.to_string()))?;
    for host in hosts {
        writer
            .serialize(HostRow::project(host))
            .map_err(|e| VectraError::Export(e.to_string()))?;
    }
    writer.flush().map_err(|e| VectraError::Io(e.to_string()))?;

    Ok(hosts.len())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn projects_a_full_record() {
        let host = json!({
            "id": 42,
            "name": "workstation-7",
            "sensor_name": "sensor-a",
            "last_source": "10.0.0.7",
            "ip": "10.0.0.7",
            "state": "active",
            "last_modified": "2024-03-01T10:00:00Z",
            "last_detection_timestamp": "2024-03-01T09:55:00Z",
            "threat": 72,
            "certainty": 88,
            "privilege_level": "3",
            "privilege_category": "medium",
            "host_artifact_set": [
                {"type": "dns", "value": "workstation-7.corp"},
                {"type": "kerberos", "value": "user@CORP"},
            ],
            "tags": ["vip", "finance"],
        });

        let row = HostRow::project(&host);
        assert_eq!(row.id, "42");
        assert_eq!(row.name, "workstation-7");
        assert_eq!(row.sensor, "sensor-a");
        assert_eq!(row.ip_address, "10.0.0.7");
        assert_eq!(row.threat, 72);
        assert_eq!(row.certainty, 88);
        assert_eq!(row.host_artifact_set, "dns:workstation-7.corp; kerberos:user@CORP");
        assert_eq!(row.tags, "vip, finance");
    }

    #[test]
    fn missing_fields_become_defaults() {
        let host = json!({"id": 1});

        let row = HostRow::project(&host);
        assert_eq!(row.id, "1");
        assert_eq!(row.name, "");
        assert_eq!(row.threat, 0);
        assert_eq!(row.certainty, 0);
        assert_eq!(row.host_artifact_set, "");
        assert_eq!(row.tags, "");
    }

    #[test]
    fn sensor_falls_back_to_legacy_field() {
        let host = json!({"sensor": "legacy-sensor"});
        assert_eq!(HostRow::project(&host).sensor, "legacy-sensor");

        let host = json!({"sensor": "legacy-sensor", "sensor_name": "new-sensor"});
        assert_eq!(HostRow::project(&host).sensor, "new-sensor");
    }

    #[test]
    fn artifacts_without_type_or_value_say_unknown() {
        let host = json!({"host_artifact_set": [{"value": "v"}, {"type": "t"}]});
        assert_eq!(HostRow::project(&host).host_artifact_set, "Unknown:v; t:Unknown");
    }

    #[test]
    fn writes_header_and_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("hosts.csv");
        let hosts = vec![
            json!({"id": 1, "name": "a", "threat": 10}),
            json!({"id": 2, "name": "b"}),
        ];

        let written = write_csv(&path, &hosts).expect("csv written");
        assert_eq!(written, 2);

        let content = std::fs::read_to_string(&path).expect("read csv");
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some(
                "id,name,sensor,last_source,ip_address,state,last_modified,\
                 last_detection_timestamp,threat,certainty,privilege_level,\
                 privilege_category,host_artifact_set,tags"
            )
        );
        assert_eq!(lines.clone().count(), 2);
        assert!(content.contains("1,a,"));
        assert!(content.contains("2,b,"));
    }

    #[test]
    fn empty_input_is_an_export_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("hosts.csv");

        let err = write_csv(&path, &[]).expect_err("nothing to write");
        assert!(matches!(err, VectraError::Export(_)));
        assert!(!path.exists());
    }
}
