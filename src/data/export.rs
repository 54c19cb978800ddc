//! Export the current window to JSON or CSV.

use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use serde::{Serialize, Serializer};

use super::channel::{Channel, Condition, Diagnosis, Reading, Severity};
use super::generator::EpisodeKind;
use super::session::MonitoringSession;

/// A classified reading as written to both export formats.
#[derive(Debug, Serialize)]
struct ReadingRecord {
    tick: u64,
    #[serde(serialize_with = "display")]
    channel: Channel,
    value: f64,
    #[serde(serialize_with = "display")]
    condition: Condition,
    severity: Severity,
    anomaly: Option<EpisodeKind>,
}

impl ReadingRecord {
    fn new((reading, diagnosis): &(Reading, Diagnosis)) -> Self {
        Self {
            tick: reading.tick,
            channel: reading.channel,
            value: reading.value,
            condition: diagnosis.condition,
            severity: diagnosis.severity,
            anomaly: reading.anomaly,
        }
    }
}

fn display<T, S>(value: &T, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    T: fmt::Display,
    S: Serializer,
{
    serializer.collect_str(value)
}

fn records<'a>(entries: impl IntoIterator<Item = &'a (Reading, Diagnosis)>) -> Vec<ReadingRecord> {
    entries.into_iter().map(ReadingRecord::new).collect()
}

/// Build the export document for a session.
pub fn to_json(session: &MonitoringSession) -> serde_json::Value {
    let mut counts = [0usize; 4];
    for channel in session.channels() {
        if let Some((_, d)) = session.latest(channel) {
            counts[d.severity as usize] += 1;
        }
    }

    let summary = serde_json::json!({
        "ticks": session.ticks(),
        "window": session.window(),
        "overall": session.overall_severity(),
        "good": counts[Severity::Good as usize],
        "caution": counts[Severity::Caution as usize],
        "concern": counts[Severity::Concern as usize],
        "critical": counts[Severity::Critical as usize],
    });

    let channels: Vec<serde_json::Value> = session
        .channels()
        .map(|channel| {
            let readings = session
                .buffer(channel)
                .map(|b| records(b.iter()))
                .unwrap_or_default();

            serde_json::json!({
                "channel": channel.label(),
                "unit": channel.unit(),
                "latest": session.latest(channel).map(|(r, _)| r.value),
                "readings": readings,
            })
        })
        .collect();

    serde_json::json!({
        "summary": summary,
        "channels": channels,
        "alerts": records(&session.alerts()),
    })
}

/// Write the session window as pretty-printed JSON.
pub fn write_json(session: &MonitoringSession, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&to_json(session))?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Write the session window as CSV, one row per reading, in tick order.
pub fn write_csv(session: &MonitoringSession, path: &Path) -> Result<()> {
    let mut rows = records(
        session
            .channels()
            .filter_map(|channel| session.buffer(channel).ok())
            .flat_map(|b| b.iter()),
    );
    rows.sort_by_key(|row| row.tick);

    let mut writer = csv::Writer::from_path(path)?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Channel, GeneratorConfig};
    use tempfile::tempdir;

    fn session() -> MonitoringSession {
        let mut s = MonitoringSession::clinical(GeneratorConfig::default(), Some(21), 10).unwrap();
        for _ in 0..12 {
            s.tick().unwrap();
        }
        s
    }

    #[test]
    fn test_json_document_shape() {
        let s = session();
        let doc = to_json(&s);

        assert_eq!(doc["summary"]["ticks"], 12);
        assert_eq!(doc["summary"]["window"], 10);
        let total: u64 = ["good", "caution", "concern", "critical"]
            .iter()
            .map(|k| doc["summary"][k].as_u64().unwrap())
            .sum();
        assert_eq!(total, Channel::ALL.len() as u64);

        let channels = doc["channels"].as_array().unwrap();
        assert_eq!(channels.len(), Channel::ALL.len());
        assert_eq!(channels[0]["channel"], "Heart Rate");
        assert_eq!(channels[0]["readings"].as_array().unwrap().len(), 10);
        assert_eq!(channels[0]["readings"][0]["tick"], 2);
        assert_eq!(channels[0]["readings"][0]["channel"], "Heart Rate");
    }

    #[test]
    fn test_write_json_round_trips() {
        let s = session();
        let dir = tempdir().unwrap();
        let path = dir.path().join("vitals.json");

        write_json(&s, &path).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, to_json(&s));

        let snapshot = s.snapshot(Channel::HeartRate).unwrap();
        let readings = parsed["channels"][0]["readings"].as_array().unwrap();
        for ((reading, _), exported) in snapshot.iter().zip(readings) {
            assert_eq!(exported["value"].as_f64(), Some(reading.value));
        }
    }

    #[test]
    fn test_write_csv() {
        let s = session();
        let dir = tempdir().unwrap();
        let path = dir.path().join("vitals.csv");

        write_csv(&s, &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec!["tick", "channel", "value", "condition", "severity", "anomaly"]
        );
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 10 * Channel::ALL.len());
        assert_eq!(&records[0][0], "2");
        assert_eq!(&records[records.len() - 1][0], "11");
    }

    fn anomalous_session() -> MonitoringSession {
        let config = GeneratorConfig {
            anomaly_rate: 0.1,
            ..GeneratorConfig::default()
        };
        let mut s = MonitoringSession::clinical(config, Some(11), 100).unwrap();
        for _ in 0..100 {
            s.tick().unwrap();
        }
        s
    }

    #[test]
    fn test_json_labels_anomalous_readings() {
        let s = anomalous_session();
        let doc = to_json(&s);

        let mut labelled = 0;
        for (channel, exported) in s.channels().zip(doc["channels"].as_array().unwrap()) {
            let snapshot = s.snapshot(channel).unwrap();
            let readings = exported["readings"].as_array().unwrap();
            assert_eq!(readings.len(), snapshot.len());
            for ((reading, _), exported) in snapshot.iter().zip(readings) {
                match reading.anomaly {
                    Some(kind) => {
                        assert_eq!(exported["anomaly"], kind.name());
                        labelled += 1;
                    }
                    None => assert!(exported["anomaly"].is_null()),
                }
            }
        }
        assert!(labelled > 0);
    }

    #[test]
    fn test_csv_anomaly_column() {
        let s = anomalous_session();
        let dir = tempdir().unwrap();
        let path = dir.path().join("vitals.csv");

        write_csv(&s, &path).unwrap();

        let expected: usize = s
            .channels()
            .map(|c| {
                s.snapshot(c)
                    .unwrap()
                    .iter()
                    .filter(|(r, _)| r.anomaly.is_some())
                    .count()
            })
            .sum();
        assert!(expected > 0);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let labels: Vec<String> = reader
            .records()
            .map(|r| r.unwrap()[5].to_string())
            .filter(|label| !label.is_empty())
            .collect();
        assert_eq!(labels.len(), expected);
        let names: Vec<&str> = [
            EpisodeKind::Tachycardia,
            EpisodeKind::Bradycardia,
            EpisodeKind::Desaturation,
            EpisodeKind::Fever,
            EpisodeKind::HypertensiveSurge,
            EpisodeKind::HypotensiveDrop,
        ]
        .iter()
        .map(|k| k.name())
        .collect();
        assert!(labels.iter().all(|label| names.contains(&label.as_str())));
    }
}
