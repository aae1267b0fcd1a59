//! Export formats: the session document, the status-tagged raw export,
//! the structured entry list, and CSV.
//!
//! Working time is always recomputed from the records; the value a payload
//! arrived with is never echoed back.  Credentials are never written.

use serde::Serialize;

use tessera_chain::canonical::format_f64;
use tessera_contracts::{
    entry::LogEntry,
    error::{TesseraError, TesseraResult},
    session::{ChainStatus, SessionPayload},
};

use crate::analyzer::SessionAnalyzer;

/// Header row of the CSV export.
pub const CSV_HEADER: &str = "timestamp,actionType,name,type,duration,vertex,face,object";

/// The full session document: id, creation time, period, working time,
/// wire records, and scene totals.
pub fn session_document(analyzer: &SessionAnalyzer<'_>) -> SessionPayload {
    let log = analyzer.log();
    SessionPayload {
        id: Some(log.id().to_string()),
        timestamp: Some(log.created_at().to_string()),
        data: log.to_wire(),
        status: None,
        total_working_time: analyzer.total_working_time(),
        period: log.period().clone(),
        stats: log.scene_totals(),
        secret_key: None,
        student_id: None,
    }
}

/// The raw export with its chain status.  Anything but a verified chain is
/// labelled `tampered`.
pub fn status_payload(analyzer: &SessionAnalyzer<'_>) -> SessionPayload {
    let log = analyzer.log();
    let status = if analyzer.integrity().is_valid() {
        ChainStatus::Valid
    } else {
        ChainStatus::Tampered
    };
    SessionPayload {
        id: None,
        timestamp: None,
        data: log.to_wire(),
        status: Some(status),
        total_working_time: analyzer.total_working_time(),
        period: log.period().clone(),
        stats: log.scene_totals(),
        secret_key: None,
        student_id: None,
    }
}

/// Every record in structured form, genesis first.
pub fn structured_entries(analyzer: &SessionAnalyzer<'_>) -> Vec<LogEntry> {
    analyzer.log().to_structured()
}

/// CSV of every record, genesis first, with derived durations.
///
/// Fields containing a comma, a quote, or a line break are quoted.  Rows are
/// joined by `\n` with no trailing newline.
pub fn to_csv(analyzer: &SessionAnalyzer<'_>) -> String {
    let log = analyzer.log();
    let mut out = String::from(CSV_HEADER);
    out.push('\n');

    let rows: Vec<String> = log
        .records()
        .zip(analyzer.record_durations())
        .map(|(record, duration)| {
            [
                record.timestamp.to_iso8601(),
                csv_field(&record.action_type),
                csv_field(&record.object_name),
                csv_field(&record.object_type),
                format_f64(duration),
                record.scene_stats.vertex.to_string(),
                record.scene_stats.face.to_string(),
                record.scene_stats.object.to_string(),
            ]
            .join(",")
        })
        .collect();

    out.push_str(&rows.join("\n"));
    out
}

/// Pretty-printed JSON of any export value.
pub fn to_json<T: Serialize>(value: &T) -> TesseraResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| TesseraError::ExportFailed {
        reason: format!("failed to serialize export: {e}"),
    })
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_are_not_quoted() {
        assert_eq!(csv_field("Added Mesh"), "Added Mesh");
    }

    #[test]
    fn special_fields_are_quoted() {
        assert_eq!(csv_field("Cube, large"), "\"Cube, large\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }
}
