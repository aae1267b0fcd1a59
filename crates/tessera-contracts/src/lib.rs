//! # tessera-contracts
//!
//! Shared types for the Tessera session-log integrity engine.
//!
//! All crates in the workspace import from here.  No business logic lives in
//! this crate: only data definitions, the pure wire/structured conversions,
//! and error types.

pub mod credentials;
pub mod entry;
pub mod error;
pub mod integrity;
pub mod report;
pub mod session;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use credentials::Credentials;
    use entry::{LogEntry, RawLogEntry, SceneStats, Timestamp};
    use error::TesseraError;
    use integrity::IntegrityStatus;
    use report::HealthSeverity;
    use session::{ChainStatus, SessionId, SessionPayload};

    fn raw_entry() -> RawLogEntry {
        serde_json::from_value(json!({
            "t": 1_709_285_400.25,
            "a": "Added Mesh",
            "o": "Cube",
            "ot": "MESH",
            "d": { "primitive": "cube", "size": 2 },
            "dt": 12.5,
            "s": { "v": 8, "f": 6, "o": 1 },
            "ph": "ab".repeat(32)
        }))
        .unwrap()
    }

    // ── Wire / structured conversion ─────────────────────────────────────────

    #[test]
    fn wire_to_structured_maps_every_field() {
        let entry = LogEntry::from(raw_entry());

        assert_eq!(entry.action_type, "Added Mesh");
        assert_eq!(entry.object_name, "Cube");
        assert_eq!(entry.object_type, "MESH");
        assert_eq!(entry.details["primitive"], json!("cube"));
        assert_eq!(entry.duration, 12.5);
        assert_eq!(
            entry.scene_stats,
            SceneStats { vertex: 8, face: 6, object: 1 }
        );
        assert_eq!(entry.chain_hash, "ab".repeat(32));
        assert!(entry.is_mesh_addition());
        assert!(!entry.is_session_start());
    }

    #[test]
    fn structured_to_wire_is_exact_inverse() {
        let raw = raw_entry();
        let structured = LogEntry::from(raw.clone());
        assert_eq!(structured.to_wire(), raw);

        let again = LogEntry::from(structured.to_wire());
        assert_eq!(again, structured);
    }

    #[test]
    fn missing_optional_wire_fields_default_to_empty() {
        let raw: RawLogEntry = serde_json::from_value(json!({
            "t": 1_709_285_400.0,
            "a": "Session Started",
            "o": "__SESSION__",
            "ot": "SYSTEM",
            "d": null,
            "s": { "v": 3 }
        }))
        .unwrap();

        assert!(raw.d.is_empty());
        assert_eq!(raw.dt, 0.0);
        assert_eq!(raw.s.v, 3);
        assert_eq!(raw.s.f, 0);
        assert_eq!(raw.ph, "");
        assert!(LogEntry::from(raw).is_session_start());
    }

    // ── Timestamp ────────────────────────────────────────────────────────────

    #[test]
    fn timestamp_iso_round_trip_is_stable_to_the_second() {
        let ts = Timestamp::from_unix_seconds(1_709_285_400.0);
        let iso = ts.to_iso8601();
        assert_eq!(iso, "2024-03-01T09:30:00.000Z");

        let back = Timestamp::parse_iso8601(&iso).unwrap();
        assert_eq!(back, ts);
        assert_eq!(back.to_iso8601(), iso);
    }

    #[test]
    fn timestamp_iso_round_trip_keeps_milliseconds() {
        let ts = Timestamp::from_unix_seconds(1_709_285_400.123);
        let back = Timestamp::parse_iso8601(&ts.to_iso8601()).unwrap();
        assert_eq!(back.as_unix_seconds(), 1_709_285_400.123);
    }

    #[test]
    fn structured_json_round_trips_through_iso_timestamps() {
        let structured = LogEntry::from(raw_entry());
        let json = serde_json::to_value(&structured).unwrap();
        assert_eq!(json["timestamp"], json!("2024-03-01T09:30:00.250Z"));
        assert_eq!(json["name"], json!("Cube"));
        assert_eq!(json["sceneStats"]["vertex"], json!(8));

        let decoded: LogEntry = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, structured);
    }

    #[test]
    fn timestamp_rejects_garbage_strings() {
        let result: Result<Timestamp, _> = serde_json::from_value(json!("yesterday"));
        assert!(result.is_err());
        assert!(Timestamp::from_unix_seconds(f64::NAN).to_datetime().is_none());
    }

    // ── Session payload ──────────────────────────────────────────────────────

    #[test]
    fn payload_accepts_both_stats_spellings() {
        let compact: SessionPayload = serde_json::from_value(json!({
            "data": [],
            "stats": { "v": 120, "f": 80, "o": 4 }
        }))
        .unwrap();
        let long: SessionPayload = serde_json::from_value(json!({
            "data": [],
            "stats": { "vertex": 120, "face": 80, "object": 4 }
        }))
        .unwrap();

        assert_eq!(compact.stats, long.stats);
        assert_eq!(compact.stats.vertex, 120);
    }

    #[test]
    fn payload_never_exports_credentials() {
        let payload = SessionPayload {
            id: Some("s-1".to_string()),
            status: Some(ChainStatus::Tampered),
            secret_key: Some("hunter2".to_string()),
            student_id: Some("stu-9".to_string()),
            ..SessionPayload::default()
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("secret_key").is_none());
        assert!(json.get("student_id").is_none());
        assert_eq!(json["status"], json!("tampered"));
    }

    #[test]
    fn session_id_new_produces_unique_values() {
        let ids: std::collections::HashSet<String> =
            (0..50).map(|_| SessionId::new().0).collect();
        assert_eq!(ids.len(), 50);
        assert!(ids.iter().all(|id| id.starts_with("session-")));
    }

    // ── Credentials / integrity / severity ───────────────────────────────────

    #[test]
    fn credentials_require_both_parts() {
        assert!(Credentials::from_parts(Some("k".into()), Some("s".into())).is_some());
        assert!(Credentials::from_parts(Some("k".into()), None).is_none());
        assert!(Credentials::from_parts(Some(String::new()), Some("s".into())).is_none());
    }

    #[test]
    fn credentials_debug_redacts_secret() {
        let creds = Credentials::new("top-secret", "stu-1");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("top-secret"));
        assert!(debug.contains("stu-1"));
    }

    #[test]
    fn integrity_from_verified() {
        assert_eq!(IntegrityStatus::from_verified(true), IntegrityStatus::Valid);
        assert_eq!(IntegrityStatus::from_verified(false), IntegrityStatus::Invalid);
        assert!(!IntegrityStatus::Indeterminate.is_valid());
    }

    #[test]
    fn severity_orders_healthy_below_critical() {
        assert!(HealthSeverity::Healthy < HealthSeverity::Warning);
        assert!(HealthSeverity::Warning < HealthSeverity::Critical);
        assert_eq!(
            HealthSeverity::Warning.max(HealthSeverity::Critical),
            HealthSeverity::Critical
        );
    }

    // ── Error display messages ───────────────────────────────────────────────

    #[test]
    fn error_invalid_credentials_display() {
        let err = TesseraError::InvalidCredentials {
            reason: "genesis mismatch".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("invalid credentials"));
        assert!(msg.contains("genesis mismatch"));
    }

    #[test]
    fn error_missing_salt_display() {
        let err = TesseraError::MissingSalt {
            reason: "salt is empty".to_string(),
        };
        assert!(err.to_string().contains("missing salt"));
    }
}
