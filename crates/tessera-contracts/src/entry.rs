//! Log entry types.
//!
//! Two shapes describe the same record:
//!
//! - `RawLogEntry` is the compact wire form written by the capture add-on
//!   (`t`, `a`, `o`, `ot`, `d`, `dt`, `s`, `ph`).  It is the form that gets
//!   hashed, so it must survive conversion bit for bit.
//! - `LogEntry` is the structured form every query works on.
//!
//! `LogEntry::from(raw)` and `LogEntry::to_wire()` are pure and total, and
//! `raw -> structured -> raw` reproduces the original wire entry exactly.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Action label of the synthetic marker written when a timer session starts.
pub const SESSION_START_ACTION: &str = "Session Started";

/// Object name carried by session start/stop markers.
pub const SESSION_OBJECT_NAME: &str = "__SESSION__";

/// Object type of records that are produced by the add-on itself.
pub const SYSTEM_OBJECT_TYPE: &str = "SYSTEM";

/// Action label written when a new mesh object is created.
pub const MESH_ADDITION_ACTION: &str = "Added Mesh";

/// Object type of mesh objects.
pub const MESH_OBJECT_TYPE: &str = "MESH";

/// Action label of the genesis record.
pub const GENESIS_ACTION: &str = "Genesis Log";

/// Object name of the genesis record.
pub const GENESIS_OBJECT_NAME: &str = "__SYSTEM__";

// ── Timestamp ─────────────────────────────────────────────────────────────────

/// A point in time, stored as the unix seconds value found on the wire.
///
/// The add-on records `round(time.time(), 3)`, so the wire value is a float
/// with millisecond resolution.  Keeping the float itself (instead of a parsed
/// date) is what makes the wire round-trip exact and the hash reproducible.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Timestamp(f64);

impl Timestamp {
    pub fn from_unix_seconds(seconds: f64) -> Self {
        Self(seconds)
    }

    pub fn as_unix_seconds(self) -> f64 {
        self.0
    }

    /// Convert to a UTC date-time at millisecond resolution.
    ///
    /// Returns `None` for non-finite or out-of-range values.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        if !self.0.is_finite() {
            return None;
        }
        let millis = (self.0 * 1000.0).round();
        if millis.abs() > i64::MAX as f64 {
            return None;
        }
        DateTime::from_timestamp_millis(millis as i64)
    }

    /// Build a timestamp from a date-time, truncated to milliseconds.
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.timestamp_millis() as f64 / 1000.0)
    }

    /// Render as ISO-8601 with millisecond precision and a `Z` suffix,
    /// e.g. `2024-03-01T09:30:00.250Z`.  Empty for unrepresentable values.
    pub fn to_iso8601(self) -> String {
        self.to_datetime()
            .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_default()
    }

    /// Parse an RFC 3339 / ISO-8601 string with an explicit offset.
    pub fn parse_iso8601(s: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|at| Self::from_datetime(at.with_timezone(&Utc)))
    }

    /// Milliseconds since the epoch, or `None` if unrepresentable.
    pub fn millis(self) -> Option<i64> {
        self.to_datetime().map(|at| at.timestamp_millis())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso8601())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Seconds(f64),
            Iso(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Seconds(seconds) => Ok(Self(seconds)),
            Repr::Iso(s) => Self::parse_iso8601(&s)
                .ok_or_else(|| de::Error::custom(format!("invalid ISO-8601 timestamp '{s}'"))),
        }
    }
}

/// Deserialize `null` (or a missing field, with `#[serde(default)]`) as the
/// type's default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Wire form ─────────────────────────────────────────────────────────────────

/// Scene complexity snapshot in wire form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSceneStats {
    /// Vertex count.
    #[serde(default, deserialize_with = "null_as_default")]
    pub v: u64,
    /// Face count.
    #[serde(default, deserialize_with = "null_as_default")]
    pub f: u64,
    /// Object count.
    #[serde(default, deserialize_with = "null_as_default")]
    pub o: u64,
}

/// One log record exactly as the capture add-on writes it.
///
/// These fields are the whole hashed schema.  Unknown top-level keys are
/// ignored on parse and take no part in the chain hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLogEntry {
    /// Unix seconds.
    pub t: f64,
    /// Action type.
    pub a: String,
    /// Object name.
    pub o: String,
    /// Object type.
    pub ot: String,
    /// Free-form details.
    #[serde(default, deserialize_with = "null_as_default")]
    pub d: Map<String, Value>,
    /// Seconds since the previous record, as recorded.
    #[serde(default, deserialize_with = "null_as_default")]
    pub dt: f64,
    /// Scene snapshot.
    #[serde(default, deserialize_with = "null_as_default")]
    pub s: RawSceneStats,
    /// Canonical hash of the previous record, or the genesis hash.
    #[serde(default, deserialize_with = "null_as_default")]
    pub ph: String,
}

// ── Structured form ───────────────────────────────────────────────────────────

/// Vertex, face and object counts.
///
/// Used both for per-entry snapshots and for the session-wide totals.
/// Accepts the compact `v`/`f`/`o` keys on input as well.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneStats {
    #[serde(default, alias = "v", deserialize_with = "null_as_default")]
    pub vertex: u64,
    #[serde(default, alias = "f", deserialize_with = "null_as_default")]
    pub face: u64,
    #[serde(default, alias = "o", deserialize_with = "null_as_default")]
    pub object: u64,
}

impl From<RawSceneStats> for SceneStats {
    fn from(raw: RawSceneStats) -> Self {
        Self {
            vertex: raw.v,
            face: raw.f,
            object: raw.o,
        }
    }
}

impl From<SceneStats> for RawSceneStats {
    fn from(stats: SceneStats) -> Self {
        Self {
            v: stats.vertex,
            f: stats.face,
            o: stats.object,
        }
    }
}

/// One recorded user action in structured form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub timestamp: Timestamp,

    /// Free-form action label, e.g. `"Added Mesh"`.
    pub action_type: String,

    #[serde(rename = "name")]
    pub object_name: String,

    #[serde(rename = "type")]
    pub object_type: String,

    /// Opaque payload.  Included in the hash, otherwise uninterpreted.
    #[serde(default, deserialize_with = "null_as_default")]
    pub details: Map<String, Value>,

    /// Seconds since the previous record as recorded by the add-on.
    ///
    /// Kept verbatim for hashing.  Analysis derives its own durations from
    /// the timestamps instead of trusting this value.
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: f64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub scene_stats: SceneStats,

    /// Pointer to the previous record's canonical hash (wire field `ph`).
    #[serde(rename = "hash", default, deserialize_with = "null_as_default")]
    pub chain_hash: String,
}

impl LogEntry {
    /// Convert back to the wire form.  Exact inverse of `From<RawLogEntry>`.
    pub fn to_wire(&self) -> RawLogEntry {
        RawLogEntry {
            t: self.timestamp.as_unix_seconds(),
            a: self.action_type.clone(),
            o: self.object_name.clone(),
            ot: self.object_type.clone(),
            d: self.details.clone(),
            dt: self.duration,
            s: self.scene_stats.into(),
            ph: self.chain_hash.clone(),
        }
    }

    /// True for the synthetic marker written when a timer session starts.
    pub fn is_session_start(&self) -> bool {
        self.action_type == SESSION_START_ACTION
            && self.object_name == SESSION_OBJECT_NAME
            && self.object_type == SYSTEM_OBJECT_TYPE
    }

    /// True when this entry records the creation of a mesh object.
    pub fn is_mesh_addition(&self) -> bool {
        self.action_type == MESH_ADDITION_ACTION && self.object_type == MESH_OBJECT_TYPE
    }
}

impl From<RawLogEntry> for LogEntry {
    fn from(raw: RawLogEntry) -> Self {
        Self {
            timestamp: Timestamp::from_unix_seconds(raw.t),
            action_type: raw.a,
            object_name: raw.o,
            object_type: raw.ot,
            details: raw.d,
            duration: raw.dt,
            scene_stats: raw.s.into(),
            chain_hash: raw.ph,
        }
    }
}

impl From<&LogEntry> for RawLogEntry {
    fn from(entry: &LogEntry) -> Self {
        entry.to_wire()
    }
}
