//! Time entries - the nodes of the forest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::EntryId;

/// A timed task, optionally nested under a parent entry.
///
/// Entries are only ever changed through [`Forest`](crate::Forest) operations;
/// values handed out by the forest are copies or shared references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Unique identifier, assigned at creation.
    pub id: EntryId,

    /// Parent entry, or `None` for a root.
    pub parent_id: Option<EntryId>,

    /// User-supplied label, never blank.
    pub title: String,

    /// Wall-clock start in epoch milliseconds.
    pub started_at_epoch_ms: i64,

    /// Start instant, mirroring `started_at_epoch_ms`.
    #[serde(rename = "startedAtISO", with = "iso_millis")]
    pub started_at: DateTime<Utc>,

    /// Stop instant; absent while running.
    #[serde(
        rename = "endedAtISO",
        default,
        skip_serializing_if = "Option::is_none",
        with = "iso_millis_opt"
    )]
    pub ended_at: Option<DateTime<Utc>>,

    /// Elapsed running time in milliseconds. Frozen once stopped.
    pub duration_ms: i64,

    /// True between start and stop.
    pub running: bool,
}

impl Entry {
    pub(crate) fn start(
        id: EntryId,
        parent_id: Option<EntryId>,
        title: String,
        now: DateTime<Utc>,
    ) -> Self {
        let (started_at_epoch_ms, started_at) = truncate_to_millis(now);
        Self {
            id,
            parent_id,
            title,
            started_at_epoch_ms,
            started_at,
            ended_at: None,
            duration_ms: 0,
            running: true,
        }
    }

    /// Returns true if this entry has no parent.
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Milliseconds elapsed between the start and `now`, never negative.
    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> i64 {
        (now.timestamp_millis() - self.started_at_epoch_ms).max(0)
    }

    /// Stops the entry at `now`, or at its start if `now` is earlier.
    pub(crate) fn finish(&mut self, now: DateTime<Utc>) {
        let (_, ended_at) = truncate_to_millis(now);
        let ended_at = ended_at.max(self.started_at);
        self.duration_ms = self.elapsed_ms(ended_at);
        self.ended_at = Some(ended_at);
        self.running = false;
    }
}

/// Drops sub-millisecond precision so the ISO and epoch fields always agree.
fn truncate_to_millis(now: DateTime<Utc>) -> (i64, DateTime<Utc>) {
    let millis = now.timestamp_millis();
    (millis, DateTime::from_timestamp_millis(millis).unwrap_or(now))
}

/// RFC 3339 timestamps with millisecond precision, e.g. `2026-01-01T09:00:00.000Z`.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

mod iso_millis_opt {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => super::iso_millis::serialize(dt, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|raw| {
            DateTime::parse_from_rfc3339(&raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}
