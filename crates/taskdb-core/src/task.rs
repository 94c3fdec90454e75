use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Status labels that put a task in the pending partition.
pub const PENDING_STATUSES: [&str; 2] = ["pending", "pendiente"];

/// Keys callers may not write; the id belongs to the store.
pub const RESERVED_KEYS: [&str; 2] = ["id", "_id"];

/// Document key of the creation timestamp.
pub const CREATED_AT_KEY: &str = "createdAt";

/// Keys held in typed slots; they never live in `extra` of a valid input.
pub const CORE_KEYS: [&str; 3] = ["title", "status", CREATED_AT_KEY];

pub fn is_pending_status(status: &str) -> bool {
    let status = status.to_lowercase();
    PENDING_STATUSES.iter().any(|label| status == *label)
}

/// Store-assigned task identifier (a 12-byte ObjectId, 24 hex chars on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(ObjectId);

impl TaskId {
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    pub fn parse(raw: &str) -> Result<Self> {
        ObjectId::parse_str(raw)
            .map(Self)
            .map_err(|_| Error::InvalidIdentifier(raw.to_string()))
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ObjectId> for TaskId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl FromStr for TaskId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl Serialize for TaskId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_hex())
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A stored task: typed core fields plus whatever else the caller wrote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: String,
    /// Absent only on documents written by something other than this crate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    pub fn from_fields(id: TaskId, fields: TaskFields) -> Self {
        Self {
            id,
            title: fields.title.unwrap_or_default(),
            status: fields.status.unwrap_or_default(),
            created_at: fields.created_at,
            extra: fields.extra,
        }
    }

    pub fn is_pending(&self) -> bool {
        is_pending_status(&self.status)
    }

    /// Merge-patch: overwrite only the fields present in `patch`.
    pub fn apply(&mut self, patch: TaskFields) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(created_at) = patch.created_at {
            self.created_at = Some(created_at);
        }
        self.extra.extend(patch.extra);
    }
}

/// Caller-supplied fields for create (full set) and update (partial set).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TaskFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object, routing each key through [`with_field`].
    ///
    /// [`with_field`]: TaskFields::with_field
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(map
                .into_iter()
                .fold(Self::new(), |fields, (key, value)| fields.with_field(key, value))),
            other => Err(Error::InvalidField(format!(
                "expected a JSON object, got {}",
                other
            ))),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Set a field by name. Core keys are routed to their typed slot when
    /// the value has the right shape (text, or RFC 3339 text for
    /// `createdAt`); otherwise the value lands in `extra` and
    /// [`check_core_keys`] reports it.
    ///
    /// [`check_core_keys`]: TaskFields::check_core_keys
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        match value {
            Value::String(title) if key == "title" => self.title = Some(title),
            Value::String(status) if key == "status" => self.status = Some(status),
            Value::String(raw) if key == CREATED_AT_KEY => match parse_timestamp(&raw) {
                Some(created_at) => self.created_at = Some(created_at),
                None => {
                    self.extra.insert(key, Value::String(raw));
                }
            },
            value => {
                self.extra.insert(key, value);
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.status.is_none()
            && self.created_at.is_none()
            && self.extra.is_empty()
    }

    /// Drop keys callers may not write. Returns the names that were removed.
    pub fn strip_reserved(&mut self) -> Vec<String> {
        RESERVED_KEYS
            .iter()
            .filter_map(|key| self.extra.remove(*key).map(|_| key.to_string()))
            .collect()
    }

    /// Forget any caller-supplied creation time, typed or not.
    pub fn clear_created_at(&mut self) {
        self.created_at = None;
        self.extra.remove(CREATED_AT_KEY);
    }

    /// Fail when a core key carries a value of the wrong type.
    pub fn check_core_keys(&self) -> Result<()> {
        match CORE_KEYS.iter().find(|key| self.extra.contains_key(**key)) {
            Some(&CREATED_AT_KEY) => Err(Error::InvalidField(format!(
                "`{}` must be an RFC 3339 timestamp",
                CREATED_AT_KEY
            ))),
            Some(key) => Err(Error::InvalidField(format!("`{}` must be a string", key))),
            None => Ok(()),
        }
    }
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
