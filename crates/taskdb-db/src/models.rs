use bson::{doc, Bson, Document};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use taskdb_core::task::{parse_timestamp, CORE_KEYS, CREATED_AT_KEY};
use taskdb_core::{Task, TaskFields, TaskFilter, TaskId};

use crate::{Error, Result};

const ID_KEY: &str = "_id";
const TITLE_KEY: &str = "title";
const STATUS_KEY: &str = "status";

/// Query document for a listing filter.
pub fn filter_to_query(filter: &TaskFilter) -> Document {
    let mut query = Document::new();

    if let Some(pattern) = filter.status_pattern() {
        query.insert(STATUS_KEY, doc! { "$regex": pattern, "$options": "i" });
    }

    if let Some(pattern) = filter.title_pattern() {
        query.insert(TITLE_KEY, doc! { "$regex": pattern, "$options": "i" });
    }

    query
}

pub fn id_query(id: &TaskId) -> Document {
    doc! { "_id": id.object_id() }
}

/// Document holding exactly the fields present in `fields`. Extension keys
/// may not shadow the typed ones.
pub fn fields_to_document(fields: &TaskFields) -> Result<Document> {
    if let Some(key) = CORE_KEYS.iter().find(|key| fields.extra.contains_key(**key)) {
        return Err(Error::InvalidField(format!(
            "`{}` given as an extension field",
            key
        )));
    }

    let mut document = Document::new();

    if let Some(title) = &fields.title {
        document.insert(TITLE_KEY, title.as_str());
    }
    if let Some(status) = &fields.status {
        document.insert(STATUS_KEY, status.as_str());
    }
    if let Some(created_at) = fields.created_at {
        document.insert(CREATED_AT_KEY, bson::DateTime::from_chrono(created_at));
    }

    for (key, value) in &fields.extra {
        let value = Bson::try_from(value.clone())
            .map_err(|e| Error::InvalidField(format!("`{}`: {}", key, e)))?;
        document.insert(key.as_str(), value);
    }

    Ok(document)
}

pub fn document_to_task(mut document: Document) -> Result<Task> {
    let id = match document.remove(ID_KEY) {
        Some(Bson::ObjectId(oid)) => TaskId::from(oid),
        Some(other) => {
            return Err(Error::Decode(format!(
                "`_id` is not an ObjectId: {}",
                other
            )))
        }
        None => return Err(Error::Decode("document has no `_id`".to_string())),
    };

    let title = take_string(&mut document, TITLE_KEY);
    let status = take_string(&mut document, STATUS_KEY);
    let created_at = take_created_at(&mut document);

    let extra: Map<String, Value> = document
        .into_iter()
        .map(|(key, value)| (key, value.into_relaxed_extjson()))
        .collect();

    Ok(Task {
        id,
        title,
        status,
        created_at,
        extra,
    })
}

/// Documents written by other clients may hold any type here; non-strings
/// are rendered as their relaxed extended JSON text.
fn take_string(document: &mut Document, key: &str) -> String {
    match document.remove(key) {
        Some(Bson::String(s)) => s,
        Some(Bson::Null) | None => String::new(),
        Some(other) => {
            tracing::warn!("Stored `{}` is not a string, converting: {}", key, other);
            other.into_relaxed_extjson().to_string()
        }
    }
}

/// A value that is not a date stays behind in the document and surfaces as an
/// extension field.
fn take_created_at(document: &mut Document) -> Option<DateTime<Utc>> {
    let created_at = match document.get(CREATED_AT_KEY)? {
        Bson::DateTime(dt) => Some(dt.to_chrono()),
        Bson::String(raw) => Some(parse_timestamp(raw)?),
        Bson::Null => None,
        _ => return None,
    };

    document.remove(CREATED_AT_KEY);
    created_at
}
