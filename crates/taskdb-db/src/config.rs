use serde::{Deserialize, Serialize};

use crate::Result;

pub const DEFAULT_DATABASE: &str = "tasks_db";
pub const DEFAULT_COLLECTION: &str = "tasks";
pub const DEFAULT_APP_NAME: &str = "taskdb";

/// Where the tasks collection lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbConfig {
    pub uri: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

fn default_app_name() -> String {
    DEFAULT_APP_NAME.to_string()
}

impl DbConfig {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: default_database(),
            collection: default_collection(),
            app_name: default_app_name(),
        }
    }

    /// Load from `MONGODB_URI`, `MONGODB_DATABASE`, `MONGODB_COLLECTION` and
    /// `MONGODB_APP_NAME`. Only the URI is required.
    pub fn from_env() -> Result<Self> {
        Self::from_source(config::Environment::with_prefix("MONGODB"))
    }

    pub(crate) fn from_source<S>(source: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings = config::Config::builder()
            .set_default("database", DEFAULT_DATABASE)?
            .set_default("collection", DEFAULT_COLLECTION)?
            .set_default("app_name", DEFAULT_APP_NAME)?
            .add_source(source)
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
