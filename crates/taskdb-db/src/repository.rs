use async_trait::async_trait;
use bson::{doc, Document};
use futures_util::TryStreamExt;
use mongodb::options::{ClientOptions, ReturnDocument, ServerApi, ServerApiVersion};
use mongodb::{Client, Collection};
use taskdb_core::{Task, TaskFields, TaskFilter, TaskId, TaskStore};

use crate::config::DbConfig;
use crate::models::{document_to_task, fields_to_document, filter_to_query, id_query};
use crate::{Error, Result};

/// Connected MongoDB client, held for the life of the process.
#[derive(Debug, Clone)]
pub struct Database {
    client: Client,
    config: DbConfig,
}

impl Database {
    /// Connect and verify the server answers a ping.
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        let database = Self::open(config).await.map_err(|e| {
            tracing::error!("Error connecting to the database: {}", e);
            Error::Connection(e.to_string())
        })?;

        tracing::info!(
            "Connected to MongoDB (database: {}, collection: {})",
            config.database,
            config.collection
        );

        Ok(database)
    }

    async fn open(config: &DbConfig) -> Result<Self> {
        let mut options = ClientOptions::parse(&config.uri).await?;
        options.app_name = Some(config.app_name.clone());
        options.server_api = Some(
            ServerApi::builder()
                .version(ServerApiVersion::V1)
                .strict(true)
                .deprecation_errors(true)
                .build(),
        );

        let database = Self {
            client: Client::with_options(options)?,
            config: config.clone(),
        };
        database.ping().await?;

        Ok(database)
    }

    pub async fn ping(&self) -> Result<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        Ok(())
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// Store over the configured tasks collection.
    pub fn tasks(&self) -> MongoTaskStore {
        let collection = self
            .client
            .database(&self.config.database)
            .collection::<Document>(&self.config.collection);

        MongoTaskStore { collection }
    }
}

/// `TaskStore` backed by one MongoDB collection.
#[derive(Debug, Clone)]
pub struct MongoTaskStore {
    collection: Collection<Document>,
}

impl MongoTaskStore {
    async fn find_documents(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let documents: Vec<Document> = self
            .collection
            .find(filter_to_query(filter))
            .await?
            .try_collect()
            .await?;

        documents.into_iter().map(document_to_task).collect()
    }

    async fn find_document(&self, id: &TaskId) -> Result<Option<Task>> {
        self.collection
            .find_one(id_query(id))
            .await?
            .map(document_to_task)
            .transpose()
    }

    /// The id is chosen here, so the written task is returned as built
    /// rather than read back.
    async fn insert_document(&self, fields: TaskFields) -> Result<Task> {
        let id = TaskId::new();
        let mut document = doc! { "_id": id.object_id() };
        document.extend(fields_to_document(&fields)?);

        self.collection.insert_one(&document).await?;

        Ok(Task::from_fields(id, fields))
    }

    async fn update_document(&self, id: &TaskId, patch: TaskFields) -> Result<Option<Task>> {
        let set = fields_to_document(&patch)?;

        self.collection
            .find_one_and_update(id_query(id), doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?
            .map(document_to_task)
            .transpose()
    }

    async fn delete_document(&self, id: &TaskId) -> Result<bool> {
        let result = self.collection.delete_one(id_query(id)).await?;
        Ok(result.deleted_count > 0)
    }
}

#[async_trait]
impl TaskStore for MongoTaskStore {
    async fn find(&self, filter: &TaskFilter) -> taskdb_core::Result<Vec<Task>> {
        Ok(self.find_documents(filter).await?)
    }

    async fn find_by_id(&self, id: &TaskId) -> taskdb_core::Result<Option<Task>> {
        Ok(self.find_document(id).await?)
    }

    async fn insert(&self, fields: TaskFields) -> taskdb_core::Result<Task> {
        Ok(self.insert_document(fields).await?)
    }

    async fn update(&self, id: &TaskId, patch: TaskFields) -> taskdb_core::Result<Option<Task>> {
        Ok(self.update_document(id, patch).await?)
    }

    async fn delete(&self, id: &TaskId) -> taskdb_core::Result<bool> {
        Ok(self.delete_document(id).await?)
    }
}
