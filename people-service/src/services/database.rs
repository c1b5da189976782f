use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, DateTime as BsonDateTime, Document},
    event::{
        cmap::{
            CmapEventHandler, ConnectionClosedEvent, ConnectionCreatedEvent, PoolClearedEvent,
        },
        sdam::{
            SdamEventHandler, ServerClosedEvent, ServerHeartbeatFailedEvent, ServerOpeningEvent,
        },
    },
    options::{ClientOptions, FindOneAndUpdateOptions, ReturnDocument},
    Client as MongoClient, Collection, Database,
};
use std::sync::Arc;

use crate::dtos::PersonPayload;
use crate::models::{now_millis, Person, PersonId};
use crate::services::{PersonStore, StoreError};

pub const PEOPLE_COLLECTION: &str = "people";

/// `PersonStore` backed by the `people` collection. Cloning shares the
/// driver's connection pool.
#[derive(Clone)]
pub struct MongoPersonStore {
    client: MongoClient,
    db: Database,
}

impl MongoPersonStore {
    /// Builds the client. The database named in `uri` wins over
    /// `fallback_database`. No round trip happens until the first operation.
    pub async fn connect(uri: &str, fallback_database: &str) -> Result<Self, StoreError> {
        let mut client_options = ClientOptions::parse(uri).await.map_err(|e| {
            tracing::error!("Failed to parse MongoDB connection string: {}", e);
            StoreError::from(e)
        })?;
        client_options.app_name = Some("people-service".to_string());
        log_connection_events(&mut client_options);

        let client = MongoClient::with_options(client_options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            StoreError::from(e)
        })?;
        let db = client
            .default_database()
            .unwrap_or_else(|| client.database(fallback_database));

        tracing::info!(database = %db.name(), "MongoDB client ready");
        Ok(Self { client, db })
    }

    pub fn new(client: MongoClient, db: Database) -> Self {
        Self { client, db }
    }

    pub fn people(&self) -> Collection<Person> {
        self.db.collection(PEOPLE_COLLECTION)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

/// Logs server and pooled-connection lifecycle events from the driver.
struct ConnectionEventLogger;

impl SdamEventHandler for ConnectionEventLogger {
    fn handle_server_opening_event(&self, event: ServerOpeningEvent) {
        tracing::info!(address = %event.address, "MongoDB server opened");
    }

    fn handle_server_closed_event(&self, event: ServerClosedEvent) {
        tracing::warn!(address = %event.address, "MongoDB server closed");
    }

    fn handle_server_heartbeat_failed_event(&self, event: ServerHeartbeatFailedEvent) {
        tracing::error!(
            address = %event.server_address,
            "MongoDB heartbeat failed: {}",
            event.failure
        );
    }
}

impl CmapEventHandler for ConnectionEventLogger {
    fn handle_connection_created_event(&self, event: ConnectionCreatedEvent) {
        tracing::debug!(
            address = %event.address,
            connection_id = event.connection_id,
            "MongoDB connection opened"
        );
    }

    fn handle_connection_closed_event(&self, event: ConnectionClosedEvent) {
        tracing::debug!(
            address = %event.address,
            connection_id = event.connection_id,
            reason = ?event.reason,
            "MongoDB connection closed"
        );
    }

    fn handle_pool_cleared_event(&self, event: PoolClearedEvent) {
        tracing::warn!(address = %event.address, "MongoDB connection pool cleared");
    }
}

fn log_connection_events(client_options: &mut ClientOptions) {
    let logger = Arc::new(ConnectionEventLogger);
    client_options.sdam_event_handler = Some(logger.clone());
    client_options.cmap_event_handler = Some(logger);
}

fn set_document(payload: PersonPayload, now: BsonDateTime) -> Document {
    let mut set = doc! { "updatedAt": now };
    if let Some(name) = payload.name {
        set.insert("name", name);
    }
    if let Some(image) = payload.image {
        set.insert("image", image);
    }
    if let Some(title) = payload.title {
        set.insert("title", title);
    }
    set
}

#[async_trait]
impl PersonStore for MongoPersonStore {
    async fn list_all(&self) -> Result<Vec<Person>, StoreError> {
        let cursor = self.people().find(doc! {}, None).await.map_err(|e| {
            tracing::error!("Failed to query people: {}", e);
            StoreError::from(e)
        })?;
        let people: Vec<Person> = cursor.try_collect().await.map_err(|e| {
            tracing::error!("Failed to read people cursor: {}", e);
            StoreError::from(e)
        })?;
        Ok(people)
    }

    async fn create(&self, payload: PersonPayload) -> Result<Person, StoreError> {
        let person = Person::new(PersonId::generate(), payload, now_millis());
        self.people().insert_one(&person, None).await.map_err(|e| {
            tracing::error!("Failed to insert person: {}", e);
            StoreError::from(e)
        })?;
        Ok(person)
    }

    async fn find_by_id(&self, id: PersonId) -> Result<Option<Person>, StoreError> {
        self.people()
            .find_one(doc! { "_id": id.as_object_id() }, None)
            .await
            .map_err(|e| {
                tracing::error!(person_id = %id, "Failed to find person: {}", e);
                StoreError::from(e)
            })
    }

    async fn update_by_id(
        &self,
        id: PersonId,
        payload: PersonPayload,
    ) -> Result<Option<Person>, StoreError> {
        let now = BsonDateTime::from_millis(now_millis().timestamp_millis());
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.people()
            .find_one_and_update(
                doc! { "_id": id.as_object_id() },
                doc! { "$set": set_document(payload, now) },
                options,
            )
            .await
            .map_err(|e| {
                tracing::error!(person_id = %id, "Failed to update person: {}", e);
                StoreError::from(e)
            })
    }

    async fn delete_by_id(&self, id: PersonId) -> Result<Option<Person>, StoreError> {
        self.people()
            .find_one_and_delete(doc! { "_id": id.as_object_id() }, None)
            .await
            .map_err(|e| {
                tracing::error!(person_id = %id, "Failed to delete person: {}", e);
                StoreError::from(e)
            })
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                StoreError::from(e)
            })?;
        Ok(())
    }
}
