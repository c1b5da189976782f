#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use async_trait::async_trait;
use http_body_util::BodyExt;
use people_service::config::ShowRouteMode;
use people_service::dtos::PersonPayload;
use people_service::models::{Person, PersonId};
use people_service::services::{InMemoryPersonStore, MongoPersonStore, PersonStore, StoreError};
use people_service::{build_router, AppState};
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;

/// Router over a fresh in-memory store.
pub fn memory_app(show_route: ShowRouteMode) -> Router {
    build_router(AppState {
        store: Arc::new(InMemoryPersonStore::new()),
        show_route,
    })
}

/// Store whose backend is never reachable.
pub struct UnavailableStore;

fn unavailable() -> StoreError {
    StoreError::StoreUnavailable(anyhow::anyhow!("server selection timeout"))
}

#[async_trait]
impl PersonStore for UnavailableStore {
    async fn list_all(&self) -> Result<Vec<Person>, StoreError> {
        Err(unavailable())
    }

    async fn create(&self, _payload: PersonPayload) -> Result<Person, StoreError> {
        Err(unavailable())
    }

    async fn find_by_id(&self, _id: PersonId) -> Result<Option<Person>, StoreError> {
        Err(unavailable())
    }

    async fn update_by_id(
        &self,
        _id: PersonId,
        _payload: PersonPayload,
    ) -> Result<Option<Person>, StoreError> {
        Err(unavailable())
    }

    async fn delete_by_id(&self, _id: PersonId) -> Result<Option<Person>, StoreError> {
        Err(unavailable())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Err(unavailable())
    }
}

/// Router whose store fails every call as unavailable.
pub fn unavailable_app(show_route: ShowRouteMode) -> Router {
    build_router(AppState {
        store: Arc::new(UnavailableStore),
        show_route,
    })
}

pub struct Reply {
    pub status: StatusCode,
    pub text: String,
}

impl Reply {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text)
            .unwrap_or_else(|e| panic!("Invalid JSON body {:?}: {}", self.text, e))
    }
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Reply {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    send_request(app, request).await
}

pub async fn send_request(app: &Router, request: Request<Body>) -> Reply {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request");

    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();

    Reply {
        status,
        text: String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8"),
    }
}

/// Router over a throwaway MongoDB database. Drop it with `MongoTestDb::cleanup`.
pub struct MongoTestDb {
    pub store: MongoPersonStore,
}

impl MongoTestDb {
    pub async fn connect() -> Self {
        let uri = std::env::var("TEST_MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let client = mongodb::Client::with_uri_str(&uri)
            .await
            .expect("Failed to connect to MongoDB");
        let db = client.database(&format!("people_test_{}", uuid::Uuid::new_v4().simple()));

        Self {
            store: MongoPersonStore::new(client, db),
        }
    }

    pub fn app(&self, show_route: ShowRouteMode) -> Router {
        build_router(AppState {
            store: Arc::new(self.store.clone()),
            show_route,
        })
    }

    pub async fn cleanup(&self) {
        self.store
            .database()
            .drop(None)
            .await
            .expect("Failed to drop test database");
    }
}
