use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::dtos::PersonPayload;
use crate::services::StoreError;

/// Store-assigned identifier of a person, rendered as 24 hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PersonId(ObjectId);

impl PersonId {
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    pub fn as_object_id(&self) -> ObjectId {
        self.0
    }
}

impl FromStr for PersonId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
            .map(Self)
            .map_err(|e| StoreError::ValidationFailed(format!("invalid person id {s:?}: {e}")))
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

/// A document of the `people` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Person {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        rename = "createdAt",
        with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime"
    )]
    pub created_at: DateTime<Utc>,
    #[serde(
        rename = "updatedAt",
        with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime"
    )]
    pub updated_at: DateTime<Utc>,
}

impl Person {
    pub fn new(id: PersonId, payload: PersonPayload, now: DateTime<Utc>) -> Self {
        Self {
            id: id.as_object_id(),
            name: payload.name,
            image: payload.image,
            title: payload.title,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn person_id(&self) -> PersonId {
        PersonId(self.id)
    }

    /// Overwrites the fields present in `payload` and bumps `updated_at`.
    pub fn apply(&mut self, payload: PersonPayload, now: DateTime<Utc>) {
        if let Some(name) = payload.name {
            self.name = Some(name);
        }
        if let Some(image) = payload.image {
            self.image = Some(image);
        }
        if let Some(title) = payload.title {
            self.title = Some(title);
        }
        self.updated_at = now;
    }
}

/// Current time at the millisecond precision BSON datetimes keep.
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_ids() {
        let id: PersonId = "65a1b2c3d4e5f60718293a4b".parse().unwrap();
        assert_eq!(id.to_string(), "65a1b2c3d4e5f60718293a4b");
    }

    #[test]
    fn rejects_malformed_ids() {
        let err = "not-an-id".parse::<PersonId>().unwrap_err();
        assert!(matches!(err, StoreError::ValidationFailed(_)));
    }

    #[test]
    fn apply_only_touches_provided_fields() {
        let created = now_millis();
        let mut person = Person::new(
            PersonId::generate(),
            PersonPayload {
                name: Some("Ada".into()),
                image: Some("/ada.png".into()),
                title: Some("Engineer".into()),
            },
            created,
        );

        let later = created + chrono::Duration::seconds(1);
        person.apply(
            PersonPayload {
                title: Some("Lead".into()),
                ..Default::default()
            },
            later,
        );

        assert_eq!(person.name.as_deref(), Some("Ada"));
        assert_eq!(person.image.as_deref(), Some("/ada.png"));
        assert_eq!(person.title.as_deref(), Some("Lead"));
        assert_eq!(person.created_at, created);
        assert_eq!(person.updated_at, later);
    }

    #[test]
    fn absent_fields_are_not_written_to_bson() {
        let person = Person::new(PersonId::generate(), PersonPayload::default(), now_millis());
        let doc = mongodb::bson::to_document(&person).unwrap();

        assert!(doc.contains_key("_id"));
        assert!(doc.contains_key("createdAt"));
        assert!(!doc.contains_key("name"));
        assert!(!doc.contains_key("title"));
    }
}
