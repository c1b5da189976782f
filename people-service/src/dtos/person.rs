use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::Person;

/// Body of create and update requests. Absent and `null` fields are left
/// untouched; unknown fields are ignored. Numbers and booleans are stored as
/// their string form.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PersonPayload {
    #[serde(default, deserialize_with = "string_like")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "string_like")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "string_like")]
    pub title: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

/// Objects and arrays have no string form and are rejected.
fn string_like<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|value| match value {
        Scalar::Text(text) => text,
        Scalar::Number(number) => number.to_string(),
        Scalar::Flag(flag) => flag.to_string(),
    }))
}

impl PersonPayload {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.image.is_none() && self.title.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersonResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Person> for PersonResponse {
    fn from(person: Person) -> Self {
        Self {
            id: person.person_id().to_string(),
            name: person.name,
            image: person.image,
            title: person.title,
            created_at: person.created_at,
            updated_at: person.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{now_millis, PersonId};
    use serde_json::json;

    #[test]
    fn payload_treats_null_as_absent_and_ignores_unknown_fields() {
        let payload: PersonPayload =
            serde_json::from_value(json!({ "name": null, "title": "Lead", "age": 40 })).unwrap();

        assert_eq!(
            payload,
            PersonPayload {
                title: Some("Lead".into()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn payload_casts_numbers_and_booleans_to_strings() {
        let payload: PersonPayload =
            serde_json::from_value(json!({ "name": 42, "image": 1.5, "title": true })).unwrap();

        assert_eq!(payload.name.as_deref(), Some("42"));
        assert_eq!(payload.image.as_deref(), Some("1.5"));
        assert_eq!(payload.title.as_deref(), Some("true"));
    }

    #[test]
    fn payload_rejects_objects_and_arrays() {
        assert!(
            serde_json::from_value::<PersonPayload>(json!({ "name": { "first": "Ada" } })).is_err()
        );
        assert!(serde_json::from_value::<PersonPayload>(json!({ "title": ["Lead"] })).is_err());
        assert!(serde_json::from_value::<PersonPayload>(json!(["Ada"])).is_err());
    }

    #[test]
    fn response_uses_camel_case_and_hex_id() {
        let id = PersonId::generate();
        let person = Person::new(
            id,
            PersonPayload {
                name: Some("Ada".into()),
                ..Default::default()
            },
            now_millis(),
        );

        let value = serde_json::to_value(PersonResponse::from(person)).unwrap();

        assert_eq!(value["id"], id.to_string());
        assert_eq!(value["name"], "Ada");
        assert!(value.get("image").is_none());
        assert_eq!(value["createdAt"], value["updatedAt"]);
    }
}
