use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::dtos::PersonPayload;
use crate::models::{now_millis, Person, PersonId};
use crate::services::{PersonStore, StoreError};

/// Process-local `PersonStore`. Keeps insertion order, which stands in for
/// storage order.
#[derive(Debug, Default)]
pub struct InMemoryPersonStore {
    people: RwLock<Vec<Person>>,
}

impl InMemoryPersonStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersonStore for InMemoryPersonStore {
    async fn list_all(&self) -> Result<Vec<Person>, StoreError> {
        Ok(self.people.read().await.clone())
    }

    async fn create(&self, payload: PersonPayload) -> Result<Person, StoreError> {
        let person = Person::new(PersonId::generate(), payload, now_millis());
        self.people.write().await.push(person.clone());
        Ok(person)
    }

    async fn find_by_id(&self, id: PersonId) -> Result<Option<Person>, StoreError> {
        let people = self.people.read().await;
        Ok(people.iter().find(|p| p.person_id() == id).cloned())
    }

    async fn update_by_id(
        &self,
        id: PersonId,
        payload: PersonPayload,
    ) -> Result<Option<Person>, StoreError> {
        let mut people = self.people.write().await;
        Ok(people.iter_mut().find(|p| p.person_id() == id).map(|person| {
            person.apply(payload, now_millis());
            person.clone()
        }))
    }

    async fn delete_by_id(&self, id: PersonId) -> Result<Option<Person>, StoreError> {
        let mut people = self.people.write().await;
        let position = people.iter().position(|p| p.person_id() == id);
        Ok(position.map(|index| people.remove(index)))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
