pub mod person;

pub use person::{now_millis, Person, PersonId};
