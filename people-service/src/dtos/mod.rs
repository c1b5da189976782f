pub mod extract;
pub mod person;

pub use extract::JsonPayload;
pub use person::{PersonPayload, PersonResponse};
