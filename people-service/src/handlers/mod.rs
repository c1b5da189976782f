pub mod health;
pub mod people;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use people::{create_person, delete_person, hello_world, list_people, show_person, update_person};
