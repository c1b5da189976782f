pub mod database;
pub mod memory;
pub mod metrics;
pub mod store;

pub use database::MongoPersonStore;
pub use memory::InMemoryPersonStore;
pub use self::metrics::{get_metrics, init_metrics, record_store_operation};
pub use store::{PersonStore, StoreError};
