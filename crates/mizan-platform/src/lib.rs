pub mod config;
pub mod db;
pub mod pg_store;

pub use config::{ServiceConfig, StoreBackend};
pub use db::connect_database;
pub use pg_store::PgRecordStore;
