//! SQLite persistence for relay labels.
//!
//! The relay board has no memory of what each channel drives, so the
//! human-readable labels live here. They are loaded once at startup to seed
//! the in-memory relay table and updated whenever a client renames a relay.
//!
//! # Example
//!
//! ```no_run
//! use relaypanel_storage::{Database, DatabaseConfig, LabelStore, SqliteLabelStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(DatabaseConfig::default()).await?;
//! let store = SqliteLabelStore::new(db.pool().clone());
//!
//! store.update(3, "garage light").await?;
//! for row in store.list().await? {
//!     println!("{}: {}", row.relay_index, row.label);
//! }
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod models;
pub mod repositories;

pub use connection::{DEFAULT_DB_NAME, Database, DatabaseConfig, default_database_path};
pub use error::{StorageError, StorageResult};
pub use models::RelayLabel;
pub use repositories::{LabelStore, SqliteLabelStore, labels_by_position};
