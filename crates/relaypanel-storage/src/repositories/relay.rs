#![allow(async_fn_in_trait)]

use crate::error::{StorageError, StorageResult};
use crate::models::RelayLabel;
use relaypanel_protocol::RELAY_COUNT;
use relaypanel_protocol::constants::{MAX_RELAY_ID, MIN_RELAY_ID};
use sqlx::SqlitePool;

/// Repository trait for relay label persistence
pub trait LabelStore: Send + Sync {
    /// All labels ordered by relay index
    async fn list(&self) -> StorageResult<Vec<RelayLabel>>;

    /// Find the label row for a 1-based relay index
    async fn find_by_index(&self, relay_index: i64) -> StorageResult<Option<RelayLabel>>;

    /// Replace the label of a 1-based relay index
    async fn update(&self, relay_index: i64, label: &str) -> StorageResult<()>;
}

/// SQLite implementation of LabelStore
#[derive(Debug, Clone)]
pub struct SqliteLabelStore {
    pool: SqlitePool,
}

impl SqliteLabelStore {
    /// Create a new SQLite label store
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn validate_index(relay_index: i64) -> StorageResult<()> {
    if !(i64::from(MIN_RELAY_ID)..=i64::from(MAX_RELAY_ID)).contains(&relay_index) {
        return Err(StorageError::Validation(format!(
            "relay index {relay_index} out of range {MIN_RELAY_ID}-{MAX_RELAY_ID}"
        )));
    }
    Ok(())
}

impl LabelStore for SqliteLabelStore {
    async fn list(&self) -> StorageResult<Vec<RelayLabel>> {
        let labels = sqlx::query_as::<_, RelayLabel>(
            r#"
            SELECT id, relay_index, label
            FROM relays
            ORDER BY relay_index ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(labels)
    }

    async fn find_by_index(&self, relay_index: i64) -> StorageResult<Option<RelayLabel>> {
        let label = sqlx::query_as::<_, RelayLabel>(
            r#"
            SELECT id, relay_index, label
            FROM relays
            WHERE relay_index = ?
            "#,
        )
        .bind(relay_index)
        .fetch_optional(&self.pool)
        .await?;

        Ok(label)
    }

    async fn update(&self, relay_index: i64, label: &str) -> StorageResult<()> {
        validate_index(relay_index)?;

        let result = sqlx::query(
            r#"
            UPDATE relays
            SET label = ?
            WHERE relay_index = ?
            "#,
        )
        .bind(label)
        .bind(relay_index)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::relay_not_found(relay_index));
        }

        Ok(())
    }
}

/// Spread stored labels into board order.
///
/// Rows with an out-of-range index are skipped; missing relays get an empty
/// label.
pub fn labels_by_position(rows: &[RelayLabel]) -> [String; RELAY_COUNT] {
    let mut labels: [String; RELAY_COUNT] = Default::default();
    for row in rows {
        if let Some(index) = row.table_index(RELAY_COUNT) {
            labels[index] = row.label.clone();
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1)]
    #[case(8)]
    fn test_validate_index_accepts(#[case] index: i64) {
        assert!(validate_index(index).is_ok());
    }

    #[rstest]
    #[case(0)]
    #[case(9)]
    #[case(-3)]
    fn test_validate_index_rejects(#[case] index: i64) {
        assert!(matches!(
            validate_index(index),
            Err(StorageError::Validation(_))
        ));
    }

    #[test]
    fn test_labels_by_position() {
        let rows = vec![
            RelayLabel {
                id: 1,
                relay_index: 3,
                label: "fan".into(),
            },
            RelayLabel {
                id: 2,
                relay_index: 12,
                label: "ghost".into(),
            },
            RelayLabel {
                id: 3,
                relay_index: 1,
                label: "lamp".into(),
            },
        ];

        let labels = labels_by_position(&rows);
        assert_eq!(labels[0], "lamp");
        assert_eq!(labels[1], "");
        assert_eq!(labels[2], "fan");
        assert!(labels[3..].iter().all(String::is_empty));
    }
}
