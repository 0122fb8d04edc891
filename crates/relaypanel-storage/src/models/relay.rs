use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Persisted label of one relay.
///
/// Maps to the `relays` table. `relay_index` is 1-based and unique; the
/// migration seeds one row per relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RelayLabel {
    pub id: i64,
    pub relay_index: i64,
    pub label: String,
}

impl RelayLabel {
    /// 0-based position in the relay table, if `relay_index` is in range.
    pub fn table_index(&self, relay_count: usize) -> Option<usize> {
        usize::try_from(self.relay_index)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .filter(|i| *i < relay_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn label(relay_index: i64) -> RelayLabel {
        RelayLabel {
            id: relay_index,
            relay_index,
            label: format!("relay-{relay_index}"),
        }
    }

    #[rstest]
    #[case(1, Some(0))]
    #[case(8, Some(7))]
    #[case(0, None)]
    #[case(9, None)]
    #[case(-1, None)]
    fn test_table_index(#[case] relay_index: i64, #[case] expected: Option<usize>) {
        assert_eq!(label(relay_index).table_index(8), expected);
    }
}
