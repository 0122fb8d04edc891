pub mod relay;

pub use relay::{LabelStore, SqliteLabelStore, labels_by_position};
