pub mod relay;

pub use relay::RelayLabel;
