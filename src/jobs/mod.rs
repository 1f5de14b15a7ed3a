pub mod relay_sentiment;
pub mod relay_service;

pub use relay_sentiment::{CycleReport, RelaySession};
pub use relay_service::{RelayService, RelayStats};
