pub mod vibe_oracle;

pub use vibe_oracle::{IVibeOracle, VibeOracleContract, RELAYER_USERNAME};
