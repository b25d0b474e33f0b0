// handlers/elevated/root/orphan/mod.rs

pub mod migrate;
pub mod stats;

pub use migrate::orphan_migrate;
pub use stats::orphan_stats;
