// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod config;
pub mod export;
pub mod format;
pub mod meter;
pub mod money;
pub mod runtime;
pub mod schedule;
