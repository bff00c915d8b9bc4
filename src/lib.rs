// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod config;
pub mod dashboard;
pub mod loader;
pub mod runtime;
pub mod scale;
pub mod series;
pub mod tooltip;
pub mod ui;
pub mod view;
