// Library surface for headless/integration tests and reuse.
// The binary in main.rs only wires terminal, CLI and logging around it.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod hiscores;
pub mod runtime;
pub mod scoring;
pub mod state;
pub mod storage;
pub mod timer;
pub mod ui;
pub mod util;
