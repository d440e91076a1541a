// Library surface for headless/integration tests; main.rs only wires the terminal.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod game;
pub mod levels;
pub mod runtime;
pub mod scores;
pub mod ui;
pub mod util;
