// Library surface for headless/integration tests and reuse.
// Game rules live here; the binary only translates keys and draws.
pub mod app_dirs;
pub mod config;
pub mod controller;
pub mod problem;
pub mod rope;
pub mod runtime;
pub mod session;
pub mod timers;
