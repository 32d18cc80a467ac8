// Library root — shared by the `konsulent-api` and `llm-verktoy-api`
// binaries and by the integration tests.

pub mod config;
pub mod error;
pub mod llm;
pub mod logger;
pub mod roster;
pub mod roster_client;
pub mod server;
pub mod summary;
