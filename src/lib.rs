pub mod config;
pub mod errors;
pub mod extract;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod search;
pub mod server;
pub mod state;
