pub mod cache;
pub mod config;
pub mod engine;
pub mod history;
pub mod llm;
pub mod logging;
pub mod protocol;
