// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod debounce;
pub mod file_source;
pub mod logging;
