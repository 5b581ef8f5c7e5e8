// Application layer - Parsing, analytics and the analysis session
pub mod aggregator;
pub mod dashboard_service;
pub mod error;
pub mod line_classifier;
pub mod log_parser;
pub mod log_source;
pub mod session_service;
pub mod trend_fitter;
