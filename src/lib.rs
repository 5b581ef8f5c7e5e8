//! Parses game-server debug logs for per-player FPS readings and builds
//! chart-ready time-series views: per-player series with trend lines and a
//! sliding-window average across players.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
