// Domain layer - Value types shared by every other layer
pub mod dashboard;
pub mod log_event;
pub mod player;
pub mod telemetry;
pub mod timestamp;
