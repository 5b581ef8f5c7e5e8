// Presentation layer - Report rendering for the command line
pub mod report;
