// Source trait for log content
use crate::application::error::LoadError;
use async_trait::async_trait;

#[async_trait]
pub trait LogSource: Send + Sync {
    /// Short label for the source (file path, upload name), used in logs and summaries
    fn describe(&self) -> String;

    /// Read the whole log as text
    async fn read_text(&self) -> Result<String, LoadError>;
}
