// File-backed and in-memory log sources
use crate::application::error::LoadError;
use crate::application::log_source::LogSource;
use async_trait::async_trait;
use std::path::PathBuf;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone)]
pub struct FileLogSource {
    path: PathBuf,
}

impl FileLogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl LogSource for FileLogSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn read_text(&self) -> Result<String, LoadError> {
        let origin = self.describe();
        tracing::debug!("Reading log file {}", origin);

        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|error| LoadError::Io {
                origin: origin.clone(),
                error,
            })?;

        tracing::debug!("Read {} bytes from {}", bytes.len(), origin);
        decode_log_bytes(bytes, &origin)
    }
}

/// Log content already held in memory, e.g. an upload handed over by a UI.
#[derive(Debug, Clone)]
pub struct MemoryLogSource {
    label: String,
    content: String,
}

impl MemoryLogSource {
    pub fn new(label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            content: content.into(),
        }
    }
}

#[async_trait]
impl LogSource for MemoryLogSource {
    fn describe(&self) -> String {
        self.label.clone()
    }

    async fn read_text(&self) -> Result<String, LoadError> {
        Ok(self.content.clone())
    }
}

/// Decode raw log bytes as UTF-8, dropping a leading byte-order mark.
pub fn decode_log_bytes(mut bytes: Vec<u8>, origin: &str) -> Result<String, LoadError> {
    if bytes.starts_with(UTF8_BOM) {
        bytes.drain(..UTF8_BOM.len());
    }

    String::from_utf8(bytes).map_err(|e| LoadError::Undecodable {
        origin: origin.to_string(),
        offset: e.utf8_error().valid_up_to(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_decode_strips_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"2025.04.04 23:42:13 [MWG_FPS] Alice FPS: 45");
        let text = decode_log_bytes(bytes, "test").unwrap();
        assert!(text.starts_with("2025"));
    }

    #[test]
    fn test_decode_rejects_binary() {
        let err = decode_log_bytes(vec![b'o', b'k', 0xFF, 0xFE, 0x00], "blob.bin").unwrap_err();
        match err {
            LoadError::Undecodable { origin, offset } => {
                assert_eq!(origin, "blob.bin");
                assert_eq!(offset, 2);
            }
            other => panic!("Expected Undecodable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_file_source_reads_text() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "2025.04.04 23:42:13 [MWG_FPS] Alice FPS: 45").unwrap();

        let source = FileLogSource::new(file.path());
        let text = source.read_text().await.unwrap();
        assert!(text.contains("Alice"));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let source = FileLogSource::new("/definitely/not/here.log");
        let err = source.read_text().await.unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.log"));
    }
}
