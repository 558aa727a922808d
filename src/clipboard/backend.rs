use super::error::{ClipboardError, Result};
use super::payload::{Payload, TransferOptions};

/// Trait for clipboard backend abstraction
/// One implementation per platform mechanism (native API or external tools)
/// Selected once per process by `detect::detect_backend`
pub trait ClipboardBackend: Send + Sync {
    /// Replace the clipboard contents
    /// `options.encoding` applies to text payloads only
    fn copy(&self, data: &Payload, options: &TransferOptions) -> Result<()>;

    /// Read the clipboard contents
    /// Returns bytes for default options, text if any option is set
    fn paste(&self, options: &TransferOptions) -> Result<Payload>;

    /// Clear the clipboard contents
    fn clear(&self) -> Result<()> {
        self.copy(&Payload::Bytes(Vec::new()), &TransferOptions::new())
    }

    /// List the formats currently on the clipboard
    /// Only backends on a native clipboard API can enumerate formats
    fn formats(&self) -> Result<Vec<FormatInfo>> {
        Err(ClipboardError::FormatListingUnsupported(self.name()))
    }

    /// Get the backend name (for logging/debugging)
    fn name(&self) -> &'static str;
}

/// A clipboard format and its human-readable name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatInfo {
    pub id: u32,
    pub name: String,
}
