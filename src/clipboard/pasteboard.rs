//! macOS clipboard backend on the general pasteboard.
//!
//! Text goes in as a string. Bytes that are not valid UTF-8 are stored
//! under [`BINARY_TYPE`], and `paste` looks for that type before falling
//! back to the string contents.

use super::backend::ClipboardBackend;
use super::error::Result;
use super::payload::{Payload, TransferOptions, negotiate_bytes, negotiate_text};

/// Pasteboard type binary payloads are stored under
pub const BINARY_TYPE: &str = "com.adobe.pdf";

/// The pasteboard calls the backend relies on
pub trait Pasteboard: Send + Sync {
    /// Remove every item and take ownership
    fn clear(&self) -> Result<()>;

    fn has_data(&self, pasteboard_type: &str) -> bool;

    fn has_text(&self) -> bool;

    fn data(&self, pasteboard_type: &str) -> Result<Vec<u8>>;

    fn text(&self) -> Result<String>;

    fn set_data(&self, pasteboard_type: &str, data: Vec<u8>) -> Result<()>;

    fn set_text(&self, text: String) -> Result<()>;
}

#[cfg(target_os = "macos")]
pub use general::GeneralPasteboard;

#[cfg(target_os = "macos")]
mod general {
    use std::error::Error;
    use std::sync::Mutex;

    use clipboard_rs::{Clipboard, ClipboardContext, ContentFormat};

    use super::Pasteboard;
    use crate::clipboard::error::{ClipboardError, Result, SetupError};

    type ContextResult<T> = std::result::Result<T, Box<dyn Error + Send + Sync>>;

    /// The system general pasteboard, through `clipboard-rs`
    pub struct GeneralPasteboard {
        context: Mutex<ClipboardContext>,
    }

    impl GeneralPasteboard {
        pub fn new() -> std::result::Result<Self, SetupError> {
            let context = ClipboardContext::new().map_err(|e| {
                SetupError::new(format!("Failed to create pasteboard context: {}", e))
            })?;
            Ok(GeneralPasteboard {
                context: Mutex::new(context),
            })
        }

        fn with_context<T>(
            &self,
            operation: &'static str,
            f: impl FnOnce(&ClipboardContext) -> ContextResult<T>,
        ) -> Result<T> {
            let context = self.context.lock().map_err(|e| ClipboardError::Pasteboard {
                operation,
                message: e.to_string(),
            })?;
            f(&context).map_err(|e| ClipboardError::Pasteboard {
                operation,
                message: e.to_string(),
            })
        }

        fn has(&self, format: ContentFormat) -> bool {
            self.context
                .lock()
                .map(|context| context.has(format))
                .unwrap_or(false)
        }
    }

    impl Pasteboard for GeneralPasteboard {
        fn clear(&self) -> Result<()> {
            self.with_context("clear", |context| context.clear())
        }

        fn has_data(&self, pasteboard_type: &str) -> bool {
            self.has(ContentFormat::Other(pasteboard_type.to_string()))
        }

        fn has_text(&self) -> bool {
            self.has(ContentFormat::Text)
        }

        fn data(&self, pasteboard_type: &str) -> Result<Vec<u8>> {
            self.with_context("read data", |context| context.get_buffer(pasteboard_type))
        }

        fn text(&self) -> Result<String> {
            self.with_context("read text", |context| context.get_text())
        }

        fn set_data(&self, pasteboard_type: &str, data: Vec<u8>) -> Result<()> {
            self.with_context("write data", |context| {
                context.set_buffer(pasteboard_type, data)
            })
        }

        fn set_text(&self, text: String) -> Result<()> {
            self.with_context("write text", |context| context.set_text(text))
        }
    }
}

/// macOS clipboard backend on the general pasteboard
pub struct PasteboardBackend<P: Pasteboard> {
    pasteboard: P,
}

impl<P: Pasteboard> PasteboardBackend<P> {
    pub fn new(pasteboard: P) -> Self {
        PasteboardBackend { pasteboard }
    }
}

impl<P: Pasteboard> ClipboardBackend for PasteboardBackend<P> {
    fn copy(&self, data: &Payload, options: &TransferOptions) -> Result<()> {
        if options.encoding.is_some() {
            log::debug!("The pasteboard stores strings natively, ignoring encoding option");
        }
        self.pasteboard.clear()?;
        match data {
            Payload::Text(text) => self.pasteboard.set_text(text.clone())?,
            Payload::Bytes(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => self.pasteboard.set_text(text.to_string())?,
                Err(_) => self.pasteboard.set_data(BINARY_TYPE, bytes.clone())?,
            },
        }

        log::debug!("Wrote {} bytes to pasteboard", data.as_bytes().len());
        Ok(())
    }

    fn paste(&self, options: &TransferOptions) -> Result<Payload> {
        if self.pasteboard.has_data(BINARY_TYPE) {
            return negotiate_bytes(self.pasteboard.data(BINARY_TYPE)?, options);
        }
        if self.pasteboard.has_text() {
            return Ok(negotiate_text(self.pasteboard.text()?, options));
        }
        Ok(Payload::empty(options))
    }

    fn clear(&self) -> Result<()> {
        self.pasteboard.clear()
    }

    fn name(&self) -> &'static str {
        "Pasteboard"
    }
}
