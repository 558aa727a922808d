pub mod backend;
pub mod detect;
pub mod error;
pub mod macos;
pub mod pasteboard;
pub mod payload;
pub mod process;
pub mod wayland;
pub mod windows;
pub mod xclip;

use std::sync::OnceLock;

pub use backend::{ClipboardBackend, FormatInfo};
pub use detect::{BackendPreference, Platform, detect_backend};
pub use error::{ClipboardError, Result, SetupError};
pub use macos::PbcopyBackend;
pub use pasteboard::PasteboardBackend;
pub use payload::{Encoding, ErrorPolicy, Payload, TransferOptions};
pub use wayland::WaylandBackend;
pub use windows::WindowsBackend;
pub use xclip::XclipBackend;

use crate::config::GeneralConfig;

type Construction = std::result::Result<Box<dyn ClipboardBackend>, SetupError>;

/// A lazily constructed backend
///
/// Construction runs at most once. A failure is kept and handed back on
/// every later access instead of retrying.
pub struct ClipboardHandle {
    cell: OnceLock<Construction>,
}

impl ClipboardHandle {
    pub const fn new() -> Self {
        ClipboardHandle {
            cell: OnceLock::new(),
        }
    }

    /// The backend, constructing it with `build` on first access
    pub fn get_or_init_with<F>(&self, build: F) -> Result<&dyn ClipboardBackend>
    where
        F: FnOnce() -> Construction,
    {
        match self.cell.get_or_init(build) {
            Ok(backend) => Ok(backend.as_ref()),
            Err(e) => Err(ClipboardError::Setup(e.clone())),
        }
    }

    /// The backend, detecting one for this platform on first access
    pub fn get(&self) -> Result<&dyn ClipboardBackend> {
        self.get_or_init_with(|| {
            detect_backend(BackendPreference::Auto, windows::DEFAULT_OPEN_TIMEOUT)
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl Default for ClipboardHandle {
    fn default() -> Self {
        Self::new()
    }
}

static DEFAULT_CLIPBOARD: ClipboardHandle = ClipboardHandle::new();

/// Set up the process-wide clipboard from configuration
/// No effect if the clipboard was already set up
pub fn init(config: &GeneralConfig) -> Result<&'static dyn ClipboardBackend> {
    if DEFAULT_CLIPBOARD.is_initialized() {
        log::debug!("Clipboard already initialized, ignoring configuration");
    }
    DEFAULT_CLIPBOARD
        .get_or_init_with(|| detect_backend(config.backend, config.open_timeout()))
}

/// The process-wide clipboard backend
pub fn default_clipboard() -> Result<&'static dyn ClipboardBackend> {
    DEFAULT_CLIPBOARD.get()
}

/// Copy text or bytes to the system clipboard
pub fn copy(data: impl Into<Payload>) -> Result<()> {
    copy_with(data, &TransferOptions::new())
}

/// Copy with an explicit text encoding
pub fn copy_with(data: impl Into<Payload>, options: &TransferOptions) -> Result<()> {
    default_clipboard()?.copy(&data.into(), options)
}

/// Read the system clipboard as raw bytes
pub fn paste() -> Result<Payload> {
    paste_with(&TransferOptions::new())
}

/// Read the system clipboard; any option set yields text
pub fn paste_with(options: &TransferOptions) -> Result<Payload> {
    default_clipboard()?.paste(options)
}

/// Clear the system clipboard
pub fn clear() -> Result<()> {
    default_clipboard()?.clear()
}
