//! The Win32 clipboard calls the backend relies on.

use std::path::PathBuf;

use crate::clipboard::error::ClipboardError;

/// Another window has the clipboard open
pub const ERROR_ACCESS_DENIED: i32 = 5;

/// `CloseClipboard` without a matching open
pub const ERROR_CLIPBOARD_NOT_OPEN: i32 = 1418;

/// A failed Win32 clipboard call
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{operation} failed with Windows error code {code}")]
pub struct NativeError {
    pub operation: &'static str,
    pub code: i32,
}

impl NativeError {
    pub fn new(operation: &'static str, code: i32) -> Self {
        NativeError { operation, code }
    }
}

impl From<NativeError> for ClipboardError {
    fn from(e: NativeError) -> Self {
        ClipboardError::Native {
            operation: e.operation,
            code: e.code,
        }
    }
}

/// Native clipboard API surface
///
/// Everything except `open` requires the clipboard to be open, which
/// `ClipboardSession` guarantees.
pub trait NativeClipboard: Send + Sync {
    fn open(&self) -> Result<(), NativeError>;

    fn close(&self) -> Result<(), NativeError>;

    /// Empty the clipboard and take ownership of it
    fn empty(&self) -> Result<(), NativeError>;

    /// Available formats in enumeration order
    fn formats(&self) -> Vec<u32>;

    fn first_format(&self) -> Option<u32> {
        self.formats().into_iter().next()
    }

    /// Raw bytes held under `format`
    fn get(&self, format: u32) -> Result<Vec<u8>, NativeError>;

    /// Place bytes under `format` without emptying first
    fn set(&self, format: u32, data: &[u8]) -> Result<(), NativeError>;

    /// Paths of a `CF_HDROP` payload
    fn file_list(&self) -> Result<Vec<PathBuf>, NativeError>;

    /// Name of a registered format
    fn format_name(&self, format: u32) -> Option<String>;
}

/// The real clipboard, through `clipboard_win::raw`
#[cfg(windows)]
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32Clipboard;

#[cfg(windows)]
impl NativeClipboard for Win32Clipboard {
    fn open(&self) -> Result<(), NativeError> {
        clipboard_win::raw::open().map_err(|e| NativeError::new("OpenClipboard", e.raw_code()))
    }

    fn close(&self) -> Result<(), NativeError> {
        clipboard_win::raw::close().map_err(|e| NativeError::new("CloseClipboard", e.raw_code()))
    }

    fn empty(&self) -> Result<(), NativeError> {
        clipboard_win::raw::empty().map_err(|e| NativeError::new("EmptyClipboard", e.raw_code()))
    }

    fn formats(&self) -> Vec<u32> {
        clipboard_win::raw::EnumFormats::new().collect()
    }

    fn first_format(&self) -> Option<u32> {
        clipboard_win::raw::EnumFormats::new().next()
    }

    fn get(&self, format: u32) -> Result<Vec<u8>, NativeError> {
        let mut out = Vec::new();
        clipboard_win::raw::get_vec(format, &mut out)
            .map_err(|e| NativeError::new("GetClipboardData", e.raw_code()))?;
        Ok(out)
    }

    fn set(&self, format: u32, data: &[u8]) -> Result<(), NativeError> {
        clipboard_win::raw::set_without_clear(format, data)
            .map_err(|e| NativeError::new("SetClipboardData", e.raw_code()))
    }

    fn file_list(&self) -> Result<Vec<PathBuf>, NativeError> {
        let mut files: Vec<String> = Vec::new();
        clipboard_win::raw::get_file_list(&mut files)
            .map_err(|e| NativeError::new("DragQueryFile", e.raw_code()))?;
        Ok(files.into_iter().map(PathBuf::from).collect())
    }

    fn format_name(&self, format: u32) -> Option<String> {
        clipboard_win::raw::format_name_big(format)
    }
}
