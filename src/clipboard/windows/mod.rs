//! Windows clipboard backend on the native clipboard API.
//!
//! `paste` reads the first format the clipboard enumerates when it is one
//! we understand. Otherwise it scans every available format and settles on
//! the numerically largest implemented one. Text formats arrive NUL
//! terminated; bytes are staged under [`formats::BINARY_FORMAT`] with a
//! trailing NUL, and a single-file `CF_HDROP` is resolved to the file's
//! contents.

pub mod formats;
pub mod native;
pub mod session;

use std::fs;
use std::iter;
use std::path::PathBuf;
use std::time::Duration;

use super::backend::{ClipboardBackend, FormatInfo};
use super::error::{ClipboardError, Result};
use super::payload::{
    Encoding, Payload, TransferOptions, negotiate_bytes, negotiate_text,
};
use formats::{BINARY_FORMAT, CF_HDROP, CF_UNICODETEXT};
use native::NativeClipboard;
use session::ClipboardSession;

#[cfg(windows)]
pub use native::Win32Clipboard;
pub use session::DEFAULT_OPEN_TIMEOUT;

/// Contents read while the clipboard was open, decoded after it is closed
enum RawContents {
    Binary(Vec<u8>),
    WideText(Vec<u8>),
    NarrowText(Vec<u8>),
    Files(Vec<PathBuf>),
}

/// Native Windows clipboard backend
pub struct WindowsBackend<C: NativeClipboard> {
    native: C,
    open_timeout: Duration,
}

impl<C: NativeClipboard> WindowsBackend<C> {
    pub fn new(native: C, open_timeout: Duration) -> Self {
        WindowsBackend {
            native,
            open_timeout,
        }
    }

    fn session(&self) -> Result<ClipboardSession<'_, C>> {
        Ok(ClipboardSession::open(&self.native, self.open_timeout)?)
    }

    /// Format to read, or `None` for an empty clipboard
    fn choose_format(&self, session: &ClipboardSession<'_, C>, options: &TransferOptions) -> Result<Option<u32>> {
        let Some(first) = session.first_format() else {
            return Ok(None);
        };
        if formats::is_implemented(first) {
            return Ok(Some(first));
        }

        let available = session.formats();
        let chosen = formats::select_fallback(&available).ok_or(ClipboardError::UnparsableFormat)?;
        if options.wants_text() && !formats::is_text_format(chosen) {
            return Err(ClipboardError::NotTextFormat);
        }
        log::debug!(
            "First clipboard format {} not readable, falling back to {} out of {:?}",
            first,
            chosen,
            available
        );
        Ok(Some(chosen))
    }

    fn read(&self, session: &ClipboardSession<'_, C>, format: u32) -> Result<RawContents> {
        Ok(match format {
            CF_HDROP => RawContents::Files(session.file_list()?),
            BINARY_FORMAT => RawContents::Binary(session.get(format)?),
            CF_UNICODETEXT => RawContents::WideText(session.get(format)?),
            _ => RawContents::NarrowText(session.get(format)?),
        })
    }

    /// Every format currently on the clipboard, with its name
    pub fn describe_formats(&self) -> Result<Vec<FormatInfo>> {
        let session = self.session()?;
        let infos = session
            .formats()
            .into_iter()
            .map(|id| {
                let name = formats::predefined_name(id)
                    .map(str::to_string)
                    .or_else(|| session.format_name(id))
                    .unwrap_or_else(|| "unknown".to_string());
                FormatInfo { id, name }
            })
            .collect();
        session.close()?;
        Ok(infos)
    }
}

fn decode(contents: RawContents, options: &TransferOptions) -> Result<Payload> {
    match contents {
        RawContents::Binary(mut data) => {
            data.pop();
            negotiate_bytes(data, options)
        }
        RawContents::Files(files) => negotiate_bytes(read_dropped_file(files)?, options),
        RawContents::WideText(mut data) => {
            data.truncate(wide_text_len(&data));
            let text = Encoding::Utf16Le.decode(&data, options.policy())?;
            Ok(negotiate_text(text, options))
        }
        RawContents::NarrowText(mut data) => {
            if let Some(end) = data.iter().position(|&b| b == 0) {
                data.truncate(end);
            }
            negotiate_bytes(data, options)
        }
    }
}

/// Byte length of UTF-16LE text up to its first zero unit
/// The allocation behind a clipboard handle may extend past the terminator.
fn wide_text_len(data: &[u8]) -> usize {
    data.chunks_exact(2)
        .position(|unit| unit == [0, 0])
        .map_or(data.len() - data.len() % 2, |units| units * 2)
}

/// A file drop stands in for binary data only when it names one file
fn read_dropped_file(files: Vec<PathBuf>) -> Result<Vec<u8>> {
    let path = match files.len() {
        0 => return Err(ClipboardError::EmptyFileList),
        1 => &files[0],
        n => return Err(ClipboardError::MultipleFiles(n)),
    };
    if !path.is_file() {
        return Err(ClipboardError::NotAFile(path.clone()));
    }
    log::debug!("Reading dropped file {:?}", path);
    fs::read(path).map_err(|source| ClipboardError::ReadDroppedFile {
        path: path.clone(),
        source,
    })
}

impl<C: NativeClipboard> ClipboardBackend for WindowsBackend<C> {
    fn copy(&self, data: &Payload, options: &TransferOptions) -> Result<()> {
        let session = self.session()?;
        // emptying makes us the clipboard owner
        session.empty()?;
        match data {
            Payload::Text(text) => {
                if options.encoding.is_some() {
                    log::debug!("Text is always stored as UTF-16, ignoring encoding option");
                }
                let wide: Vec<u8> = text
                    .encode_utf16()
                    .chain(iter::once(0))
                    .flat_map(u16::to_le_bytes)
                    .collect();
                session.set(CF_UNICODETEXT, &wide)?;
            }
            Payload::Bytes(bytes) => {
                let mut staged = Vec::with_capacity(bytes.len() + 1);
                staged.extend_from_slice(bytes);
                staged.push(0);
                session.set(BINARY_FORMAT, &staged)?;
            }
        }
        session.close()?;

        log::debug!("Wrote {} bytes to clipboard", data.as_bytes().len());
        Ok(())
    }

    fn paste(&self, options: &TransferOptions) -> Result<Payload> {
        let session = self.session()?;
        let Some(format) = self.choose_format(&session, options)? else {
            session.close()?;
            return Ok(Payload::empty(options));
        };
        let contents = self.read(&session, format)?;
        session.close()?;

        decode(contents, options)
    }

    fn clear(&self) -> Result<()> {
        let session = self.session()?;
        session.empty()?;
        session.close()?;
        Ok(())
    }

    fn formats(&self) -> Result<Vec<FormatInfo>> {
        self.describe_formats()
    }

    fn name(&self) -> &'static str {
        "Windows"
    }
}
