//! Platform detection: which backend serves this process.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::time::Duration;

use super::backend::ClipboardBackend;
use super::error::SetupError;
use super::macos::PbcopyBackend;
use super::wayland::WaylandBackend;
use super::xclip::XclipBackend;

/// Operating system families with a clipboard mechanism
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
    Other(String),
}

impl Platform {
    /// The platform this binary was built for
    pub fn current() -> Self {
        Platform::from_os(env::consts::OS)
    }

    /// Map an OS identifier (`std::env::consts::OS` style, or `darwin`/`win32`)
    pub fn from_os(os: &str) -> Self {
        match os {
            "macos" | "darwin" => Platform::MacOs,
            "windows" | "win32" => Platform::Windows,
            "linux" => Platform::Linux,
            other => Platform::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::MacOs => f.write_str("macos"),
            Platform::Windows => f.write_str("windows"),
            Platform::Linux => f.write_str("linux"),
            Platform::Other(name) => f.write_str(name),
        }
    }
}

/// Backend requested by configuration
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    /// Pick from the platform
    #[default]
    Auto,
    Pasteboard,
    Pbcopy,
    Xclip,
    Wayland,
    Windows,
}

/// The concrete backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Pasteboard,
    Pbcopy,
    Xclip,
    Wayland,
    Windows,
}

/// True when a Wayland compositor is reachable
pub fn wayland_session() -> bool {
    env::var_os("WAYLAND_DISPLAY").is_some_and(|display| !display.is_empty())
}

/// Decide which backend serves the platform
pub fn select_backend(
    platform: &Platform,
    wayland: bool,
    preference: BackendPreference,
) -> Result<BackendKind, SetupError> {
    match preference {
        BackendPreference::Pasteboard => return Ok(BackendKind::Pasteboard),
        BackendPreference::Pbcopy => return Ok(BackendKind::Pbcopy),
        BackendPreference::Xclip => return Ok(BackendKind::Xclip),
        BackendPreference::Wayland => return Ok(BackendKind::Wayland),
        BackendPreference::Windows => return Ok(BackendKind::Windows),
        BackendPreference::Auto => {}
    }

    match platform {
        Platform::MacOs => Ok(BackendKind::Pasteboard),
        Platform::Windows => Ok(BackendKind::Windows),
        Platform::Linux if wayland => Ok(BackendKind::Wayland),
        Platform::Linux => Ok(BackendKind::Xclip),
        Platform::Other(name) => Err(SetupError::new(format!(
            "No suitable clipboard found for platform {:?}",
            name
        ))),
    }
}

/// Construct a backend of the given kind
pub fn build_backend(
    kind: BackendKind,
    open_timeout: Duration,
) -> Result<Box<dyn ClipboardBackend>, SetupError> {
    let backend: Box<dyn ClipboardBackend> = match kind {
        BackendKind::Pasteboard => build_pasteboard()?,
        BackendKind::Pbcopy => Box::new(PbcopyBackend::new()?),
        BackendKind::Xclip => Box::new(XclipBackend::new()?),
        BackendKind::Wayland => Box::new(WaylandBackend::new()?),
        BackendKind::Windows => build_windows(open_timeout)?,
    };
    log::info!("Using {} clipboard backend", backend.name());
    Ok(backend)
}

/// Backend to try when `kind` cannot be constructed
/// Only a detected pasteboard falls back; an explicit choice stands.
pub fn fallback_for(kind: BackendKind, preference: BackendPreference) -> Option<BackendKind> {
    match (kind, preference) {
        (BackendKind::Pasteboard, BackendPreference::Auto) => Some(BackendKind::Pbcopy),
        _ => None,
    }
}

#[cfg(target_os = "macos")]
fn build_pasteboard() -> Result<Box<dyn ClipboardBackend>, SetupError> {
    use super::pasteboard::{GeneralPasteboard, PasteboardBackend};
    Ok(Box::new(PasteboardBackend::new(GeneralPasteboard::new()?)))
}

#[cfg(not(target_os = "macos"))]
fn build_pasteboard() -> Result<Box<dyn ClipboardBackend>, SetupError> {
    Err(SetupError::new(
        "The macOS pasteboard is not available in this build",
    ))
}

#[cfg(windows)]
fn build_windows(open_timeout: Duration) -> Result<Box<dyn ClipboardBackend>, SetupError> {
    use super::windows::{Win32Clipboard, WindowsBackend};
    Ok(Box::new(WindowsBackend::new(Win32Clipboard, open_timeout)))
}

#[cfg(not(windows))]
fn build_windows(_open_timeout: Duration) -> Result<Box<dyn ClipboardBackend>, SetupError> {
    Err(SetupError::new(
        "The native Windows clipboard API is not available in this build",
    ))
}

/// Detect and construct the backend for the running platform
pub fn detect_backend(
    preference: BackendPreference,
    open_timeout: Duration,
) -> Result<Box<dyn ClipboardBackend>, SetupError> {
    let platform = Platform::current();
    let wayland = wayland_session();
    log::debug!("Detecting clipboard for {} (wayland: {})", platform, wayland);

    let kind = select_backend(&platform, wayland, preference)?;
    match (build_backend(kind, open_timeout), fallback_for(kind, preference)) {
        (Err(e), Some(fallback)) => {
            log::warn!("{}, falling back to {:?}", e.reason(), fallback);
            build_backend(fallback, open_timeout)
        }
        (result, _) => result,
    }
}
