use super::backend::ClipboardBackend;
use super::error::{Result, SetupError};
use super::payload::{Payload, TransferOptions, encode_for_copy, negotiate_bytes};
use super::process::{CommandRunner, SystemRunner, Tool};

const INSTALL_HINT: &str =
    "wl-clipboard must be installed. Please install wl-clipboard using your system package manager";

/// Wayland clipboard backend using wl-clipboard tools
/// Requires wl-copy and wl-paste to be installed
pub struct WaylandBackend {
    wl_copy: Tool,
    wl_paste: Tool,
    runner: Box<dyn CommandRunner>,
}

impl WaylandBackend {
    /// Create a new Wayland clipboard backend
    pub fn new() -> std::result::Result<Self, SetupError> {
        let wl_copy = Tool::resolve("wl-copy", INSTALL_HINT)?;
        let wl_paste = Tool::resolve("wl-paste", INSTALL_HINT)?;

        log::debug!("WaylandBackend initialized successfully");
        Ok(Self::with_runner(wl_copy, wl_paste, Box::new(SystemRunner)))
    }

    pub fn with_runner(wl_copy: Tool, wl_paste: Tool, runner: Box<dyn CommandRunner>) -> Self {
        WaylandBackend {
            wl_copy,
            wl_paste,
            runner,
        }
    }
}

impl ClipboardBackend for WaylandBackend {
    fn copy(&self, data: &Payload, options: &TransferOptions) -> Result<()> {
        let input = encode_for_copy(data, options)?;
        let len = input.len();

        // wl-copy forks to serve the selection, so its output is not captured
        self.wl_copy.run(self.runner.as_ref(), &[], Some(input), false)?;

        log::debug!("Wrote {} bytes to clipboard", len);
        Ok(())
    }

    fn paste(&self, options: &TransferOptions) -> Result<Payload> {
        let output = self
            .wl_paste
            .run(self.runner.as_ref(), &["--no-newline"], None, true)?;
        negotiate_bytes(output.stdout, options)
    }

    fn clear(&self) -> Result<()> {
        self.copy(&Payload::Text(String::new()), &TransferOptions::new())
    }

    fn name(&self) -> &'static str {
        "Wayland"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::error::ClipboardError;
    use crate::clipboard::process::testing::FakeRunner;
    use std::sync::Arc;

    fn backend() -> (WaylandBackend, Arc<FakeRunner>) {
        let runner = Arc::new(FakeRunner::new());
        let backend = WaylandBackend::with_runner(
            Tool::at("wl-copy", "/usr/bin/wl-copy"),
            Tool::at("wl-paste", "/usr/bin/wl-paste"),
            Box::new(runner.clone()),
        );
        (backend, runner)
    }

    #[test]
    fn test_paste_uses_no_newline() {
        let (clip, runner) = backend();
        clip.copy(&Payload::from(&b"\x00bin\x00"[..]), &TransferOptions::new())
            .unwrap();
        assert_eq!(
            clip.paste(&TransferOptions::new()).unwrap(),
            Payload::from(&b"\x00bin\x00"[..])
        );

        let calls = runner.calls();
        assert!(calls[0].args.is_empty());
        assert!(!calls[0].capture);
        assert_eq!(calls[1].args, vec!["--no-newline"]);
    }

    #[test]
    fn test_unicode_round_trip() {
        let (clip, _runner) = backend();
        let unicode = "א ב ג ד ה ו ז ח ט י ך כ ל ם מ ן נ ס ע ף פ ץ צ ק ר ש ת װ ױ";
        clip.copy(&Payload::from(unicode), &TransferOptions::new()).unwrap();

        let pasted = clip.paste(&TransferOptions::new()).unwrap().into_bytes();
        assert_eq!(String::from_utf8(pasted).unwrap(), unicode);
    }

    #[test]
    fn test_copy_failure_propagates() {
        let (clip, runner) = backend();
        runner.fail_next(2);
        let err = clip.copy(&Payload::from(""), &TransferOptions::new()).unwrap_err();
        match err {
            ClipboardError::CommandFailed { tool, code, .. } => {
                assert_eq!(tool, "wl-copy");
                assert_eq!(code, Some(2));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_clear() {
        let (clip, _runner) = backend();
        clip.copy(&Payload::from("foo"), &TransferOptions::new()).unwrap();
        clip.clear().unwrap();
        assert!(clip.paste(&TransferOptions::new()).unwrap().is_empty());
    }
}
