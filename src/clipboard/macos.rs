use super::backend::ClipboardBackend;
use super::error::{Result, SetupError};
use super::payload::{Payload, TransferOptions, encode_for_copy, negotiate_bytes};
use super::process::{CommandRunner, SystemRunner, Tool};

/// macOS clipboard backend using pbcopy/pbpaste
pub struct PbcopyBackend {
    pbcopy: Tool,
    pbpaste: Tool,
    runner: Box<dyn CommandRunner>,
}

impl PbcopyBackend {
    /// Create a new pbcopy backend
    /// Both tools must be available on PATH
    pub fn new() -> std::result::Result<Self, SetupError> {
        let pbcopy = Tool::resolve(
            "pbcopy",
            "pbcopy must be installed and available on PATH",
        )?;
        let pbpaste = Tool::resolve(
            "pbpaste",
            "pbpaste must be installed and available on PATH",
        )?;

        log::debug!("PbcopyBackend initialized successfully");
        Ok(Self::with_runner(pbcopy, pbpaste, Box::new(SystemRunner)))
    }

    pub fn with_runner(pbcopy: Tool, pbpaste: Tool, runner: Box<dyn CommandRunner>) -> Self {
        PbcopyBackend {
            pbcopy,
            pbpaste,
            runner,
        }
    }
}

impl ClipboardBackend for PbcopyBackend {
    fn copy(&self, data: &Payload, options: &TransferOptions) -> Result<()> {
        let input = encode_for_copy(data, options)?;
        let len = input.len();
        self.pbcopy.run(self.runner.as_ref(), &[], Some(input), true)?;

        log::debug!("Wrote {} bytes to clipboard", len);
        Ok(())
    }

    fn paste(&self, options: &TransferOptions) -> Result<Payload> {
        let output = self.pbpaste.run(self.runner.as_ref(), &[], None, true)?;
        negotiate_bytes(output.stdout, options)
    }

    fn name(&self) -> &'static str {
        "pbcopy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::error::ClipboardError;
    use crate::clipboard::process::testing::FakeRunner;
    use std::sync::Arc;

    fn backend() -> (PbcopyBackend, Arc<FakeRunner>) {
        let runner = Arc::new(FakeRunner::new());
        let backend = PbcopyBackend::with_runner(
            Tool::at("pbcopy", "/usr/bin/pbcopy"),
            Tool::at("pbpaste", "/usr/bin/pbpaste"),
            Box::new(runner.clone()),
        );
        (backend, runner)
    }

    #[test]
    fn test_copypaste() {
        let (clip, runner) = backend();
        clip.copy(&Payload::from("foo"), &TransferOptions::new()).unwrap();

        assert_eq!(clip.paste(&TransferOptions::new()).unwrap(), Payload::from(&b"foo"[..]));
        assert_eq!(clip.paste(&TransferOptions::text()).unwrap(), Payload::from("foo"));

        let calls = runner.calls();
        assert_eq!(calls[0].program.file_name().unwrap(), "pbcopy");
        assert!(calls[0].args.is_empty());
        assert_eq!(calls[1].program.file_name().unwrap(), "pbpaste");
        assert!(calls[1].input.is_none());
    }

    #[test]
    fn test_clear_empties_clipboard() {
        let (clip, _runner) = backend();
        clip.copy(&Payload::from("foo"), &TransferOptions::new()).unwrap();
        clip.clear().unwrap();

        assert_eq!(clip.paste(&TransferOptions::new()).unwrap(), Payload::Bytes(vec![]));
        assert_eq!(clip.paste(&TransferOptions::text()).unwrap(), Payload::Text(String::new()));
    }

    #[test]
    fn test_copy_failure_propagates() {
        let (clip, runner) = backend();
        runner.fail_next(1);
        let err = clip.copy(&Payload::from(""), &TransferOptions::new()).unwrap_err();
        assert!(matches!(err, ClipboardError::CommandFailed { code: Some(1), .. }));
        assert!(err.to_string().contains("mock stderr"));
    }

    #[test]
    fn test_paste_failure_propagates() {
        let (clip, runner) = backend();
        runner.fail_next(1);
        let err = clip.paste(&TransferOptions::new()).unwrap_err();
        assert!(matches!(err, ClipboardError::CommandFailed { code: Some(1), .. }));
        assert!(err.to_string().contains("mock stdout"));
    }
}
