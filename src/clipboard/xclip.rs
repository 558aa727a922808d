use super::backend::ClipboardBackend;
use super::error::{Result, SetupError};
use super::payload::{Payload, TransferOptions, encode_for_copy, negotiate_bytes};
use super::process::{CommandRunner, SystemRunner, Tool};

/// Targets every X11 selection owner advertises that carry no content
const META_TARGETS: &[&str] = &[
    "TARGETS",
    "TIMESTAMP",
    "MULTIPLE",
    "SAVE_TARGETS",
    "DELETE",
    "INCR",
];

const PREFERRED_TARGET: &str = "text/plain";

/// X11 clipboard backend using xclip
/// Always operates on the CLIPBOARD selection, never PRIMARY
pub struct XclipBackend {
    xclip: Tool,
    runner: Box<dyn CommandRunner>,
}

impl XclipBackend {
    /// Create a new xclip backend
    pub fn new() -> std::result::Result<Self, SetupError> {
        let xclip = Tool::resolve(
            "xclip",
            "xclip must be installed. Please install xclip using your system package manager",
        )?;

        log::debug!("XclipBackend initialized successfully");
        Ok(Self::with_runner(xclip, Box::new(SystemRunner)))
    }

    pub fn with_runner(xclip: Tool, runner: Box<dyn CommandRunner>) -> Self {
        XclipBackend { xclip, runner }
    }

    /// Targets offered by the current clipboard owner
    /// Empty when nobody owns the selection or the query fails
    fn targets(&self) -> Vec<String> {
        match self.xclip.run(
            self.runner.as_ref(),
            &["-o", "-selection", "clipboard", "-t", "TARGETS"],
            None,
            true,
        ) {
            Ok(output) => String::from_utf8_lossy(&output.stdout)
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) => {
                log::debug!("Could not list clipboard targets: {}", e);
                Vec::new()
            }
        }
    }
}

/// Choose the target to request: text/plain if offered, else the first
/// content target, else none
pub fn select_target(targets: &[String]) -> Option<&str> {
    if targets.iter().any(|t| t == PREFERRED_TARGET) {
        return Some(PREFERRED_TARGET);
    }
    targets
        .iter()
        .map(String::as_str)
        .find(|t| !META_TARGETS.contains(t))
}

/// Arguments for reading the clipboard with an optional target restriction
pub fn paste_args(target: Option<&str>) -> Vec<&str> {
    let mut args = vec!["-o", "-selection", "clipboard"];
    if let Some(target) = target {
        args.extend(["-t", target]);
    }
    args
}

impl ClipboardBackend for XclipBackend {
    fn copy(&self, data: &Payload, options: &TransferOptions) -> Result<()> {
        let input = encode_for_copy(data, options)?;
        let len = input.len();

        // xclip forks to own the selection, so its output is not captured
        self.xclip.run(
            self.runner.as_ref(),
            &["-selection", "clipboard"],
            Some(input),
            false,
        )?;

        log::debug!("Wrote {} bytes to clipboard", len);
        Ok(())
    }

    fn paste(&self, options: &TransferOptions) -> Result<Payload> {
        let targets = self.targets();
        let target = select_target(&targets);
        log::debug!("Clipboard targets {:?}, selected {:?}", targets, target);

        let output = self
            .xclip
            .run(self.runner.as_ref(), &paste_args(target), None, true)?;
        negotiate_bytes(output.stdout, options)
    }

    fn clear(&self) -> Result<()> {
        self.copy(&Payload::Text(String::new()), &TransferOptions::new())
    }

    fn name(&self) -> &'static str {
        "xclip"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::error::ClipboardError;
    use crate::clipboard::process::CommandOutput;
    use crate::clipboard::process::testing::FakeRunner;
    use std::sync::Arc;

    fn backend() -> (XclipBackend, Arc<FakeRunner>) {
        let runner = Arc::new(FakeRunner::new());
        let backend =
            XclipBackend::with_runner(Tool::at("xclip", "/usr/bin/xclip"), Box::new(runner.clone()));
        (backend, runner)
    }

    fn targets_output(targets: &[&str]) -> CommandOutput {
        CommandOutput {
            code: Some(0),
            stdout: targets.join("\n").into_bytes(),
            stderr: Vec::new(),
        }
    }

    #[test]
    fn test_paste_with_target() {
        let cases: [(&[&str], &[&str]); 4] = [
            (&["TARGETS", "TIMESTAMP", "image/png"], &["-t", "image/png"]),
            (&[], &[]),
            (&["TARGETS", "TIMESTAMP", "text/plain"], &["-t", "text/plain"]),
            (
                &["text/html", "TARGETS", "TIMESTAMP", "text/plain"],
                &["-t", "text/plain"],
            ),
        ];

        for (targets, expected) in cases {
            let (clip, runner) = backend();
            let data = b"\x01\x02\x00random\xff".to_vec();
            clip.copy(&Payload::Bytes(data.clone()), &TransferOptions::new())
                .unwrap();

            runner.push_output(targets_output(targets));
            assert_eq!(clip.paste(&TransferOptions::new()).unwrap(), Payload::Bytes(data));

            let mut want = vec!["-o", "-selection", "clipboard"];
            want.extend_from_slice(expected);
            assert_eq!(runner.last_args(), want, "targets {:?}", targets);
        }
    }

    #[test]
    fn test_failed_target_query_means_no_restriction() {
        let (clip, runner) = backend();
        runner.fail_next(1);
        clip.paste(&TransferOptions::new()).unwrap();
        assert_eq!(runner.last_args(), vec!["-o", "-selection", "clipboard"]);
    }

    #[test]
    fn test_copy_selects_clipboard() {
        let (clip, runner) = backend();
        clip.copy(&Payload::from("foo"), &TransferOptions::new()).unwrap();
        assert_eq!(runner.last_args(), vec!["-selection", "clipboard"]);
    }

    #[test]
    fn test_paste_failure_propagates() {
        let (clip, runner) = backend();
        runner.push_output(targets_output(&["text/plain"]));
        runner.fail_next(1);
        let err = clip.paste(&TransferOptions::text()).unwrap_err();
        assert!(matches!(err, ClipboardError::CommandFailed { code: Some(1), .. }));
    }

    #[test]
    fn test_select_target_skips_meta_targets() {
        let targets: Vec<String> = ["TARGETS", "MULTIPLE", "SAVE_TARGETS"]
            .iter()
            .map(|t| t.to_string())
            .collect();
        assert_eq!(select_target(&targets), None);
    }
}
