use std::ops::Deref;
use std::thread;
use std::time::{Duration, Instant};

use super::native::{ERROR_ACCESS_DENIED, ERROR_CLIPBOARD_NOT_OPEN, NativeClipboard, NativeError};

/// Window for waiting out another process holding the clipboard
pub const DEFAULT_OPEN_TIMEOUT: Duration = Duration::from_millis(50);

const RETRY_INTERVAL: Duration = Duration::from_millis(1);

/// An open clipboard
///
/// Closed by `close` on success paths and by `Drop` on every other path,
/// so the clipboard is never left locked.
pub struct ClipboardSession<'a, C: NativeClipboard + ?Sized> {
    clipboard: &'a C,
    is_open: bool,
}

impl<'a, C: NativeClipboard + ?Sized> ClipboardSession<'a, C> {
    /// Open the clipboard, retrying while another process holds it
    /// Fails with the access-denied error once `timeout` has elapsed
    pub fn open(clipboard: &'a C, timeout: Duration) -> Result<Self, NativeError> {
        let deadline = Instant::now() + timeout;
        loop {
            match clipboard.open() {
                Ok(()) => {
                    return Ok(ClipboardSession {
                        clipboard,
                        is_open: true,
                    });
                }
                Err(e) if e.code == ERROR_ACCESS_DENIED && Instant::now() < deadline => {
                    log::trace!("Clipboard busy, retrying open");
                    thread::sleep(RETRY_INTERVAL);
                }
                Err(e) => {
                    if e.code == ERROR_ACCESS_DENIED {
                        log::warn!("Clipboard still held by another process after {:?}", timeout);
                    }
                    return Err(e);
                }
            }
        }
    }

    /// Close the clipboard, reporting failures
    pub fn close(mut self) -> Result<(), NativeError> {
        self.is_open = false;
        close_clipboard(self.clipboard)
    }
}

impl<C: NativeClipboard + ?Sized> Deref for ClipboardSession<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.clipboard
    }
}

impl<C: NativeClipboard + ?Sized> Drop for ClipboardSession<'_, C> {
    fn drop(&mut self) {
        if self.is_open {
            if let Err(e) = close_clipboard(self.clipboard) {
                log::warn!("Failed to close clipboard: {}", e);
            }
        }
    }
}

/// Closing an already-closed clipboard is a no-op
fn close_clipboard<C: NativeClipboard + ?Sized>(clipboard: &C) -> Result<(), NativeError> {
    match clipboard.close() {
        Err(e) if e.code == ERROR_CLIPBOARD_NOT_OPEN => {
            log::debug!("Clipboard was not open on close");
            Ok(())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::super::native::testing::FakeClipboard;
    use super::*;

    #[test]
    fn test_open_retries_while_busy() {
        let fake = FakeClipboard::new();
        fake.state.lock().unwrap().busy_opens = 3;

        let session = ClipboardSession::open(&fake, Duration::from_secs(5)).unwrap();
        assert!(fake.is_open());
        session.close().unwrap();

        assert!(!fake.is_open());
        assert_eq!(fake.state.lock().unwrap().open_attempts, 4);
    }

    #[test]
    fn test_open_gives_up_after_timeout() {
        let fake = FakeClipboard::new();
        fake.state.lock().unwrap().always_busy = true;

        let started = Instant::now();
        let err = ClipboardSession::open(&fake, Duration::from_millis(5))
            .err()
            .unwrap();
        assert_eq!(err.code, ERROR_ACCESS_DENIED);
        assert!(started.elapsed() >= Duration::from_millis(5));
        assert!(fake.state.lock().unwrap().open_attempts > 1);
    }

    #[test]
    fn test_close_swallows_not_open() {
        let fake = FakeClipboard::new();
        fake.state.lock().unwrap().close_not_open = true;

        let session = ClipboardSession::open(&fake, DEFAULT_OPEN_TIMEOUT).unwrap();
        session.close().unwrap();
        assert!(!fake.is_open());
    }

    #[test]
    fn test_drop_releases_clipboard() {
        let fake = FakeClipboard::new();
        {
            let session = ClipboardSession::open(&fake, DEFAULT_OPEN_TIMEOUT).unwrap();
            assert!(session.get(1).is_err());
        }
        assert!(!fake.is_open());
    }
}
