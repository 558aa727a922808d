//! anyclip - cross-platform clipboard access for text and binary data
//!
//! ```no_run
//! use anyclip::{Payload, TransferOptions};
//!
//! anyclip::copy("hello")?;
//! assert_eq!(anyclip::paste()?, Payload::Bytes(b"hello".to_vec()));
//! assert_eq!(anyclip::paste_with(&TransferOptions::text())?, Payload::from("hello"));
//! anyclip::clear()?;
//! # Ok::<(), anyclip::ClipboardError>(())
//! ```

pub mod clipboard;
pub mod config;
pub mod logging;

pub use clipboard::{
    ClipboardBackend, ClipboardError, Encoding, ErrorPolicy, Payload, SetupError, TransferOptions,
    clear, copy, copy_with, default_clipboard, paste, paste_with,
};
