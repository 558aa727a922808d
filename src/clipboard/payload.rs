//! Payloads and the text/bytes negotiation rules shared by every backend.
//!
//! `paste` with default options always yields `Payload::Bytes`. Setting any of
//! `text`, `encoding` or `errors` means the caller wants `Payload::Text`,
//! whatever the clipboard's native representation is.

use std::any::Any;
use std::fmt;
use std::str::FromStr;

use super::error::{ClipboardError, Result};

/// Data read from or written to the clipboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Bytes(Vec<u8>),
    Text(String),
}

impl Payload {
    /// Empty value of the type implied by the options
    pub fn empty(options: &TransferOptions) -> Self {
        if options.wants_text() {
            Payload::Text(String::new())
        } else {
            Payload::Bytes(Vec::new())
        }
    }

    /// Accept a type-erased value, rejecting anything that is neither text nor bytes
    pub fn try_from_any<T: Any>(value: T) -> Result<Self> {
        let value: Box<dyn Any> = Box::new(value);
        let value = match value.downcast::<Payload>() {
            Ok(payload) => return Ok(*payload),
            Err(value) => value,
        };
        let value = match value.downcast::<String>() {
            Ok(text) => return Ok(Payload::Text(*text)),
            Err(value) => value,
        };
        let value = match value.downcast::<&'static str>() {
            Ok(text) => return Ok(Payload::Text((*text).to_string())),
            Err(value) => value,
        };
        let value = match value.downcast::<Vec<u8>>() {
            Ok(bytes) => return Ok(Payload::Bytes(*bytes)),
            Err(value) => value,
        };
        match value.downcast::<&'static [u8]>() {
            Ok(bytes) => Ok(Payload::Bytes(bytes.to_vec())),
            Err(_) => Err(ClipboardError::UnsupportedPayload(std::any::type_name::<T>())),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Bytes(bytes) => bytes.is_empty(),
            Payload::Text(text) => text.is_empty(),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Payload::Text(_))
    }

    /// Borrow the raw bytes (UTF-8 for text)
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Bytes(bytes) => bytes,
            Payload::Text(text) => text.as_bytes(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            Payload::Bytes(_) => None,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Payload::Bytes(bytes) => bytes,
            Payload::Text(text) => text.into_bytes(),
        }
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Bytes(bytes.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Payload {
    fn from(bytes: &[u8; N]) -> Self {
        Payload::Bytes(bytes.to_vec())
    }
}

/// Text encodings understood by the negotiator
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    #[default]
    Utf8,
    Utf16Le,
    Utf16Be,
    Latin1,
    Ascii,
}

impl Encoding {
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Utf16Le => "utf-16le",
            Encoding::Utf16Be => "utf-16be",
            Encoding::Latin1 => "latin-1",
            Encoding::Ascii => "ascii",
        }
    }

    /// Decode bytes into text, applying the error policy
    pub fn decode(self, bytes: &[u8], policy: ErrorPolicy) -> Result<String> {
        match self {
            Encoding::Utf8 => decode_utf8(bytes, policy),
            Encoding::Utf16Le => decode_utf16(bytes, policy, self, u16::from_le_bytes),
            Encoding::Utf16Be => decode_utf16(bytes, policy, self, u16::from_be_bytes),
            Encoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            Encoding::Ascii => {
                let mut out = String::with_capacity(bytes.len());
                for (position, &b) in bytes.iter().enumerate() {
                    if b.is_ascii() {
                        out.push(char::from(b));
                    } else {
                        match policy {
                            ErrorPolicy::Strict => {
                                return Err(ClipboardError::Decode {
                                    encoding: self.name(),
                                    position,
                                });
                            }
                            ErrorPolicy::Replace => out.push(char::REPLACEMENT_CHARACTER),
                            ErrorPolicy::Ignore => {}
                        }
                    }
                }
                Ok(out)
            }
        }
    }

    /// Encode text into bytes, applying the error policy
    pub fn encode(self, text: &str, policy: ErrorPolicy) -> Result<Vec<u8>> {
        match self {
            Encoding::Utf8 => Ok(text.as_bytes().to_vec()),
            Encoding::Utf16Le => Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
            Encoding::Utf16Be => Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
            Encoding::Latin1 => encode_narrow(text, policy, self, 0xFF),
            Encoding::Ascii => encode_narrow(text, policy, self, 0x7F),
        }
    }
}

impl FromStr for Encoding {
    type Err = ClipboardError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        match normalized.as_str() {
            "utf-8" | "utf8" | "u8" => Ok(Encoding::Utf8),
            "utf-16le" | "utf-16-le" | "utf16le" | "utf-16" | "utf16" => Ok(Encoding::Utf16Le),
            "utf-16be" | "utf-16-be" | "utf16be" => Ok(Encoding::Utf16Be),
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" | "l1" => Ok(Encoding::Latin1),
            "ascii" | "us-ascii" => Ok(Encoding::Ascii),
            _ => Err(ClipboardError::UnknownEncoding(s.to_string())),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How undecodable bytes or unencodable characters are handled
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    #[default]
    Strict,
    Replace,
    Ignore,
}

impl FromStr for ErrorPolicy {
    type Err = ClipboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(ErrorPolicy::Strict),
            "replace" => Ok(ErrorPolicy::Replace),
            "ignore" => Ok(ErrorPolicy::Ignore),
            _ => Err(ClipboardError::UnknownErrorPolicy(s.to_string())),
        }
    }
}

/// Per-call transfer options
///
/// Any option being set implies the caller wants text back from `paste`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TransferOptions {
    pub encoding: Option<Encoding>,
    pub text: bool,
    pub errors: Option<ErrorPolicy>,
}

impl TransferOptions {
    /// No options: `paste` returns raw bytes
    pub fn new() -> Self {
        Self::default()
    }

    /// Request text using the default encoding
    pub fn text() -> Self {
        TransferOptions {
            text: true,
            ..Self::default()
        }
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    pub fn with_errors(mut self, errors: ErrorPolicy) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn wants_text(&self) -> bool {
        self.text || self.encoding.is_some() || self.errors.is_some()
    }

    pub fn encoding_or_default(&self) -> Encoding {
        self.encoding.unwrap_or_default()
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.errors.unwrap_or_default()
    }
}

/// Shape raw clipboard bytes according to the options
pub fn negotiate_bytes(raw: Vec<u8>, options: &TransferOptions) -> Result<Payload> {
    if !options.wants_text() {
        return Ok(Payload::Bytes(raw));
    }
    options
        .encoding_or_default()
        .decode(&raw, options.policy())
        .map(Payload::Text)
}

/// Shape text read from a native text format according to the options
///
/// Without options the text goes back as UTF-8 bytes, so `paste()` yields
/// bytes regardless of how the clipboard held the data.
pub fn negotiate_text(text: String, options: &TransferOptions) -> Payload {
    if options.wants_text() {
        Payload::Text(text)
    } else {
        Payload::Bytes(text.into_bytes())
    }
}

/// Bytes to stream into a copy tool
pub fn encode_for_copy(data: &Payload, options: &TransferOptions) -> Result<Vec<u8>> {
    match data {
        Payload::Bytes(bytes) => {
            if options.encoding.is_some() {
                log::warn!(
                    "encoding specified with a bytes argument. Encoding option will be ignored"
                );
            }
            Ok(bytes.clone())
        }
        Payload::Text(text) => options
            .encoding_or_default()
            .encode(text, options.policy()),
    }
}

fn decode_utf8(bytes: &[u8], policy: ErrorPolicy) -> Result<String> {
    match policy {
        ErrorPolicy::Strict => std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|e| ClipboardError::Decode {
                encoding: Encoding::Utf8.name(),
                position: e.valid_up_to(),
            }),
        ErrorPolicy::Replace => Ok(String::from_utf8_lossy(bytes).into_owned()),
        ErrorPolicy::Ignore => Ok(bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()),
    }
}

fn decode_utf16(
    bytes: &[u8],
    policy: ErrorPolicy,
    encoding: Encoding,
    to_unit: fn([u8; 2]) -> u16,
) -> Result<String> {
    let units = bytes.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));
    let mut out = String::with_capacity(bytes.len() / 2);
    let mut position = 0;
    for decoded in char::decode_utf16(units) {
        match decoded {
            Ok(c) => {
                position += c.len_utf16() * 2;
                out.push(c);
            }
            Err(_) => {
                match policy {
                    ErrorPolicy::Strict => {
                        return Err(ClipboardError::Decode {
                            encoding: encoding.name(),
                            position,
                        });
                    }
                    ErrorPolicy::Replace => out.push(char::REPLACEMENT_CHARACTER),
                    ErrorPolicy::Ignore => {}
                }
                position += 2;
            }
        }
    }
    if bytes.len() % 2 != 0 {
        match policy {
            ErrorPolicy::Strict => {
                return Err(ClipboardError::Decode {
                    encoding: encoding.name(),
                    position: bytes.len() - 1,
                });
            }
            ErrorPolicy::Replace => out.push(char::REPLACEMENT_CHARACTER),
            ErrorPolicy::Ignore => {}
        }
    }
    Ok(out)
}

fn encode_narrow(text: &str, policy: ErrorPolicy, encoding: Encoding, max: u32) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len());
    for (position, c) in text.chars().enumerate() {
        let code = u32::from(c);
        if code <= max {
            // code fits in one byte
            out.push(code as u8);
            continue;
        }
        match policy {
            ErrorPolicy::Strict => {
                return Err(ClipboardError::Encode {
                    encoding: encoding.name(),
                    character: c,
                    position,
                });
            }
            ErrorPolicy::Replace => out.push(b'?'),
            ErrorPolicy::Ignore => {}
        }
    }
    Ok(out)
}
