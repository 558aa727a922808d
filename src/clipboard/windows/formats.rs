//! Predefined clipboard format ids and the format selection rules.

pub const CF_TEXT: u32 = 1;
pub const CF_BITMAP: u32 = 2;
pub const CF_METAFILEPICT: u32 = 3;
pub const CF_SYLK: u32 = 4;
pub const CF_DIF: u32 = 5;
pub const CF_TIFF: u32 = 6;
pub const CF_OEMTEXT: u32 = 7;
pub const CF_DIB: u32 = 8;
pub const CF_PALETTE: u32 = 9;
pub const CF_PENDATA: u32 = 10;
pub const CF_RIFF: u32 = 11;
pub const CF_WAVE: u32 = 12;
pub const CF_UNICODETEXT: u32 = 13;
pub const CF_ENHMETAFILE: u32 = 14;
pub const CF_HDROP: u32 = 15;
pub const CF_LOCALE: u32 = 16;
pub const CF_DIBV5: u32 = 17;
pub const CF_OWNERDISPLAY: u32 = 0x0080;
pub const CF_DSPTEXT: u32 = 0x0081;
pub const CF_DSPBITMAP: u32 = 0x0082;
pub const CF_DSPMETAFILEPICT: u32 = 0x0083;
pub const CF_DSPENHMETAFILE: u32 = 0x008E;

/// Format byte payloads are staged under. Written with one trailing NUL
/// byte that `paste` strips again.
pub const BINARY_FORMAT: u32 = CF_RIFF;

/// NUL-terminated text formats
pub const TEXT_FORMATS: [u32; 4] = [CF_TEXT, CF_UNICODETEXT, CF_DSPTEXT, CF_OEMTEXT];

/// Every format `paste` knows how to decode
pub const IMPLEMENTED_FORMATS: [u32; 6] = [
    CF_HDROP,
    BINARY_FORMAT,
    CF_TEXT,
    CF_UNICODETEXT,
    CF_DSPTEXT,
    CF_OEMTEXT,
];

const PREDEFINED: &[(u32, &str)] = &[
    (CF_TEXT, "CF_TEXT"),
    (CF_BITMAP, "CF_BITMAP"),
    (CF_METAFILEPICT, "CF_METAFILEPICT"),
    (CF_SYLK, "CF_SYLK"),
    (CF_DIF, "CF_DIF"),
    (CF_TIFF, "CF_TIFF"),
    (CF_OEMTEXT, "CF_OEMTEXT"),
    (CF_DIB, "CF_DIB"),
    (CF_PALETTE, "CF_PALETTE"),
    (CF_PENDATA, "CF_PENDATA"),
    (CF_RIFF, "CF_RIFF"),
    (CF_WAVE, "CF_WAVE"),
    (CF_UNICODETEXT, "CF_UNICODETEXT"),
    (CF_ENHMETAFILE, "CF_ENHMETAFILE"),
    (CF_HDROP, "CF_HDROP"),
    (CF_LOCALE, "CF_LOCALE"),
    (CF_DIBV5, "CF_DIBV5"),
    (CF_OWNERDISPLAY, "CF_OWNERDISPLAY"),
    (CF_DSPTEXT, "CF_DSPTEXT"),
    (CF_DSPBITMAP, "CF_DSPBITMAP"),
    (CF_DSPMETAFILEPICT, "CF_DSPMETAFILEPICT"),
    (CF_DSPENHMETAFILE, "CF_DSPENHMETAFILE"),
];

/// Name of a predefined format, `None` for registered formats
pub fn predefined_name(format: u32) -> Option<&'static str> {
    PREDEFINED
        .iter()
        .find(|(id, _)| *id == format)
        .map(|(_, name)| *name)
}

pub fn is_text_format(format: u32) -> bool {
    TEXT_FORMATS.contains(&format)
}

pub fn is_implemented(format: u32) -> bool {
    IMPLEMENTED_FORMATS.contains(&format)
}

/// Best-effort pick when the first format is not one we read directly:
/// the numerically largest implemented format on offer.
pub fn select_fallback(available: &[u32]) -> Option<u32> {
    available.iter().copied().filter(|f| is_implemented(*f)).max()
}
