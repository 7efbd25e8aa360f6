//! Source text encoding detection.
//!
//! Statement files are either UTF-8 or a single-byte legacy charset. Anything
//! that is not valid UTF-8 is read as Latin-1, which maps every byte and so
//! never fails.

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
}

pub fn detect_encoding(bytes: &[u8]) -> TextEncoding {
    match std::str::from_utf8(bytes) {
        Ok(_) => TextEncoding::Utf8,
        Err(_) => TextEncoding::Latin1,
    }
}

/// Decodes `bytes` with the detected encoding.
pub fn decode(bytes: &[u8]) -> (String, TextEncoding) {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let encoding = detect_encoding(bytes);
    let text = match encoding {
        TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        TextEncoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
    };

    tracing::debug!(?encoding, len = bytes.len(), "decoded statement bytes");
    (text, encoding)
}
