//! Codepage decoding for 8-bit strings in legacy records.
//!
//! BIFF and PowerPoint records store "compressed" strings as single bytes in
//! the document codepage. The codepage is carried by the parse context; this
//! module maps Windows codepage identifiers onto `encoding_rs` encodings.

use encoding_rs::Encoding;

/// Codepage assumed when a document does not declare one.
pub const DEFAULT_CODEPAGE: u16 = 1252;

/// Decode bytes using the specified Windows codepage.
///
/// Unknown codepages fall back to Windows-1252 with a warning; decoding never
/// fails, malformed sequences become U+FFFD.
///
/// # Examples
///
/// ```
/// use oleparse::ole::codepage::decode_ansi;
///
/// assert_eq!(decode_ansi(b"Caf\xE9", 1252), "Café");
/// assert_eq!(decode_ansi(b"\x82\xA0", 932), "あ");
/// ```
pub fn decode_ansi(bytes: &[u8], codepage: u16) -> String {
    let encoding = codepage_to_encoding(codepage).unwrap_or_else(|| {
        log::warn!(
            "unsupported codepage {}, decoding as Windows-1252",
            codepage
        );
        encoding_rs::WINDOWS_1252
    });
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    text.into_owned()
}

/// Map a Windows codepage identifier to an `encoding_rs` encoding.
///
/// BIFF CODEPAGE records use 1200 for "UTF-16" files; their compressed strings
/// are plain Latin-1, so 1200 maps to Windows-1252 here.
#[inline]
pub fn codepage_to_encoding(codepage: u16) -> Option<&'static Encoding> {
    match codepage {
        // DOS codepages
        437 | 850 => Some(encoding_rs::WINDOWS_1252),
        866 => Some(encoding_rs::IBM866),

        // Windows codepages (Western scripts)
        874 => Some(encoding_rs::WINDOWS_874),
        1200 | 1252 | 32769 => Some(encoding_rs::WINDOWS_1252),
        1250 => Some(encoding_rs::WINDOWS_1250),
        1251 => Some(encoding_rs::WINDOWS_1251),
        1253 => Some(encoding_rs::WINDOWS_1253),
        1254 => Some(encoding_rs::WINDOWS_1254),
        1255 => Some(encoding_rs::WINDOWS_1255),
        1256 => Some(encoding_rs::WINDOWS_1256),
        1257 => Some(encoding_rs::WINDOWS_1257),
        1258 => Some(encoding_rs::WINDOWS_1258),

        // East Asian codepages
        932 => Some(encoding_rs::SHIFT_JIS),
        936 => Some(encoding_rs::GBK),
        949 => Some(encoding_rs::EUC_KR),
        950 => Some(encoding_rs::BIG5),
        54936 => Some(encoding_rs::GB18030),

        // Macintosh
        10000 | 32768 => Some(encoding_rs::MACINTOSH),
        10007 => Some(encoding_rs::X_MAC_CYRILLIC),

        65001 => Some(encoding_rs::UTF_8),

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ascii() {
        assert_eq!(decode_ansi(b"Hello, World!", 1252), "Hello, World!");
    }

    #[test]
    fn test_biff_utf16_marker_is_latin1() {
        assert_eq!(decode_ansi(b"\xC0", 1200), "À");
    }

    #[test]
    fn test_unsupported_codepage_falls_back() {
        assert_eq!(decode_ansi(b"\xE9", 4242), "é");
        assert!(codepage_to_encoding(4242).is_none());
    }

    #[test]
    fn test_common_codepages() {
        assert!(codepage_to_encoding(1251).is_some());
        assert!(codepage_to_encoding(932).is_some());
        assert!(codepage_to_encoding(65001).is_some());
    }
}
