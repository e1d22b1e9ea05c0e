//! Modified UTF-8 decoding (JVMS §4.4.7).
//!
//! Class files store strings in a variant of UTF-8: `U+0000` is encoded as the two bytes
//! `C0 80`, and supplementary characters are encoded as a surrogate pair whose halves are
//! each encoded with three bytes. Four-byte sequences never occur.

use crate::Result;

/// Decode a modified UTF-8 byte string.
///
/// # Errors
/// Returns a malformed error for truncated sequences, invalid lead bytes, raw zero bytes or
/// unpaired surrogates.
pub fn decode(bytes: &[u8]) -> Result<String> {
    if bytes.iter().all(|&b| b != 0 && b < 0x80) {
        // Plain ASCII is the overwhelmingly common case for names and descriptors
        return match std::str::from_utf8(bytes) {
            Ok(text) => Ok(text.to_string()),
            Err(_) => Err(malformed_error!("Invalid ASCII in Utf8 constant")),
        };
    }

    let mut units = Vec::with_capacity(bytes.len());
    let mut pos = 0;
    while pos < bytes.len() {
        let lead = bytes[pos];
        match lead {
            0x01..=0x7F => {
                units.push(u16::from(lead));
                pos += 1;
            }
            0xC0..=0xDF => {
                let b1 = continuation(bytes, pos + 1)?;
                units.push((u16::from(lead & 0x1F) << 6) | u16::from(b1));
                pos += 2;
            }
            0xE0..=0xEF => {
                let b1 = continuation(bytes, pos + 1)?;
                let b2 = continuation(bytes, pos + 2)?;
                units.push(
                    (u16::from(lead & 0x0F) << 12) | (u16::from(b1) << 6) | u16::from(b2),
                );
                pos += 3;
            }
            _ => {
                return Err(malformed_error!(
                    "Invalid modified UTF-8 lead byte 0x{:02X} at {}",
                    lead,
                    pos
                ))
            }
        }
    }

    String::from_utf16(&units).map_err(|_| malformed_error!("Unpaired surrogate in Utf8 constant"))
}

/// Payload bits of the continuation byte at `pos`.
fn continuation(bytes: &[u8], pos: usize) -> Result<u8> {
    match bytes.get(pos) {
        Some(&b) if b & 0xC0 == 0x80 => Ok(b & 0x3F),
        Some(&b) => Err(malformed_error!(
            "Invalid modified UTF-8 continuation byte 0x{:02X} at {}",
            b,
            pos
        )),
        None => Err(malformed_error!("Truncated modified UTF-8 sequence")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii() {
        assert_eq!(decode(b"java/lang/Object").unwrap(), "java/lang/Object");
        assert_eq!(decode(b"").unwrap(), "");
    }

    #[test]
    fn embedded_nul() {
        assert_eq!(decode(&[b'a', 0xC0, 0x80, b'b']).unwrap(), "a\u{0}b");
        assert!(decode(&[b'a', 0x00]).is_err());
    }

    #[test]
    fn two_and_three_byte() {
        // é (U+00E9), € (U+20AC)
        assert_eq!(decode(&[0xC3, 0xA9]).unwrap(), "é");
        assert_eq!(decode(&[0xE2, 0x82, 0xAC]).unwrap(), "€");
    }

    #[test]
    fn surrogate_pair() {
        // U+1F600 as D83D DE00, each half three-byte encoded
        let bytes = [0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80];
        assert_eq!(decode(&bytes).unwrap(), "\u{1F600}");

        // lone high surrogate
        assert!(decode(&bytes[..3]).is_err());
    }

    #[test]
    fn malformed() {
        assert!(decode(&[0xC3]).is_err());
        assert!(decode(&[0xE2, 0x82]).is_err());
        assert!(decode(&[0xC3, 0x41]).is_err());
        assert!(decode(&[0xF0, 0x9F, 0x98, 0x80]).is_err());
    }
}
