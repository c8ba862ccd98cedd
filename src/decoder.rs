//! Incremental UTF-8 decoder
//!
//! The PTY delivers bytes in arbitrary chunks, so a multi-byte sequence can
//! be split across reads. The decoder is fed one byte at a time and carries
//! partial state between calls. Decoding is structural only: it assembles
//! codepoint values from lead and continuation bytes without range-checking
//! the result; the screen layer owns the validity check for what it is asked
//! to print.

/// Outcome of feeding one byte to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// The byte extended a sequence still in progress.
    None,
    /// The byte completed a codepoint.
    Codepoint(u32),
    /// The byte was not valid at this position. The decoder has discarded
    /// it and reset; callers log and move on.
    Invalid,
}

/// Streaming UTF-8 decoder. One instance per byte stream.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    /// Codepoint bits accumulated so far.
    acc: u32,
    /// Continuation bytes still expected.
    pending: u8,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte. A byte that is invalid mid-sequence loses both the
    /// partial sequence and itself, matching the usual "skip one byte and
    /// resynchronize" recovery for malformed input.
    pub fn feed(&mut self, byte: u8) -> Decoded {
        if self.pending > 0 {
            if byte & 0xc0 == 0x80 {
                self.acc = (self.acc << 6) | u32::from(byte & 0x3f);
                self.pending -= 1;
                if self.pending == 0 {
                    return Decoded::Codepoint(self.acc);
                }
                return Decoded::None;
            }
            self.pending = 0;
            return Decoded::Invalid;
        }
        match byte {
            0x00..=0x7f => Decoded::Codepoint(u32::from(byte)),
            0xc0..=0xdf => {
                self.acc = u32::from(byte & 0x1f);
                self.pending = 1;
                Decoded::None
            }
            0xe0..=0xef => {
                self.acc = u32::from(byte & 0x0f);
                self.pending = 2;
                Decoded::None
            }
            0xf0..=0xf7 => {
                self.acc = u32::from(byte & 0x07);
                self.pending = 3;
                Decoded::None
            }
            // Stray continuation byte or invalid lead.
            _ => Decoded::Invalid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(decoder: &mut Utf8Decoder, bytes: &[u8]) -> Vec<Decoded> {
        bytes.iter().map(|&b| decoder.feed(b)).collect()
    }

    fn codepoints(bytes: &[u8]) -> Vec<u32> {
        let mut d = Utf8Decoder::new();
        decode_all(&mut d, bytes)
            .into_iter()
            .filter_map(|r| match r {
                Decoded::Codepoint(cp) => Some(cp),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_ascii_passthrough() {
        assert_eq!(codepoints(b"Hi!"), vec![0x48, 0x69, 0x21]);
    }

    #[test]
    fn test_multibyte_sequences() {
        // 2, 3, and 4 byte encodings
        assert_eq!(codepoints("é".as_bytes()), vec![0xe9]);
        assert_eq!(codepoints("€".as_bytes()), vec![0x20ac]);
        assert_eq!(codepoints("🦀".as_bytes()), vec![0x1f980]);
    }

    #[test]
    fn test_sequence_split_across_feeds() {
        let mut d = Utf8Decoder::new();
        let bytes = "€".as_bytes(); // e2 82 ac
        assert_eq!(d.feed(bytes[0]), Decoded::None);
        assert_eq!(d.feed(bytes[1]), Decoded::None);
        assert_eq!(d.feed(bytes[2]), Decoded::Codepoint(0x20ac));
    }

    #[test]
    fn test_stray_continuation_byte() {
        let mut d = Utf8Decoder::new();
        assert_eq!(d.feed(0x80), Decoded::Invalid);
        // Decoder resynchronizes immediately
        assert_eq!(d.feed(b'a'), Decoded::Codepoint(b'a' as u32));
    }

    #[test]
    fn test_truncated_sequence_then_ascii() {
        let mut d = Utf8Decoder::new();
        assert_eq!(d.feed(0xe2), Decoded::None);
        // ASCII where a continuation byte was expected drops the partial
        // sequence and the offending byte
        assert_eq!(d.feed(b'x'), Decoded::Invalid);
        assert_eq!(d.feed(b'y'), Decoded::Codepoint(b'y' as u32));
    }

    #[test]
    fn test_invalid_lead_byte() {
        let mut d = Utf8Decoder::new();
        assert_eq!(d.feed(0xff), Decoded::Invalid);
        assert_eq!(d.feed(0xf8), Decoded::Invalid);
    }

    #[test]
    fn test_mixed_stream() {
        let mut input = b"a".to_vec();
        input.push(0xff);
        input.extend_from_slice("ñ".as_bytes());
        input.push(b'z');
        assert_eq!(codepoints(&input), vec![b'a' as u32, 0xf1, b'z' as u32]);
    }
}
