//! Keyboard input encoding
//!
//! Translates key events from the embedding UI into the byte sequences a
//! terminal sends its child: plain UTF-8 for text, C0 controls for the
//! edit keys, and CSI arrows.

/// A key event as delivered by the embedding UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Up,
    Down,
    Left,
    Right,
}

/// Modifier state for a key event. Shift is assumed to already be applied
/// to `Key::Char`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
    };

    pub fn ctrl() -> Self {
        Modifiers {
            ctrl: true,
            alt: false,
        }
    }
}

/// Encode a key event as the bytes to write to the PTY master. Returns an
/// empty vector for combinations that have no terminal encoding.
pub fn encode_key(key: Key, mods: Modifiers) -> Vec<u8> {
    let mut bytes = Vec::new();
    if mods.alt {
        bytes.push(0x1b);
    }
    match key {
        Key::Char(c) if mods.ctrl => match c.to_ascii_lowercase() {
            // Ctrl+A .. Ctrl+Z map onto the C0 range
            c @ 'a'..='z' => bytes.push(c as u8 - b'a' + 1),
            _ => return Vec::new(),
        },
        Key::Char(c) => {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
        }
        Key::Enter => bytes.push(b'\r'),
        Key::Tab => bytes.push(b'\t'),
        Key::Backspace => bytes.push(0x08),
        Key::Escape => bytes.push(0x1b),
        Key::Up => bytes.extend_from_slice(b"\x1b[A"),
        Key::Down => bytes.extend_from_slice(b"\x1b[B"),
        Key::Right => bytes.extend_from_slice(b"\x1b[C"),
        Key::Left => bytes.extend_from_slice(b"\x1b[D"),
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_chars_are_utf8() {
        assert_eq!(encode_key(Key::Char('a'), Modifiers::NONE), b"a");
        assert_eq!(
            encode_key(Key::Char('é'), Modifiers::NONE),
            "é".as_bytes()
        );
    }

    #[test]
    fn test_ctrl_letters_map_to_c0() {
        assert_eq!(encode_key(Key::Char('a'), Modifiers::ctrl()), vec![1]);
        assert_eq!(encode_key(Key::Char('C'), Modifiers::ctrl()), vec![3]);
        assert_eq!(encode_key(Key::Char('z'), Modifiers::ctrl()), vec![26]);
    }

    #[test]
    fn test_ctrl_non_letter_has_no_encoding() {
        assert!(encode_key(Key::Char('!'), Modifiers::ctrl()).is_empty());
    }

    #[test]
    fn test_edit_keys() {
        assert_eq!(encode_key(Key::Enter, Modifiers::NONE), b"\r");
        assert_eq!(encode_key(Key::Tab, Modifiers::NONE), b"\t");
        assert_eq!(encode_key(Key::Backspace, Modifiers::NONE), vec![0x08]);
        assert_eq!(encode_key(Key::Escape, Modifiers::NONE), vec![0x1b]);
    }

    #[test]
    fn test_arrow_keys() {
        assert_eq!(encode_key(Key::Up, Modifiers::NONE), b"\x1b[A");
        assert_eq!(encode_key(Key::Down, Modifiers::NONE), b"\x1b[B");
        assert_eq!(encode_key(Key::Right, Modifiers::NONE), b"\x1b[C");
        assert_eq!(encode_key(Key::Left, Modifiers::NONE), b"\x1b[D");
    }

    #[test]
    fn test_alt_prefixes_escape() {
        let mods = Modifiers {
            ctrl: false,
            alt: true,
        };
        assert_eq!(encode_key(Key::Char('f'), mods), b"\x1bf");
    }
}
