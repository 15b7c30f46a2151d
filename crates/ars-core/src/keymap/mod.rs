//! Translation from host keys to Android key codes.
//!
//! Letters and digits map by offset arithmetic (`a`/`A` → 29 … `z`/`Z` → 54,
//! `0` → 7 … `9` → 16).  Everything else goes through an explicit table.
//! Keys with no Android counterpart map to `None` and are dropped by the
//! input dispatcher.

pub mod android;

use std::str::FromStr;

pub use android::AndroidKeyCode;

/// A host key as reported by the viewer surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolicKey {
    /// A typed character.
    Char(char),
    Enter,
    Escape,
    Home,
    Backspace,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Power,
    VolumeUp,
    VolumeDown,
    Menu,
    AppSwitch,
}

/// Error returned when a key name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key name: {0}")]
pub struct UnknownKeyName(pub String);

impl FromStr for SymbolicKey {
    type Err = UnknownKeyName;

    /// Parses names such as `enter`, `back`, `up`, or a single character.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(SymbolicKey::Char(c));
        }
        let key = match s.to_ascii_lowercase().as_str() {
            "enter" | "return" => SymbolicKey::Enter,
            "escape" | "esc" | "back" => SymbolicKey::Escape,
            "home" => SymbolicKey::Home,
            "backspace" | "del" | "delete" => SymbolicKey::Backspace,
            "up" => SymbolicKey::ArrowUp,
            "down" => SymbolicKey::ArrowDown,
            "left" => SymbolicKey::ArrowLeft,
            "right" => SymbolicKey::ArrowRight,
            "power" => SymbolicKey::Power,
            "volume-up" | "volup" => SymbolicKey::VolumeUp,
            "volume-down" | "voldown" => SymbolicKey::VolumeDown,
            "menu" => SymbolicKey::Menu,
            "app-switch" | "recents" => SymbolicKey::AppSwitch,
            _ => return Err(UnknownKeyName(s.to_string())),
        };
        Ok(key)
    }
}

/// Unified key mapper.
pub struct KeyMapper;

impl KeyMapper {
    /// Translates a host key to an Android key code.
    ///
    /// Returns `None` if the key has no mapping.
    pub fn to_android(key: SymbolicKey) -> Option<AndroidKeyCode> {
        match key {
            SymbolicKey::Char(c) => Self::char_to_android(c),
            SymbolicKey::Enter => Some(AndroidKeyCode::ENTER),
            SymbolicKey::Escape => Some(AndroidKeyCode::BACK),
            SymbolicKey::Home => Some(AndroidKeyCode::HOME),
            SymbolicKey::Backspace => Some(AndroidKeyCode::DEL),
            SymbolicKey::ArrowUp => Some(AndroidKeyCode::DPAD_UP),
            SymbolicKey::ArrowDown => Some(AndroidKeyCode::DPAD_DOWN),
            SymbolicKey::ArrowLeft => Some(AndroidKeyCode::DPAD_LEFT),
            SymbolicKey::ArrowRight => Some(AndroidKeyCode::DPAD_RIGHT),
            SymbolicKey::Power => Some(AndroidKeyCode::POWER),
            SymbolicKey::VolumeUp => Some(AndroidKeyCode::VOLUME_UP),
            SymbolicKey::VolumeDown => Some(AndroidKeyCode::VOLUME_DOWN),
            SymbolicKey::Menu => Some(AndroidKeyCode::MENU),
            SymbolicKey::AppSwitch => Some(AndroidKeyCode::APP_SWITCH),
        }
    }

    /// Translates a typed character.  Only ASCII letters and digits map.
    pub fn char_to_android(c: char) -> Option<AndroidKeyCode> {
        match c {
            'a'..='z' => Some(offset(AndroidKeyCode::A, c as u8 - b'a')),
            'A'..='Z' => Some(offset(AndroidKeyCode::A, c as u8 - b'A')),
            '0'..='9' => Some(offset(AndroidKeyCode::DIGIT_0, c as u8 - b'0')),
            _ => None,
        }
    }
}

fn offset(base: AndroidKeyCode, by: u8) -> AndroidKeyCode {
    AndroidKeyCode(base.0 + by as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_map_by_offset_case_insensitively() {
        assert_eq!(KeyMapper::char_to_android('a'), Some(AndroidKeyCode::A));
        assert_eq!(KeyMapper::char_to_android('Z'), Some(AndroidKeyCode::Z));
        assert_eq!(KeyMapper::char_to_android('m'), Some(AndroidKeyCode(41)));
        assert_eq!(KeyMapper::char_to_android('M'), Some(AndroidKeyCode(41)));
    }

    #[test]
    fn test_digits_map_by_offset() {
        assert_eq!(KeyMapper::char_to_android('0'), Some(AndroidKeyCode(7)));
        assert_eq!(KeyMapper::char_to_android('9'), Some(AndroidKeyCode(16)));
    }

    #[test]
    fn test_navigation_table() {
        assert_eq!(KeyMapper::to_android(SymbolicKey::Enter), Some(AndroidKeyCode(66)));
        assert_eq!(KeyMapper::to_android(SymbolicKey::Escape), Some(AndroidKeyCode(4)));
        assert_eq!(KeyMapper::to_android(SymbolicKey::Home), Some(AndroidKeyCode(3)));
        assert_eq!(KeyMapper::to_android(SymbolicKey::Backspace), Some(AndroidKeyCode(67)));
        assert_eq!(KeyMapper::to_android(SymbolicKey::ArrowUp), Some(AndroidKeyCode(19)));
        assert_eq!(KeyMapper::to_android(SymbolicKey::ArrowDown), Some(AndroidKeyCode(20)));
        assert_eq!(KeyMapper::to_android(SymbolicKey::ArrowLeft), Some(AndroidKeyCode(21)));
        assert_eq!(KeyMapper::to_android(SymbolicKey::ArrowRight), Some(AndroidKeyCode(22)));
    }

    #[test]
    fn test_unmapped_characters_return_none() {
        assert_eq!(KeyMapper::char_to_android('é'), None);
        assert_eq!(KeyMapper::char_to_android(' '), None);
        assert_eq!(KeyMapper::to_android(SymbolicKey::Char('#')), None);
    }

    #[test]
    fn test_parse_key_names() {
        assert_eq!("Enter".parse::<SymbolicKey>(), Ok(SymbolicKey::Enter));
        assert_eq!("back".parse::<SymbolicKey>(), Ok(SymbolicKey::Escape));
        assert_eq!("q".parse::<SymbolicKey>(), Ok(SymbolicKey::Char('q')));
        assert!("hyperspace".parse::<SymbolicKey>().is_err());
    }
}
