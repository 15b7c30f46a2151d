//! Android `KeyEvent` key codes, as accepted by `input keyevent`.

/// A numeric Android key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AndroidKeyCode(pub u16);

impl AndroidKeyCode {
    pub const HOME: Self = Self(3);
    pub const BACK: Self = Self(4);
    pub const DIGIT_0: Self = Self(7);
    pub const DPAD_UP: Self = Self(19);
    pub const DPAD_DOWN: Self = Self(20);
    pub const DPAD_LEFT: Self = Self(21);
    pub const DPAD_RIGHT: Self = Self(22);
    pub const VOLUME_UP: Self = Self(24);
    pub const VOLUME_DOWN: Self = Self(25);
    pub const POWER: Self = Self(26);
    pub const A: Self = Self(29);
    pub const Z: Self = Self(54);
    pub const ENTER: Self = Self(66);
    pub const DEL: Self = Self(67);
    pub const MENU: Self = Self(82);
    pub const APP_SWITCH: Self = Self(187);
}
