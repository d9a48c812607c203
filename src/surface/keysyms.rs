//! Keysyms
//!
//! X11 keysym constants used by the input normalizer, and the keycode to
//! keysym table fetched from the server at startup.

use crate::surface::Modifiers;

pub const NO_SYMBOL: u32 = 0;

pub const XK_BACKSPACE: u32 = 0xff08;
pub const XK_LEFT: u32 = 0xff51;
pub const XK_UP: u32 = 0xff52;
pub const XK_RIGHT: u32 = 0xff53;
pub const XK_DOWN: u32 = 0xff54;
pub const XK_PAGE_UP: u32 = 0xff55;
pub const XK_PAGE_DOWN: u32 = 0xff56;
pub const XK_KP_ADD: u32 = 0xffab;
pub const XK_KP_SUBTRACT: u32 = 0xffad;

/// Keycode to keysym table (`GetKeyboardMapping` reply)
#[derive(Debug, Clone)]
pub struct KeyboardMapping {
    min_keycode: u8,
    keysyms_per_keycode: u8,
    keysyms: Vec<u32>,
}

impl KeyboardMapping {
    pub fn new(min_keycode: u8, keysyms_per_keycode: u8, keysyms: Vec<u32>) -> Self {
        Self {
            min_keycode,
            keysyms_per_keycode,
            keysyms,
        }
    }

    /// Resolve a keycode using the first keysym group.
    ///
    /// With shift held the second column is used; when that column is empty
    /// lowercase Latin letters fall back to their uppercase form (core protocol
    /// rule for single-keysym groups). Caps Lock uppercases Latin letters and
    /// leaves everything else alone.
    pub fn lookup(&self, keycode: u8, modifiers: Modifiers) -> Option<u32> {
        if keycode < self.min_keycode || self.keysyms_per_keycode == 0 {
            return None;
        }

        let base = usize::from(keycode - self.min_keycode) * usize::from(self.keysyms_per_keycode);
        let unshifted = *self.keysyms.get(base)?;
        if unshifted == NO_SYMBOL {
            return None;
        }

        let keysym = if modifiers.contains(Modifiers::SHIFT) {
            let shifted = if self.keysyms_per_keycode > 1 {
                self.keysyms.get(base + 1).copied().unwrap_or(NO_SYMBOL)
            } else {
                NO_SYMBOL
            };
            if shifted != NO_SYMBOL { shifted } else { to_upper_latin(unshifted) }
        } else {
            unshifted
        };

        if modifiers.contains(Modifiers::LOCK) {
            Some(to_upper_latin(keysym))
        } else {
            Some(keysym)
        }
    }
}

fn to_upper_latin(keysym: u32) -> u32 {
    if (u32::from(b'a')..=u32::from(b'z')).contains(&keysym) {
        keysym - 0x20
    } else {
        keysym
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> KeyboardMapping {
        // keycode 8: 'a'/'A', keycode 9: '1'/'!', keycode 10: 'q' only, keycode 11: Left
        KeyboardMapping::new(
            8,
            2,
            vec![
                u32::from(b'a'), u32::from(b'A'),
                u32::from(b'1'), u32::from(b'!'),
                u32::from(b'q'), NO_SYMBOL,
                XK_LEFT, NO_SYMBOL,
                NO_SYMBOL, NO_SYMBOL,
            ],
        )
    }

    #[test]
    fn test_lookup_unshifted_and_shifted() {
        let map = mapping();
        assert_eq!(map.lookup(8, Modifiers::empty()), Some(u32::from(b'a')));
        assert_eq!(map.lookup(8, Modifiers::SHIFT), Some(u32::from(b'A')));
        assert_eq!(map.lookup(9, Modifiers::SHIFT), Some(u32::from(b'!')));
    }

    #[test]
    fn test_lookup_single_column_letter_uppercases() {
        let map = mapping();
        assert_eq!(map.lookup(10, Modifiers::SHIFT), Some(u32::from(b'Q')));
        assert_eq!(map.lookup(11, Modifiers::SHIFT), Some(XK_LEFT));
    }

    #[test]
    fn test_lookup_caps_lock_uppercases_letters_only() {
        let map = mapping();
        assert_eq!(map.lookup(8, Modifiers::LOCK), Some(u32::from(b'A')));
        assert_eq!(map.lookup(10, Modifiers::LOCK), Some(u32::from(b'Q')));
        assert_eq!(map.lookup(9, Modifiers::LOCK), Some(u32::from(b'1')));
        assert_eq!(map.lookup(11, Modifiers::LOCK), Some(XK_LEFT));
        assert_eq!(map.lookup(8, Modifiers::LOCK | Modifiers::SHIFT), Some(u32::from(b'A')));
        assert_eq!(map.lookup(9, Modifiers::LOCK | Modifiers::SHIFT), Some(u32::from(b'!')));
    }

    #[test]
    fn test_lookup_out_of_range() {
        let map = mapping();
        assert_eq!(map.lookup(7, Modifiers::empty()), None);
        assert_eq!(map.lookup(12, Modifiers::empty()), None);
        assert_eq!(map.lookup(200, Modifiers::empty()), None);
    }
}
