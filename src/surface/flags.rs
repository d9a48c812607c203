//! Surface Flags
//!
//! Bitfield flags for window-manager state and pointer modifiers.

use bitflags::bitflags;

bitflags! {
    /// Window state as reported by the window manager
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WindowStateFlags: u32 {
        const FULLSCREEN = 1 << 0;
        const MAXIMIZED  = 1 << 1;
    }
}

impl WindowStateFlags {
    /// Whether the window manager owns the window size in this state
    pub fn is_obstructed(&self) -> bool {
        self.intersects(Self::FULLSCREEN | Self::MAXIMIZED)
    }
}

bitflags! {
    /// Modifiers held during a key or pointer event (X11 core `KeyButMask` bits)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u16 {
        const SHIFT   = 1 << 0;
        const LOCK    = 1 << 1;
        const CONTROL = 1 << 2;
        const MOD1    = 1 << 3;
        const MOD2    = 1 << 4;
        const MOD3    = 1 << 5;
        const MOD4    = 1 << 6;
        const MOD5    = 1 << 7;
        const BUTTON1 = 1 << 8;
        const BUTTON2 = 1 << 9;
        const BUTTON3 = 1 << 10;
        const BUTTON4 = 1 << 11;
        const BUTTON5 = 1 << 12;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obstruction() {
        assert!(!WindowStateFlags::empty().is_obstructed());
        assert!(WindowStateFlags::FULLSCREEN.is_obstructed());
        assert!(WindowStateFlags::MAXIMIZED.is_obstructed());
        assert!(WindowStateFlags::all().is_obstructed());
    }

    #[test]
    fn test_modifiers_from_raw_state() {
        // Shift + Button1 as delivered in an X11 event state field
        let mods = Modifiers::from_bits_truncate(0x0101);
        assert!(mods.contains(Modifiers::SHIFT));
        assert!(mods.contains(Modifiers::BUTTON1));
        assert!(!mods.contains(Modifiers::CONTROL));
    }
}
