//! EWMH (Extended Window Manager Hints), client side
//!
//! The atoms and requests a managed top-level window needs to talk to the
//! window manager: state changes, close requests, title, opacity, decorations.

use tracing::debug;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::wrapper::ConnectionExt as _;

use crate::error::Result;
use crate::surface::WindowStateFlags;

/// `_NET_WM_STATE` client message actions
const NET_WM_STATE_REMOVE: u32 = 0;
const NET_WM_STATE_ADD: u32 = 1;

/// Source indication for client messages: normal application
const SOURCE_APPLICATION: u32 = 1;

/// `_MOTIF_WM_HINTS` flag saying the decorations field is valid
const MWM_HINTS_DECORATIONS: u32 = 1 << 1;

/// Holds all interned atoms
#[derive(Debug)]
pub struct Atoms {
    pub wm_protocols: Atom,
    pub wm_delete_window: Atom,
    pub net_wm_state: Atom,
    pub net_wm_state_fullscreen: Atom,
    pub net_wm_state_maximized_vert: Atom,
    pub net_wm_state_maximized_horz: Atom,
    pub net_active_window: Atom,
    pub net_wm_name: Atom,
    pub net_wm_pid: Atom,
    pub net_wm_window_opacity: Atom,
    pub motif_wm_hints: Atom,
    pub utf8_string: Atom,
}

impl Atoms {
    /// Intern all required atoms
    pub fn new<C: Connection>(conn: &C) -> Result<Self> {
        let intern = |name: &str| -> Result<Atom> {
            Ok(conn.intern_atom(false, name.as_bytes())?.reply()?.atom)
        };

        Ok(Self {
            wm_protocols: intern("WM_PROTOCOLS")?,
            wm_delete_window: intern("WM_DELETE_WINDOW")?,
            net_wm_state: intern("_NET_WM_STATE")?,
            net_wm_state_fullscreen: intern("_NET_WM_STATE_FULLSCREEN")?,
            net_wm_state_maximized_vert: intern("_NET_WM_STATE_MAXIMIZED_VERT")?,
            net_wm_state_maximized_horz: intern("_NET_WM_STATE_MAXIMIZED_HORZ")?,
            net_active_window: intern("_NET_ACTIVE_WINDOW")?,
            net_wm_name: intern("_NET_WM_NAME")?,
            net_wm_pid: intern("_NET_WM_PID")?,
            net_wm_window_opacity: intern("_NET_WM_WINDOW_OPACITY")?,
            motif_wm_hints: intern("_MOTIF_WM_HINTS")?,
            utf8_string: intern("UTF8_STRING")?,
        })
    }

    /// Read `_NET_WM_STATE` and fold it into [`WindowStateFlags`].
    ///
    /// Maximized requires both the vertical and horizontal atoms, matching
    /// how toolkits report it.
    pub fn get_window_state<C: Connection>(&self, conn: &C, window: Window) -> Result<WindowStateFlags> {
        let reply = conn
            .get_property(false, window, self.net_wm_state, AtomEnum::ATOM, 0, 1024)?
            .reply()?;

        let mut flags = WindowStateFlags::empty();
        let (mut vert, mut horz) = (false, false);
        if let Some(value32) = reply.value32() {
            for atom in value32 {
                if atom == self.net_wm_state_fullscreen {
                    flags |= WindowStateFlags::FULLSCREEN;
                } else if atom == self.net_wm_state_maximized_vert {
                    vert = true;
                } else if atom == self.net_wm_state_maximized_horz {
                    horz = true;
                }
            }
        }
        if vert && horz {
            flags |= WindowStateFlags::MAXIMIZED;
        }
        Ok(flags)
    }

    /// Ask the window manager to add or remove up to two state atoms on a
    /// mapped window
    pub fn request_window_state<C: Connection>(
        &self,
        conn: &C,
        root: Window,
        window: Window,
        add: bool,
        first: Atom,
        second: Atom,
    ) -> Result<()> {
        let action = if add { NET_WM_STATE_ADD } else { NET_WM_STATE_REMOVE };
        let event = ClientMessageEvent::new(
            32,
            window,
            self.net_wm_state,
            [action, first, second, SOURCE_APPLICATION, 0],
        );

        conn.send_event(
            false,
            root,
            EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY,
            event,
        )?;
        conn.flush()?;
        debug!("Requested _NET_WM_STATE {} {} {} on window {}", action, first, second, window);
        Ok(())
    }

    /// Rewrite `_NET_WM_STATE` directly. Only valid before the window is
    /// mapped; the window manager reads it as the initial state.
    pub fn set_initial_window_state<C: Connection>(
        &self,
        conn: &C,
        window: Window,
        add: &[Atom],
        remove: &[Atom],
    ) -> Result<()> {
        let mut states: Vec<Atom> = conn
            .get_property(false, window, self.net_wm_state, AtomEnum::ATOM, 0, 1024)?
            .reply()?
            .value32()
            .map(|values| values.collect())
            .unwrap_or_default();

        states.retain(|atom| !remove.contains(atom));
        for atom in add {
            if !states.contains(atom) {
                states.push(*atom);
            }
        }

        conn.change_property32(PropMode::REPLACE, window, self.net_wm_state, AtomEnum::ATOM, &states)?;
        Ok(())
    }

    /// Advertise WM_DELETE_WINDOW so closing the window becomes a message
    /// instead of a killed connection
    pub fn set_wm_protocols<C: Connection>(&self, conn: &C, window: Window) -> Result<()> {
        conn.change_property32(
            PropMode::REPLACE,
            window,
            self.wm_protocols,
            AtomEnum::ATOM,
            &[self.wm_delete_window],
        )?;
        Ok(())
    }

    /// Whether a client message is the window manager's close request
    pub fn is_delete_window(&self, event: &ClientMessageEvent) -> bool {
        event.format == 32
            && event.type_ == self.wm_protocols
            && event.data.as_data32()[0] == self.wm_delete_window
    }

    /// Set WM_NAME and _NET_WM_NAME
    pub fn set_title<C: Connection>(&self, conn: &C, window: Window, title: &str) -> Result<()> {
        conn.change_property8(PropMode::REPLACE, window, AtomEnum::WM_NAME, AtomEnum::STRING, title.as_bytes())?;
        conn.change_property8(PropMode::REPLACE, window, self.net_wm_name, self.utf8_string, title.as_bytes())?;
        conn.flush()?;
        Ok(())
    }

    /// Set _NET_WM_WINDOW_OPACITY (compositor hint, 0xffffffff = opaque)
    pub fn set_opacity<C: Connection>(&self, conn: &C, window: Window, alpha: f64) -> Result<()> {
        let value = (alpha.clamp(0.0, 1.0) * f64::from(u32::MAX)).round() as u32;
        conn.change_property32(
            PropMode::REPLACE,
            window,
            self.net_wm_window_opacity,
            AtomEnum::CARDINAL,
            &[value],
        )?;
        conn.flush()?;
        Ok(())
    }

    /// Toggle all decorations through _MOTIF_WM_HINTS
    pub fn set_decorations<C: Connection>(&self, conn: &C, window: Window, visible: bool) -> Result<()> {
        let decorations = u32::from(visible);
        conn.change_property32(
            PropMode::REPLACE,
            window,
            self.motif_wm_hints,
            self.motif_wm_hints,
            &[MWM_HINTS_DECORATIONS, 0, decorations, 0, 0],
        )?;
        conn.flush()?;
        Ok(())
    }

    /// Ask the window manager to raise and focus the window
    pub fn activate<C: Connection>(&self, conn: &C, root: Window, window: Window) -> Result<()> {
        let event = ClientMessageEvent::new(
            32,
            window,
            self.net_active_window,
            [SOURCE_APPLICATION, x11rb::CURRENT_TIME, 0, 0, 0],
        );
        conn.send_event(
            false,
            root,
            EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY,
            event,
        )?;
        conn.flush()?;
        Ok(())
    }
}
