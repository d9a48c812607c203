//! X11 display surface
//!
//! A single top-level video window managed through EWMH. Fullscreen and
//! maximized state always come from `_NET_WM_STATE` on the server; the only
//! thing cached here is the last state reported upward, used to build the
//! changed mask for [`SurfaceEvent::WindowState`].

use std::sync::Arc;
use tracing::{debug, info, warn};
use x11rb::connection::Connection;
use x11rb::protocol::Event;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;
use x11rb::{COPY_DEPTH_FROM_PARENT, COPY_FROM_PARENT, NONE};

use crate::config::WindowConfig;
use crate::error::{Result, SurfaceError};
use crate::surface::ewmh::Atoms;
use crate::surface::keysyms::KeyboardMapping;
use crate::surface::{DisplaySurface, EventSource, Modifiers, SurfaceEvent, WindowStateFlags};

/// WM_CLASS instance and class, NUL separated
const WM_CLASS: &[u8] = b"reel\0Reel\0";

pub struct X11Surface {
    /// X11 connection (Arc so the readiness poller can share it)
    conn: Arc<RustConnection>,
    root: Window,
    window: Window,
    atoms: Atoms,
    keymap: KeyboardMapping,
    blank_cursor: Cursor,
    /// Cursor last installed on the window; NONE means the parent's cursor
    cursor: Cursor,
    opacity: f64,
    mapped: bool,
    /// Last window state reported through `next_event`
    reported_state: WindowStateFlags,
}

impl X11Surface {
    /// Connect to the X server and create (but not map) the video window
    pub fn new(config: &WindowConfig) -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None)?;
        let conn = Arc::new(conn);

        let screen = &conn.setup().roots[screen_num];
        let root = screen.root;
        info!("Connected to X server, screen {}, root window {}", screen_num, root);

        let atoms = Atoms::new(conn.as_ref())?;

        let window = conn.generate_id()?;
        conn.create_window(
            COPY_DEPTH_FROM_PARENT,
            window,
            root,
            0,
            0,
            clamp_dimension(config.width),
            clamp_dimension(config.height),
            0,
            WindowClass::INPUT_OUTPUT,
            COPY_FROM_PARENT,
            &CreateWindowAux::new()
                .background_pixel(config.background)
                .event_mask(
                    EventMask::KEY_PRESS
                        | EventMask::BUTTON_PRESS
                        | EventMask::POINTER_MOTION
                        | EventMask::STRUCTURE_NOTIFY
                        | EventMask::PROPERTY_CHANGE,
                ),
        )?;

        atoms.set_wm_protocols(conn.as_ref(), window)?;
        conn.change_property8(PropMode::REPLACE, window, AtomEnum::WM_CLASS, AtomEnum::STRING, WM_CLASS)?;
        conn.change_property32(
            PropMode::REPLACE,
            window,
            atoms.net_wm_pid,
            AtomEnum::CARDINAL,
            &[std::process::id()],
        )?;

        let keymap = load_keyboard_mapping(conn.as_ref())?;
        let blank_cursor = create_blank_cursor(conn.as_ref(), window)?;
        conn.flush()?;

        info!("Created video window 0x{:x} ({}x{})", window, config.width, config.height);

        Ok(Self {
            conn,
            root,
            window,
            atoms,
            keymap,
            blank_cursor,
            cursor: NONE,
            opacity: 1.0,
            mapped: false,
            reported_state: WindowStateFlags::empty(),
        })
    }

    /// Connection handle, shared with the readiness poller
    pub fn connection(&self) -> Arc<RustConnection> {
        self.conn.clone()
    }

    /// The window manager only keeps `_NET_WM_STATE` current for mapped windows
    fn ensure_mapped(&self) -> Result<()> {
        if self.mapped {
            Ok(())
        } else {
            Err(SurfaceError::NotShown)
        }
    }

    /// Add or remove state atoms, by client message once mapped or by
    /// property before the first map
    fn change_state(&mut self, add: bool, first: Atom, second: Atom) -> Result<()> {
        if self.mapped {
            self.atoms
                .request_window_state(self.conn.as_ref(), self.root, self.window, add, first, second)
        } else {
            let atoms: Vec<Atom> = [first, second].into_iter().filter(|&a| a != NONE).collect();
            let none: &[Atom] = &[];
            let (add_atoms, remove_atoms) = if add {
                (atoms.as_slice(), none)
            } else {
                (none, atoms.as_slice())
            };
            self.atoms
                .set_initial_window_state(self.conn.as_ref(), self.window, add_atoms, remove_atoms)?;
            self.conn.flush()?;
            Ok(())
        }
    }

    fn translate(&mut self, event: Event) -> Result<Option<SurfaceEvent>> {
        let translated = match event {
            Event::KeyPress(e) if e.event == self.window => {
                let modifiers = Modifiers::from_bits_truncate(u16::from(e.state));
                match self.keymap.lookup(e.detail, modifiers) {
                    Some(keysym) => Some(SurfaceEvent::KeyPress { keysym }),
                    None => {
                        debug!("KeyPress: keycode {} has no keysym", e.detail);
                        None
                    }
                }
            }

            Event::ButtonPress(e) if e.event == self.window => Some(SurfaceEvent::ButtonPress {
                button: e.detail,
                modifiers: Modifiers::from_bits_truncate(u16::from(e.state)),
            }),

            Event::MotionNotify(e) if e.event == self.window => Some(SurfaceEvent::Motion),

            Event::ClientMessage(e) if e.window == self.window => {
                if self.atoms.is_delete_window(&e) {
                    Some(SurfaceEvent::CloseRequest)
                } else {
                    None
                }
            }

            Event::PropertyNotify(e) if e.window == self.window && e.atom == self.atoms.net_wm_state => {
                let new_state = self.atoms.get_window_state(self.conn.as_ref(), self.window)?;
                let event = window_state_event(self.reported_state, new_state);
                self.reported_state = new_state;
                if let Some(SurfaceEvent::WindowState { changed, .. }) = event {
                    debug!("_NET_WM_STATE changed: {:?} -> now {:?}", changed, new_state);
                }
                event
            }

            Event::MappingNotify(e) if e.request == Mapping::KEYBOARD => {
                self.keymap = load_keyboard_mapping(self.conn.as_ref())?;
                debug!("Reloaded keyboard mapping");
                None
            }

            Event::Error(e) => {
                warn!("X11 error: {:?}", e);
                None
            }

            _ => None,
        };
        Ok(translated)
    }
}

impl DisplaySurface for X11Surface {
    type Cursor = Cursor;

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.conn.configure_window(
            self.window,
            &ConfigureWindowAux::new()
                .width(u32::from(clamp_dimension(width)))
                .height(u32::from(clamp_dimension(height))),
        )?;
        self.conn.flush()?;
        Ok(())
    }

    fn show(&mut self) -> Result<()> {
        self.conn.map_window(self.window)?;
        // Round trip so the window is really mapped before we return
        self.conn.get_input_focus()?.reply()?;
        self.mapped = true;
        self.atoms.activate(self.conn.as_ref(), self.root, self.window)?;
        Ok(())
    }

    fn hide(&mut self) -> Result<()> {
        self.conn.unmap_window(self.window)?;
        self.conn.flush()?;
        self.mapped = false;
        Ok(())
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<()> {
        let atom = self.atoms.net_wm_state_fullscreen;
        self.change_state(fullscreen, atom, NONE)
    }

    fn set_maximized(&mut self, maximized: bool) -> Result<()> {
        let (vert, horz) = (
            self.atoms.net_wm_state_maximized_vert,
            self.atoms.net_wm_state_maximized_horz,
        );
        self.change_state(maximized, vert, horz)
    }

    fn set_titlebar_visible(&mut self, visible: bool) -> Result<()> {
        self.atoms.set_decorations(self.conn.as_ref(), self.window, visible)
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        self.atoms.set_title(self.conn.as_ref(), self.window, title)
    }

    fn opacity(&self) -> f64 {
        self.opacity
    }

    fn set_opacity(&mut self, alpha: f64) -> Result<()> {
        self.atoms.set_opacity(self.conn.as_ref(), self.window, alpha)?;
        self.opacity = alpha.clamp(0.0, 1.0);
        Ok(())
    }

    fn is_fullscreen(&self) -> Result<bool> {
        self.ensure_mapped()?;
        let state = self.atoms.get_window_state(self.conn.as_ref(), self.window)?;
        Ok(state.contains(WindowStateFlags::FULLSCREEN))
    }

    fn is_maximized(&self) -> Result<bool> {
        self.ensure_mapped()?;
        let state = self.atoms.get_window_state(self.conn.as_ref(), self.window)?;
        Ok(state.contains(WindowStateFlags::MAXIMIZED))
    }

    fn current_cursor(&self) -> Cursor {
        self.cursor
    }

    fn blank_cursor(&self) -> Cursor {
        self.blank_cursor
    }

    fn set_cursor(&mut self, cursor: Cursor) -> Result<()> {
        self.conn.change_window_attributes(
            self.window,
            &ChangeWindowAttributesAux::new().cursor(cursor),
        )?;
        self.conn.flush()?;
        self.cursor = cursor;
        Ok(())
    }

    fn native_handle(&self) -> Option<u64> {
        Some(u64::from(self.window))
    }
}

impl EventSource for X11Surface {
    fn next_event(&mut self) -> Result<Option<SurfaceEvent>> {
        while let Some(event) = self.conn.poll_for_event()? {
            if let Some(translated) = self.translate(event)? {
                return Ok(Some(translated));
            }
        }
        Ok(None)
    }
}

impl Drop for X11Surface {
    fn drop(&mut self) {
        let _ = self.conn.free_cursor(self.blank_cursor);
        let _ = self.conn.destroy_window(self.window);
        let _ = self.conn.flush();
    }
}

/// Notification for a `_NET_WM_STATE` update, `None` if nothing we track changed
fn window_state_event(reported: WindowStateFlags, new_state: WindowStateFlags) -> Option<SurfaceEvent> {
    let changed = reported ^ new_state;
    if changed.is_empty() {
        None
    } else {
        Some(SurfaceEvent::WindowState { changed, new_state })
    }
}

/// X11 window dimensions are 16 bit and must be non-zero
fn clamp_dimension(value: u32) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX).max(1)
}

fn load_keyboard_mapping(conn: &RustConnection) -> Result<KeyboardMapping> {
    let setup = conn.setup();
    let (min, max) = (setup.min_keycode, setup.max_keycode);
    let reply = conn.get_keyboard_mapping(min, max - min + 1)?.reply()?;
    Ok(KeyboardMapping::new(min, reply.keysyms_per_keycode, reply.keysyms))
}

/// 1x1 cursor whose mask is all zeroes, i.e. nothing is drawn
fn create_blank_cursor(conn: &RustConnection, window: Window) -> Result<Cursor> {
    let pixmap = conn.generate_id()?;
    conn.create_pixmap(1, pixmap, window, 1, 1)?;

    let gc = conn.generate_id()?;
    conn.create_gc(gc, pixmap, &CreateGCAux::new().foreground(0))?;
    conn.poly_fill_rectangle(pixmap, gc, &[Rectangle { x: 0, y: 0, width: 1, height: 1 }])?;
    conn.free_gc(gc)?;

    let cursor = conn.generate_id()?;
    conn.create_cursor(cursor, pixmap, pixmap, 0, 0, 0, 0, 0, 0, 0, 0)?;
    conn.free_pixmap(pixmap)?;
    Ok(cursor)
}
