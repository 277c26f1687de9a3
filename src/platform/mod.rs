// ── Platform abstraction layer ────────────────────────────────────────────────
//
// This module defines the interface the rest of the codebase uses to talk to
// the OS windowing API.  No `unsafe` lives here; all Win32 FFI is confined to
// the `win32` sub-module and never leaks outward.
//
// Handles are opaque newtypes: no arithmetic, and the raw value is visible
// only inside `platform`.  A `DeviceContext` is neither `Copy` nor `Clone`;
// the window layer reaches it only through a live paint session.

use std::{ops::BitOr, rc::Rc};

use crate::{error::Result, window::WindowProcedure};

#[cfg(windows)]
pub mod win32;

#[cfg(test)]
pub(crate) mod fake;

// ── Message identifiers ───────────────────────────────────────────────────────

pub(crate) const WM_DESTROY: u32 = 0x0002;
pub(crate) const WM_PAINT: u32 = 0x000F;
pub(crate) const WM_CLOSE: u32 = 0x0010;

// ── Window creation constants ─────────────────────────────────────────────────

/// "Let the system choose" sentinel for position and size.
pub(crate) const CW_USEDEFAULT: i32 = 0x8000_0000_u32 as i32;

/// System color index of the window background.
pub(crate) const COLOR_WINDOW: u32 = 5;

// ── Handles ───────────────────────────────────────────────────────────────────

/// The running executable's loaded image.  Valid for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ModuleHandle(pub(in crate::platform) isize);

/// A shared system cursor.  System cursors are never destroyed by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CursorHandle(pub(in crate::platform) isize);

/// A window issued by the OS; valid until destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct WindowHandle(pub(in crate::platform) isize);

/// The atom the OS returns for a registered class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ClassAtom(pub(in crate::platform) u16);

/// Drawing surface of one paint session.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct DeviceContext(pub(in crate::platform) isize);

// ── Resources ─────────────────────────────────────────────────────────────────

/// Built-in cursors, by their well-known resource identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub(crate) enum SystemCursor {
    Arrow = 32512,
}

impl SystemCursor {
    pub(crate) fn resource_id(self) -> u16 {
        self as u16
    }
}

/// A class background brush given as a system color index.
///
/// The registered brush value is the index plus `OFFSET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Background {
    pub(crate) color_index: u32,
}

impl Background {
    const OFFSET: u32 = 2;

    pub(crate) fn system_color(color_index: u32) -> Self {
        Self { color_index }
    }

    /// The value stored in the class record's background field.
    pub(crate) fn brush_value(self) -> isize {
        (self.color_index + Self::OFFSET) as isize
    }
}

/// Window style bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WindowStyle(pub(crate) u32);

impl WindowStyle {
    pub(crate) const VISIBLE: Self = Self(0x1000_0000);
    /// Title bar, system menu, sizing border, minimize and maximize boxes.
    pub(crate) const OVERLAPPED_WINDOW: Self = Self(0x00CF_0000);

    #[cfg(test)]
    pub(crate) fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for WindowStyle {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

// ── Records ───────────────────────────────────────────────────────────────────

/// A class registration request.
pub(crate) struct WindowClass {
    pub(crate) name: String,
    /// Class style flags (CS_*).
    pub(crate) style: u32,
    pub(crate) module: ModuleHandle,
    pub(crate) cursor: CursorHandle,
    pub(crate) background: Background,
    /// Receives every message addressed to a window of this class.
    pub(crate) procedure: Rc<WindowProcedure>,
}

/// A top-level window request.  Top-level windows have no parent and no menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WindowParams {
    pub(crate) class_name: String,
    pub(crate) title: String,
    pub(crate) style: WindowStyle,
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) module: ModuleHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Point {
    pub(crate) x: i32,
    pub(crate) y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Rect {
    pub(crate) left: i32,
    pub(crate) top: i32,
    pub(crate) right: i32,
    pub(crate) bottom: i32,
}

/// One queued event, as retrieved from the thread's message queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Message {
    pub(crate) window: WindowHandle,
    pub(crate) kind: u32,
    pub(crate) wparam: usize,
    pub(crate) lparam: isize,
    pub(crate) time: u32,
    pub(crate) point: Point,
}

impl Message {
    pub(crate) fn new(window: WindowHandle, kind: u32, wparam: usize, lparam: isize) -> Self {
        Self {
            window,
            kind,
            wparam,
            lparam,
            time: 0,
            point: Point::default(),
        }
    }

    pub(crate) fn kind(&self) -> MessageKind {
        MessageKind::from_raw(self.kind)
    }
}

/// The message kinds the window procedure distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MessageKind {
    Close,
    Destroy,
    Paint,
    Other(u32),
}

impl MessageKind {
    pub(crate) fn from_raw(kind: u32) -> Self {
        match kind {
            WM_CLOSE => Self::Close,
            WM_DESTROY => Self::Destroy,
            WM_PAINT => Self::Paint,
            other => Self::Other(other),
        }
    }
}

/// Outcome of a successful message retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Retrieved {
    Message(Message),
    /// The quit signal, carrying the code passed to `post_quit_message`.
    Quit(i32),
}

/// What begin-paint hands back; valid until the matching end-paint.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct PaintRecord {
    pub(crate) surface: DeviceContext,
    pub(crate) erase: bool,
    /// The invalidated region.
    pub(crate) invalid: Rect,
    pub(crate) restore: bool,
    pub(crate) inc_update: bool,
    pub(crate) reserved: [u8; 32],
}

// ── Platform capability ───────────────────────────────────────────────────────

/// The windowing calls the application makes.
///
/// An implementation is resolved once and shared for the process lifetime;
/// every method takes `&self` because the window procedure re-enters the
/// platform while `dispatch_message` is still on the stack.
pub(crate) trait Platform {
    /// Handle of the running executable.
    fn module_handle(&self) -> Result<ModuleHandle>;

    fn load_cursor(&self, cursor: SystemCursor) -> Result<CursorHandle>;

    /// Register a class; afterwards `dispatch_message` routes messages for
    /// windows of that class to `class.procedure`.
    fn register_class(&self, class: &WindowClass) -> Result<ClassAtom>;

    fn create_window(&self, params: &WindowParams) -> Result<WindowHandle>;

    /// Block until the next message for any window of the calling thread.
    fn get_message(&self) -> Result<Retrieved>;

    fn translate_message(&self, message: &Message);

    /// Synchronously run the target window's procedure on `message`.
    fn dispatch_message(&self, message: &Message) -> isize;

    fn destroy_window(&self, window: WindowHandle) -> Result<()>;

    fn post_quit_message(&self, exit_code: i32);

    fn begin_paint(&self, window: WindowHandle) -> Result<PaintRecord>;

    /// Must be called exactly once for each successful `begin_paint`.
    fn end_paint(&self, window: WindowHandle, record: &PaintRecord);

    fn text_out(&self, surface: &DeviceContext, x: i32, y: i32, text: &str) -> Result<()>;

    /// The platform's own handling, for messages the application ignores.
    fn default_window_procedure(&self, message: &Message) -> isize;
}

// ── Tests ─────────────────────────────────────────────────────────────────────
