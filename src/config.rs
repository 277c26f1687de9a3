// ── Window configuration ──────────────────────────────────────────────────────
//
// The fixed identity of the one window: class, title and the text it paints.
// Nothing here is read from disk or the environment.

/// Device-surface coordinates, in pixels from the client-area top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Origin {
    pub(crate) x: i32,
    pub(crate) y: i32,
}

/// Everything about the window that is not fixed by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WindowConfig {
    /// Window class name; must be unique within the process.
    pub(crate) class_name: String,
    /// Title bar text.
    pub(crate) title: String,
    /// The line of text painted on every WM_PAINT.
    pub(crate) greeting: String,
    /// Where the greeting is drawn.
    pub(crate) text_origin: Origin,
}

pub(crate) const CLASS_NAME: &str = "testClass";
pub(crate) const TITLE: &str = "Test Window";
pub(crate) const GREETING: &str = "Hello Window API";

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            class_name: CLASS_NAME.to_owned(),
            title: TITLE.to_owned(),
            greeting: GREETING.to_owned(),
            text_origin: Origin::default(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
