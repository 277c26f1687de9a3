// ── Main window ───────────────────────────────────────────────────────────────
//
// Responsibilities in this file (no unsafe; everything goes through
// `platform::Platform`):
//   • Acquire the module and cursor, register the window class.
//   • Create the one top-level window.
//   • Run the retrieve / translate / dispatch message loop.
//   • Dispatch WM_CLOSE, WM_DESTROY and WM_PAINT; defer the rest.
//
// The window is either Live or Terminating.  WM_CLOSE moves it to
// Terminating by requesting destruction; WM_DESTROY posts the quit signal
// that ends the loop.  Only a Live window draws.

use std::{cell::Cell, rc::Rc};

use crate::{
    config::{Origin, WindowConfig},
    error::Result,
    platform::{
        Background, Message, MessageKind, PaintRecord, Platform, Retrieved, SystemCursor,
        WindowClass, WindowHandle, WindowParams, WindowStyle, COLOR_WINDOW, CW_USEDEFAULT,
    },
};

/// Exit code posted with the quit signal when the window is destroyed.
const QUIT_EXIT_CODE: i32 = 0;

// ── Public API ────────────────────────────────────────────────────────────────

/// Create the window and drive the message loop until the quit signal.
///
/// Returns the exit code carried by the quit signal.
pub(crate) fn run<P: Platform + ?Sized>(platform: &P, config: &WindowConfig) -> Result<i32> {
    // Startup timing is only measured in debug builds.
    #[cfg(debug_assertions)]
    let t0 = std::time::Instant::now();

    let window = bootstrap(platform, config)?;

    #[cfg(debug_assertions)]
    log::info!(
        "window visible in {:.1} ms",
        t0.elapsed().as_secs_f64() * 1000.0
    );
    log::info!("created window {window:?} of class {:?}", config.class_name);

    run_message_loop(platform)
}

/// Acquire everything the window needs and create it.
///
/// Steps run strictly in order; the first failure is returned and nothing
/// after it is attempted.
pub(crate) fn bootstrap<P: Platform + ?Sized>(
    platform: &P,
    config: &WindowConfig,
) -> Result<WindowHandle> {
    let module = platform.module_handle()?;
    let cursor = platform.load_cursor(SystemCursor::Arrow)?;

    let class = WindowClass {
        name: config.class_name.clone(),
        style: 0,
        module,
        cursor,
        background: Background::system_color(COLOR_WINDOW),
        procedure: Rc::new(WindowProcedure::new(
            config.greeting.clone(),
            config.text_origin,
        )),
    };
    let atom = platform.register_class(&class)?;
    log::debug!("registered class {:?} as {atom:?}", class.name);

    platform.create_window(&WindowParams {
        class_name: config.class_name.clone(),
        title: config.title.clone(),
        style: WindowStyle::VISIBLE | WindowStyle::OVERLAPPED_WINDOW,
        x: CW_USEDEFAULT,
        y: CW_USEDEFAULT,
        width: CW_USEDEFAULT,
        height: CW_USEDEFAULT,
        module,
    })
}

// ── Message loop ──────────────────────────────────────────────────────────────

/// Pump messages for every window of the calling thread until the quit signal.
///
/// Nothing is retrieved or dispatched after the quit signal.
pub(crate) fn run_message_loop<P: Platform + ?Sized>(platform: &P) -> Result<i32> {
    loop {
        match platform.get_message()? {
            Retrieved::Message(message) => {
                // TranslateMessage only matters for keyboard input, but the
                // platform expects every message to pass through it.
                platform.translate_message(&message);
                let _ = platform.dispatch_message(&message);
            }
            Retrieved::Quit(exit_code) => {
                log::info!("quit signal received (exit code {exit_code})");
                return Ok(exit_code);
            }
        }
    }
}

// ── Window procedure ──────────────────────────────────────────────────────────

/// Where the window is in its life.
///
/// A Terminating window still answers WM_PAINT with a paint session, so the
/// invalid region is validated, but draws nothing into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lifecycle {
    Live,
    /// Destruction has been requested; the quit signal follows.
    Terminating,
}

/// Per-class message handler.
///
/// Runs synchronously on the UI thread from inside `dispatch_message` and must
/// never block.
#[derive(Debug)]
pub(crate) struct WindowProcedure {
    greeting: String,
    origin: Origin,
    lifecycle: Cell<Lifecycle>,
}

impl WindowProcedure {
    pub(crate) fn new(greeting: String, origin: Origin) -> Self {
        Self {
            greeting,
            origin,
            lifecycle: Cell::new(Lifecycle::Live),
        }
    }

    #[cfg(test)]
    pub(crate) fn lifecycle(&self) -> Lifecycle {
        self.lifecycle.get()
    }

    /// Handle one message and return the value the OS expects for it.
    pub(crate) fn handle<P: Platform + ?Sized>(&self, platform: &P, message: &Message) -> isize {
        log::trace!("{:?} <- {:#06x}", message.window, message.kind);

        match message.kind() {
            MessageKind::Close => {
                self.enter(Lifecycle::Terminating);
                // DestroyWindow sends WM_DESTROY, which posts the quit signal.
                if let Err(e) = platform.destroy_window(message.window) {
                    log::warn!("could not destroy {:?}: {e}", message.window);
                }
                0
            }

            MessageKind::Destroy => {
                self.enter(Lifecycle::Terminating);
                platform.post_quit_message(QUIT_EXIT_CODE);
                0
            }

            MessageKind::Paint => {
                self.paint(platform, message.window);
                0
            }

            // Window chrome (moving, sizing, minimising) is all default handling.
            MessageKind::Other(_) => platform.default_window_procedure(message),
        }
    }

    fn enter(&self, next: Lifecycle) {
        let prev = self.lifecycle.replace(next);
        if prev != next {
            log::debug!("window lifecycle {prev:?} -> {next:?}");
        }
    }

    fn paint<P: Platform + ?Sized>(&self, platform: &P, window: WindowHandle) {
        let session = match PaintSession::begin(platform, window) {
            Ok(session) => session,
            Err(e) => {
                log::error!("BeginPaint on {window:?}: {e}");
                return;
            }
        };
        if self.lifecycle.get() == Lifecycle::Terminating {
            log::trace!("{window:?} is terminating; validating without drawing");
            return;
        }
        log::trace!("painting {:?} of {window:?}", session.record().invalid);
        // A failed draw is cosmetic; the session still ends when dropped.
        if let Err(e) = session.draw_text(self.origin, &self.greeting) {
            log::error!("drawing {:?} on {window:?}: {e}", self.greeting);
        }
    }
}

// ── Paint session ─────────────────────────────────────────────────────────────

/// A begin-paint / end-paint bracket.
///
/// End-paint runs exactly once, when the session is dropped, on every path.
pub(crate) struct PaintSession<'p, P: Platform + ?Sized> {
    platform: &'p P,
    window: WindowHandle,
    record: PaintRecord,
}

impl<'p, P: Platform + ?Sized> PaintSession<'p, P> {
    pub(crate) fn begin(platform: &'p P, window: WindowHandle) -> Result<Self> {
        let record = platform.begin_paint(window)?;
        Ok(Self {
            platform,
            window,
            record,
        })
    }

    pub(crate) fn record(&self) -> &PaintRecord {
        &self.record
    }

    pub(crate) fn draw_text(&self, origin: Origin, text: &str) -> Result<()> {
        self.platform
            .text_out(&self.record.surface, origin.x, origin.y, text)
    }
}

impl<P: Platform + ?Sized> Drop for PaintSession<'_, P> {
    fn drop(&mut self) {
        self.platform.end_paint(self.window, &self.record);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
