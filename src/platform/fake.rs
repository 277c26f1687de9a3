// ── Recording stand-in for the windowing API ──────────────────────────────────
//
// Replays a scripted message queue, records every call in order, and fails
// whichever step a test asks it to.  Dispatch routes to the procedure of the
// target window's class, just like the real thing.

use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, VecDeque},
    rc::Rc,
};

use super::{
    Background, ClassAtom, CursorHandle, DeviceContext, Message, ModuleHandle, PaintRecord,
    Platform, Rect, Retrieved, SystemCursor, WindowClass, WindowHandle, WindowParams,
};
use crate::{
    error::{HelloError, Result},
    window::WindowProcedure,
};

const MODULE: isize = 0x0040_0000;
const CURSOR: isize = 0x0001_0003;
const FIRST_WINDOW: isize = 0x0002_0010;
const FIRST_SURFACE: isize = 0x0101_0000;

/// Win32's ERROR_CLASS_ALREADY_EXISTS.
const ERROR_CLASS_ALREADY_EXISTS: u32 = 1410;
/// Win32's ERROR_CANNOT_FIND_WND_CLASS.
const ERROR_CANNOT_FIND_WND_CLASS: u32 = 1407;
/// Code reported when a test forgets to end its script with a quit.
const SCRIPT_EXHAUSTED: u32 = 0xDEAD;
/// Code reported for an injected failure.
const INJECTED: u32 = 0x1F;

/// One observed platform call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    ModuleHandle,
    LoadCursor(SystemCursor),
    RegisterClass(String),
    CreateWindow(WindowParams),
    GetMessage,
    Translate(Message),
    Dispatch(Message),
    DestroyWindow(WindowHandle),
    PostQuit(i32),
    BeginPaint(WindowHandle),
    TextOut { x: i32, y: i32, text: String },
    EndPaint(WindowHandle),
    DefaultProcedure(Message),
}

/// Calls a test can make fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    ModuleHandle,
    LoadCursor,
    RegisterClass,
    CreateWindow,
    DestroyWindow,
    BeginPaint,
    TextOut,
}

/// One entry of the scripted message queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scripted {
    /// A message for the most recently created window: kind, wparam, lparam.
    Message(u32, usize, isize),
    Quit(i32),
    /// A hard retrieval error with the given code.
    Error(u32),
}

/// What the fake remembers about a registered class.
#[derive(Debug, Clone)]
pub(crate) struct RegisteredClass {
    pub(crate) style: u32,
    pub(crate) module: ModuleHandle,
    pub(crate) cursor: CursorHandle,
    pub(crate) background: Background,
    pub(crate) procedure: Rc<WindowProcedure>,
}

#[derive(Default)]
pub(crate) struct FakePlatform {
    calls: RefCell<Vec<Call>>,
    queue: RefCell<VecDeque<Scripted>>,
    failing: Option<Step>,
    default_result: isize,
    classes: RefCell<HashMap<String, RegisteredClass>>,
    windows: RefCell<HashMap<WindowHandle, String>>,
    last_window: Cell<Option<WindowHandle>>,
    next_surface: Cell<isize>,
    open_sessions: Cell<usize>,
}

impl FakePlatform {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing_at(mut self, step: Step) -> Self {
        self.failing = Some(step);
        self
    }

    /// Value the default window procedure returns.
    pub(crate) fn with_default_result(mut self, result: isize) -> Self {
        self.default_result = result;
        self
    }

    /// Append entries to the message queue.
    pub(crate) fn script(&self, entries: impl IntoIterator<Item = Scripted>) {
        self.queue.borrow_mut().extend(entries);
    }

    pub(crate) fn remaining_script(&self) -> usize {
        self.queue.borrow().len()
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub(crate) fn module(&self) -> ModuleHandle {
        ModuleHandle(MODULE)
    }

    pub(crate) fn cursor(&self) -> CursorHandle {
        CursorHandle(CURSOR)
    }

    pub(crate) fn registered(&self, class_name: &str) -> Option<RegisteredClass> {
        self.classes.borrow().get(class_name).cloned()
    }

    pub(crate) fn class_of(&self, window: WindowHandle) -> Option<String> {
        self.windows.borrow().get(&window).cloned()
    }

    /// Begin-paint calls not yet matched by an end-paint.
    pub(crate) fn open_paint_sessions(&self) -> usize {
        self.open_sessions.get()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn check(&self, step: Step, function: &'static str) -> Result<()> {
        if self.failing == Some(step) {
            return Err(HelloError::win32(function, INJECTED));
        }
        Ok(())
    }
}

impl Platform for FakePlatform {
    fn module_handle(&self) -> Result<ModuleHandle> {
        self.record(Call::ModuleHandle);
        self.check(Step::ModuleHandle, "GetModuleHandleW")?;
        Ok(self.module())
    }

    fn load_cursor(&self, cursor: SystemCursor) -> Result<CursorHandle> {
        self.record(Call::LoadCursor(cursor));
        self.check(Step::LoadCursor, "LoadCursorW")?;
        Ok(self.cursor())
    }

    fn register_class(&self, class: &WindowClass) -> Result<ClassAtom> {
        self.record(Call::RegisterClass(class.name.clone()));
        self.check(Step::RegisterClass, "RegisterClassExW")?;
        let mut classes = self.classes.borrow_mut();
        if classes.contains_key(&class.name) {
            return Err(HelloError::win32("RegisterClassExW", ERROR_CLASS_ALREADY_EXISTS));
        }
        classes.insert(
            class.name.clone(),
            RegisteredClass {
                style: class.style,
                module: class.module,
                cursor: class.cursor,
                background: class.background,
                procedure: Rc::clone(&class.procedure),
            },
        );
        Ok(ClassAtom(0xC000 + classes.len() as u16))
    }

    fn create_window(&self, params: &WindowParams) -> Result<WindowHandle> {
        self.record(Call::CreateWindow(params.clone()));
        self.check(Step::CreateWindow, "CreateWindowExW")?;
        if !self.classes.borrow().contains_key(&params.class_name) {
            return Err(HelloError::win32("CreateWindowExW", ERROR_CANNOT_FIND_WND_CLASS));
        }
        let mut windows = self.windows.borrow_mut();
        let window = WindowHandle(FIRST_WINDOW + 2 * windows.len() as isize);
        windows.insert(window, params.class_name.clone());
        self.last_window.set(Some(window));
        Ok(window)
    }

    fn get_message(&self) -> Result<Retrieved> {
        self.record(Call::GetMessage);
        let window = self.last_window.get().unwrap_or(WindowHandle(0));
        match self.queue.borrow_mut().pop_front() {
            Some(Scripted::Message(kind, wparam, lparam)) => Ok(Retrieved::Message(
                Message::new(window, kind, wparam, lparam),
            )),
            Some(Scripted::Quit(code)) => Ok(Retrieved::Quit(code)),
            Some(Scripted::Error(code)) => Err(HelloError::win32("GetMessageW", code)),
            None => Err(HelloError::win32("GetMessageW", SCRIPT_EXHAUSTED)),
        }
    }

    fn translate_message(&self, message: &Message) {
        self.record(Call::Translate(*message));
    }

    fn dispatch_message(&self, message: &Message) -> isize {
        self.record(Call::Dispatch(*message));
        // Clone the procedure out so no borrow is held while it re-enters.
        let procedure = self
            .class_of(message.window)
            .and_then(|class| self.registered(&class))
            .map(|class| class.procedure);
        match procedure {
            Some(procedure) => procedure.handle(self, message),
            None => self.default_window_procedure(message),
        }
    }

    fn destroy_window(&self, window: WindowHandle) -> Result<()> {
        self.record(Call::DestroyWindow(window));
        self.check(Step::DestroyWindow, "DestroyWindow")
    }

    fn post_quit_message(&self, exit_code: i32) {
        self.record(Call::PostQuit(exit_code));
    }

    fn begin_paint(&self, window: WindowHandle) -> Result<PaintRecord> {
        self.record(Call::BeginPaint(window));
        self.check(Step::BeginPaint, "BeginPaint")?;
        let surface = FIRST_SURFACE + self.next_surface.replace(self.next_surface.get() + 1);
        self.open_sessions.set(self.open_sessions.get() + 1);
        Ok(PaintRecord {
            surface: DeviceContext(surface),
            erase: true,
            invalid: Rect {
                left: 0,
                top: 0,
                right: 640,
                bottom: 480,
            },
            restore: false,
            inc_update: false,
            reserved: [0; 32],
        })
    }

    fn end_paint(&self, window: WindowHandle, _record: &PaintRecord) {
        self.record(Call::EndPaint(window));
        let open = self.open_sessions.get();
        assert!(open > 0, "end-paint without a matching begin-paint");
        self.open_sessions.set(open - 1);
    }

    fn text_out(&self, _surface: &DeviceContext, x: i32, y: i32, text: &str) -> Result<()> {
        self.record(Call::TextOut {
            x,
            y,
            text: text.to_owned(),
        });
        self.check(Step::TextOut, "TextOutW")
    }

    fn default_window_procedure(&self, message: &Message) -> isize {
        self.record(Call::DefaultProcedure(*message));
        self.default_result
    }
}
