// ── Win32 binding ─────────────────────────────────────────────────────────────
//
// `Win32Platform` implements `Platform` with direct user32 / gdi32 / kernel32
// calls through the `windows` crate.  Entry points are resolved by the loader
// at startup, so the binding itself carries no state.
//
// The OS calls `wnd_proc` for every window of every class registered here.
// It recovers the window's class name and forwards to the procedure that was
// registered for that class.

#![allow(unsafe_code)]

use std::{cell::RefCell, collections::HashMap, ffi::c_void, rc::Rc};

use windows::{
    core::{HSTRING, PCWSTR},
    Win32::{
        Foundation::{GetLastError, BOOL, HINSTANCE, HWND, LPARAM, LRESULT, POINT, RECT, WPARAM},
        Graphics::Gdi::{BeginPaint, EndPaint, TextOutW, HBRUSH, HDC, PAINTSTRUCT},
        System::LibraryLoader::GetModuleHandleW,
        UI::WindowsAndMessaging::{
            CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetClassNameW,
            GetMessageW, LoadCursorW, PostQuitMessage, RegisterClassExW, TranslateMessage,
            HCURSOR, HMENU, MSG, WINDOW_EX_STYLE, WINDOW_STYLE, WNDCLASSEXW, WNDCLASS_STYLES,
        },
    },
};

use crate::{
    error::{HelloError, Result},
    platform::{
        ClassAtom, CursorHandle, DeviceContext, Message, ModuleHandle, PaintRecord, Platform,
        Point, Rect, Retrieved, SystemCursor, WindowClass, WindowHandle, WindowParams,
    },
    window::WindowProcedure,
};

/// Longest class name Win32 accepts, plus the terminator.
const CLASS_NAME_BUF_LEN: usize = 257;

thread_local! {
    // Window procedures by class name.  Windows and their messages belong to
    // the thread that created them, and so do these.
    static PROCEDURES: RefCell<HashMap<String, Rc<WindowProcedure>>> =
        RefCell::new(HashMap::new());
}

/// The real windowing API.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Win32Platform;

// ── Handle conversions ────────────────────────────────────────────────────────

fn hwnd(window: WindowHandle) -> HWND {
    HWND(window.0 as *mut c_void)
}

fn window_handle(hwnd: HWND) -> WindowHandle {
    WindowHandle(hwnd.0 as isize)
}

fn hinstance(module: ModuleHandle) -> HINSTANCE {
    HINSTANCE(module.0 as *mut c_void)
}

fn to_msg(message: &Message) -> MSG {
    MSG {
        hwnd: hwnd(message.window),
        message: message.kind,
        wParam: WPARAM(message.wparam),
        lParam: LPARAM(message.lparam),
        time: message.time,
        pt: POINT {
            x: message.point.x,
            y: message.point.y,
        },
    }
}

fn from_msg(msg: &MSG) -> Message {
    Message {
        window: window_handle(msg.hwnd),
        kind: msg.message,
        wparam: msg.wParam.0,
        lparam: msg.lParam.0,
        time: msg.time,
        point: Point {
            x: msg.pt.x,
            y: msg.pt.y,
        },
    }
}

fn to_paintstruct(record: &PaintRecord) -> PAINTSTRUCT {
    PAINTSTRUCT {
        hdc: HDC(record.surface.0 as *mut c_void),
        fErase: BOOL::from(record.erase),
        rcPaint: RECT {
            left: record.invalid.left,
            top: record.invalid.top,
            right: record.invalid.right,
            bottom: record.invalid.bottom,
        },
        fRestore: BOOL::from(record.restore),
        fIncUpdate: BOOL::from(record.inc_update),
        rgbReserved: record.reserved,
    }
}

// ── Platform ──────────────────────────────────────────────────────────────────

impl Platform for Win32Platform {
    fn module_handle(&self) -> Result<ModuleHandle> {
        // SAFETY: GetModuleHandleW(None) returns the .exe's own HMODULE, which
        // is valid for the process lifetime.
        let hmodule = unsafe { GetModuleHandleW(None) }.map_err(failed("GetModuleHandleW"))?;
        Ok(ModuleHandle(hmodule.0 as isize))
    }

    fn load_cursor(&self, cursor: SystemCursor) -> Result<CursorHandle> {
        // MAKEINTRESOURCEW: the resource id travels in the pointer value.
        let name = PCWSTR(cursor.resource_id() as usize as *const u16);
        // SAFETY: a null instance selects the system cursors; `name` is an
        // integer resource id, which LoadCursorW never dereferences.
        let hcursor = unsafe { LoadCursorW(None, name) }.map_err(failed("LoadCursorW"))?;
        Ok(CursorHandle(hcursor.0 as isize))
    }

    fn register_class(&self, class: &WindowClass) -> Result<ClassAtom> {
        let name = HSTRING::from(class.name.as_str());
        let wndclass = WNDCLASSEXW {
            // WNDCLASSEXW is ~80 bytes; the cast to u32 is always lossless.
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            style: WNDCLASS_STYLES(class.style),
            lpfnWndProc: Some(wnd_proc),
            hInstance: hinstance(class.module),
            hCursor: HCURSOR(class.cursor.0 as *mut c_void),
            hbrBackground: HBRUSH(class.background.brush_value() as *mut c_void),
            lpszClassName: PCWSTR(name.as_ptr()),
            ..Default::default()
        };

        // SAFETY: wndclass is fully initialised with valid handles; `name` is
        // a null-terminated UTF-16 string that outlives the call, and the OS
        // copies it into its class table.
        let atom = unsafe { RegisterClassExW(&wndclass) };
        if atom == 0 {
            return Err(last_error("RegisterClassExW"));
        }

        PROCEDURES.with(|procedures| {
            procedures
                .borrow_mut()
                .insert(class.name.clone(), Rc::clone(&class.procedure));
        });
        Ok(ClassAtom(atom))
    }

    fn create_window(&self, params: &WindowParams) -> Result<WindowHandle> {
        let class_name = HSTRING::from(params.class_name.as_str());
        let title = HSTRING::from(params.title.as_str());

        // SAFETY: the class was registered by this module; both strings are
        // null-terminated and outlive the call.  HWND::default() (null parent)
        // creates a top-level window; HMENU::default() means no menu.
        // WM_NCCREATE / WM_CREATE reach wnd_proc before this returns, which
        // is why the procedure table is filled during registration.
        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE(0),
                PCWSTR(class_name.as_ptr()),
                PCWSTR(title.as_ptr()),
                WINDOW_STYLE(params.style.0),
                params.x,
                params.y,
                params.width,
                params.height,
                HWND::default(),
                HMENU::default(),
                hinstance(params.module),
                None,
            )
        }
        .map_err(failed("CreateWindowExW"))?;

        Ok(window_handle(hwnd))
    }

    fn get_message(&self) -> Result<Retrieved> {
        let mut msg = MSG::default();

        // SAFETY: &mut msg is a valid MSG pointer; HWND::default() retrieves
        // messages for all windows on this thread; 0,0 filter accepts all.
        let ret = unsafe { GetMessageW(&mut msg, HWND::default(), 0, 0) };

        match ret.0 {
            // GetMessageW returns -1 on error.
            -1 => Err(last_error("GetMessageW")),
            // Returns 0 when WM_QUIT is retrieved; wParam holds the exit code.
            0 => Ok(Retrieved::Quit(msg.wParam.0 as i32)),
            _ => Ok(Retrieved::Message(from_msg(&msg))),
        }
    }

    fn translate_message(&self, message: &Message) {
        let msg = to_msg(message);
        // SAFETY: msg mirrors a record filled by GetMessageW.  The return value
        // (whether a WM_CHAR was generated) is intentionally unused.
        unsafe {
            let _ = TranslateMessage(&msg);
        }
    }

    fn dispatch_message(&self, message: &Message) -> isize {
        let msg = to_msg(message);
        // SAFETY: msg mirrors a record filled by GetMessageW.  The OS calls
        // wnd_proc synchronously on this thread before returning.
        unsafe { DispatchMessageW(&msg) }.0
    }

    fn destroy_window(&self, window: WindowHandle) -> Result<()> {
        // SAFETY: `window` was issued by CreateWindowExW on this thread.
        // DestroyWindow sends WM_DESTROY to wnd_proc before returning.
        unsafe { DestroyWindow(hwnd(window)) }.map_err(failed("DestroyWindow"))
    }

    fn post_quit_message(&self, exit_code: i32) {
        // SAFETY: PostQuitMessage has no preconditions; it posts WM_QUIT to
        // the calling thread's queue.
        unsafe { PostQuitMessage(exit_code) };
    }

    fn begin_paint(&self, window: WindowHandle) -> Result<PaintRecord> {
        let mut ps = PAINTSTRUCT::default();
        // SAFETY: `window` is valid for the duration of its WM_PAINT; &mut ps
        // is a valid PAINTSTRUCT for the OS to fill.
        let hdc = unsafe { BeginPaint(hwnd(window), &mut ps) };
        if hdc.0.is_null() {
            // BeginPaint does not set a last-error code.
            return Err(HelloError::win32("BeginPaint", 0));
        }
        Ok(PaintRecord {
            surface: DeviceContext(hdc.0 as isize),
            erase: ps.fErase.as_bool(),
            invalid: Rect {
                left: ps.rcPaint.left,
                top: ps.rcPaint.top,
                right: ps.rcPaint.right,
                bottom: ps.rcPaint.bottom,
            },
            restore: ps.fRestore.as_bool(),
            inc_update: ps.fIncUpdate.as_bool(),
            reserved: ps.rgbReserved,
        })
    }

    fn end_paint(&self, window: WindowHandle, record: &PaintRecord) {
        let ps = to_paintstruct(record);
        // SAFETY: `record` came from BeginPaint on this window and has not been
        // ended yet.  EndPaint always returns nonzero.
        unsafe {
            let _ = EndPaint(hwnd(window), &ps);
        }
    }

    fn text_out(&self, surface: &DeviceContext, x: i32, y: i32, text: &str) -> Result<()> {
        // TextOutW takes a counted string, not a terminated one.
        let wide: Vec<u16> = text.encode_utf16().collect();
        // SAFETY: `surface` is the DC of a live paint session; `wide` outlives
        // the call and its length is passed by the slice.
        let ok = unsafe { TextOutW(HDC(surface.0 as *mut c_void), x, y, &wide) };
        if !ok.as_bool() {
            // TextOutW does not set a last-error code.
            return Err(HelloError::win32("TextOutW", 0));
        }
        Ok(())
    }

    fn default_window_procedure(&self, message: &Message) -> isize {
        // SAFETY: the message parameters are exactly those the OS delivered.
        unsafe {
            DefWindowProcW(
                hwnd(message.window),
                message.kind,
                WPARAM(message.wparam),
                LPARAM(message.lparam),
            )
        }
        .0
    }
}

// ── Window procedure ──────────────────────────────────────────────────────────

/// The procedure registered for `hwnd`'s class, if this module registered it.
fn procedure_for(hwnd: HWND) -> Option<Rc<WindowProcedure>> {
    let mut buf = [0u16; CLASS_NAME_BUF_LEN];
    // SAFETY: hwnd is provided by the OS for the current message; buf is a
    // writable buffer whose length is passed with the slice.
    let len = unsafe { GetClassNameW(hwnd, &mut buf) };
    if len <= 0 {
        return None;
    }
    let name = String::from_utf16_lossy(&buf[..len as usize]);
    // Clone out of the table so no borrow is held while the procedure runs;
    // it re-enters the OS, which may call back into wnd_proc.
    PROCEDURES.with(|procedures| procedures.borrow().get(&name).cloned())
}

// SAFETY: wnd_proc is registered as lpfnWndProc in WNDCLASSEXW.
// Windows guarantees that hwnd, msg, wparam, and lparam are valid for the
// lifetime of this call; we must not store hwnd beyond the message handler.
unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match procedure_for(hwnd) {
        Some(procedure) => {
            let message = Message::new(window_handle(hwnd), msg, wparam.0, lparam.0);
            LRESULT(procedure.handle(&Win32Platform, &message))
        }
        // SAFETY: hwnd and message parameters are valid, provided by Windows.
        None => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

// ── Error helpers ─────────────────────────────────────────────────────────────

/// Map a windows-crate error to a `HelloError` naming the failing function.
fn failed(function: &'static str) -> impl FnOnce(windows::core::Error) -> HelloError {
    move |e| HelloError::win32(function, e.code().0 as u32)
}

/// Capture the current Win32 last-error code and wrap it in a `HelloError`.
///
/// Call immediately after a Win32 function that signals failure: `GetLastError`
/// reads thread-local state that can be overwritten by any subsequent API call.
fn last_error(function: &'static str) -> HelloError {
    // SAFETY: GetLastError reads thread-local state set by the last Win32 call.
    // It is always safe to call and never fails.
    let code = unsafe { GetLastError() };
    HelloError::win32(function, code.0)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
