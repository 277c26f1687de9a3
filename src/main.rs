// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except `platform::win32`, the Win32 FFI.
// Each unsafe block in that module MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]

// Release builds run as a GUI application (no console window).
// Debug builds keep the console so that log output is visible.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

// Off Windows only the platform-independent core and its tests are built.
#![cfg_attr(not(windows), allow(dead_code))]

mod config;
mod error;
mod platform;
mod window;

#[cfg(test)]
mod test_log;

use error::HelloError;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match start() {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            // Startup or the message loop failed; nothing is left to clean up.
            report_fatal(&e);
            #[cfg(windows)]
            platform::win32::dialogs::show_error_dialog(&e.to_string());
            std::process::exit(1);
        }
    }
}

#[cfg(windows)]
fn start() -> error::Result<i32> {
    window::run(&platform::win32::Win32Platform, &config::WindowConfig::default())
}

#[cfg(not(windows))]
fn start() -> error::Result<i32> {
    Err(HelloError::UnsupportedTarget(std::env::consts::OS))
}

/// The one log line a fatal error produces.
fn report_fatal(e: &HelloError) {
    log::error!("{e}");
}

// ── Tests ─────────────────────────────────────────────────────────────────────
