// ── Log capture for tests ─────────────────────────────────────────────────────
//
// A process-wide `log::Log` that keeps records per thread, so tests running
// in parallel only see what their own thread logged.

use std::{cell::RefCell, sync::Once};

use log::{Level, LevelFilter, Log, Metadata, Record};

thread_local! {
    static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        RECORDS.with(|records| {
            records
                .borrow_mut()
                .push((record.level(), record.args().to_string()));
        });
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INSTALL: Once = Once::new();

/// Install the capturing logger (once per process) and clear this thread's
/// records.
pub(crate) fn capture() {
    INSTALL.call_once(|| {
        log::set_logger(&LOGGER).expect("no other logger installed in tests");
        log::set_max_level(LevelFilter::Trace);
    });
    RECORDS.with(|records| records.borrow_mut().clear());
}

/// Records logged on this thread since the last `capture()`.
pub(crate) fn records() -> Vec<(Level, String)> {
    RECORDS.with(|records| records.borrow().clone())
}

/// Messages logged at `level` on this thread since the last `capture()`.
pub(crate) fn at(level: Level) -> Vec<String> {
    records()
        .into_iter()
        .filter(|(l, _)| *l == level)
        .map(|(_, message)| message)
        .collect()
}
