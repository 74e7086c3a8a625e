//! Logger that records, per thread, whether interrupts were disabled when
//! each message was emitted.

use crate::hal::critical;
use log::{LevelFilter, Log, Metadata, Record};
use std::cell::RefCell;
use std::sync::Once;

struct CaptureLogger;

thread_local! {
    static RECORDS: RefCell<Vec<(String, bool)>> = const { RefCell::new(Vec::new()) };
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let masked = critical::interrupts_disabled();
        let message = record.args().to_string();
        RECORDS.with(|records| records.borrow_mut().push((message, masked)));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INIT: Once = Once::new();

/// Install the capturing logger and clear this thread's records.
pub fn capture() {
    INIT.call_once(|| {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Trace);
    });
    RECORDS.with(|records| records.borrow_mut().clear());
}

/// Messages logged on this thread since [`capture`], each with whether
/// interrupts were disabled at the time.
pub fn take() -> Vec<(String, bool)> {
    RECORDS.with(|records| records.take())
}

/// Messages logged on this thread while interrupts were disabled.
pub fn logged_masked() -> Vec<String> {
    take()
        .into_iter()
        .filter(|(_, masked)| *masked)
        .map(|(message, _)| message)
        .collect()
}
