// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies
//
// Shared test logger: records every log message for assertions and forwards
// to env_logger's test writer so `--nocapture` runs still show output.

use std::sync::{Mutex, OnceLock};

use log::{Level, LevelFilter, Log, Metadata, Record};

pub struct CaptureLogger {
    inner: env_logger::Logger,
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut records) = self.records.lock() {
            records.push((record.level(), record.args().to_string()));
        }
        if self.inner.matches(record) {
            self.inner.log(record);
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Install the capturing logger once per test binary
pub fn install() -> &'static CaptureLogger {
    static LOGGER: OnceLock<CaptureLogger> = OnceLock::new();
    let logger = LOGGER.get_or_init(|| CaptureLogger {
        inner: env_logger::Builder::from_default_env()
            .is_test(true)
            .build(),
        records: Mutex::new(Vec::new()),
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(LevelFilter::Trace);
    }
    logger
}

/// Install the capturing logger and drop everything recorded so far
pub fn capture() -> &'static CaptureLogger {
    let logger = install();
    logger.records.lock().unwrap().clear();
    logger
}

/// Messages recorded at `level`, oldest first
pub fn messages(logger: &CaptureLogger, level: Level) -> Vec<String> {
    logger
        .records
        .lock()
        .unwrap()
        .iter()
        .filter(|(l, _)| *l == level)
        .map(|(_, msg)| msg.clone())
        .collect()
}
