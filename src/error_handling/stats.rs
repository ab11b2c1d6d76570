//! Processing statistics tracking.
//!
//! Thread-safe counters for errors and informational events, summarized by a
//! worker when it exits.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::{ErrorType, InfoType};

/// Thread-safe processing statistics tracker.
///
/// All types are initialized to zero on creation, so lookups never miss.
pub struct ProcessingStats {
    errors: HashMap<ErrorType, AtomicUsize>,
    info: HashMap<InfoType, AtomicUsize>,
}

impl Default for ProcessingStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStats {
    pub fn new() -> Self {
        let errors = ErrorType::iter()
            .map(|error| (error, AtomicUsize::new(0)))
            .collect();
        let info = InfoType::iter()
            .map(|info_type| (info_type, AtomicUsize::new(0)))
            .collect();

        ProcessingStats { errors, info }
    }

    pub fn increment_error(&self, error: ErrorType) {
        if let Some(counter) = self.errors.get(&error) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!("Error counter for {:?} missing from stats map", error);
        }
    }

    pub fn increment_info(&self, info_type: InfoType) {
        if let Some(counter) = self.info.get(&info_type) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!("Info counter for {:?} missing from stats map", info_type);
        }
    }

    pub fn get_error_count(&self, error: ErrorType) -> usize {
        self.errors
            .get(&error)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn get_info_count(&self, info_type: InfoType) -> usize {
        self.info
            .get(&info_type)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Get total error count across all error types.
    pub fn total_errors(&self) -> usize {
        ErrorType::iter().map(|e| self.get_error_count(e)).sum()
    }

    /// Get total info count across all info types.
    pub fn total_info(&self) -> usize {
        InfoType::iter().map(|i| self.get_info_count(i)).sum()
    }

    /// Logs every non-zero counter at info level.
    pub fn log_summary(&self) {
        for error_type in ErrorType::iter() {
            let count = self.get_error_count(error_type);
            if count > 0 {
                log::info!("   {:?}: {}", error_type, count);
            }
        }
        for info_type in InfoType::iter() {
            let count = self.get_info_count(info_type);
            if count > 0 {
                log::info!("   {:?}: {}", info_type, count);
            }
        }
    }
}
