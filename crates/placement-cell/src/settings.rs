//! Key-value settings consumed by the landing page and the progression engine.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::AcademicsConfig;

pub mod keys {
    pub const CURRENT_ACADEMIC_HALF: &str = "current_academic_half";
    pub const MESSAGE_FROM_HOD: &str = "message_from_hod";
    pub const MESSAGE_FROM_TPC_HEAD: &str = "message_from_tpc_head";
}

pub const DEFAULT_HOD_MESSAGE: &str = "Welcome to the Department of Computer Science and Engineering. \
The department offers B.Tech, M.Tech and Ph.D. programs and runs a very active \
Training and Placement Cell that takes care of the training and placement of its students.";

pub const DEFAULT_TPC_HEAD_MESSAGE: &str =
    "Welcome to the Training and Placement Cell of the Department of Computer Science.";

/// Mutable configuration persisted alongside the domain data.
pub trait SettingsStore: Send + Sync {
    /// Return the stored value, creating it from `default` when absent.
    fn get_or_create(&self, key: &str, default: &str) -> String;
    fn set(&self, key: &str, value: &str);
}

#[derive(Default, Clone)]
pub struct MemorySettings {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the well-known keys so the first request does not race the writes.
    pub fn seeded(config: &AcademicsConfig) -> Self {
        let settings = Self::new();
        settings.get_or_create(keys::CURRENT_ACADEMIC_HALF, &config.academic_half);
        settings.get_or_create(keys::MESSAGE_FROM_HOD, DEFAULT_HOD_MESSAGE);
        settings.get_or_create(keys::MESSAGE_FROM_TPC_HEAD, DEFAULT_TPC_HEAD_MESSAGE);
        settings
    }
}

impl SettingsStore for MemorySettings {
    fn get_or_create(&self, key: &str, default: &str) -> String {
        let mut guard = self.values.lock().expect("settings mutex poisoned");
        guard
            .entry(key.to_string())
            .or_insert_with(|| default.to_string())
            .clone()
    }

    fn set(&self, key: &str, value: &str) {
        let mut guard = self.values.lock().expect("settings mutex poisoned");
        guard.insert(key.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_create_keeps_the_first_written_value() {
        let settings = MemorySettings::new();
        assert_eq!(settings.get_or_create("k", "first"), "first");
        assert_eq!(settings.get_or_create("k", "second"), "first");
    }

    #[test]
    fn set_overrides_existing_value() {
        let settings = MemorySettings::new();
        settings.get_or_create(keys::CURRENT_ACADEMIC_HALF, "odd");
        settings.set(keys::CURRENT_ACADEMIC_HALF, "even");
        assert_eq!(
            settings.get_or_create(keys::CURRENT_ACADEMIC_HALF, "odd"),
            "even"
        );
    }

    #[test]
    fn seeded_settings_contain_landing_messages() {
        let settings = MemorySettings::seeded(&AcademicsConfig {
            academic_half: "even".to_string(),
        });
        assert_eq!(
            settings.get_or_create(keys::CURRENT_ACADEMIC_HALF, "odd"),
            "even"
        );
        assert!(settings
            .get_or_create(keys::MESSAGE_FROM_HOD, "")
            .contains("Training and Placement"));
    }
}
