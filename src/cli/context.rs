use std::path::Path;

use crate::cli::output::OutputFormat;
use crate::settings::{Settings, SettingsStore};

pub struct CliContext {
    store: SettingsStore,
    settings: Settings,
    output: OutputFormat,
}

impl CliContext {
    pub fn new(store: SettingsStore, settings: Settings, output: OutputFormat) -> Self {
        Self {
            store,
            settings,
            output,
        }
    }

    /// Settings as loaded at startup, with the environment key applied.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    pub fn settings_path(&self) -> &Path {
        self.store.path()
    }

    pub fn output(&self) -> OutputFormat {
        self.output
    }
}
