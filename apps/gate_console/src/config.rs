use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::Context;
use gate_core::{DashboardOptions, SimulatedFailure, SimulatedTosSync, SyncPolicy};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "gate.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub sync_latency_ms: u64,
    pub sync_timeout_ms: u64,
    pub sync_max_attempts: u32,
    pub sync_retry_delay_ms: u64,
    pub show_seal_row: bool,
    pub default_lane: Option<String>,
    /// 0 never fails, 1 rejects every sync, N rejects every N-th sync.
    pub simulate_failures: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sync_latency_ms: 2000,
            sync_timeout_ms: 5000,
            sync_max_attempts: 1,
            sync_retry_delay_ms: 500,
            show_seal_row: false,
            default_lane: None,
            simulate_failures: 0,
        }
    }
}

impl Settings {
    pub fn sync_policy(&self) -> SyncPolicy {
        SyncPolicy {
            timeout: Duration::from_millis(self.sync_timeout_ms),
            max_attempts: self.sync_max_attempts.max(1),
            retry_delay: Duration::from_millis(self.sync_retry_delay_ms),
        }
    }

    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            include_seal_row: self.show_seal_row,
        }
    }

    pub fn simulated_sink(&self) -> SimulatedTosSync {
        let failure = match self.simulate_failures {
            0 => SimulatedFailure::Never,
            1 => SimulatedFailure::Always,
            n => SimulatedFailure::EveryNth(n),
        };
        SimulatedTosSync::with_failure(Duration::from_millis(self.sync_latency_ms), failure)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    sync_latency_ms: Option<u64>,
    sync_timeout_ms: Option<u64>,
    sync_max_attempts: Option<u32>,
    sync_retry_delay_ms: Option<u64>,
    show_seal_row: Option<bool>,
    default_lane: Option<String>,
    simulate_failures: Option<u32>,
}

/// Defaults, then the TOML file, then `GATE_*` / `APP__*` environment variables.
///
/// An explicit `path` must exist; the default `gate.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        Err(err) if required => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()));
        }
        Err(_) => {}
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file.sync_latency_ms {
        settings.sync_latency_ms = v;
    }
    if let Some(v) = file.sync_timeout_ms {
        settings.sync_timeout_ms = v;
    }
    if let Some(v) = file.sync_max_attempts {
        settings.sync_max_attempts = v;
    }
    if let Some(v) = file.sync_retry_delay_ms {
        settings.sync_retry_delay_ms = v;
    }
    if let Some(v) = file.show_seal_row {
        settings.show_seal_row = v;
    }
    if let Some(v) = file.default_lane {
        settings.default_lane = Some(v);
    }
    if let Some(v) = file.simulate_failures {
        settings.simulate_failures = v;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    let var = |name: &str| {
        lookup(&format!("APP__{name}")).or_else(|| lookup(&format!("GATE_{name}")))
    };

    override_parsed(&mut settings.sync_latency_ms, var("SYNC_LATENCY_MS"));
    override_parsed(&mut settings.sync_timeout_ms, var("SYNC_TIMEOUT_MS"));
    override_parsed(&mut settings.sync_max_attempts, var("SYNC_MAX_ATTEMPTS"));
    override_parsed(&mut settings.sync_retry_delay_ms, var("SYNC_RETRY_DELAY_MS"));
    override_parsed(&mut settings.show_seal_row, var("SHOW_SEAL_ROW"));
    override_parsed(&mut settings.simulate_failures, var("SIMULATE_FAILURES"));

    if let Some(v) = var("DEFAULT_LANE") {
        let v = v.trim();
        settings.default_lane = (!v.is_empty()).then(|| v.to_string());
    }
}

fn override_parsed<T: FromStr>(slot: &mut T, raw: Option<String>) {
    if let Some(parsed) = raw.and_then(|v| v.trim().parse::<T>().ok()) {
        *slot = parsed;
    }
}
