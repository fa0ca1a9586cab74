/// Configuration management
use crate::error::{DeskError, Result};
use crate::model::Handler;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_REPLY_DELAY_MS: u64 = 1500;
const DEFAULT_NOTIFICATION_DURATION_MS: u64 = 3000;

/// Desk configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Delay before the automatic reply lands
    pub reply_delay: Duration,

    /// How long transfer / settings notifications stay visible
    pub notification_duration_ms: u64,

    /// Seed for reply selection (random when unset)
    pub rng_seed: Option<u64>,

    /// Tab shown when the desk opens
    pub initial_tab: Handler,

    /// Write logs here instead of stderr
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reply_delay: Duration::from_millis(DEFAULT_REPLY_DELAY_MS),
            notification_duration_ms: DEFAULT_NOTIFICATION_DURATION_MS,
            rng_seed: None,
            initial_tab: Handler::Ai,
            log_file: None,
        }
    }
}

impl Config {
    /// Usage line for the command-line flags
    pub fn usage(bin: &str) -> String {
        format!(
            "Usage: {} [--reply-delay-ms <ms>] [--seed <n>] [--tab <ai|agent>] [--log-file <path>]",
            bin
        )
    }

    /// Create config from command line arguments (`args[0]` is the binary)
    pub fn from_args(args: &[String]) -> Result<Self> {
        let mut config = Self::default();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--reply-delay-ms" => {
                    let v = flag_value(args, i, "--reply-delay-ms")?;
                    config.reply_delay = Duration::from_millis(v.parse::<u64>().map_err(|_| {
                        DeskError::Config("--reply-delay-ms must be a number of milliseconds".to_string())
                    })?);
                    i += 2;
                }
                "--seed" => {
                    let v = flag_value(args, i, "--seed")?;
                    config.rng_seed = Some(v.parse::<u64>().map_err(|_| {
                        DeskError::Config("--seed must be an unsigned number".to_string())
                    })?);
                    i += 2;
                }
                "--tab" => {
                    let v = flag_value(args, i, "--tab")?;
                    config.initial_tab = v.parse::<Handler>().map_err(DeskError::Config)?;
                    i += 2;
                }
                "--log-file" => {
                    let v = flag_value(args, i, "--log-file")?;
                    config.log_file = Some(PathBuf::from(v));
                    i += 2;
                }
                other => {
                    return Err(DeskError::Config(format!(
                        "unknown argument '{}'\n{}",
                        other,
                        Self::usage(args.first().map(|s| s.as_str()).unwrap_or("desk"))
                    )));
                }
            }
        }

        // Env overrides (nice for scripts)
        if let Some(ms) = std::env::var("DESK_REPLY_DELAY_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            config.reply_delay = Duration::from_millis(ms);
        }
        if let Some(seed) = std::env::var("DESK_SEED")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            config.rng_seed = Some(seed);
        }

        Ok(config)
    }
}

fn flag_value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    args.get(i + 1)
        .map(|s| s.as_str())
        .ok_or_else(|| DeskError::Config(format!("{} requires a value", flag)))
}
