use crate::aggregate::DEFAULT_WEEKLY_TARGET_MINUTES;
use crate::view::DEFAULT_PAGE_SIZE;
use std::{env, path::PathBuf, str::FromStr, time::Duration};
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/state.json";
const DEFAULT_TOOLTIP_DELAY_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub weekly_target_minutes: u32,
    pub page_size: usize,
    pub tooltip_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            weekly_target_minutes: DEFAULT_WEEKLY_TARGET_MINUTES,
            page_size: DEFAULT_PAGE_SIZE,
            tooltip_delay: Duration::from_millis(DEFAULT_TOOLTIP_DELAY_MS),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: parse_var(&lookup, "PORT", defaults.port, |_| true),
            data_path: lookup("APP_DATA_PATH")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            weekly_target_minutes: parse_var(
                &lookup,
                "WEEKLY_TARGET_MINUTES",
                defaults.weekly_target_minutes,
                |minutes| *minutes > 0,
            ),
            page_size: parse_var(&lookup, "PAGE_SIZE", defaults.page_size, |size| *size > 0),
            tooltip_delay: Duration::from_millis(parse_var(
                &lookup,
                "TOOLTIP_DELAY_MS",
                DEFAULT_TOOLTIP_DELAY_MS,
                |_| true,
            )),
        }
    }
}

fn parse_var<T: FromStr + Copy>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    valid: impl Fn(&T) -> bool,
) -> T {
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => value,
        _ => {
            warn!("ignoring invalid {key}={raw:?}");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_path, PathBuf::from("data/state.json"));
        assert_eq!(config.weekly_target_minutes, 150);
        assert_eq!(config.page_size, 5);
        assert_eq!(config.tooltip_delay, Duration::from_millis(500));
    }

    #[test]
    fn values_are_read_from_environment() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("APP_DATA_PATH", "/tmp/workouts.json"),
            ("WEEKLY_TARGET_MINUTES", "500"),
            ("PAGE_SIZE", "10"),
        ]);
        assert_eq!(config.port, 9000);
        assert_eq!(config.data_path, PathBuf::from("/tmp/workouts.json"));
        assert_eq!(config.weekly_target_minutes, 500);
        assert_eq!(config.page_size, 10);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config_from(&[
            ("PORT", "http"),
            ("WEEKLY_TARGET_MINUTES", "0"),
            ("PAGE_SIZE", "-3"),
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.weekly_target_minutes, 150);
        assert_eq!(config.page_size, 5);
    }
}
