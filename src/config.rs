use log::warn;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_INTERVAL_SECS: u64 = 120;
const DEFAULT_DEMO_MATCHDAYS: u32 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub interval: Duration,
    pub is_one_shot: bool,
    pub demo_players: Option<usize>,
    pub demo_matchdays: u32,
    pub seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let interval_secs: u64 = parse_or(&value, "MATCHDAY_INTERVAL_SECS", DEFAULT_INTERVAL_SECS).max(1);

        Config {
            data_dir: value("FARM_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            interval: Duration::from_secs(interval_secs),
            is_one_shot: value("MODE").as_deref() == Some("ONESHOT"),
            demo_players: parse_opt::<usize>(&value, "FARM_DEMO_LEAGUE").filter(|n| *n >= 1),
            demo_matchdays: parse_or(&value, "FARM_DEMO_MATCHDAYS", DEFAULT_DEMO_MATCHDAYS),
            seed: parse_opt(&value, "FARM_SEED"),
        }
    }
}

fn parse_opt<T: FromStr>(value: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = value(key)?;

    match raw.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("{}={} is not a valid value, ignoring", key, raw);
            None
        }
    }
}

fn parse_or<T: FromStr>(value: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    parse_opt(value, key).unwrap_or(default)
}
