use std::env;
use std::fmt;

use chrono::Duration;

use crate::commands::giveaway::util::parse_duration;
use crate::error::{Error, Result};

pub const DEFAULT_MAX_DURATION: &str = "30d";
pub const DEFAULT_MAX_WINNERS: usize = 50;

#[derive(Clone)]
pub struct Config {
    // Bot token used for connecting to Discord
    pub discord_token: String,
    // The longest giveaway that can be created
    pub max_duration: Duration,
    // The maximum number of winners per giveaway
    pub max_winners: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Config::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                Error::Configuration("Expected a DISCORD_TOKEN in the environment".to_string())
            })?;

        let raw_max_duration =
            lookup("GIVEAWAY_MAX_DURATION").unwrap_or(DEFAULT_MAX_DURATION.to_string());
        let max_duration = parse_duration(&raw_max_duration).map_err(|_| {
            let message = format!("Invalid GIVEAWAY_MAX_DURATION value: {}", raw_max_duration);
            Error::Configuration(message)
        })?;

        let max_winners = match lookup("GIVEAWAY_MAX_WINNERS") {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|value| *value > 0)
                .ok_or_else(|| {
                    let message = format!("Invalid GIVEAWAY_MAX_WINNERS value: {}", value);
                    Error::Configuration(message)
                })?,
            None => DEFAULT_MAX_WINNERS,
        };

        Ok(Config {
            discord_token,
            max_duration,
            max_winners,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"***")
            .field("max_duration", &self.max_duration)
            .field("max_winners", &self.max_winners)
            .finish()
    }
}
