use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{config_error, Error};

/// Settings shared by every navigation session the process creates.
#[derive(Clone, Debug)]
pub struct Settings {
    pub city: Option<String>,
    pub arrival_radius_meters: f64,
    pub retry_attempts: u32,
    pub retry_backoff: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            city: None,
            arrival_radius_meters: 30.0,
            retry_attempts: 3,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub amap_api_base: String,
    pub amap_api_key: String,
    pub request_timeout: Duration,
    pub listen_addr: SocketAddr,
    pub settings: Settings,
}

impl Config {
    /// Reads the process environment. `AMAP_API_KEY` is the only required
    /// variable; everything else falls back to a default.
    #[tracing::instrument(name = "Config::from_env")]
    pub fn from_env() -> Result<Self, Error> {
        let defaults = Settings::default();

        let settings = Settings {
            city: env::var("CITYWALK_CITY").ok().filter(|city| !city.trim().is_empty()),
            arrival_radius_meters: parse_or("CITYWALK_ARRIVAL_RADIUS_METERS", defaults.arrival_radius_meters)?,
            retry_attempts: parse_or("CITYWALK_RETRY_ATTEMPTS", defaults.retry_attempts)?.max(1),
            retry_backoff: Duration::from_millis(parse_or(
                "CITYWALK_RETRY_BACKOFF_MS",
                defaults.retry_backoff.as_millis() as u64,
            )?),
        };

        if !(settings.arrival_radius_meters.is_finite() && settings.arrival_radius_meters >= 0.0) {
            return Err(config_error("CITYWALK_ARRIVAL_RADIUS_METERS"));
        }

        Ok(Self {
            amap_api_base: env::var("AMAP_API_BASE").unwrap_or_else(|_| "restapi.amap.com".into()),
            amap_api_key: env::var("AMAP_API_KEY")?,
            request_timeout: Duration::from_secs(parse_or("CITYWALK_REQUEST_TIMEOUT_SECS", 10)?),
            listen_addr: parse_or("CITYWALK_LISTEN_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?,
            settings,
        })
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> Result<T, Error> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| config_error(key)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_or_falls_back_when_unset() {
        let value: u32 = parse_or("CITYWALK_TEST_SURELY_UNSET_VARIABLE", 7).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn parse_or_rejects_garbage() {
        env::set_var("CITYWALK_TEST_GARBAGE_RADIUS", "thirty");
        let err = parse_or::<f64>("CITYWALK_TEST_GARBAGE_RADIUS", 30.0).unwrap_err();
        assert_eq!(err.code, 2);
    }

    #[test]
    fn parse_or_trims_values() {
        env::set_var("CITYWALK_TEST_PADDED_ATTEMPTS", " 5 ");
        let value: u32 = parse_or("CITYWALK_TEST_PADDED_ATTEMPTS", 3).unwrap();
        assert_eq!(value, 5);
    }
}
