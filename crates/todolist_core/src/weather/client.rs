//! Current-conditions HTTP client.
//!
//! # Responsibility
//! - Build the `GET /v1/current.json` request for one coordinate.
//! - Map status codes and body decoding failures to [`WeatherError`].
//!
//! # Invariants
//! - Only HTTP 200 is success.
//! - Each fetch is independent: no retry, no caching.
//! - Log events carry metadata only (no api key, no coordinates).

use super::error::{WeatherError, WeatherResult};
use crate::config::WeatherConfig;
use crate::model::weather::{Coordinate, WeatherSnapshot};
use log::{debug, warn};
use serde::Deserialize;
use std::time::Instant;

/// Source of current weather conditions.
///
/// `Send + Sync` so the view-model can run a fetch on a worker thread.
pub trait WeatherClient: Send + Sync {
    fn fetch(&self, coordinate: Coordinate) -> WeatherResult<WeatherSnapshot>;
}

impl<T: WeatherClient + ?Sized> WeatherClient for std::sync::Arc<T> {
    fn fetch(&self, coordinate: Coordinate) -> WeatherResult<WeatherSnapshot> {
        (**self).fetch(coordinate)
    }
}

#[derive(Debug, Deserialize)]
struct CurrentConditionsWire {
    location: LocationWire,
    current: CurrentWire,
}

#[derive(Debug, Deserialize)]
struct LocationWire {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CurrentWire {
    temp_c: f64,
    condition: ConditionWire,
}

#[derive(Debug, Deserialize)]
struct ConditionWire {
    text: String,
}

/// Decodes a current-conditions response body.
///
/// Extra fields are ignored; missing or mistyped fields are a parse error.
pub fn decode_current_conditions(body: &str) -> WeatherResult<WeatherSnapshot> {
    let wire: CurrentConditionsWire =
        serde_json::from_str(body).map_err(|err| WeatherError::Parse {
            reason: err.to_string(),
        })?;

    Ok(WeatherSnapshot {
        location_name: wire.location.name,
        condition_text: wire.current.condition.text,
        temperature_celsius: wire.current.temp_c,
    })
}

/// Blocking HTTP client for the weather API.
pub struct HttpWeatherClient {
    config: WeatherConfig,
    agent: ureq::Agent,
}

impl HttpWeatherClient {
    /// Uses the transport's default timeouts.
    pub fn new(config: WeatherConfig) -> Self {
        Self {
            config,
            agent: ureq::agent(),
        }
    }

    fn send(&self, coordinate: Coordinate) -> WeatherResult<String> {
        let response = self
            .agent
            .get(&self.config.current_conditions_url())
            .set("Content-Type", "application/json")
            .query("key", &self.config.api_key)
            .query("q", &coordinate.as_query())
            .query("aqi", &self.config.aqi)
            .call();

        let response = match response {
            Ok(response) => response,
            Err(ureq::Error::Status(status, _)) => return Err(WeatherError::for_status(status)),
            Err(ureq::Error::Transport(transport)) => {
                return Err(match transport.kind() {
                    ureq::ErrorKind::InvalidUrl | ureq::ErrorKind::UnknownScheme => {
                        WeatherError::BadRequest
                    }
                    _ => WeatherError::Transport(transport.to_string()),
                });
            }
        };

        if response.status() != 200 {
            return Err(WeatherError::for_status(response.status()));
        }

        response
            .into_string()
            .map_err(|err| WeatherError::Transport(err.to_string()))
    }
}

impl WeatherClient for HttpWeatherClient {
    fn fetch(&self, coordinate: Coordinate) -> WeatherResult<WeatherSnapshot> {
        let started_at = Instant::now();
        debug!("event=weather_request module=weather status=start");

        let result = self
            .send(coordinate)
            .and_then(|body| decode_current_conditions(&body));

        match &result {
            Ok(_) => debug!(
                "event=weather_request module=weather status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=weather_request module=weather status=error duration_ms={} error_code={} error={}",
                started_at.elapsed().as_millis(),
                err.code(),
                err
            ),
        }

        result
    }
}
