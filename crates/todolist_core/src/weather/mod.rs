//! Weather fetch client.
//!
//! # Responsibility
//! - Perform the single outbound current-conditions lookup.
//! - Keep HTTP and JSON details out of the view-model.

pub mod client;
pub mod error;

pub use client::{decode_current_conditions, HttpWeatherClient, WeatherClient};
pub use error::{WeatherError, WeatherResult};
