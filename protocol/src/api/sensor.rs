//! Temperature sensor DTOs

use serde::{Deserialize, Serialize};

/// Latest reading payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentTemperature {
    pub temperature: i64,
}

/// Response of GET getTemp.php
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureResponse {
    pub status: String,
    pub data: CurrentTemperature,
}

/// One historical sample, as returned by GET api.php
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureData {
    pub id: i64,
    pub temperature: f64,
    pub humidity: i64,
    pub timestamp: String,
}
