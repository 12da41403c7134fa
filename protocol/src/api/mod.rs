//! API DTOs module
//!
//! This module contains all API data transfer objects organized by endpoint:
//! - `chat`: LLM chat endpoint (`/api/chat`)
//! - `sensor`: fridge temperature endpoints (`getTemp.php`, `api.php`)

pub mod chat;
pub mod sensor;

pub use chat::*;
pub use sensor::*;
