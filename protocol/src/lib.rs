//! Wire types shared by the fridge assistant and its endpoints
//!
//! - `api`: request/response DTOs for the chat and sensor endpoints
//! - `common`: small types reused across DTOs

pub mod api;
pub mod common;

pub use api::*;
pub use common::*;
