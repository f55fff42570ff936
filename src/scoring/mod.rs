//! External scoring upstream.

pub mod gateway;

pub use gateway::{ScoreError, ScoreGateway, ScorePayload};
