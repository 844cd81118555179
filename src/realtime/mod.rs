//! Realtime notifications
//!
//! A [`Broker`] fans wake-up signals out to topic subscribers; SSE handlers
//! turn each signal into a fresh snapshot for their client.

pub mod broker;
pub mod sse;
pub mod topics;

pub use broker::{Broker, Subscription};
pub use topics::Topic;
