//! Bridge between a method-call channel and the native notification service.
//!
//! Callers send `notify` and `close` calls; the bridge submits them to the
//! OS and reports `onLocalNotificationShow`, `onLocalNotificationClose`,
//! `onLocalNotificationClick` and `onLocalNotificationClickAction` events.

pub mod bridge;
pub mod channel;
pub mod client;
pub mod config;
pub mod daemon;
pub mod error;
pub mod notify;

pub use error::NotificationError;
