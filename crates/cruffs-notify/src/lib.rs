//! # cruffs-notify: Email Relay Client
//!
//! Fire-and-forget client for the transactional email relay. Events are
//! queued on an in-process channel and posted by a detached worker; the
//! order flow never waits on, and never fails because of, this crate.
//!
//! ## Modules
//!
//! - [`events`] - Typed payloads, one per relay endpoint
//! - [`notifier`] - The queue handle and its worker

pub mod events;
pub mod notifier;

pub use events::{ItemSummary, NotifyEvent};
pub use notifier::Notifier;
