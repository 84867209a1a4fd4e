//! The Evaluation API facade (C5) and the subscriber wire protocol (§6).
//!
//! This is the crate external callers depend on: [`EvaluationService`] for
//! request/response evaluation, [`subscription::SubscriptionHub`] for the
//! config-mirroring stream.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod protocol;
pub mod service;
pub mod subscription;

pub use config::ApiConfig;
pub use protocol::{ClientMessage, ServerMessage};
pub use service::EvaluationService;
pub use subscription::{to_wire, SubscriptionHub};
