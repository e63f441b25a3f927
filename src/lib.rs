//! Installment calculator funnel.
//!
//! A three-screen lead funnel (calculator, confirmation, success) for a single
//! fixed-rate installment product. The pricing, validation and navigation
//! core is free of I/O; storage, analytics and submission are injected into
//! [`funnel::Funnel`], and [`ui`] drives it from a terminal.

pub mod analytics;
pub mod config;
pub mod finance;
pub mod funnel;
pub mod logging;
pub mod money;
pub mod navigation;
pub mod state;
pub mod storage;
pub mod submission;
pub mod ui;
pub mod validation;

pub use config::{ConfigError, FunnelConfig};
pub use finance::{compute_annual_service_fee, compute_monthly_payment, Term};
pub use funnel::{Funnel, FunnelEvent};
pub use navigation::{resolve_screen, NavigationToken, Screen};
pub use validation::{is_amount_valid, parse_amount};
