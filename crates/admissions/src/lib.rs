//! Course admission management: merit scoring, category-cutoff allocation,
//! and reporting, exposed through a service facade and an axum router.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
