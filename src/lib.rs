//! Pre-flight checklist validation against recorded flight telemetry.
//!
//! A telemetry log is loaded once ([`data::loader`]), reduced to its
//! on-ground samples ([`data::filter`]) and each checklist step is classified
//! against the reference sample ([`validate`]). [`state::ChecklistSession`]
//! walks a pilot through the steps.

pub mod checklist;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod state;
pub mod ui;
pub mod validate;
