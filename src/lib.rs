//! Library crate for student-groups.
//!
//! This crate exposes the building blocks of the TUI:
//! - Class roster and shuffling (`roster`)
//! - Pure grouping transforms (`grouping`)
//! - Application state, interaction controller and event loop (`app`)
//! - UI rendering (`ui`)
//! - Logging setup (`logging`) and error types (`error`)
//!
//! It is used by the `student-groups` binary and by tests.
#![doc = include_str!("../README.md")]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod app;
pub mod error;
pub mod grouping;
pub mod logging;
pub mod roster;
pub mod ui;

/// Convenient error and result types shared across the crate.
pub use error::{DynError, Result};
