// src/host/mod.rs

//! Facts about the machine itself rather than about any action.
//!
//! - [`privilege`] checks for administrator rights before `run`.
//! - [`info`] samples OS, CPU, memory and uptime for `sysmaint info`.

pub mod info;
pub mod privilege;

pub use info::{collect, SystemSnapshot};
pub use privilege::{admit, detect, Elevation};
