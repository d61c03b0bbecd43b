//! Skylt panel drivers
//!
//! MIPI DCS command plumbing, the DBI Type C option 3 register bus, and
//! concrete panel drivers on top of `skylt-core`.

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod dbi;
pub mod dcs;
pub mod ili9341;
pub mod panel;

pub use config::PanelConfig;
pub use dbi::MipiDbiBus;
pub use ili9341::Ili9341;
pub use panel::MipiDbi;
