//! Platform-agnostic core logic for WiFi transceiver firmware
//!
//! This crate contains the socket shim and the WiFi geolocation reporter.
//! It has NO hardware dependencies: the transceiver is reached only through
//! `wifi_hal_abstractions::Transceiver`, which BSPs implement.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
#![deny(warnings)]

// Must come first so the logging macros are visible to every module below
#[macro_use]
mod fmt;

pub mod geolocate;
pub mod network;

#[cfg(test)]
mod testing;

pub use wifi_hal_abstractions as hal;
