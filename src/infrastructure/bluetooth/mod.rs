//! Bluetooth Module
//!
//! BLE link to the Jake light.
//!
//! ```text
//! BluetoothService (command loop on the BLE thread)
//!        |
//! ConnectionManager ---- scanner (first matching advertisement)
//!        |
//! BleTransport / BleLink ---- platform (btleplug)
//! ```
//!
//! - [`protocol`] - GATT addresses of the light
//! - [`transport`] - transport traits and errors
//! - [`platform`] - btleplug implementation
//! - [`scanner`] - scan with timeout and cancellation
//! - [`connection`] - connection lifecycle and packet writes
//! - [`service`] - command loop

pub mod connection;
pub mod platform;
pub mod protocol;
pub mod scanner;
pub mod service;
pub mod transport;

#[cfg(test)]
pub(crate) mod fake;

pub use service::run_host_service;
