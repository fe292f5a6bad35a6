//! RDA5807M FM Receiver Driver Library
//!
//! Register-model driver for the RDA5807M single-chip FM stereo receiver
//! with RDS/RBDS. The chip is controlled entirely through 16-bit registers
//! on an I2C bus.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       DRIVER LAYER                           │
//! │   Rda5807m: setters, commit, status accessors                │
//! ├─────────────────────────────────────────────────────────────┤
//! │                      REGISTER MODEL                          │
//! │  Control records 0x02..0x08  │  Status decode 0x0A..0x0F     │
//! │  Shadow map (write diffing)  │  500 ms snapshot cache        │
//! ├─────────────────────────────────────────────────────────────┤
//! │                           HAL                                │
//! │  Transport (embedded-hal I2C adapter)  │  Clock              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Type-driven registers**: one record per register, pure serializers
//! - **Saturating inputs**: out-of-range property values clamp, never fail
//! - **Minimal bus traffic**: only changed registers are written, status is
//!   read in one burst and cached
//! - **Explicit error handling**: bus failures are returned, short status
//!   bursts are tagged as degraded snapshots
//! - **Injected capabilities**: transport and clock are traits

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[macro_use]
mod fmt;

/// Hardware Abstraction Layer
///
/// Bus transport and clock traits.
pub mod hal;

/// Peripheral Drivers
///
/// The RDA5807M driver.
pub mod drivers;

/// Register Model
///
/// Control register records and status decoding.
pub mod registers;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Prelude module for common imports
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::drivers::rda5807m::{CommitReport, Rda5807m};
    pub use crate::hal::i2c::{BusAddress, BusResult, Error, I2cTransport, Transport};
    #[cfg(feature = "embedded")]
    pub use crate::hal::timer::EmbassyClock;
    pub use crate::hal::timer::Clock;
    pub use crate::registers::control::ControlRegisters;
    pub use crate::registers::status::{Snapshot, Status};
    pub use crate::types::*;
}
