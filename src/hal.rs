//! Hardware Abstraction Layer
//!
//! Bus transport and time source seams. Platform-neutral: the driver only
//! depends on these traits, firmware builds plug in embassy implementations.

pub mod i2c;
pub mod timer;
