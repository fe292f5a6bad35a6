//! System configuration and hardware constants
//!
//! Compile-time constants for the RDA5807M and the demo receiver board.
//! Bus addresses, timing and power-on register values are centralized here.

use crate::types::{Band, ChannelSpacing};

/// I2C bus frequency (the chip supports fast mode)
pub const I2C_FREQUENCY_HZ: u32 = 400_000;

/// Sequential-access I2C address (status burst reads)
pub const SEQUENTIAL_I2C_ADDR: u8 = 0x10;

/// Random-access I2C address (single register reads and writes)
pub const RANDOM_ACCESS_I2C_ADDR: u8 = 0x11;

/// Chip ID register address
pub const CHIP_ID_REGISTER: u8 = 0x00;

/// Expected high byte of the chip ID (reads as 0x58xx)
pub const EXPECTED_CHIP_ID_HIGH: u8 = 0x58;

/// Number of control registers (0x02..=0x08)
pub const CONTROL_REGISTER_COUNT: usize = 7;

/// Number of status registers (0x0A..=0x0F)
pub const STATUS_REGISTER_COUNT: usize = 6;

/// Bytes requested in one status burst read
pub const STATUS_BURST_BYTES: usize = STATUS_REGISTER_COUNT * 2;

/// Minimum time between two status burst reads
pub const STATUS_REFRESH_MS: u64 = 500;

/// Power-on values of the control registers 0x02..=0x08
///
/// Audio enabled and unmuted, seek up with stop at band limit, 32.768 kHz
/// clock, chip enabled, 50 us de-emphasis, soft mute on, interrupt held until
/// read, seek threshold 8, LNA on the (+) input, volume 11, soft blend on.
pub const POWER_ON_REGISTERS: [u16; CONTROL_REGISTER_COUNT] = [
    0xC281, // 0x02
    0x0000, // 0x03
    0x0A00, // 0x04
    0x888B, // 0x05
    0x0000, // 0x06
    0x4202, // 0x07
    0x0000, // 0x08
];

/// Maximum audio volume (4-bit field)
pub const MAX_VOLUME: u8 = 15;

/// Maximum seek SNR threshold (4-bit field)
pub const MAX_SEEK_THRESHOLD: u8 = 15;

/// Maximum soft blend threshold (5-bit field)
pub const MAX_SOFT_BLEND_THRESHOLD: u8 = 31;

/// Maximum legacy seek threshold (6-bit field)
pub const MAX_SEEK_THRESHOLD_OLD: u8 = 63;

/// Maximum I2S open mode (2-bit field)
pub const MAX_OPEN_MODE: u8 = 3;

/// Maximum channel number (10-bit field)
pub const MAX_CHANNEL: u16 = 0x3FF;

/// Maximum RSSI reported by the chip (7-bit field)
pub const MAX_SIGNAL_STRENGTH: u8 = 127;

/// Default band for the demo receiver
pub const DEFAULT_BAND: Band = Band::Western;

/// Default channel spacing for the demo receiver
pub const DEFAULT_SPACING: ChannelSpacing = ChannelSpacing::Khz100;

/// Default start-up station in kHz
pub const DEFAULT_STATION_KHZ: u32 = 100_000;

/// Default start-up volume
pub const DEFAULT_VOLUME: u8 = 8;

/// Pin assignments for the demo board
pub mod pins {
    //! GPIO pin assignments matching the schematic

    /// I2C1 SCL (RDA5807M)
    pub const I2C1_SCL: &str = "PB8";

    /// I2C1 SDA (RDA5807M)
    pub const I2C1_SDA: &str = "PB9";

    /// Status LED
    pub const LED_STATUS: &str = "PA5";
}
