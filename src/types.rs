//! Shared types used across the driver
//!
//! Domain types for the enum-coded register fields. Each type knows its
//! register code, and raw-code constructors never fail: invalid codes map
//! to the power-on default, as the hardware tolerates any bit pattern.

use crate::config::MAX_CHANNEL;

/// FM band selection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Band {
    /// 87-108 MHz (US/Europe)
    #[default]
    Western,
    /// 76-91 MHz (Japan)
    Japan,
    /// 76-108 MHz (world wide)
    WorldWide,
    /// 65-76 MHz (East Europe)
    EastEurope,
    /// 50-65 MHz
    Low,
}

impl Band {
    /// Create from a band number 0..=4 (invalid maps to `Western`)
    #[must_use]
    pub const fn from_choice(choice: u8) -> Self {
        match choice {
            1 => Self::Japan,
            2 => Self::WorldWide,
            3 => Self::EastEurope,
            4 => Self::Low,
            _ => Self::Western,
        }
    }

    /// 2-bit code written to register 0x03 bits 3..2
    ///
    /// `EastEurope` and `Low` share code 3; register 0x07 bit 9 tells them apart.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Western => 0,
            Self::Japan => 1,
            Self::WorldWide => 2,
            Self::EastEurope | Self::Low => 3,
        }
    }

    /// Value of the `65M_50M MODE` bit (register 0x07 bit 9) for this band
    #[must_use]
    pub const fn is_65mhz_mode(self) -> bool {
        !matches!(self, Self::Low)
    }

    /// Lower band edge in kHz
    #[must_use]
    pub const fn start_khz(self) -> u32 {
        match self {
            Self::Western => 87_000,
            Self::Japan | Self::WorldWide => 76_000,
            Self::EastEurope => 65_000,
            Self::Low => 50_000,
        }
    }

    /// Upper band edge in kHz
    #[must_use]
    pub const fn end_khz(self) -> u32 {
        match self {
            Self::Western | Self::WorldWide => 108_000,
            Self::Japan => 91_000,
            Self::EastEurope => 76_000,
            Self::Low => 65_000,
        }
    }

    /// Frequency of a channel number in kHz
    ///
    /// Frequency = spacing x channel + band start.
    #[must_use]
    pub const fn frequency_khz(self, spacing: ChannelSpacing, channel: u16) -> u32 {
        self.start_khz() + spacing.khz() * channel as u32
    }

    /// Channel number for a frequency, clamped to the band edges
    #[must_use]
    pub fn channel_for(self, spacing: ChannelSpacing, khz: u32) -> u16 {
        let khz = khz.clamp(self.start_khz(), self.end_khz());
        let channel = (khz - self.start_khz()) / spacing.khz();
        u16::try_from(channel).map_or(MAX_CHANNEL, |c| c.min(MAX_CHANNEL))
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Band {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Western => defmt::write!(f, "87-108MHz"),
            Self::Japan => defmt::write!(f, "76-91MHz"),
            Self::WorldWide => defmt::write!(f, "76-108MHz"),
            Self::EastEurope => defmt::write!(f, "65-76MHz"),
            Self::Low => defmt::write!(f, "50-65MHz"),
        }
    }
}

/// Channel spacing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ChannelSpacing {
    /// 100 kHz
    #[default]
    Khz100,
    /// 200 kHz (US)
    Khz200,
    /// 50 kHz
    Khz50,
    /// 25 kHz
    Khz25,
}

impl ChannelSpacing {
    /// Create from a 2-bit code (upper bits ignored)
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            1 => Self::Khz200,
            2 => Self::Khz50,
            3 => Self::Khz25,
            _ => Self::Khz100,
        }
    }

    /// Register code
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Khz100 => 0,
            Self::Khz200 => 1,
            Self::Khz50 => 2,
            Self::Khz25 => 3,
        }
    }

    /// Step size in kHz
    #[must_use]
    pub const fn khz(self) -> u32 {
        match self {
            Self::Khz100 => 100,
            Self::Khz200 => 200,
            Self::Khz50 => 50,
            Self::Khz25 => 25,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ChannelSpacing {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}kHz", self.khz());
    }
}

/// Reference clock frequency (`CLK_MODE`)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ClockMode {
    /// 32.768 kHz crystal
    #[default]
    Khz32_768,
    /// 12 MHz
    Mhz12,
    /// 13 MHz
    Mhz13,
    /// 19.2 MHz
    Mhz19_2,
    /// 24 MHz
    Mhz24,
    /// 26 MHz
    Mhz26,
    /// 38.4 MHz
    Mhz38_4,
}

impl ClockMode {
    /// Create from a 3-bit code; code 4 and anything above 7 map to 32.768 kHz
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits {
            1 => Self::Mhz12,
            2 => Self::Mhz13,
            3 => Self::Mhz19_2,
            5 => Self::Mhz24,
            6 => Self::Mhz26,
            7 => Self::Mhz38_4,
            _ => Self::Khz32_768,
        }
    }

    /// Register code
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Khz32_768 => 0,
            Self::Mhz12 => 1,
            Self::Mhz13 => 2,
            Self::Mhz19_2 => 3,
            Self::Mhz24 => 5,
            Self::Mhz26 => 6,
            Self::Mhz38_4 => 7,
        }
    }
}

/// FM de-emphasis time constant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DeEmphasis {
    /// 75 us (US)
    Us75,
    /// 50 us (Europe)
    #[default]
    Us50,
}

/// Seek direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SeekDirection {
    /// Towards higher frequencies
    #[default]
    Up,
    /// Towards lower frequencies
    Down,
}

/// GPIO pin of the chip
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gpio {
    /// GPIO1 (no special function)
    Gpio1,
    /// GPIO2 (seek/tune interrupt output)
    Gpio2,
    /// GPIO3 (mono/stereo indicator)
    Gpio3,
}

/// GPIO pin function
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GpioMode {
    /// High impedance
    #[default]
    HighImpedance,
    /// Special function (GPIO3 stereo indicator, GPIO2 interrupt)
    Special,
    /// Driven low
    Low,
    /// Driven high
    High,
}

impl GpioMode {
    /// Create from a 2-bit code (upper bits ignored)
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            1 => Self::Special,
            2 => Self::Low,
            3 => Self::High,
            _ => Self::HighImpedance,
        }
    }

    /// Register code
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::HighImpedance => 0,
            Self::Special => 1,
            Self::Low => 2,
            Self::High => 3,
        }
    }
}

/// Low noise amplifier input port
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LnaPort {
    /// No input
    None,
    /// LNAN input
    Negative,
    /// LNAP input
    #[default]
    Positive,
    /// Both inputs
    Dual,
}

impl LnaPort {
    /// Create from a 2-bit code (upper bits ignored)
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::None,
            1 => Self::Negative,
            3 => Self::Dual,
            _ => Self::Positive,
        }
    }

    /// Register code
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::None => 0,
            Self::Negative => 1,
            Self::Positive => 2,
            Self::Dual => 3,
        }
    }
}

/// Low noise amplifier working current
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LnaCurrent {
    /// 1.8 mA
    #[default]
    Ma1_8,
    /// 2.1 mA
    Ma2_1,
    /// 2.5 mA
    Ma2_5,
    /// 3.0 mA
    Ma3_0,
}

impl LnaCurrent {
    /// Create from a 2-bit code (upper bits ignored)
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            1 => Self::Ma2_1,
            2 => Self::Ma2_5,
            3 => Self::Ma3_0,
            _ => Self::Ma1_8,
        }
    }

    /// Register code
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Ma1_8 => 0,
            Self::Ma2_1 => 1,
            Self::Ma2_5 => 2,
            Self::Ma3_0 => 3,
        }
    }
}

/// Seek/tune interrupt behaviour (`INT_MODE`)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum InterruptMode {
    /// 5 ms low pulse on GPIO2
    Pulse,
    /// Held low until register 0x0C is read
    #[default]
    UntilRead,
}

/// I2S word-select rate (`I2S_SW_CNT`, master mode only)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum I2sSampleRate {
    /// 8 kHz
    #[default]
    Hz8000,
    /// 11.025 kHz
    Hz11025,
    /// 12 kHz
    Hz12000,
    /// 16 kHz
    Hz16000,
    /// 22.05 kHz
    Hz22050,
    /// 24 kHz
    Hz24000,
    /// 32 kHz
    Hz32000,
    /// 44.1 kHz
    Hz44100,
    /// 48 kHz
    Hz48000,
}

impl I2sSampleRate {
    /// Create from a 4-bit code; codes above 8 map to 8 kHz
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits {
            1 => Self::Hz11025,
            2 => Self::Hz12000,
            3 => Self::Hz16000,
            4 => Self::Hz22050,
            5 => Self::Hz24000,
            6 => Self::Hz32000,
            7 => Self::Hz44100,
            8 => Self::Hz48000,
            _ => Self::Hz8000,
        }
    }

    /// Register code
    #[must_use]
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Rate in Hz
    #[must_use]
    pub const fn as_hz(self) -> u32 {
        match self {
            Self::Hz8000 => 8_000,
            Self::Hz11025 => 11_025,
            Self::Hz12000 => 12_000,
            Self::Hz16000 => 16_000,
            Self::Hz22050 => 22_050,
            Self::Hz24000 => 24_000,
            Self::Hz32000 => 32_000,
            Self::Hz44100 => 44_100,
            Self::Hz48000 => 48_000,
        }
    }
}

/// RDS block error level (`BLERA`/`BLERB`)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BlockErrors {
    /// No errors
    #[default]
    None,
    /// 1-2 errors, corrected
    Corrected1To2,
    /// 3-5 errors, corrected
    Corrected3To5,
    /// 6 or more errors or checkword error; not correctable
    Uncorrectable,
}

impl BlockErrors {
    /// Create from a 2-bit level (upper bits ignored)
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        match bits & 0x03 {
            1 => Self::Corrected1To2,
            2 => Self::Corrected3To5,
            3 => Self::Uncorrectable,
            _ => Self::None,
        }
    }

    /// Raw level 0..=3
    #[must_use]
    pub const fn level(self) -> u8 {
        self as u8
    }

    /// Block data can be trusted
    #[must_use]
    pub const fn is_usable(self) -> bool {
        !matches!(self, Self::Uncorrectable)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for BlockErrors {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::None => defmt::write!(f, "ok"),
            Self::Corrected1To2 => defmt::write!(f, "1-2 corrected"),
            Self::Corrected3To5 => defmt::write!(f, "3-5 corrected"),
            Self::Uncorrectable => defmt::write!(f, "uncorrectable"),
        }
    }
}
