//! Control registers 0x02..=0x08
//!
//! One record per register. Each field is masked to its declared width when
//! folded into the word, so any field value serializes to a legal pattern.

use crate::config::{
    CONTROL_REGISTER_COUNT, MAX_CHANNEL, MAX_OPEN_MODE, MAX_SEEK_THRESHOLD,
    MAX_SEEK_THRESHOLD_OLD, MAX_SOFT_BLEND_THRESHOLD, MAX_VOLUME,
};
use crate::types::{
    Band, ChannelSpacing, ClockMode, DeEmphasis, Gpio, GpioMode, I2sSampleRate, InterruptMode,
    LnaCurrent, LnaPort,
};

/// Single-bit flag at `bit`
const fn flag(value: bool, bit: u16) -> u16 {
    if value {
        1 << bit
    } else {
        0
    }
}

/// `width`-bit field at `shift`
const fn field(value: u16, width: u16, shift: u16) -> u16 {
    (value & ((1 << width) - 1)) << shift
}

/// Register 0x02: power and audio
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PowerConfig {
    /// Audio output driven (`DHIZ`); false = high impedance
    pub audio_output: bool,
    /// Audio not muted (`DMUTE`)
    pub unmuted: bool,
    /// Force mono
    pub mono: bool,
    /// Bass boost
    pub bass_boost: bool,
    /// RCLK supplied while FM works; written inverted as `RCLK_NON_CALIBRATE_MODE`
    pub rclk_always_on: bool,
    /// RCLK uses direct input mode
    pub rclk_direct_input: bool,
    /// Seek towards higher frequencies
    pub seek_up: bool,
    /// Seek trigger; the chip clears it on STC or SF
    pub seek: bool,
    /// Stop seeking at the band limit instead of wrapping (`SKMODE`)
    pub seek_stop_at_limit: bool,
    /// Reference clock
    pub clock_mode: ClockMode,
    /// RDS/RBDS enable
    pub rds: bool,
    /// New demodulation method (about 1 dB more sensitive)
    pub new_demod: bool,
    /// Soft reset
    pub soft_reset: bool,
    /// Power-up enable
    pub enable: bool,
}

impl PowerConfig {
    /// Register address
    pub const ADDRESS: u8 = 0x02;

    /// `SEEK` trigger bit, cleared by the chip when the seek ends
    pub const SEEK_BIT: u16 = 1 << 8;

    /// Serialize to the register word
    #[must_use]
    pub const fn to_word(&self) -> u16 {
        flag(self.audio_output, 15)
            | flag(self.unmuted, 14)
            | flag(self.mono, 13)
            | flag(self.bass_boost, 12)
            | flag(!self.rclk_always_on, 11)
            | flag(self.rclk_direct_input, 10)
            | flag(self.seek_up, 9)
            | flag(self.seek, 8)
            | flag(self.seek_stop_at_limit, 7)
            | field(self.clock_mode.code(), 3, 4)
            | flag(self.rds, 3)
            | flag(self.new_demod, 2)
            | flag(self.soft_reset, 1)
            | flag(self.enable, 0)
    }
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            audio_output: true,
            unmuted: true,
            mono: false,
            bass_boost: false,
            rclk_always_on: true,
            rclk_direct_input: false,
            seek_up: true,
            seek: false,
            seek_stop_at_limit: true,
            clock_mode: ClockMode::default(),
            rds: false,
            new_demod: false,
            soft_reset: false,
            enable: true,
        }
    }
}

/// Register 0x03: channel and band
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ChannelConfig {
    /// Channel number (10 bits)
    pub channel: u16,
    /// Direct control mode, test only (`DIRECT_MODE`)
    pub test_mode: bool,
    /// Tune trigger
    pub tune: bool,
    /// Band; `Low` and `EastEurope` share a code, see [`BlendConfig::band_65mhz`]
    pub band: Band,
    /// Channel spacing
    pub spacing: ChannelSpacing,
}

impl ChannelConfig {
    /// Register address
    pub const ADDRESS: u8 = 0x03;

    /// `TUNE` trigger bit, cleared by the chip when the tune ends
    pub const TUNE_BIT: u16 = 1 << 4;

    /// Serialize to the register word
    #[must_use]
    pub const fn to_word(&self) -> u16 {
        field(self.channel, 10, 6)
            | flag(self.test_mode, 5)
            | flag(self.tune, 4)
            | field(self.band.code(), 2, 2)
            | field(self.spacing.code(), 2, 0)
    }
}

/// Register 0x04: interrupts, RDS mode, audio path and GPIO
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SystemConfig {
    /// Pulse GPIO2 low when seek/tune completes (`STCIEN`)
    pub seek_tune_interrupt: bool,
    /// RBDS (US) mode
    pub rbds: bool,
    /// RDS FIFO mode
    pub rds_fifo: bool,
    /// De-emphasis time constant (`DE`)
    pub de_emphasis: DeEmphasis,
    /// Clear the RDS FIFO
    pub rds_fifo_clear: bool,
    /// Soft mute
    pub soft_mute: bool,
    /// AFC enabled; written inverted as `AFCD`
    pub afc: bool,
    /// Digital I2S audio output
    pub i2s: bool,
    /// GPIO3 function
    pub gpio3: GpioMode,
    /// GPIO2 function
    pub gpio2: GpioMode,
    /// GPIO1 function
    pub gpio1: GpioMode,
}

impl SystemConfig {
    /// Register address
    pub const ADDRESS: u8 = 0x04;

    /// Serialize to the register word
    #[must_use]
    pub const fn to_word(&self) -> u16 {
        flag(self.seek_tune_interrupt, 14)
            | flag(self.rbds, 13)
            | flag(self.rds_fifo, 12)
            | flag(matches!(self.de_emphasis, DeEmphasis::Us50), 11)
            | flag(self.rds_fifo_clear, 10)
            | flag(self.soft_mute, 9)
            | flag(!self.afc, 8)
            | flag(self.i2s, 6)
            | field(self.gpio3.code(), 2, 4)
            | field(self.gpio2.code(), 2, 2)
            | field(self.gpio1.code(), 2, 0)
    }

    /// Set a GPIO function
    pub fn set_gpio(&mut self, gpio: Gpio, mode: GpioMode) {
        match gpio {
            Gpio::Gpio1 => self.gpio1 = mode,
            Gpio::Gpio2 => self.gpio2 = mode,
            Gpio::Gpio3 => self.gpio3 = mode,
        }
    }

    /// Current GPIO function
    #[must_use]
    pub const fn gpio(&self, gpio: Gpio) -> GpioMode {
        match gpio {
            Gpio::Gpio1 => self.gpio1,
            Gpio::Gpio2 => self.gpio2,
            Gpio::Gpio3 => self.gpio3,
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            seek_tune_interrupt: false,
            rbds: false,
            rds_fifo: false,
            de_emphasis: DeEmphasis::Us50,
            rds_fifo_clear: false,
            soft_mute: true,
            afc: true,
            i2s: false,
            gpio3: GpioMode::HighImpedance,
            gpio2: GpioMode::HighImpedance,
            gpio1: GpioMode::HighImpedance,
        }
    }
}

/// Register 0x05: seek threshold, LNA and volume
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TuningConfig {
    /// Seek/tune interrupt mode (`INT_MODE`)
    pub interrupt_mode: InterruptMode,
    /// Add the RSSI seek mode (`Seek_mode` = 0b10)
    pub rssi_seek_mode: bool,
    /// Seek SNR threshold (4 bits)
    pub seek_threshold: u8,
    /// LNA input port
    pub lna_port: LnaPort,
    /// LNA working current
    pub lna_current: LnaCurrent,
    /// Volume (4 bits, logarithmic)
    pub volume: u8,
}

impl TuningConfig {
    /// Register address
    pub const ADDRESS: u8 = 0x05;

    /// Serialize to the register word
    #[must_use]
    pub const fn to_word(&self) -> u16 {
        flag(matches!(self.interrupt_mode, InterruptMode::UntilRead), 15)
            | flag(self.rssi_seek_mode, 14)
            | field(self.seek_threshold as u16, 4, 8)
            | field(self.lna_port.code(), 2, 6)
            | field(self.lna_current.code(), 2, 4)
            | field(self.volume as u16, 4, 0)
    }
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            interrupt_mode: InterruptMode::UntilRead,
            rssi_seek_mode: false,
            seek_threshold: 8,
            lna_port: LnaPort::Positive,
            lna_current: LnaCurrent::Ma1_8,
            volume: 11,
        }
    }
}

/// Register 0x06: I2S interface
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct I2sConfig {
    /// Open the reserved registers (`OPEN_MODE`, 2 bits)
    pub open_mode: u8,
    /// I2S slave (true) or master (false)
    pub slave: bool,
    /// WS high selects the left channel (`ws_lr`)
    pub ws_left_high: bool,
    /// Invert SCLK input edge
    pub sclk_inverted_in: bool,
    /// Signed 16-bit samples
    pub signed_data: bool,
    /// Invert WS input edge
    pub ws_inverted_in: bool,
    /// WS rate in master mode
    pub sample_rate: I2sSampleRate,
    /// Invert WS output edge
    pub ws_inverted_out: bool,
    /// Invert SCLK output edge
    pub sclk_inverted_out: bool,
    /// Left channel data delay 1T
    pub left_delay: bool,
    /// Right channel data delay 1T
    pub right_delay: bool,
}

impl I2sConfig {
    /// Register address
    pub const ADDRESS: u8 = 0x06;

    /// Serialize to the register word
    #[must_use]
    pub const fn to_word(&self) -> u16 {
        field(self.open_mode as u16, 2, 13)
            | flag(self.slave, 12)
            | flag(self.ws_left_high, 11)
            | flag(self.sclk_inverted_in, 10)
            | flag(self.signed_data, 9)
            | flag(self.ws_inverted_in, 8)
            | field(self.sample_rate.code(), 4, 4)
            | flag(self.ws_inverted_out, 3)
            | flag(self.sclk_inverted_out, 2)
            | flag(self.left_delay, 1)
            | flag(self.right_delay, 0)
    }
}

/// Register 0x07: soft blend, 50/65 MHz band select, direct frequency mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlendConfig {
    /// Soft blend threshold (5 bits)
    pub soft_blend_threshold: u8,
    /// Band code 3 covers 65-76 MHz (true) or 50-65 MHz (false)
    pub band_65mhz: bool,
    /// Legacy seek threshold (6 bits)
    pub seek_threshold_old: u8,
    /// Soft blend enable
    pub soft_blend: bool,
    /// Tune to band start + [`DirectFrequency::offset_khz`] (`FREQ_MODE`)
    pub direct_frequency_mode: bool,
}

impl BlendConfig {
    /// Register address
    pub const ADDRESS: u8 = 0x07;

    /// Serialize to the register word
    #[must_use]
    pub const fn to_word(&self) -> u16 {
        field(self.soft_blend_threshold as u16, 5, 10)
            | flag(self.band_65mhz, 9)
            | field(self.seek_threshold_old as u16, 6, 2)
            | flag(self.soft_blend, 1)
            | flag(self.direct_frequency_mode, 0)
    }
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            soft_blend_threshold: 16,
            band_65mhz: true,
            seek_threshold_old: 0,
            soft_blend: true,
            direct_frequency_mode: false,
        }
    }
}

/// Register 0x08: direct frequency offset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct DirectFrequency {
    /// Offset from the band start in kHz, used when `FREQ_MODE` is set
    pub offset_khz: u16,
}

impl DirectFrequency {
    /// Register address
    pub const ADDRESS: u8 = 0x08;

    /// Serialize to the register word
    #[must_use]
    pub const fn to_word(&self) -> u16 {
        self.offset_khz
    }
}

/// The complete property set: every writable field of the chip
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ControlRegisters {
    /// 0x02
    pub power: PowerConfig,
    /// 0x03
    pub channel: ChannelConfig,
    /// 0x04
    pub system: SystemConfig,
    /// 0x05
    pub tuning: TuningConfig,
    /// 0x06
    pub i2s: I2sConfig,
    /// 0x07
    pub blend: BlendConfig,
    /// 0x08
    pub direct: DirectFrequency,
}

impl ControlRegisters {
    /// Register addresses, one per shadow slot, ascending
    pub const ADDRESSES: [u8; CONTROL_REGISTER_COUNT] = [
        PowerConfig::ADDRESS,
        ChannelConfig::ADDRESS,
        SystemConfig::ADDRESS,
        TuningConfig::ADDRESS,
        I2sConfig::ADDRESS,
        BlendConfig::ADDRESS,
        DirectFrequency::ADDRESS,
    ];

    /// Serialize all registers, in ascending address order
    #[must_use]
    pub const fn words(&self) -> [u16; CONTROL_REGISTER_COUNT] {
        [
            self.power.to_word(),
            self.channel.to_word(),
            self.system.to_word(),
            self.tuning.to_word(),
            self.i2s.to_word(),
            self.blend.to_word(),
            self.direct.to_word(),
        ]
    }

    /// Select a band; `EastEurope` and `Low` also set register 0x07 bit 9
    pub fn set_band(&mut self, band: Band) {
        self.channel.band = band;
        self.blend.band_65mhz = band.is_65mhz_mode();
    }

    /// Effective band, resolving code 3 through the 65/50 MHz bit
    #[must_use]
    pub const fn band(&self) -> Band {
        match self.channel.band {
            Band::EastEurope | Band::Low => {
                if self.blend.band_65mhz {
                    Band::EastEurope
                } else {
                    Band::Low
                }
            }
            band => band,
        }
    }

    /// Set the channel number, saturating at 1023
    pub fn set_channel(&mut self, channel: u16) {
        self.channel.channel = channel.min(MAX_CHANNEL);
    }

    /// Set the volume, saturating at 15
    pub fn set_volume(&mut self, volume: u8) {
        self.tuning.volume = volume.min(MAX_VOLUME);
    }

    /// Set the seek SNR threshold, saturating at 15
    pub fn set_seek_threshold(&mut self, threshold: u8) {
        self.tuning.seek_threshold = threshold.min(MAX_SEEK_THRESHOLD);
    }

    /// Set the soft blend threshold, saturating at 31
    pub fn set_soft_blend_threshold(&mut self, threshold: u8) {
        self.blend.soft_blend_threshold = threshold.min(MAX_SOFT_BLEND_THRESHOLD);
    }

    /// Set the legacy seek threshold, saturating at 63
    pub fn set_seek_threshold_old(&mut self, threshold: u8) {
        self.blend.seek_threshold_old = threshold.min(MAX_SEEK_THRESHOLD_OLD);
    }

    /// Set the I2S open mode, saturating at 3
    pub fn set_open_mode(&mut self, mode: u8) {
        self.i2s.open_mode = mode.min(MAX_OPEN_MODE);
    }

    /// Channel number for a frequency in the current band and spacing
    #[must_use]
    pub fn channel_for_khz(&self, khz: u32) -> u16 {
        self.band().channel_for(self.channel.spacing, khz)
    }

    /// Frequency of a channel number in the current band and spacing
    #[must_use]
    pub const fn frequency_khz(&self, channel: u16) -> u32 {
        self.band().frequency_khz(self.channel.spacing, channel)
    }
}
