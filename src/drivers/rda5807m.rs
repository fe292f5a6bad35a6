//! `RDA5807M` FM Receiver Driver
//!
//! Single-chip FM stereo receiver with RDS/RBDS support.
//!
//! Writes go through a shadow of the seven control registers: a setter
//! updates the typed property set and commits, and only registers whose
//! serialized word changed are transmitted, lowest address first. Register
//! 0x03 carries the tune trigger and later registers configuration the chip
//! latches with it, so the ascending order is required.
//!
//! Status reads fetch all six status registers in one burst and are served
//! from a cache for [`STATUS_REFRESH_MS`]. All values returned within one
//! interval come from the same burst.
//!
//! The driver owns its transport. Callers sharing one instance across
//! threads must serialize access themselves.

use crate::config::{
    CHIP_ID_REGISTER, CONTROL_REGISTER_COUNT, EXPECTED_CHIP_ID_HIGH, POWER_ON_REGISTERS,
    STATUS_BURST_BYTES, STATUS_REFRESH_MS,
};
use crate::hal::i2c::{BusAddress, BusResult, Error, ShadowMap, Transport};
use crate::hal::timer::Clock;
use crate::registers::control::{ChannelConfig, ControlRegisters, I2sConfig, PowerConfig};
use crate::registers::status::{Snapshot, Status, StatusCache};
use crate::types::{
    Band, BlockErrors, ChannelSpacing, ClockMode, DeEmphasis, Gpio, GpioMode, InterruptMode,
    LnaCurrent, LnaPort, SeekDirection,
};

/// Registers transmitted by one commit, in transmission order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitReport {
    written: heapless::Vec<u8, CONTROL_REGISTER_COUNT>,
}

impl CommitReport {
    /// Empty report
    #[must_use]
    pub const fn new() -> Self {
        Self {
            written: heapless::Vec::new(),
        }
    }

    fn push(&mut self, address: u8) {
        let _ = self.written.push(address);
    }

    /// Addresses written, ascending
    #[must_use]
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Number of registers written
    #[must_use]
    pub fn len(&self) -> usize {
        self.written.len()
    }

    /// Nothing was written
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }

    /// Whether `address` was written
    #[must_use]
    pub fn contains(&self, address: u8) -> bool {
        self.written.contains(&address)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for CommitReport {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "wrote {=[u8]:x}", self.written());
    }
}

/// Shadow slot of register 0x02
const POWER_SLOT: usize = 0;

/// Shadow slot of register 0x03
const CHANNEL_SLOT: usize = 1;

/// `RDA5807M` driver
pub struct Rda5807m<T, C> {
    transport: T,
    clock: C,
    registers: ControlRegisters,
    shadow: ShadowMap<CONTROL_REGISTER_COUNT>,
    cache: StatusCache,
    chip_id: u16,
}

impl<T: Transport, C: Clock> Rda5807m<T, C> {
    /// Create a driver and read the chip ID
    ///
    /// No control register is written; the shadow starts from the power-on
    /// values. Call [`Self::power_up`] to bring the chip in sync.
    pub fn new(transport: T, clock: C) -> BusResult<Self, T::Error> {
        let mut radio = Self {
            transport,
            clock,
            registers: ControlRegisters::default(),
            shadow: ShadowMap::new(POWER_ON_REGISTERS),
            cache: StatusCache::new(STATUS_REFRESH_MS),
            chip_id: 0,
        };

        radio.chip_id = radio.read_register(CHIP_ID_REGISTER)?;
        if radio.is_expected_chip() {
            info!("RDA5807M chip id 0x{=u16:04X}", radio.chip_id);
        } else {
            warn!("unexpected chip id 0x{=u16:04X}", radio.chip_id);
        }

        Ok(radio)
    }

    /// Chip ID read at construction
    #[must_use]
    pub const fn chip_id(&self) -> u16 {
        self.chip_id
    }

    /// Chip ID reads as 0x58xx
    #[must_use]
    pub const fn is_expected_chip(&self) -> bool {
        (self.chip_id >> 8) as u8 == EXPECTED_CHIP_ID_HIGH
    }

    /// Current property set
    #[must_use]
    pub const fn registers(&self) -> &ControlRegisters {
        &self.registers
    }

    /// Words last written to 0x02..=0x08
    #[must_use]
    pub const fn shadow(&self) -> &[u16; CONTROL_REGISTER_COUNT] {
        self.shadow.values()
    }

    /// Number of registers the next `commit(false)` would write
    #[must_use]
    pub fn pending_writes(&self) -> usize {
        let words = self.registers.words();
        self.shadow.changed(&words).count()
    }

    /// Borrow the transport
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Give back the transport and clock
    pub fn release(self) -> (T, C) {
        (self.transport, self.clock)
    }

    // ------------------------------------------------------------------
    // Write model
    // ------------------------------------------------------------------

    /// Transmit every register whose word differs from the shadow
    ///
    /// With `force`, all seven registers are written. Registers are written
    /// in ascending address order, each as its own random-access
    /// transaction. On a bus error the commit stops; registers already
    /// written keep their updated shadow.
    pub fn commit(&mut self, force: bool) -> BusResult<CommitReport, T::Error> {
        let words = self.registers.words();
        let mut report = CommitReport::new();

        for (index, (&address, &word)) in ControlRegisters::ADDRESSES
            .iter()
            .zip(words.iter())
            .enumerate()
        {
            if !self.shadow.needs_write(index, word, force) {
                continue;
            }
            self.write_register(address, word)?;
            self.shadow.store(index, word);
            report.push(address);
        }

        if !report.is_empty() {
            debug!("commit: {} register(s), force={}", report.len(), force);
        }
        Ok(report)
    }

    /// Edit several properties and commit once
    pub fn configure<F>(&mut self, edit: F) -> BusResult<CommitReport, T::Error>
    where
        F: FnOnce(&mut ControlRegisters),
    {
        edit(&mut self.registers);
        self.commit(false)
    }

    fn update<F>(&mut self, edit: F) -> BusResult<(), T::Error>
    where
        F: FnOnce(&mut ControlRegisters),
    {
        self.configure(edit).map(|_| ())
    }

    fn write_register(&mut self, address: u8, word: u16) -> BusResult<(), T::Error> {
        let [hi, lo] = word.to_be_bytes();
        trace!("write reg 0x{=u8:02X} = 0x{=u16:04X}", address, word);
        self.transport
            .write(BusAddress::RANDOM_ACCESS, &[address, hi, lo])
            .map_err(Error::Bus)
    }

    /// Enable the chip and rewrite every register
    ///
    /// Used after a power cycle, when the chip's registers cannot be assumed
    /// to match the shadow.
    pub fn power_up(&mut self) -> BusResult<CommitReport, T::Error> {
        self.registers.power.enable = true;
        self.commit(true)
    }

    /// Clear the power-up enable bit
    pub fn power_down(&mut self) -> BusResult<(), T::Error> {
        self.update(|r| r.power.enable = false)
    }

    /// Audio output on (false = high impedance)
    pub fn set_audio_output(&mut self, on: bool) -> BusResult<(), T::Error> {
        self.update(|r| r.power.audio_output = on)
    }

    /// Mute the audio output
    pub fn set_muted(&mut self, muted: bool) -> BusResult<(), T::Error> {
        self.update(|r| r.power.unmuted = !muted)
    }

    /// Force mono
    pub fn set_mono(&mut self, mono: bool) -> BusResult<(), T::Error> {
        self.update(|r| r.power.mono = mono)
    }

    /// Bass boost
    pub fn set_bass_boost(&mut self, on: bool) -> BusResult<(), T::Error> {
        self.update(|r| r.power.bass_boost = on)
    }

    /// Keep RCLK supplied while FM works
    pub fn set_rclk_always_on(&mut self, on: bool) -> BusResult<(), T::Error> {
        self.update(|r| r.power.rclk_always_on = on)
    }

    /// RCLK direct input mode
    pub fn set_rclk_direct_input(&mut self, on: bool) -> BusResult<(), T::Error> {
        self.update(|r| r.power.rclk_direct_input = on)
    }

    /// Seek direction
    pub fn set_seek_direction(&mut self, direction: SeekDirection) -> BusResult<(), T::Error> {
        self.update(|r| r.power.seek_up = matches!(direction, SeekDirection::Up))
    }

    /// Start (true) or stop (false) a seek
    pub fn set_seek(&mut self, on: bool) -> BusResult<(), T::Error> {
        self.update(|r| r.power.seek = on)
    }

    /// Stop seeking at the band limit (true) or wrap around (false)
    pub fn set_seek_stop_at_limit(&mut self, stop: bool) -> BusResult<(), T::Error> {
        self.update(|r| r.power.seek_stop_at_limit = stop)
    }

    /// Reference clock
    pub fn set_clock_mode(&mut self, mode: ClockMode) -> BusResult<(), T::Error> {
        self.update(|r| r.power.clock_mode = mode)
    }

    /// Enable RDS/RBDS reception
    pub fn set_rds(&mut self, on: bool) -> BusResult<(), T::Error> {
        self.update(|r| r.power.rds = on)
    }

    /// New demodulation method
    pub fn set_new_demod(&mut self, on: bool) -> BusResult<(), T::Error> {
        self.update(|r| r.power.new_demod = on)
    }

    /// Pulse the soft reset bit
    pub fn soft_reset(&mut self) -> BusResult<(), T::Error> {
        self.update(|r| r.power.soft_reset = true)?;
        self.update(|r| r.power.soft_reset = false)
    }

    /// Set the channel number (saturates at 1023)
    pub fn set_channel(&mut self, channel: u16) -> BusResult<(), T::Error> {
        self.update(|r| r.set_channel(channel))
    }

    /// Direct control (test) mode
    pub fn set_test_mode(&mut self, on: bool) -> BusResult<(), T::Error> {
        self.update(|r| r.channel.test_mode = on)
    }

    /// Set or clear the tune trigger
    pub fn set_tune(&mut self, on: bool) -> BusResult<(), T::Error> {
        self.update(|r| r.channel.tune = on)
    }

    /// Band selection
    pub fn set_band(&mut self, band: Band) -> BusResult<(), T::Error> {
        self.update(|r| r.set_band(band))
    }

    /// Channel spacing
    pub fn set_channel_spacing(&mut self, spacing: ChannelSpacing) -> BusResult<(), T::Error> {
        self.update(|r| r.channel.spacing = spacing)
    }

    /// Seek/tune complete interrupt on GPIO2
    pub fn set_seek_tune_interrupt(&mut self, on: bool) -> BusResult<(), T::Error> {
        self.update(|r| r.system.seek_tune_interrupt = on)
    }

    /// RBDS (US) mode
    pub fn set_rbds(&mut self, on: bool) -> BusResult<(), T::Error> {
        self.update(|r| r.system.rbds = on)
    }

    /// RDS FIFO mode
    pub fn set_rds_fifo(&mut self, on: bool) -> BusResult<(), T::Error> {
        self.update(|r| r.system.rds_fifo = on)
    }

    /// De-emphasis time constant
    pub fn set_de_emphasis(&mut self, de_emphasis: DeEmphasis) -> BusResult<(), T::Error> {
        self.update(|r| r.system.de_emphasis = de_emphasis)
    }

    /// Pulse the RDS FIFO clear bit
    pub fn clear_rds_fifo(&mut self) -> BusResult<(), T::Error> {
        self.update(|r| r.system.rds_fifo_clear = true)?;
        self.update(|r| r.system.rds_fifo_clear = false)
    }

    /// Soft mute
    pub fn set_soft_mute(&mut self, on: bool) -> BusResult<(), T::Error> {
        self.update(|r| r.system.soft_mute = on)
    }

    /// Automatic frequency control
    pub fn set_afc(&mut self, on: bool) -> BusResult<(), T::Error> {
        self.update(|r| r.system.afc = on)
    }

    /// Digital I2S audio output
    pub fn set_i2s(&mut self, on: bool) -> BusResult<(), T::Error> {
        self.update(|r| r.system.i2s = on)
    }

    /// GPIO pin function
    pub fn set_gpio(&mut self, gpio: Gpio, mode: GpioMode) -> BusResult<(), T::Error> {
        self.update(|r| r.system.set_gpio(gpio, mode))
    }

    /// Seek/tune interrupt mode
    pub fn set_interrupt_mode(&mut self, mode: InterruptMode) -> BusResult<(), T::Error> {
        self.update(|r| r.tuning.interrupt_mode = mode)
    }

    /// Add the RSSI seek mode
    pub fn set_rssi_seek_mode(&mut self, on: bool) -> BusResult<(), T::Error> {
        self.update(|r| r.tuning.rssi_seek_mode = on)
    }

    /// Seek SNR threshold 0..=15 (saturates)
    pub fn set_seek_threshold(&mut self, threshold: u8) -> BusResult<(), T::Error> {
        self.update(|r| r.set_seek_threshold(threshold))
    }

    /// LNA input port
    pub fn set_lna_port(&mut self, port: LnaPort) -> BusResult<(), T::Error> {
        self.update(|r| r.tuning.lna_port = port)
    }

    /// LNA working current
    pub fn set_lna_current(&mut self, current: LnaCurrent) -> BusResult<(), T::Error> {
        self.update(|r| r.tuning.lna_current = current)
    }

    /// Volume 0..=15 (saturates)
    pub fn set_volume(&mut self, volume: u8) -> BusResult<(), T::Error> {
        self.update(|r| r.set_volume(volume))
    }

    /// I2S interface configuration
    pub fn set_i2s_config(&mut self, config: I2sConfig) -> BusResult<(), T::Error> {
        self.update(|r| {
            r.i2s = config;
            r.set_open_mode(config.open_mode);
        })
    }

    /// Soft blend
    pub fn set_soft_blend(&mut self, on: bool) -> BusResult<(), T::Error> {
        self.update(|r| r.blend.soft_blend = on)
    }

    /// Soft blend threshold 0..=31 (saturates)
    pub fn set_soft_blend_threshold(&mut self, threshold: u8) -> BusResult<(), T::Error> {
        self.update(|r| r.set_soft_blend_threshold(threshold))
    }

    /// Legacy seek threshold 0..=63 (saturates)
    pub fn set_seek_threshold_old(&mut self, threshold: u8) -> BusResult<(), T::Error> {
        self.update(|r| r.set_seek_threshold_old(threshold))
    }

    /// Tune to band start + `offset_khz` directly (`None` returns to channel tuning)
    pub fn set_direct_frequency(&mut self, offset_khz: Option<u16>) -> BusResult<(), T::Error> {
        self.update(|r| match offset_khz {
            Some(offset) => {
                r.direct.offset_khz = offset;
                r.blend.direct_frequency_mode = true;
            }
            None => r.blend.direct_frequency_mode = false,
        })
    }

    /// Write `channel` with the tune trigger set
    ///
    /// `TUNE` self-clears on the chip, so it is dropped from the property set
    /// and the shadow once sent. Calling again with the same channel retunes.
    pub fn tune_to(&mut self, channel: u16) -> BusResult<(), T::Error> {
        let result = self.update(|r| {
            r.set_channel(channel);
            r.channel.tune = true;
        });
        self.registers.channel.tune = false;
        self.settle_trigger(CHANNEL_SLOT, ChannelConfig::TUNE_BIT);
        self.cache.invalidate();
        result
    }

    /// Tune to a frequency in the current band (clamped to the band edges)
    pub fn set_frequency_khz(&mut self, khz: u32) -> BusResult<(), T::Error> {
        let channel = self.registers.channel_for_khz(khz);
        self.tune_to(channel)
    }

    /// Start a seek
    ///
    /// `SEEK` is handled like `TUNE`: sent once, then dropped, so later
    /// writes of register 0x02 do not restart the seek.
    pub fn seek(&mut self, direction: SeekDirection) -> BusResult<(), T::Error> {
        let result = self.update(|r| {
            r.power.seek_up = matches!(direction, SeekDirection::Up);
            r.power.seek = true;
        });
        self.registers.power.seek = false;
        self.settle_trigger(POWER_SLOT, PowerConfig::SEEK_BIT);
        self.cache.invalidate();
        result
    }

    /// Clear a self-clearing trigger bit from the shadow of slot `index`
    fn settle_trigger(&mut self, index: usize, bit: u16) {
        let written = self.shadow.get(index);
        if written & bit != 0 {
            self.shadow.store(index, written & !bit);
        }
    }

    // ------------------------------------------------------------------
    // Read model
    // ------------------------------------------------------------------

    /// Refresh the status cache if it is older than the refresh interval
    pub fn refresh(&mut self) -> BusResult<Snapshot, T::Error> {
        let now = self.clock.now_ms();
        if self.cache.is_fresh(now) {
            return Ok(self.cache.snapshot());
        }

        let mut burst = [0u8; STATUS_BURST_BYTES];
        let available = self
            .transport
            .read(BusAddress::SEQUENTIAL, &mut burst)
            .map_err(Error::Bus)?;
        let snapshot = self.cache.update(&burst, available, now);

        if snapshot.is_complete() {
            trace!("status refresh at {=u64}ms", now);
        } else {
            warn!("status burst short: {} of {} bytes", available, STATUS_BURST_BYTES);
        }
        Ok(snapshot)
    }

    /// Decoded status, refreshed if stale
    pub fn status(&mut self) -> BusResult<Status, T::Error> {
        Ok(*self.refresh()?.status())
    }

    /// Raw status words 0x0A..=0x0F as of the last refresh
    #[must_use]
    pub const fn status_words(&self) -> &[u16; 6] {
        self.cache.words()
    }

    /// New RDS/RBDS group ready
    pub fn is_rds_ready(&mut self) -> BusResult<bool, T::Error> {
        Ok(self.status()?.rds_ready)
    }

    /// Seek or tune completed
    pub fn is_tuning_complete(&mut self) -> BusResult<bool, T::Error> {
        Ok(self.status()?.tune_complete)
    }

    /// Seek found no station above the threshold
    pub fn is_seek_failed(&mut self) -> BusResult<bool, T::Error> {
        Ok(self.status()?.seek_failed)
    }

    /// RDS decoder synchronized
    pub fn is_rds_synchronized(&mut self) -> BusResult<bool, T::Error> {
        Ok(self.status()?.rds_synchronized)
    }

    /// RDS block E found
    pub fn is_block_e_found(&mut self) -> BusResult<bool, T::Error> {
        Ok(self.status()?.block_e_found)
    }

    /// Stereo reception
    pub fn is_stereo(&mut self) -> BusResult<bool, T::Error> {
        Ok(self.status()?.stereo)
    }

    /// Current channel number, updated after tune or seek
    pub fn channel_number(&mut self) -> BusResult<u16, T::Error> {
        Ok(self.status()?.channel)
    }

    /// Current frequency in kHz, from the status channel and the configured band
    pub fn frequency_khz(&mut self) -> BusResult<u32, T::Error> {
        let channel = self.status()?.channel;
        Ok(self.registers.frequency_khz(channel))
    }

    /// RSSI 0..=127 (logarithmic)
    pub fn signal_strength(&mut self) -> BusResult<u8, T::Error> {
        Ok(self.status()?.signal_strength)
    }

    /// Current channel is a station
    pub fn is_station(&mut self) -> BusResult<bool, T::Error> {
        Ok(self.status()?.station)
    }

    /// FM ready
    pub fn is_fm_ready(&mut self) -> BusResult<bool, T::Error> {
        Ok(self.status()?.fm_ready)
    }

    /// RDS registers hold block E (RBDS) instead of A..D
    pub fn is_rbds_block_e(&mut self) -> BusResult<bool, T::Error> {
        Ok(self.status()?.rbds_block_e)
    }

    /// Block A error level
    pub fn block_a_errors(&mut self) -> BusResult<BlockErrors, T::Error> {
        Ok(self.status()?.block_a_errors)
    }

    /// Block B error level
    pub fn block_b_errors(&mut self) -> BusResult<BlockErrors, T::Error> {
        Ok(self.status()?.block_b_errors)
    }

    /// Raw RDS block A (or E)
    pub fn rds_block_a(&mut self) -> BusResult<u16, T::Error> {
        Ok(self.status()?.block_a())
    }

    /// Raw RDS block B
    pub fn rds_block_b(&mut self) -> BusResult<u16, T::Error> {
        Ok(self.status()?.block_b())
    }

    /// Raw RDS block C
    pub fn rds_block_c(&mut self) -> BusResult<u16, T::Error> {
        Ok(self.status()?.block_c())
    }

    /// Raw RDS block D
    pub fn rds_block_d(&mut self) -> BusResult<u16, T::Error> {
        Ok(self.status()?.block_d())
    }

    /// Uncached read of one register, for diagnostics
    pub fn read_register(&mut self, address: u8) -> BusResult<u16, T::Error> {
        let mut buf = [0u8; 2];
        let available = self
            .transport
            .write_read(BusAddress::RANDOM_ACCESS, &[address], &mut buf)
            .map_err(Error::Bus)?;
        if available < buf.len() {
            return Err(Error::ShortRead {
                expected: buf.len(),
                available,
            });
        }
        Ok(u16::from_be_bytes(buf))
    }
}
