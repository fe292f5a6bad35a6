//! Write Model Tests
//!
//! Shadow diffing, write ordering, clamping and trigger handling.
//! Run with: cargo test --no-default-features --features std --test driver_tests

mod common;

use common::{BusOp, ManualClock, MockBus, Nack};
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use rda5807m::config::POWER_ON_REGISTERS;
use rda5807m::drivers::rda5807m::Rda5807m;
use rda5807m::hal::i2c::{Error, I2cTransport};
use rda5807m::registers::control::I2sConfig;
use rda5807m::types::{
    Band, ChannelSpacing, ClockMode, DeEmphasis, Gpio, GpioMode, I2sSampleRate, InterruptMode,
    LnaCurrent, LnaPort, SeekDirection,
};

fn radio() -> Rda5807m<MockBus, ManualClock> {
    let mut radio = Rda5807m::new(MockBus::new(), ManualClock::new(0)).unwrap();
    radio.transport_mut().clear();
    radio
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn new_reads_chip_id_without_writing() {
    let radio = Rda5807m::new(MockBus::new(), ManualClock::new(0)).unwrap();
    assert_eq!(radio.chip_id(), 0x5804);
    assert!(radio.is_expected_chip());
    assert_eq!(
        radio.transport().ops,
        vec![BusOp::WriteRead {
            address: 0x11,
            bytes: vec![0x00],
            requested: 2,
        }]
    );
}

#[test]
fn unexpected_chip_id_still_constructs() {
    let mut bus = MockBus::new();
    bus.registers[0] = 0x1234;
    let radio = Rda5807m::new(bus, ManualClock::new(0)).unwrap();
    assert!(!radio.is_expected_chip());
}

#[test]
fn chip_id_unchanged_by_writes() {
    let mut radio = radio();
    let id = radio.chip_id();
    radio.transport_mut().registers[0] = 0xFFFF;
    radio.set_volume(3).unwrap();
    radio.power_up().unwrap();
    radio.set_band(Band::Japan).unwrap();
    assert_eq!(radio.chip_id(), id);
}

#[test]
fn shadow_starts_at_power_on_values() {
    let radio = radio();
    assert_eq!(radio.shadow(), &POWER_ON_REGISTERS);
    assert_eq!(radio.pending_writes(), 0);
}

// ============================================================================
// Commit
// ============================================================================

#[test]
fn commit_without_changes_is_silent() {
    let mut radio = radio();
    let report = radio.commit(false).unwrap();
    assert!(report.is_empty());
    assert!(radio.transport().ops.is_empty());
}

#[test]
fn second_commit_is_idempotent() {
    let mut radio = radio();
    radio.configure(|r| r.power.mono = true).unwrap();
    radio.transport_mut().clear();

    let report = radio.commit(false).unwrap();
    assert!(report.is_empty());
    assert!(radio.transport().ops.is_empty());
}

#[test]
fn forced_commit_writes_all_registers_in_order() {
    let mut radio = radio();
    let report = radio.commit(true).unwrap();
    assert_eq!(report.written(), &[0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);

    let writes = radio.transport().register_writes();
    let expected: Vec<(u8, u16)> = (0x02..=0x08).zip(POWER_ON_REGISTERS).collect();
    assert_eq!(writes, expected);
}

#[test]
fn power_up_forces_full_write() {
    let mut radio = radio();
    radio.commit(true).unwrap();
    radio.transport_mut().clear();

    let report = radio.power_up().unwrap();
    assert_eq!(report.len(), 7);
    assert_eq!(radio.transport().register_writes().len(), 7);
}

#[test]
fn volume_change_writes_only_register_0x05() {
    let mut radio = radio();
    radio.set_volume(3).unwrap();
    assert_eq!(radio.transport().register_writes(), vec![(0x05, 0x8883)]);
}

#[test]
fn register_write_wire_format() {
    let mut radio = radio();
    radio.set_volume(3).unwrap();
    assert_eq!(
        radio.transport().ops,
        vec![BusOp::Write {
            address: 0x11,
            bytes: vec![0x05, 0x88, 0x83],
        }]
    );
}

#[test]
fn resetting_same_value_produces_no_traffic() {
    let mut radio = radio();
    radio.set_volume(7).unwrap();
    radio.transport_mut().clear();

    radio.set_volume(7).unwrap();
    radio.set_band(Band::Western).unwrap();
    radio.set_muted(false).unwrap();
    assert!(radio.transport().ops.is_empty());
}

#[test]
fn multi_register_change_written_ascending() {
    let mut radio = radio();
    let report = radio
        .configure(|r| {
            r.set_volume(1);
            r.set_band(Band::Low);
            r.power.mono = true;
        })
        .unwrap();

    assert_eq!(report.written(), &[0x02, 0x03, 0x05, 0x07]);
    let addresses: Vec<u8> = radio
        .transport()
        .register_writes()
        .iter()
        .map(|(a, _)| *a)
        .collect();
    assert_eq!(addresses, vec![0x02, 0x03, 0x05, 0x07]);
}

#[test]
fn bus_error_stops_commit_and_keeps_written_shadow() {
    let mut radio = radio();
    radio.transport_mut().writes_before_nack = Some(1);

    let result = radio.configure(|r| {
        r.power.bass_boost = true;
        r.set_volume(2);
    });
    assert_eq!(result, Err(Error::Bus(Nack)));
    assert_eq!(radio.shadow()[0], 0xD281);
    assert_eq!(radio.shadow()[3], 0x888B);
    assert_eq!(radio.pending_writes(), 1);

    radio.transport_mut().writes_before_nack = None;
    radio.transport_mut().clear();
    let report = radio.commit(false).unwrap();
    assert_eq!(report.written(), &[0x05]);
}

// ============================================================================
// Clamping and polarity
// ============================================================================

#[test]
fn volume_saturates_at_15() {
    let mut radio = radio();
    radio.set_volume(255).unwrap();
    assert_eq!(radio.registers().tuning.volume, 15);
    assert_eq!(radio.shadow()[3] & 0x000F, 0b1111);
}

#[test]
fn seek_threshold_and_channel_saturate() {
    let mut radio = radio();
    radio.set_seek_threshold(40).unwrap();
    radio.set_channel(0xFFFF).unwrap();
    assert_eq!(radio.registers().tuning.seek_threshold, 15);
    assert_eq!(radio.registers().channel.channel, 1023);
    assert_eq!(radio.shadow()[1] >> 6, 0x3FF);
}

#[test]
fn clock_mode_bits() {
    let mut radio = radio();
    radio.set_clock_mode(ClockMode::Mhz24).unwrap();
    assert_eq!((radio.shadow()[0] >> 4) & 0x7, 5);
}

#[test]
fn rclk_always_on_is_inverted_bit_11() {
    let mut radio = radio();
    radio.set_rclk_always_on(false).unwrap();
    assert_eq!(radio.shadow()[0] & 0x0800, 0x0800);
    radio.set_rclk_always_on(true).unwrap();
    assert_eq!(radio.shadow()[0] & 0x0800, 0);
}

#[test]
fn afc_disable_bit_is_inverted() {
    let mut radio = radio();
    radio.set_afc(false).unwrap();
    assert_eq!(radio.shadow()[2] & 0x0100, 0x0100);
}

#[test]
fn mute_and_audio_output_bits() {
    let mut radio = radio();
    radio.set_muted(true).unwrap();
    assert_eq!(radio.shadow()[0] & 0x4000, 0);
    radio.set_audio_output(false).unwrap();
    assert_eq!(radio.shadow()[0] & 0x8000, 0);
}

#[test]
fn gpio_function_select() {
    let mut radio = radio();
    radio.set_gpio(Gpio::Gpio3, GpioMode::Special).unwrap();
    radio.set_gpio(Gpio::Gpio1, GpioMode::High).unwrap();
    assert_eq!(radio.shadow()[2], 0x0A00 | 0x0010 | 0x0003);
}

#[test]
fn power_down_clears_enable() {
    let mut radio = radio();
    radio.power_down().unwrap();
    assert_eq!(radio.transport().register_writes(), vec![(0x02, 0xC280)]);
}

// ============================================================================
// Field placement
// ============================================================================

/// Apply one setter to a fresh driver and return the writes it caused
fn writes_after<F>(edit: F) -> Vec<(u8, u16)>
where
    F: FnOnce(&mut Rda5807m<MockBus, ManualClock>),
{
    let mut radio = radio();
    edit(&mut radio);
    radio.transport().register_writes()
}

#[test]
fn power_register_flags() {
    assert_eq!(writes_after(|r| r.set_bass_boost(true).unwrap()), vec![(0x02, 0xD281)]);
    assert_eq!(writes_after(|r| r.set_rclk_direct_input(true).unwrap()), vec![(0x02, 0xC681)]);
    assert_eq!(
        writes_after(|r| r.set_seek_direction(SeekDirection::Down).unwrap()),
        vec![(0x02, 0xC081)]
    );
    assert_eq!(writes_after(|r| r.set_seek(true).unwrap()), vec![(0x02, 0xC381)]);
    assert_eq!(writes_after(|r| r.set_seek_stop_at_limit(false).unwrap()), vec![(0x02, 0xC201)]);
    assert_eq!(writes_after(|r| r.set_rds(true).unwrap()), vec![(0x02, 0xC289)]);
    assert_eq!(writes_after(|r| r.set_new_demod(true).unwrap()), vec![(0x02, 0xC285)]);
}

#[test]
fn channel_register_fields() {
    assert_eq!(writes_after(|r| r.set_test_mode(true).unwrap()), vec![(0x03, 0x0020)]);
    assert_eq!(writes_after(|r| r.set_tune(true).unwrap()), vec![(0x03, 0x0010)]);
    assert_eq!(
        writes_after(|r| r.set_channel_spacing(ChannelSpacing::Khz25).unwrap()),
        vec![(0x03, 0x0003)]
    );
    assert_eq!(writes_after(|r| r.set_band(Band::Japan).unwrap()), vec![(0x03, 0x0004)]);
}

#[test]
fn low_band_clears_65mhz_bit() {
    assert_eq!(
        writes_after(|r| r.set_band(Band::Low).unwrap()),
        vec![(0x03, 0x000C), (0x07, 0x4002)]
    );
    assert_eq!(writes_after(|r| r.set_band(Band::EastEurope).unwrap()), vec![(0x03, 0x000C)]);
}

#[test]
fn system_register_flags() {
    assert_eq!(writes_after(|r| r.set_seek_tune_interrupt(true).unwrap()), vec![(0x04, 0x4A00)]);
    assert_eq!(writes_after(|r| r.set_rbds(true).unwrap()), vec![(0x04, 0x2A00)]);
    assert_eq!(writes_after(|r| r.set_rds_fifo(true).unwrap()), vec![(0x04, 0x1A00)]);
    assert_eq!(
        writes_after(|r| r.set_de_emphasis(DeEmphasis::Us75).unwrap()),
        vec![(0x04, 0x0200)]
    );
    assert_eq!(writes_after(|r| r.set_soft_mute(false).unwrap()), vec![(0x04, 0x0800)]);
    assert_eq!(writes_after(|r| r.set_i2s(true).unwrap()), vec![(0x04, 0x0A40)]);
}

#[test]
fn tuning_register_fields() {
    assert_eq!(
        writes_after(|r| r.set_interrupt_mode(InterruptMode::Pulse).unwrap()),
        vec![(0x05, 0x088B)]
    );
    assert_eq!(writes_after(|r| r.set_rssi_seek_mode(true).unwrap()), vec![(0x05, 0xC88B)]);
    assert_eq!(writes_after(|r| r.set_lna_port(LnaPort::Dual).unwrap()), vec![(0x05, 0x88CB)]);
    assert_eq!(
        writes_after(|r| r.set_lna_current(LnaCurrent::Ma3_0).unwrap()),
        vec![(0x05, 0x88BB)]
    );
}

#[test]
fn i2s_config_saturates_open_mode() {
    let config = I2sConfig {
        open_mode: 7,
        slave: true,
        sample_rate: I2sSampleRate::Hz48000,
        ..I2sConfig::default()
    };
    assert_eq!(writes_after(|r| r.set_i2s_config(config).unwrap()), vec![(0x06, 0x7080)]);
}

#[test]
fn blend_register_fields() {
    assert_eq!(writes_after(|r| r.set_soft_blend(false).unwrap()), vec![(0x07, 0x4200)]);
    assert_eq!(writes_after(|r| r.set_soft_blend_threshold(40).unwrap()), vec![(0x07, 0x7E02)]);
    assert_eq!(writes_after(|r| r.set_seek_threshold_old(100).unwrap()), vec![(0x07, 0x42FE)]);
}

// ============================================================================
// Triggers and pulses
// ============================================================================

#[test]
fn tune_to_sets_trigger_once() {
    let mut radio = radio();
    radio.tune_to(147).unwrap();
    assert_eq!(radio.transport().register_writes(), vec![(0x03, 0x24D0)]);
    assert!(!radio.registers().channel.tune);

    radio.transport_mut().clear();
    radio.set_volume(4).unwrap();
    assert_eq!(radio.transport().register_writes(), vec![(0x05, 0x8884)]);
}

#[test]
fn set_frequency_computes_channel() {
    let mut radio = radio();
    radio.set_frequency_khz(101_700).unwrap();
    assert_eq!(radio.registers().channel.channel, 147);
    assert_eq!(radio.transport().register_writes(), vec![(0x03, 0x24D0)]);
    assert_eq!(radio.shadow()[1], 0x24C0);
}

#[test]
fn set_frequency_clamps_to_band() {
    let mut radio = radio();
    radio.set_frequency_khz(120_000).unwrap();
    assert_eq!(radio.registers().channel.channel, 210);
    radio.set_frequency_khz(10_000).unwrap();
    assert_eq!(radio.registers().channel.channel, 0);
}

#[test]
fn repeated_seek_rewrites_trigger() {
    let mut radio = radio();
    radio.seek(SeekDirection::Up).unwrap();
    assert_eq!(radio.transport().register_writes(), vec![(0x02, 0xC381)]);

    radio.transport_mut().clear();
    radio.seek(SeekDirection::Up).unwrap();
    assert_eq!(radio.transport().register_writes(), vec![(0x02, 0xC381)]);
}

#[test]
fn seek_trigger_not_resent_by_later_writes() {
    let mut radio = radio();
    radio.seek(SeekDirection::Up).unwrap();
    assert!(!radio.registers().power.seek);
    assert_eq!(radio.shadow()[0], 0xC281);

    radio.transport_mut().clear();
    radio.set_mono(true).unwrap();
    let writes = radio.transport().register_writes();
    assert_eq!(writes, vec![(0x02, 0xE281)]);
    assert_eq!(writes[0].1 & 0x0100, 0);
}

#[test]
fn seek_leaves_unrelated_commits_alone() {
    let mut radio = radio();
    radio.seek(SeekDirection::Down).unwrap();
    radio.transport_mut().clear();

    radio.set_volume(2).unwrap();
    assert_eq!(radio.transport().register_writes(), vec![(0x05, 0x8882)]);

    radio.transport_mut().clear();
    radio.power_up().unwrap();
    let power = radio.transport().register_writes()[0];
    assert_eq!(power, (0x02, 0xC081));
}

#[test]
fn repeated_tune_to_same_channel_retunes() {
    let mut radio = radio();
    radio.tune_to(50).unwrap();
    assert_eq!(radio.transport().register_writes(), vec![(0x03, 0x0C90)]);

    radio.transport_mut().clear();
    radio.tune_to(50).unwrap();
    let writes = radio.transport().register_writes();
    assert_eq!(writes, vec![(0x03, 0x0C90)]);
    assert_ne!(writes[0].1 & 0x0010, 0);
}

#[test]
fn failed_seek_does_not_leave_trigger_pending() {
    let mut radio = radio();
    radio.transport_mut().writes_before_nack = Some(0);
    assert_eq!(radio.seek(SeekDirection::Up), Err(Error::Bus(Nack)));
    assert!(!radio.registers().power.seek);

    radio.transport_mut().writes_before_nack = None;
    radio.set_mono(true).unwrap();
    assert_eq!(radio.transport().register_writes(), vec![(0x02, 0xE281)]);
}

#[test]
fn seek_down_clears_direction() {
    let mut radio = radio();
    radio.seek(SeekDirection::Down).unwrap();
    assert_eq!(radio.transport().register_writes(), vec![(0x02, 0xC181)]);
}

#[test]
fn soft_reset_pulses() {
    let mut radio = radio();
    radio.soft_reset().unwrap();
    assert_eq!(
        radio.transport().register_writes(),
        vec![(0x02, 0xC283), (0x02, 0xC281)]
    );
    assert!(!radio.registers().power.soft_reset);
}

#[test]
fn clear_rds_fifo_pulses() {
    let mut radio = radio();
    radio.clear_rds_fifo().unwrap();
    assert_eq!(
        radio.transport().register_writes(),
        vec![(0x04, 0x0E00), (0x04, 0x0A00)]
    );
}

#[test]
fn direct_frequency_writes_0x07_then_0x08() {
    let mut radio = radio();
    radio.set_direct_frequency(Some(1234)).unwrap();
    assert_eq!(
        radio.transport().register_writes(),
        vec![(0x07, 0x4203), (0x08, 1234)]
    );

    radio.transport_mut().clear();
    radio.set_direct_frequency(None).unwrap();
    assert_eq!(radio.transport().register_writes(), vec![(0x07, 0x4202)]);
}

#[test]
fn release_returns_transport() {
    let mut radio = radio();
    radio.set_mono(true).unwrap();
    let (bus, _clock) = radio.release();
    assert_eq!(bus.register_writes(), vec![(0x02, 0xE281)]);
}

// ============================================================================
// embedded-hal adapter
// ============================================================================

#[derive(Default)]
struct FakeI2c {
    writes: Vec<(u8, Vec<u8>)>,
    response: Vec<u8>,
    nack: bool,
}

impl ErrorType for FakeI2c {
    type Error = ErrorKind;
}

impl I2c for FakeI2c {
    fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), ErrorKind> {
        if self.nack {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => self.writes.push((address, bytes.to_vec())),
                Operation::Read(buffer) => {
                    for (i, byte) in buffer.iter_mut().enumerate() {
                        *byte = self.response.get(i).copied().unwrap_or(0);
                    }
                }
            }
        }
        Ok(())
    }
}

#[test]
fn i2c_adapter_reads_chip_id_and_writes_registers() {
    let i2c = FakeI2c {
        response: vec![0x58, 0x04],
        ..FakeI2c::default()
    };
    let mut radio = Rda5807m::new(I2cTransport::new(i2c), ManualClock::new(0)).unwrap();
    assert_eq!(radio.chip_id(), 0x5804);

    radio.set_volume(0).unwrap();
    let (transport, _) = radio.release();
    let i2c = transport.release();
    assert_eq!(
        i2c.writes,
        vec![(0x11, vec![0x00]), (0x11, vec![0x05, 0x88, 0x80])]
    );
}

#[test]
fn i2c_adapter_surfaces_nack() {
    let i2c = FakeI2c {
        nack: true,
        ..FakeI2c::default()
    };
    let result = Rda5807m::new(I2cTransport::new(i2c), ManualClock::new(0));
    assert!(matches!(
        result,
        Err(Error::Bus(ErrorKind::NoAcknowledge(_)))
    ));
}
