//! FM Receiver Main Application
//!
//! Entry point for the STM32G474 demo board with an RDA5807M on I2C1.
//! Tunes the default station and reports status and raw RDS groups.

#![no_std]
#![no_main]

use defmt::{error, info, warn};
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::i2c::I2c;
use embassy_stm32::time::Hertz;
use embassy_time::{Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

use rda5807m::prelude::*;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("FM receiver firmware v{}", env!("CARGO_PKG_VERSION"));

    let config = embassy_stm32::Config::default();
    let p = embassy_stm32::init(config);

    let led = Output::new(p.PA5, Level::Low, Speed::Low);
    spawner.spawn(heartbeat_task(led)).unwrap();

    // PB8 = SCL, PB9 = SDA for I2C1 on STM32G474
    let i2c = I2c::new_blocking(
        p.I2C1,
        p.PB8,
        p.PB9,
        Hertz(I2C_FREQUENCY_HZ),
        Default::default(),
    );

    info!(
        "I2C1 initialized at {}Hz (SCL {=str}, SDA {=str})",
        I2C_FREQUENCY_HZ,
        pins::I2C1_SCL,
        pins::I2C1_SDA
    );

    let mut radio = match Rda5807m::new(I2cTransport::new(i2c), EmbassyClock) {
        Ok(radio) => radio,
        Err(e) => {
            error!("RDA5807M not responding: {}", e);
            loop {
                Timer::after(Duration::from_secs(10)).await;
            }
        }
    };

    if let Err(e) = start_receiver(&mut radio) {
        error!("receiver setup failed: {}", e);
    }

    let mut ticks: u32 = 0;
    loop {
        Timer::after(Duration::from_millis(100)).await;
        ticks = ticks.wrapping_add(1);

        match radio.refresh() {
            Ok(snapshot) => {
                let status = snapshot.status();
                if status.rds_ready && status.block_b_errors.is_usable() {
                    info!(
                        "RDS {:04x} {:04x} {:04x} {:04x}",
                        status.block_a(),
                        status.block_b(),
                        status.block_c(),
                        status.block_d()
                    );
                }
                if ticks % 50 == 0 {
                    info!("{}", status);
                }
                if !snapshot.is_complete() {
                    warn!("degraded status snapshot");
                }
            }
            Err(e) => warn!("status read failed: {}", e),
        }
    }
}

/// Bring the chip up and tune the default station
fn start_receiver<T: Transport, C: Clock>(radio: &mut Rda5807m<T, C>) -> BusResult<(), T::Error> {
    radio.power_up()?;
    radio.configure(|r| {
        r.set_band(DEFAULT_BAND);
        r.channel.spacing = DEFAULT_SPACING;
        r.set_volume(DEFAULT_VOLUME);
        r.power.rds = true;
        r.power.new_demod = true;
    })?;
    radio.set_frequency_khz(DEFAULT_STATION_KHZ)?;
    info!("tuned to {}kHz", DEFAULT_STATION_KHZ);
    Ok(())
}

/// Heartbeat task - blinks LED to show system is running
#[embassy_executor::task]
async fn heartbeat_task(mut led: Output<'static>) {
    loop {
        led.set_high();
        Timer::after(Duration::from_millis(100)).await;
        led.set_low();
        Timer::after(Duration::from_millis(900)).await;
    }
}
