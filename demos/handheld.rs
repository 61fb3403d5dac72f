//! Handheld firmware entry point
//!
//! Boot sequence:
//!
//! 1. Load any persisted gyro calibration from flash
//! 2. Join WiFi — blocks, retrying, until the network is up
//! 3. Spawn the sampling (200 Hz), button (1 kHz), and telemetry (200 Hz)
//!    tasks
//!
//! # Hardware
//!
//! - MPU-6886 breakout on I2C0 (GPIO 4 = SDA, GPIO 5 = SCL)
//! - Buttons on GPIO 14 (primary) and GPIO 15 (side), active low
//!
//! # Build
//!
//! ```bash
//! TILT_SSID=MyNetwork TILT_PASS=secret TILT_HOST=192.168.1.20 \
//!     cargo build --release --example handheld --features pico2_w \
//!     --target thumbv8m.main-none-eabihf
//! ```

#![no_std]
#![no_main]

use defmt::{info, unwrap, warn};
use embassy_executor::Spawner;
use embassy_net::udp::PacketMetadata;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::I2C0;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use tilt_link::devices::{
    run_button_task, run_sampling_task, ButtonInput, ButtonMonitor, ImuReader, Mpu6886,
};
use tilt_link::fusion::{FusionConfig, GyroCalibrator};
use tilt_link::platform::rp2350::{
    join_network, NetworkConfig, Rp2350Flash, UdpTelemetry, WifiHardware,
};
use tilt_link::settings::CalibrationSettings;
use tilt_link::state::{ButtonMask, SampleStore};
use tilt_link::telemetry::run_telemetry_task;

/// Local port the telemetry socket binds to
const TELEMETRY_LOCAL_PORT: u16 = 10393;

static STORE: SampleStore = SampleStore::new();

bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

/// GPIO buttons, active low with internal pull-ups
struct GpioButtons {
    primary: Input<'static>,
    side: Input<'static>,
}

impl ButtonInput for GpioButtons {
    fn poll(&mut self) -> ButtonMask {
        let mut mask = ButtonMask::empty();
        if self.primary.is_low() {
            mask |= ButtonMask::PRIMARY;
        }
        if self.side.is_low() {
            mask |= ButtonMask::SECONDARY;
        }
        mask
    }
}

#[embassy_executor::task]
async fn sampling_task(
    reader: ImuReader<Mpu6886<'static, I2C0>>,
    calibrator: Option<GyroCalibrator>,
    mut flash: Rp2350Flash<'static>,
) -> ! {
    run_sampling_task(reader, calibrator, &STORE, move |offset| {
        let settings = CalibrationSettings {
            gyro_offset: offset,
        };
        if settings.save(&mut flash).is_err() {
            warn!("failed to persist gyro offset");
        }
    })
    .await
}

#[embassy_executor::task]
async fn button_task(monitor: ButtonMonitor<GpioButtons>) -> ! {
    run_button_task(monitor, &STORE).await
}

#[embassy_executor::task]
async fn telemetry_task(transport: UdpTelemetry<'static>) -> ! {
    run_telemetry_task(transport, &STORE).await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("tilt_link handheld starting");
    let p = embassy_rp::init(Default::default());

    // Persisted calibration, if an earlier boot stored one
    let mut flash = Rp2350Flash::new(p.FLASH);
    let stored = CalibrationSettings::load(&mut flash).ok().flatten();

    // Startup gate: no task runs until the uplink exists
    let config = NetworkConfig::from_build_env();
    let stack = join_network(
        spawner,
        &config,
        WifiHardware {
            pwr: p.PIN_23,
            cs: p.PIN_25,
            pio: p.PIO0,
            dio: p.PIN_24,
            clk: p.PIN_29,
            dma: p.DMA_CH0,
        },
    )
    .await;

    // IMU on I2C0: GPIO 5 = SCL, GPIO 4 = SDA
    let i2c = I2c::new_async(p.I2C0, p.PIN_5, p.PIN_4, Irqs, i2c::Config::default());
    let sensor = unwrap!(Mpu6886::new(i2c).await);
    let mut reader = ImuReader::new(sensor, FusionConfig::default());

    let calibrator = match stored {
        Some(settings) => {
            info!("gyro offset restored from flash");
            reader.set_gyro_offset(settings.gyro_offset);
            None
        }
        None => {
            info!("no stored calibration, hold the device still");
            Some(GyroCalibrator::default())
        }
    };

    // Buttons
    let monitor = ButtonMonitor::new(GpioButtons {
        primary: Input::new(p.PIN_14, Pull::Up),
        side: Input::new(p.PIN_15, Pull::Up),
    });

    // Telemetry socket
    static RX_META: StaticCell<[PacketMetadata; 4]> = StaticCell::new();
    static RX_BUFFER: StaticCell<[u8; 256]> = StaticCell::new();
    static TX_META: StaticCell<[PacketMetadata; 8]> = StaticCell::new();
    static TX_BUFFER: StaticCell<[u8; 512]> = StaticCell::new();
    let transport = UdpTelemetry::new(
        stack,
        TELEMETRY_LOCAL_PORT,
        config.destination(),
        RX_META.init([PacketMetadata::EMPTY; 4]),
        RX_BUFFER.init([0; 256]),
        TX_META.init([PacketMetadata::EMPTY; 8]),
        TX_BUFFER.init([0; 512]),
    );

    unwrap!(spawner.spawn(sampling_task(reader, calibrator, flash)));
    unwrap!(spawner.spawn(button_task(monitor)));
    unwrap!(spawner.spawn(telemetry_task(transport)));

    info!("all tasks running");
}
