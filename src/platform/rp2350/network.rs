//! Pico 2 W WiFi bring-up
//!
//! Initializes the CYW43439 driver and the network stack, then joins the
//! configured network. Joining is the startup gate: the firmware retries at
//! a fixed interval for as long as it takes, and no periodic task starts
//! until the gate has cleared. A handheld with no uplink has nothing to do.
//!
//! Configuration is compile-time only, injected by `build.rs` from the
//! `TILT_SSID` / `TILT_PASS` / `TILT_HOST` / `TILT_PORT` environment.

use cyw43::JoinOptions;
use cyw43_pio::{PioSpi, DEFAULT_CLOCK_DIVIDER};
use embassy_executor::Spawner;
use embassy_net::{
    Config as NetConfig, IpAddress, IpEndpoint, Ipv4Address, Stack, StackResources,
};
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{DMA_CH0, PIN_23, PIN_24, PIN_25, PIN_29, PIO0};
use embassy_rp::pio::{InterruptHandler as PioInterruptHandler, Pio};
use embassy_rp::{bind_interrupts, Peri};
use embassy_time::{Duration, Timer};
use static_cell::StaticCell;

/// Fixed delay between join attempts
const JOIN_RETRY_INTERVAL: Duration = Duration::from_millis(500);

/// Deployment network configuration (compile-time, not runtime-mutable)
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// WiFi network name
    pub ssid: &'static str,
    /// WPA2 password
    pub password: &'static str,
    /// Telemetry destination IPv4 address
    pub host: [u8; 4],
    /// Telemetry destination UDP port
    pub port: u16,
}

impl NetworkConfig {
    /// Read the configuration injected by `build.rs`
    pub fn from_build_env() -> Self {
        Self {
            ssid: env!("TILT_SSID"),
            password: env!("TILT_PASS"),
            host: parse_ipv4(env!("TILT_HOST")).unwrap_or([192, 168, 4, 2]),
            port: env!("TILT_PORT").parse().unwrap_or(10394),
        }
    }

    /// Telemetry destination as a socket endpoint
    pub fn destination(&self) -> IpEndpoint {
        IpEndpoint::new(
            IpAddress::Ipv4(Ipv4Address::new(
                self.host[0],
                self.host[1],
                self.host[2],
                self.host[3],
            )),
            self.port,
        )
    }
}

fn parse_ipv4(s: &str) -> Option<[u8; 4]> {
    let mut octets = [0u8; 4];
    let mut parts = s.split('.');
    for octet in octets.iter_mut() {
        *octet = parts.next()?.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(octets)
}

/// Pins and peripherals wired to the CYW43439
pub struct WifiHardware {
    pub pwr: Peri<'static, PIN_23>,
    pub cs: Peri<'static, PIN_25>,
    pub pio: Peri<'static, PIO0>,
    pub dio: Peri<'static, PIN_24>,
    pub clk: Peri<'static, PIN_29>,
    pub dma: Peri<'static, DMA_CH0>,
}

bind_interrupts!(struct PioIrqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
});

/// CYW43439 driver event loop
#[embassy_executor::task]
async fn wifi_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>,
) -> ! {
    runner.run().await
}

/// embassy-net stack event loop
#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

/// Bring up WiFi and block until the network is usable
///
/// Retries the join at [`JOIN_RETRY_INTERVAL`] indefinitely, then waits for
/// DHCP. Callers spawn the periodic tasks only after this returns.
pub async fn join_network(
    spawner: Spawner,
    config: &NetworkConfig,
    hw: WifiHardware,
) -> Stack<'static> {
    let fw = include_bytes!("../../../cyw43-firmware/43439A0.bin");
    let clm = include_bytes!("../../../cyw43-firmware/43439A0_clm.bin");

    let pwr = Output::new(hw.pwr, Level::Low);
    let cs = Output::new(hw.cs, Level::High);
    let mut pio = Pio::new(hw.pio, PioIrqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        hw.dio,
        hw.clk,
        hw.dma,
    );

    static STATE: StaticCell<cyw43::State> = StaticCell::new();
    let state = STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw).await;
    spawner.spawn(wifi_task(runner)).unwrap();

    control.init(clm).await;

    static RESOURCES: StaticCell<StackResources<4>> = StaticCell::new();
    let seed = 0x7ab6_34c9_02fe_11d8;
    let (stack, net_runner) = embassy_net::new(
        net_device,
        NetConfig::dhcpv4(Default::default()),
        RESOURCES.init(StackResources::new()),
        seed,
    );
    spawner.spawn(net_task(net_runner)).unwrap();

    defmt::info!("joining WiFi network: {}", config.ssid);
    loop {
        match control
            .join(config.ssid, JoinOptions::new(config.password.as_bytes()))
            .await
        {
            Ok(()) => break,
            Err(_) => {
                defmt::warn!("WiFi join failed, retrying");
                Timer::after(JOIN_RETRY_INTERVAL).await;
            }
        }
    }
    defmt::info!("WiFi connected");

    stack.wait_config_up().await;
    defmt::info!("network configured");

    stack
}
