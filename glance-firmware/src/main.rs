//! Glance - Ambient Character Display Firmware
//!
//! Main firmware binary for an RP2040 driving an HP LD220 pole display.
//! Apps take turns on the display; the button asks for a song out of turn.
//!
//! Pins (Raspberry Pi Pico):
//! - GPIO0: UART0 TX to the display
//! - GPIO1: UART0 RX (claimed by the UART, left unconnected)
//! - GPIO15: push button to ground

#![no_std]
#![no_main]

extern crate alloc;

use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, BufferedUartTx, Uart};
use embassy_time::{Duration, Instant, Ticker, Timer};
use embedded_alloc::LlffHeap as Heap;
use embedded_io_async::Write;
use heapless::Vec;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use glance_apps::babyshark::BabyShark;
use glance_apps::clock::Clock;
use glance_apps::fortune::Fortune;
use glance_apps::script::ScriptApp;
use glance_apps::{derek, eightclap, play};
use glance_core::cancel::CancelSource;
use glance_core::display::{Chain, Display};
use glance_core::scheduler::{App, Scheduler};
use glance_drivers::{ld220, Ld220};
use glance_hal::gpio::ActiveLevel;
use glance_hal_rp2040::gpio::RpInput;
use glance_hal_rp2040::uart::{gpio_to_uart, to_rp_config};

use crate::channels::{DISPLAY_TX, DISPLAY_TX_QUEUE, INTENTS, MIRROR, STATUS};
use crate::config::{parse_config, AppName, FirmwareConfig, MAX_ROSTER};

mod channels;
mod config;

// Heap allocator for boxed activities
#[global_allocator]
static HEAP: Heap = Heap::empty();

// Heap size: 32KB
const HEAP_SIZE: usize = 32 * 1024;

/// Embedded configuration (compiled into firmware)
/// Edit glance.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../glance.toml");

/// Display TX pin
const DISPLAY_TX_GPIO: u8 = 0;

/// Debounce for the button
const DEBOUNCE_MS: u64 = 20;

/// Holding the button this long arms baby shark instead of playing it
const LONG_PRESS: Duration = Duration::from_millis(1000);

/// How often the mirrored display content is logged
const MIRROR_LOG_INTERVAL: Duration = Duration::from_secs(10);

type PoleDisplay = Ld220<'static, DISPLAY_TX_QUEUE>;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 16]> = StaticCell::new();

static CONFIG: StaticCell<FirmwareConfig> = StaticCell::new();

static FORTUNE: Fortune = Fortune::new(glance_apps::fortune::FORTUNES);
static DEREK: ScriptApp = derek::derek();
static PLAY: ScriptApp = play::play();
static EIGHT_CLAP: ScriptApp = eightclap::eight_clap();
static BABY_SHARK: BabyShark = BabyShark::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Glance firmware starting...");

    // Initialize heap allocator
    init_heap();

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = CONFIG.init(load_config());

    // Pole display on UART0; the display never talks back
    info!(
        "Display TX on GPIO{} ({}) at {} baud",
        DISPLAY_TX_GPIO,
        gpio_to_uart(DISPLAY_TX_GPIO),
        config.baud
    );
    let uart_config = to_rp_config(&ld220::uart_config(config.baud));
    let tx_buf = TX_BUF.init([0u8; 64]);
    let rx_buf = RX_BUF.init([0u8; 16]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let (tx, _rx) = uart.into_buffered(Irqs, tx_buf, rx_buf).split();

    let display = match Ld220::open(&DISPLAY_TX) {
        Ok(display) => Some(display),
        Err(e) => {
            // Keep running on the mirror alone
            error!("Failed to open display: {:?}", e);
            None
        }
    };

    // Button to ground, internal pull-up
    let button = Input::new(p.PIN_15, Pull::Up);

    // Spawn tasks
    spawner.spawn(display_tx_task(tx)).unwrap();
    spawner.spawn(scheduler_task(display, config)).unwrap();
    spawner.spawn(button_task(button)).unwrap();
    spawner.spawn(status_task()).unwrap();

    info!("All tasks spawned, firmware running");

    // Greet with a cheer before the first roster turn
    INTENTS.submit(EIGHT_CLAP.intent()).await;

    loop {
        Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Initialize the heap allocator
fn init_heap() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE)
    }
}

/// Parse the embedded configuration, falling back to defaults
fn load_config() -> FirmwareConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            // The build script validates glance.toml, so this is a parser bug
            error!("Failed to parse embedded config: {:?}", e);
            FirmwareConfig::default()
        }
    }
}

/// Look up roster names among the known apps
///
/// Unknown names are logged and left out.
fn select_roster<'a>(
    names: &[AppName],
    known: &[&'a dyn App],
) -> Vec<&'a dyn App, MAX_ROSTER> {
    let mut roster = Vec::new();
    for name in names {
        match known.iter().find(|app| app.name() == name.as_str()) {
            Some(app) => {
                let _ = roster.push(*app);
            }
            None => warn!("Unknown app {} in roster", name.as_str()),
        }
    }
    roster
}

/// Display TX task - drains queued LD220 bytes to the UART
#[embassy_executor::task]
async fn display_tx_task(mut tx: BufferedUartTx<'static, UART0>) {
    info!("Display TX task started");

    let mut buf = [0u8; 32];
    loop {
        let len = DISPLAY_TX.read(&mut buf).await;
        if let Err(e) = tx.write_all(&buf[..len]).await {
            warn!("Failed to send to display: {:?}", e);
        }
    }
}

/// Scheduler task - owns the display and runs the roster forever
#[embassy_executor::task]
async fn scheduler_task(display: Option<PoleDisplay>, config: &'static FirmwareConfig) {
    info!("Scheduler task started");

    let clock = Clock::new(config.clock_offset_s);
    let known: [&dyn App; 6] = [&clock, &FORTUNE, &DEREK, &PLAY, &EIGHT_CLAP, &BABY_SHARK];
    let roster = select_roster(&config.roster, &known);

    let mut targets: Vec<&dyn Display, 2> = Vec::new();
    if let Some(display) = display.as_ref() {
        let _ = targets.push(display);
    }
    let _ = targets.push(&MIRROR);
    let chain = Chain::new(&targets);

    let scheduler = Scheduler::new(&chain, &roster, &INTENTS, &STATUS, config.scheduler);
    let stop = CancelSource::new();

    loop {
        match scheduler.run(stop.token()).await {
            Ok(()) => {
                info!("Scheduler stopped");
                return;
            }
            Err(e) => {
                error!("Scheduler failed: {:?}, restarting", e);
                Timer::after_secs(1).await;
            }
        }
    }
}

/// Button task - short press plays baby shark now, long press arms it
#[embassy_executor::task]
async fn button_task(pin: Input<'static>) {
    info!("Button task started");

    let mut button = ActiveLevel::active_low(RpInput::new(pin));

    loop {
        button.inner_mut().wait_for_any_edge().await;
        Timer::after_millis(DEBOUNCE_MS).await;
        if !button.is_active() {
            continue;
        }

        let pressed = Instant::now();
        while button.is_active() {
            button.inner_mut().wait_for_any_edge().await;
            Timer::after_millis(DEBOUNCE_MS).await;
        }

        if pressed.elapsed() >= LONG_PRESS {
            BABY_SHARK.arm();
            info!("Baby shark armed for its next turn");
        } else {
            BABY_SHARK.request(INTENTS.sender()).await;
        }
    }
}

/// Status task - logs what the scheduler starts and what the display shows
#[embassy_executor::task]
async fn status_task() {
    info!("Status task started");

    let feed = STATUS.receiver();
    let mut ticker = Ticker::every(MIRROR_LOG_INTERVAL);

    loop {
        match select(feed.next(), ticker.next()).await {
            Either::First(status) => {
                info!(
                    "Showing {} as {} until {}s",
                    status.name,
                    status.id.as_str(),
                    status.deadline.as_secs()
                );
            }
            Either::Second(()) => {
                debug!(
                    "Display: [{}] [{}]",
                    MIRROR.line(0).as_str(),
                    MIRROR.line(1).as_str()
                );
            }
        }
    }
}
