//! ams2oled firmware entry point (nRF52840 + S140).
//!
//! Tasks:
//! - `softdevice_task`: runs the SoftDevice event loop.
//! - `ble_task`: advertise → bond → AMS session, forever.
//! - `ui_task`: renders the shared media snapshot on the OLED.
//! - `button_task` ×5: debounced buttons feeding the BLE task.

#![no_std]
#![no_main]

mod ble;
mod config;
mod error;
mod ui;

use core::cell::Cell;
use core::mem;

use ams2oled::ams::{LinkState, MediaSnapshot, MediaStore};
use ams2oled::ble::current_time::format_clock;
use ams2oled::ui::now_playing::extrapolate_elapsed;
use defmt::info;
use embassy_executor::Spawner;
use embassy_futures::select::{select3, Either3};
use embassy_nrf::gpio::{AnyPin, Pin};
use embassy_nrf::interrupt::{self, InterruptExt, Priority};
use embassy_nrf::peripherals::TWISPI0;
use embassy_nrf::twim::{self, Twim};
use embassy_nrf::{bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Timer};
use nrf_softdevice::{raw, Softdevice};
use {defmt_rtt as _, panic_probe as _};

use crate::ble::connection::{self, BleContext, ClockCell};
use crate::ble::{BleErrorTag, BleEvent};
use crate::config::{BUTTON_QUEUE_DEPTH, DEVICE_NAME, DISPLAY_TICK_MS};
use crate::ui::{display, ButtonEvent, Screen};

bind_interrupts!(struct Irqs {
    TWISPI0 => twim::InterruptHandler<peripherals::TWISPI0>;
});

static MEDIA: MediaStore<CriticalSectionRawMutex> = MediaStore::new();
static BUTTONS: Channel<CriticalSectionRawMutex, ButtonEvent, BUTTON_QUEUE_DEPTH> = Channel::new();
static BLE_EVENTS: Channel<CriticalSectionRawMutex, BleEvent, 8> = Channel::new();
static REDRAW: Signal<CriticalSectionRawMutex, ()> = Signal::new();
static CLOCK: ClockCell = Mutex::new(Cell::new(None));

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[embassy_executor::task]
async fn ble_task(sd: &'static Softdevice) -> ! {
    let ctx = BleContext {
        store: &MEDIA,
        buttons: BUTTONS.receiver(),
        events: BLE_EVENTS.sender(),
        redraw: &REDRAW,
        clock: &CLOCK,
    };
    connection::ble_task(sd, ctx).await
}

#[embassy_executor::task(pool_size = 5)]
async fn button_task(pin: AnyPin, event: ButtonEvent) -> ! {
    ui::buttons::button_task(pin, event, BUTTONS.sender()).await
}

fn clock_text() -> Option<heapless::String<5>> {
    CLOCK
        .lock(|cell| cell.get())
        .map(|sample| format_clock(sample.seconds_of_day_at(Instant::now())))
}

#[embassy_executor::task]
async fn ui_task(i2c: Twim<'static, TWISPI0>) -> ! {
    let mut display = display::init(i2c);
    let mut screen = Screen::Advertising;
    let mut last_error = BleErrorTag::DiscoveryFailed;
    let mut snapshot = MediaSnapshot::empty();
    let mut snapshot_at = Instant::now();
    let mut tick: usize = 0;

    loop {
        match select3(
            BLE_EVENTS.receive(),
            REDRAW.wait(),
            Timer::after(Duration::from_millis(DISPLAY_TICK_MS)),
        )
        .await
        {
            Either3::First(event) => {
                info!("UI: {}", event);
                screen = match event {
                    BleEvent::Advertising | BleEvent::Disconnected => Screen::Advertising,
                    BleEvent::Connected => Screen::Connecting,
                    BleEvent::Error(tag) => {
                        last_error = tag;
                        Screen::Error
                    }
                };
            }
            Either3::Second(()) => {}
            Either3::Third(()) => tick = tick.wrapping_add(1),
        }

        if let Some(update) = MEDIA.take_update() {
            if update.flags.playback_changed {
                snapshot_at = Instant::now();
            }
            snapshot = update.snapshot;
        }

        let active = MEDIA.link_state() == LinkState::Active;
        screen = match (screen, active) {
            (Screen::Connecting, true) => Screen::NowPlaying,
            (Screen::NowPlaying, false) => Screen::Connecting,
            (other, _) => other,
        };

        let clock = clock_text();
        match screen {
            Screen::Advertising => display::draw_status(
                &mut display,
                "Waiting for phone",
                "Pair in BT settings",
                clock.as_deref(),
            ),
            Screen::Connecting => {
                display::draw_status(&mut display, "Connected", "Starting media", clock.as_deref())
            }
            Screen::NowPlaying => {
                let since = Instant::now().duration_since(snapshot_at).as_millis() as f32 / 1000.0;
                let elapsed = extrapolate_elapsed(&snapshot, since);
                display::draw_now_playing(&mut display, &snapshot, elapsed, tick, clock.as_deref());
            }
            Screen::Error => display::draw_error(&mut display, last_error.message()),
        }
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("ams2oled starting");

    // The SoftDevice reserves priorities 0, 1 and 4.
    let mut nrf_config = embassy_nrf::config::Config::default();
    nrf_config.gpiote_interrupt_priority = Priority::P2;
    nrf_config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(nrf_config);
    interrupt::TWISPI0.set_priority(Priority::P3);

    let sd_config = nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t {
            att_mtu: config::ATT_MTU,
        }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: DEVICE_NAME.as_ptr() as _,
            current_len: DEVICE_NAME.len() as u16,
            max_len: DEVICE_NAME.len() as u16,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    };

    let sd = Softdevice::enable(&sd_config);
    spawner.must_spawn(softdevice_task(sd));

    let mut twim_config = twim::Config::default();
    twim_config.frequency = twim::Frequency::K400;
    let i2c = Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim_config);
    spawner.must_spawn(ui_task(i2c));

    spawner.must_spawn(button_task(p.P0_11.degrade(), ButtonEvent::PlayPause));
    spawner.must_spawn(button_task(p.P0_12.degrade(), ButtonEvent::Next));
    spawner.must_spawn(button_task(p.P0_24.degrade(), ButtonEvent::Previous));
    spawner.must_spawn(button_task(p.P0_25.degrade(), ButtonEvent::VolumeUp));
    spawner.must_spawn(button_task(p.P0_02.degrade(), ButtonEvent::VolumeDown));

    spawner.must_spawn(ble_task(sd));
}
