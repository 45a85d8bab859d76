//! Debounced media buttons.
//!
//! Five active-low switches with internal pull-ups, one task each:
//! PLAY/PAUSE, NEXT, PREV, VOL+ and VOL-. A press is reported once the
//! pin has read low for a full debounce period; the next press is only
//! accepted after the pin has been released the same way.

use defmt::{debug, info};
use embassy_nrf::gpio::{AnyPin, Input, Level, Pull};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Sender;
use embassy_time::{Duration, Timer};

use crate::config::{BUTTON_DEBOUNCE_MS, BUTTON_QUEUE_DEPTH};
use crate::ui::ButtonEvent;

pub type ButtonSender = Sender<'static, CriticalSectionRawMutex, ButtonEvent, BUTTON_QUEUE_DEPTH>;

/// Wait until the pin settles at `level` for one debounce period.
async fn settle(pin: &mut Input<'static>, level: Level) {
    loop {
        match level {
            Level::Low => pin.wait_for_low().await,
            Level::High => pin.wait_for_high().await,
        }
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
        if pin.get_level() == level {
            return;
        }
    }
}

pub async fn button_task(pin: AnyPin, event: ButtonEvent, tx: ButtonSender) -> ! {
    let mut pin = Input::new(pin, Pull::Up);

    loop {
        settle(&mut pin, Level::Low).await;
        info!("Button: {}", event);

        // A full queue drops the press instead of stalling the button.
        if tx.try_send(event).is_err() {
            debug!("Button queue full, dropping {}", event);
        }

        settle(&mut pin, Level::High).await;
    }
}
