//! User interface subsystem - OLED display + physical buttons.
//!
//! The UI task renders whatever the shared `MediaStore` holds and reacts
//! to connection events from the BLE task.
//!
//! ## Components
//!
//! - **Display**: SSD1306 128×64 OLED via I²C
//! - **Buttons**: 5 tactile switches with debouncing (transport + volume)

pub mod buttons;
pub mod display;

pub use ams2oled::ui::ButtonEvent;

use defmt::Format;

/// Screens (views) the UI can be in.
#[derive(Clone, Copy, PartialEq, Eq, Format)]
pub enum Screen {
    /// Advertising, waiting for the phone.
    Advertising,
    /// Link up, AMS not active yet.
    Connecting,
    /// AMS active - shows the now-playing view.
    NowPlaying,
    /// Error - shows a transient message.
    Error,
}
