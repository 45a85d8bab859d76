//! SSD1306 OLED display wrapper.

use ams2oled::ams::MediaSnapshot;
use ams2oled::ui::now_playing::{
    format_duration, mode_badge, progress_percent, queue_position, scroll_window, state_glyph,
};
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyleBuilder;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::Text;
use heapless::String;
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;

use crate::config::DISPLAY_COLUMNS;

/// Type alias for the concrete display driver.
///
/// Generic over the I²C implementation so callers pass in their HAL's
/// I²C peripheral.
pub type Display<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

/// Initialise the SSD1306 display and clear the screen.
pub fn init<I2C>(i2c: I2C) -> Display<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    let interface = I2CDisplayInterface::new(i2c);
    let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    let _ = display.init();
    display.clear_buffer();
    let _ = display.flush();
    display
}

fn text_style() -> embedded_graphics::mono_font::MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(BinaryColor::On)
        .build()
}

fn line<I2C>(display: &mut Display<I2C>, text: &str, x: i32, y: i32)
where
    I2C: embedded_hal::i2c::I2c,
{
    let _ = Text::new(text, Point::new(x, y), text_style()).draw(display);
}

/// Clock in the top-right corner, if the phone's time is known.
fn draw_clock<I2C>(display: &mut Display<I2C>, clock: Option<&str>)
where
    I2C: embedded_hal::i2c::I2c,
{
    if let Some(clock) = clock {
        line(display, clock, 128 - 6 * clock.len() as i32, 10);
    }
}

/// Render a status screen (advertising / connecting).
pub fn draw_status<I2C>(display: &mut Display<I2C>, status: &str, hint: &str, clock: Option<&str>)
where
    I2C: embedded_hal::i2c::I2c,
{
    display.clear_buffer();

    line(display, "ams2oled", 0, 10);
    draw_clock(display, clock);
    line(display, status, 0, 30);
    line(display, hint, 0, 44);

    let _ = display.flush();
}

/// Render the now-playing screen.
///
/// ```text
/// > 1:23/4:56   12:34
/// Title (scrolling)
/// Artist (scrolling)
/// Album (scrolling)
/// [=======      ] 3/12 S R1
/// ```
pub fn draw_now_playing<I2C>(
    display: &mut Display<I2C>,
    snapshot: &MediaSnapshot,
    elapsed: f32,
    tick: usize,
    clock: Option<&str>,
) where
    I2C: embedded_hal::i2c::I2c,
{
    display.clear_buffer();

    let mut header: String<24> = String::new();
    let _ = header.push_str(state_glyph(snapshot.playback_state));
    let _ = header.push(' ');
    let _ = header.push_str(&format_duration(elapsed));
    if snapshot.duration_seconds > 0.0 {
        let _ = header.push_str("/");
        let _ = header.push_str(&format_duration(snapshot.duration_seconds));
    }
    line(display, &header, 0, 10);
    // Long headers (hour-plus tracks) take the clock's place.
    if header.len() + 6 <= DISPLAY_COLUMNS {
        draw_clock(display, clock);
    }

    let texts = [
        snapshot.title.as_str(),
        snapshot.artist.as_str(),
        snapshot.album.as_str(),
    ];
    for (row, text) in texts.iter().enumerate() {
        let visible = scroll_window(text, DISPLAY_COLUMNS, tick);
        line(display, visible, 0, 22 + row as i32 * 11);
    }

    // Progress bar on the left, queue/mode info on the right.
    let bar_width = 60u32;
    let _ = Rectangle::new(Point::new(0, 56), Size::new(bar_width, 6))
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(display);
    let filled = bar_width * progress_percent(elapsed, snapshot.duration_seconds) as u32 / 100;
    if filled > 0 {
        let _ = Rectangle::new(Point::new(0, 56), Size::new(filled, 6))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(display);
    }

    let mut info: String<32> = String::new();
    let _ = info.push_str(&queue_position(snapshot.queue_index, snapshot.queue_count));
    let badge = mode_badge(snapshot.shuffle_mode, snapshot.repeat_mode);
    if !badge.is_empty() {
        let _ = info.push(' ');
        let _ = info.push_str(&badge);
    }
    line(display, &info, 64, 63);

    let _ = display.flush();
}

/// Render a transient error message.
pub fn draw_error<I2C>(display: &mut Display<I2C>, message: &str)
where
    I2C: embedded_hal::i2c::I2c,
{
    display.clear_buffer();

    line(display, "ERROR", 0, 10);
    line(display, message, 0, 30);

    let _ = display.flush();
}
