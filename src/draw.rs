// Window + software drawing utilities: a minifb window wrapper, pixel/line/
// rect primitives, and a 5x7 bitmap font for HUD text, labels and buttons.

use crate::error::Error;
use crate::types::FrameBuffer;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

pub struct Drawer {
    window: Window,
}

impl Drawer {
    /// Create a window sized to the camera feed. The built-in rate limiter
    /// doubles as the loop's frame pacing.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(30);
        Ok(Self { window })
    }

    /// Push this frame's pixels to the screen. Also pumps the event queue,
    /// so key and mouse state observed afterwards is current.
    pub fn present(&mut self, fb: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&fb.pixels, fb.width, fb.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// False once the user closes the window.
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Cursor position in window pixels, clamped to the window.
    pub fn mouse_pos(&self) -> Option<(usize, usize)> {
        self.window
            .get_mouse_pos(MouseMode::Clamp)
            .map(|(x, y)| (x.max(0.0) as usize, y.max(0.0) as usize))
    }

    pub fn left_mouse_down(&self) -> bool {
        self.window.get_mouse_down(MouseButton::Left)
    }

    // One-shot key queries (no auto-repeat), checked once per iteration.

    pub fn quit_pressed(&self) -> bool {
        self.window.is_key_pressed(Key::Q, KeyRepeat::No)
    }

    pub fn reselect_pressed(&self) -> bool {
        self.window.is_key_pressed(Key::R, KeyRepeat::No)
    }

    /// SPACE or ENTER: confirm the current selection.
    pub fn confirm_pressed(&self) -> bool {
        self.window.is_key_pressed(Key::Space, KeyRepeat::No)
            || self.window.is_key_pressed(Key::Enter, KeyRepeat::No)
    }

    /// C or ESC: cancel the selection.
    pub fn cancel_pressed(&self) -> bool {
        self.window.is_key_pressed(Key::C, KeyRepeat::No)
            || self.window.is_key_pressed(Key::Escape, KeyRepeat::No)
    }
}

/* ---------- Software drawing: pixels, lines, rects ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
pub fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    fb.pixels[y * fb.width + x] = color;
}

/// Thin line between (x0,y0) and (x1,y1) using Bresenham.
pub fn draw_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
    let (mut x0, mut y0, x1, y1) = (x0, y0, x1, y1);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(fb, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Solid rectangle. Out-of-bounds parts are clipped by `put_pixel`.
pub fn fill_rect(fb: &mut FrameBuffer, x: i32, y: i32, w: i32, h: i32, color: u32) {
    for yy in y..y + h {
        for xx in x..x + w {
            put_pixel(fb, xx, yy, color);
        }
    }
}

/// Rectangle outline with the given border thickness (drawn inwards).
pub fn draw_rect(fb: &mut FrameBuffer, x: i32, y: i32, w: i32, h: i32, color: u32, thickness: i32) {
    let t = thickness.max(1).min(w / 2 + 1).min(h / 2 + 1);
    fill_rect(fb, x, y, w, t, color); // top
    fill_rect(fb, x, y + h - t, w, t, color); // bottom
    fill_rect(fb, x, y + t, t, h - 2 * t, color); // left
    fill_rect(fb, x + w - t, y + t, t, h - 2 * t, color); // right
}

/// Small filled disc, e.g. the tracked-center dot.
pub fn draw_disc(fb: &mut FrameBuffer, cx: i32, cy: i32, radius: i32, color: u32) {
    let r2 = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r2 {
                put_pixel(fb, cx + dx, cy + dy, color);
            }
        }
    }
}

/// A "+" shape with a small gap at the center; the selection cursor.
pub fn draw_crosshair(fb: &mut FrameBuffer, cx: i32, cy: i32, size: i32, color: u32) {
    draw_line(fb, cx - size, cy, cx - 2, cy, color);
    draw_line(fb, cx + 2, cy, cx + size, cy, color);
    draw_line(fb, cx, cy - size, cx, cy - 2, color);
    draw_line(fb, cx, cy + 2, cx, cy + size, color);
    put_pixel(fb, cx, cy, color);
}

/* ---------- 5x7 bitmap font ---------- */

/// Return a 5x7 glyph bitmap. Each u8 is a row; the low 5 bits are the
/// pixels (bit 4 = leftmost). Uppercase-only; callers uppercase their text.
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b11001,0b10101,0b10011,0b10001,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b11011,0b10001),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        ',' => g!(0b00000,0b00000,0b00000,0b00000,0b00100,0b00100,0b01000),
        '!' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00000,0b00100),
        '-' => g!(0b00000,0b00000,0b00000,0b01110,0b00000,0b00000,0b00000),
        '/' => g!(0b00001,0b00010,0b00010,0b00100,0b01000,0b01000,0b10000),
        '(' => g!(0b00010,0b00100,0b01000,0b01000,0b01000,0b00100,0b00010),
        ')' => g!(0b01000,0b00100,0b00010,0b00010,0b00010,0b00100,0b01000),
        '[' => g!(0b01110,0b01000,0b01000,0b01000,0b01000,0b01000,0b01110),
        ']' => g!(0b01110,0b00010,0b00010,0b00010,0b00010,0b00010,0b01110),

        _ => None,
    }
}

// 5 pixel glyph + 1 pixel spacing, before scaling.
const GLYPH_ADVANCE: i32 = 6;

/// Pixel width of a rendered string.
pub fn text_width(text: &str, scale: i32) -> i32 {
    let n = text.chars().count() as i32;
    if n == 0 { 0 } else { (n * GLYPH_ADVANCE - 1) * scale }
}

/// Pixel height of a rendered string.
pub fn text_height(scale: i32) -> i32 {
    7 * scale
}

/// Draw one glyph at (x,y), scaled, with a 1-cell black shadow for contrast.
fn draw_char(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32, scale: i32) {
    let Some(rows) = glyph5x7(ch) else { return };
    // Shadow pass first, then the glyph on top.
    for (pass, col) in [(1, 0x00000000u32), (0, color)] {
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    let px = x + (rx + pass) * scale;
                    let py = y + (ry as i32 + pass) * scale;
                    fill_rect(fb, px, py, scale, scale, col);
                }
            }
        }
    }
}

/// Draw a string in 5x7 glyphs. Input is uppercased; unknown glyphs are
/// skipped (they still take up an advance, so layout stays stable).
pub fn draw_text(fb: &mut FrameBuffer, x: i32, y: i32, text: &str, color: u32, scale: i32) {
    let mut cx = x;
    for ch in text.chars() {
        draw_char(fb, cx, y, ch.to_ascii_uppercase(), color, scale);
        cx += GLYPH_ADVANCE * scale;
    }
}

/// Draw text over a solid background box so it stays readable on any frame.
pub fn draw_text_with_bg(
    fb: &mut FrameBuffer,
    x: i32,
    y: i32,
    text: &str,
    color: u32,
    bg: u32,
    scale: i32,
    padding: i32,
) {
    let tw = text_width(text, scale);
    let th = text_height(scale);
    fill_rect(
        fb,
        x - padding,
        y - padding,
        tw + 2 * padding,
        th + 2 * padding,
        bg,
    );
    draw_text(fb, x, y, text, color, scale);
}
