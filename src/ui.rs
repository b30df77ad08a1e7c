// On-screen controls and overlays.
//
// Pointer state is an explicit structure with a strict access pattern: the
// main loop calls `sample` exactly once per iteration (single writer) and
// `take_click` at most once (single consumer), both on the same turn, so no
// locking is needed.

use crate::draw::{
    Drawer, draw_disc, draw_rect, draw_text, draw_text_with_bg, fill_rect, text_height, text_width,
};
use crate::types::{BBox, FrameBuffer};

// Button styling.
const BTN_H: i32 = 30;
const BTN_PAD_X: i32 = 14;
const BTN_MARGIN: i32 = 8;
const BTN_BG: u32 = 0x001E1E1E;
const BTN_HOVER_BG: u32 = 0x004B4B4B;
const BTN_BORDER: u32 = 0x00787878;
const BTN_TEXT: u32 = 0x00E6E6E6;

const LABEL_SCALE: i32 = 1;
const HUD_SCALE: i32 = 2;

const GREEN: u32 = 0x0000DC00;
const RED: u32 = 0x00FF0000;
const BLACK: u32 = 0x00000000;

/// Actions a control button can trigger. Key equivalents are checked
/// independently by the loop and OR-combined with clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Reselect,
    Quit,
}

impl ButtonAction {
    fn label(self) -> &'static str {
        match self {
            ButtonAction::Reselect => "RESELECT [R]",
            ButtonAction::Quit => "QUIT [Q]",
        }
    }
}

/// A button's action and its rectangle for the current frame.
#[derive(Debug, Clone, Copy)]
pub struct Button {
    pub action: ButtonAction,
    pub rect: BBox,
}

/// Compute button rectangles for a frame of the given size, packed
/// right-to-left from the bottom-right corner so layout adapts to label
/// width. Recomputed every frame; never persisted.
pub fn layout_buttons(frame_w: usize, frame_h: usize) -> Vec<Button> {
    let order = [ButtonAction::Reselect, ButtonAction::Quit];
    let mut x_cursor = frame_w as i32 - BTN_MARGIN;
    let by = frame_h as i32 - BTN_H - BTN_MARGIN;

    let mut buttons = Vec::with_capacity(order.len());
    // Walk right-to-left so on screen it reads Reselect, then Quit.
    for action in order.iter().rev() {
        let bw = text_width(action.label(), LABEL_SCALE) + BTN_PAD_X * 2;
        let bx = x_cursor - bw;
        x_cursor = bx - BTN_MARGIN;
        buttons.push(Button {
            action: *action,
            rect: BBox::new(bx, by, bw, BTN_H),
        });
    }
    buttons
}

/// Draw the buttons, highlighting whichever one the pointer is over.
pub fn draw_buttons(fb: &mut FrameBuffer, buttons: &[Button], pointer: &Pointer) {
    for b in buttons {
        let r = b.rect;
        let hovered = r.contains(pointer.x, pointer.y);
        let bg = if hovered { BTN_HOVER_BG } else { BTN_BG };
        fill_rect(fb, r.x, r.y, r.width, r.height, bg);
        draw_rect(fb, r.x, r.y, r.width, r.height, BTN_BORDER, 1);

        let label = b.action.label();
        let tx = r.x + (r.width - text_width(label, LABEL_SCALE)) / 2;
        let ty = r.y + (r.height - text_height(LABEL_SCALE)) / 2;
        draw_text(fb, tx, ty, label, BTN_TEXT, LABEL_SCALE);
    }
}

/// Resolve a click position to an action. Rects are disjoint by
/// construction, so the first hit wins.
pub fn hit_test(buttons: &[Button], x: i32, y: i32) -> Option<ButtonAction> {
    buttons
        .iter()
        .find(|b| b.rect.contains(x, y))
        .map(|b| b.action)
}

/// Tracking box, center dot and the "watching" indicator.
pub fn draw_watching(fb: &mut FrameBuffer, bbox: BBox) {
    draw_rect(fb, bbox.x, bbox.y, bbox.width, bbox.height, GREEN, 2);
    let c = bbox.center();
    draw_disc(fb, c.x, c.y, 4, GREEN);
    draw_text_with_bg(fb, 10, 16, "WATCHING...", GREEN, BLACK, HUD_SCALE, 5);
}

/// Red frame border plus the alert message on a solid background.
pub fn draw_alert(fb: &mut FrameBuffer, reason: &str) {
    let (w, h) = (fb.width as i32, fb.height as i32);
    draw_rect(fb, 0, 0, w, h, RED, 6);
    let msg = format!("ALERT: {reason}");
    draw_text_with_bg(fb, 10, h - 55, &msg, RED, BLACK, HUD_SCALE, 6);
}

/// Last known cursor position and a one-shot clicked flag.
#[derive(Debug, Default)]
pub struct Pointer {
    pub x: i32,
    pub y: i32,
    held: bool,
    clicked: bool,
}

impl Pointer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Poll the window once per iteration: update the position and latch
    /// `clicked` on the press edge (held transitions false -> true).
    pub fn sample(&mut self, drawer: &Drawer) {
        if let Some((mx, my)) = drawer.mouse_pos() {
            self.x = mx as i32;
            self.y = my as i32;
        }
        let down = drawer.left_mouse_down();
        if down && !self.held {
            self.clicked = true;
        }
        self.held = down;
    }

    /// Consume the one-shot flag. Returns true at most once per press.
    pub fn take_click(&mut self) -> bool {
        std::mem::take(&mut self.clicked)
    }
}
