// Interactive region selection: a transient window shows a frozen frame, the
// operator drags a rectangle and confirms with SPACE/ENTER or cancels with
// C/ESC. There is no timeout; the operator may take as long as they like.

use log::info;

use crate::draw::{Drawer, draw_crosshair, draw_rect, draw_text_with_bg};
use crate::error::Error;
use crate::types::{BBox, FrameBuffer, Point};

const SELECT_TITLE: &str = "Select object - press SPACE/ENTER to confirm, C to cancel";
const HINT: &str = "DRAG A BOX, SPACE/ENTER CONFIRM, C CANCEL";

const RECT_COLOR: u32 = 0x0000DC00;
const CROSSHAIR_COLOR: u32 = 0x00FFCC33;

/// Drag state: anchor at the press position, rectangle normalized so the
/// operator can drag in any direction. Pure bookkeeping, no window access.
#[derive(Debug, Default)]
pub struct DragRect {
    anchor: Option<Point>,
    current: Option<BBox>,
}

impl DragRect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one sample of pointer position + button state. A press sets the
    /// anchor; movement while held updates the rectangle; release keeps the
    /// last rectangle so the operator can still confirm it.
    pub fn update(&mut self, x: i32, y: i32, down: bool) {
        match (down, self.anchor) {
            (true, None) => {
                self.anchor = Some(Point::new(x, y));
                self.current = Some(BBox::new(x, y, 0, 0));
            }
            (true, Some(a)) => {
                self.current = Some(BBox::new(
                    a.x.min(x),
                    a.y.min(y),
                    (x - a.x).abs(),
                    (y - a.y).abs(),
                ));
            }
            (false, _) => self.anchor = None,
        }
    }

    /// Rectangle to draw this frame, possibly still degenerate mid-drag.
    pub fn preview(&self) -> Option<BBox> {
        self.current
    }

    /// The confirmed selection, or None if nothing was drawn or the
    /// rectangle has zero area.
    pub fn selection(&self) -> Option<BBox> {
        self.current.filter(|r| r.width > 0 && r.height > 0)
    }
}

/// Block until the operator confirms a region on the given frame or cancels.
/// Returns `None` on cancel, on window close, or on a zero-area selection.
pub fn select_region(frame: &FrameBuffer) -> Result<Option<BBox>, Error> {
    info!("draw a box around the object, then press SPACE or ENTER to confirm (C cancels)");

    let mut drawer = Drawer::new(SELECT_TITLE, frame.width, frame.height)?;
    let mut drag = DragRect::new();
    let mut canvas = frame.clone();

    // First present, so key state below reflects real events.
    drawer.present(&canvas)?;

    while drawer.is_open() {
        if drawer.cancel_pressed() {
            info!("selection cancelled");
            return Ok(None);
        }
        if drawer.confirm_pressed() {
            let sel = drag.selection();
            if sel.is_none() {
                info!("no region selected");
            }
            return Ok(sel);
        }

        let pos = drawer.mouse_pos();
        if let Some((mx, my)) = pos {
            drag.update(mx as i32, my as i32, drawer.left_mouse_down());
        }

        canvas.pixels.copy_from_slice(&frame.pixels);
        draw_text_with_bg(&mut canvas, 10, 10, HINT, 0x00FFFFFF, 0x00000000, 1, 4);
        if let Some(r) = drag.preview() {
            draw_rect(&mut canvas, r.x, r.y, r.width, r.height, RECT_COLOR, 2);
        }
        if let Some((mx, my)) = pos {
            draw_crosshair(&mut canvas, mx as i32, my as i32, 12, CROSSHAIR_COLOR);
        }
        drawer.present(&canvas)?;
    }

    // Window closed without confirming.
    Ok(None)
}
