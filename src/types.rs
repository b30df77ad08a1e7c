// Core geometry and pixel-buffer types shared by every module.

use image::{GrayImage, RgbImage};

/// One frame as the window wants it: each entry is 0x00RRGGBB for minifb.
#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl FrameBuffer {
    /// A black frame of the given size. Handy for tests and scratch buffers.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u32; width * height],
        }
    }

    /// Unpack into an `image` RGB buffer, e.g. for JPEG encoding.
    pub fn to_rgb_image(&self) -> RgbImage {
        let mut out = RgbImage::new(self.width as u32, self.height as u32);
        for (i, px) in self.pixels.iter().enumerate() {
            let x = (i % self.width) as u32;
            let y = (i / self.width) as u32;
            let r = ((px >> 16) & 0xFF) as u8;
            let g = ((px >> 8) & 0xFF) as u8;
            let b = (px & 0xFF) as u8;
            out.put_pixel(x, y, image::Rgb([r, g, b]));
        }
        out
    }

    /// Grayscale copy for the template matcher (integer BT.601 luma).
    pub fn to_gray(&self) -> GrayImage {
        let mut out = GrayImage::new(self.width as u32, self.height as u32);
        for (i, px) in self.pixels.iter().enumerate() {
            let x = (i % self.width) as u32;
            let y = (i / self.width) as u32;
            let r = (px >> 16) & 0xFF;
            let g = (px >> 8) & 0xFF;
            let b = px & 0xFF;
            // 0.299 R + 0.587 G + 0.114 B in 8.8 fixed point
            let luma = ((77 * r + 150 * g + 29 * b) >> 8) as u8;
            out.put_pixel(x, y, image::Luma([luma]));
        }
        out
    }
}

/// A point in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: Point) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned bounding box in integer pixel coordinates.
///
/// Any box handed out by the selector or a tracker has `width > 0` and
/// `height > 0`; a zero-area drag is reported as "no selection" instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center of the box, integer division. Always derived, never stored.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}
