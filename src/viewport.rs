//! Viewport size state.
//!
//! A [`Viewport`] is the single record of how big the drawable surface is,
//! in logical pixels, and how dense the display behind it is. It is owned by
//! the application state and handed by reference to the camera and renderer
//! whenever the host window changes size.

use winit::dpi::PhysicalSize;

/// Upper bound for the pixel ratio used for the drawing buffer. Very dense
/// displays are rendered at 2x and upscaled.
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Logical size of a window reported in physical pixels. `None` while the
/// window is minimised.
pub fn logical_size(physical: PhysicalSize<u32>, scale_factor: f64) -> Option<(u32, u32)> {
    if physical.width == 0 || physical.height == 0 {
        return None;
    }
    let logical = physical.to_logical::<f64>(scale_factor);
    Some((logical.width.round() as u32, logical.height.round() as u32))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Logical width of the surface.
    pub width: u32,
    /// Logical height of the surface.
    pub height: u32,
    /// Pixel density reported by the host.
    pub device_pixel_ratio: f64,
    pub max_pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32, device_pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
            max_pixel_ratio: MAX_PIXEL_RATIO,
        }
    }

    /// Derive the logical size from what winit reports for the window.
    pub fn from_physical(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        let (width, height) = logical_size(size, scale_factor).unwrap_or((0, 0));
        Self::new(width, height, scale_factor)
    }

    /// Apply a size-change notification. Returns `false` when nothing changed.
    pub fn resize(&mut self, width: u32, height: u32, device_pixel_ratio: f64) -> bool {
        let changed = self.width != width
            || self.height != height
            || self.device_pixel_ratio != device_pixel_ratio;
        self.width = width;
        self.height = height;
        self.device_pixel_ratio = device_pixel_ratio;
        changed
    }

    /// Apply a size notification in physical pixels. Returns `None` for a
    /// minimised window, which leaves the viewport untouched.
    pub fn resize_physical(&mut self, physical: PhysicalSize<u32>, scale_factor: f64) -> Option<bool> {
        let (width, height) = logical_size(physical, scale_factor)?;
        Some(self.resize(width, height, scale_factor))
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }

    /// The pixel ratio the renderer actually uses.
    pub fn pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio.min(self.max_pixel_ratio)
    }

    /// Size of the buffer the scene gets rasterized into.
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        let ratio = self.pixel_ratio();
        let width = (self.width as f64 * ratio).round() as u32;
        let height = (self.height as f64 * ratio).round() as u32;
        (width.max(1), height.max(1))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800, 600, 1.0)
    }
}
