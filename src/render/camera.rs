//! Orbit camera and perspective projection of board space onto the screen.
//!
//! Board space puts cell (c, d, r) at x = c, y = d, z = r, so the cube spans
//! [0, 3] on every axis and rotates about its centre (1.5, 1.5, 1.5).

use std::f64::consts::PI;

/// Centre of the cube in board coordinates.
pub const BOARD_CENTER: f64 = 1.5;

/// Depth used in place of a point at or behind the camera plane.
const MIN_DEPTH: f64 = 0.1;

/// Camera orientation and lens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    /// Rotation about the vertical axis, radians.
    pub angle_y: f64,
    /// Tilt about the horizontal axis, radians.
    pub angle_x: f64,
    pub distance: f64,
    pub fov: f64,
}

impl Default for CameraState {
    fn default() -> Self {
        CameraState {
            angle_y: PI / 4.0,
            angle_x: -PI / 6.0,
            distance: 600.0,
            fov: 500.0,
        }
    }
}

impl CameraState {
    pub fn rotate(&mut self, yaw: f64, pitch: f64) {
        self.angle_y += yaw;
        self.angle_x += pitch;
    }

    /// Project a board-space point onto `viewport`.
    pub fn project(&self, viewport: &Viewport, x: f64, y: f64, z: f64) -> Projection {
        let (tx, ty, tz) = (x - BOARD_CENTER, y - BOARD_CENTER, z - BOARD_CENTER);

        let (sin_y, cos_y) = self.angle_y.sin_cos();
        let rx = tx * cos_y - tz * sin_y;
        let rz = tx * sin_y + tz * cos_y;

        let (sin_x, cos_x) = self.angle_x.sin_cos();
        let ry = ty * cos_x - rz * sin_x;
        let rz = ty * sin_x + rz * cos_x;

        let raw_depth = rz + self.distance;
        let depth = if raw_depth <= 0.0 { MIN_DEPTH } else { raw_depth };
        let scale = self.fov / depth;

        Projection {
            x: viewport.center_x() + rx * scale * viewport.unit,
            y: viewport.center_y() - ry * scale * viewport.unit,
            scale,
            depth,
            visible: raw_depth > 0.0,
        }
    }
}

/// Pixel surface the scene is projected onto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// Pixels per board unit at scale 1.
    pub unit: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, unit: f64) -> Self {
        Viewport {
            width,
            height,
            unit,
        }
    }

    /// Size the board unit to the surface; a 1000x800 window gets 100 px.
    pub fn fit(width: f64, height: f64) -> Self {
        Viewport::new(width, height, width.min(height) / 8.0)
    }

    pub fn center_x(&self) -> f64 {
        self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.height / 2.0
    }

    /// Convert a length given in pixels of the 100 px/unit reference window.
    pub fn px(&self, reference: f64) -> f64 {
        reference * self.unit / 100.0
    }
}

/// A projected point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub x: f64,
    pub y: f64,
    /// Perspective scale factor, `fov / depth`.
    pub scale: f64,
    /// Distance along the view axis; larger is farther.
    pub depth: f64,
    /// False when the point was at or behind the camera plane and its depth
    /// got clamped.
    pub visible: bool,
}
