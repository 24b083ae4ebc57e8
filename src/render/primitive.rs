//! Closed set of drawable shapes produced by the scene builder.

use super::color::Rgba;

/// Screen-space point in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// One shape in the scene, tagged with its sort depth (larger is farther).
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Filled quad of the base plate, outlined in black.
    BasePanel {
        points: [Point; 4],
        color: Rgba,
        depth: f64,
    },
    /// Pillar segment with a thin highlight stroke.
    Pillar {
        from: Point,
        to: Point,
        width: f64,
        color: Rgba,
        depth: f64,
    },
    /// Shaded solid piece.
    Piece {
        center: Point,
        radius: f64,
        color: Rgba,
        depth: f64,
    },
    /// Translucent preview of where the next piece would land.
    Ghost {
        center: Point,
        radius: f64,
        color: Rgba,
        depth: f64,
    },
}

impl Primitive {
    pub fn depth(&self) -> f64 {
        match self {
            Primitive::BasePanel { depth, .. }
            | Primitive::Pillar { depth, .. }
            | Primitive::Piece { depth, .. }
            | Primitive::Ghost { depth, .. } => *depth,
        }
    }
}

#[cfg(test)]
impl Primitive {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Primitive::BasePanel { .. } => "base",
            Primitive::Pillar { .. } => "pillar",
            Primitive::Piece { .. } => "piece",
            Primitive::Ghost { .. } => "ghost",
        }
    }
}
