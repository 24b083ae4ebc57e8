//! Painter's algorithm: sort far to near, then draw each primitive.

use super::color::{self, Rgba};
use super::primitive::{Point, Primitive};
use super::surface::Surface;

/// Piece shading, relative to the piece radius.
const HIGHLIGHT_OFFSET: f64 = 0.2;
const HIGHLIGHT_RADIUS: f64 = 0.6;
const HIGHLIGHT_LIGHTEN: u8 = 60;
const SPECULAR_OFFSET: f64 = 0.35;
const SPECULAR_RADIUS: f64 = 0.25;

/// Inner pillar stroke, relative to the pillar width.
const PILLAR_SHINE_WIDTH: f64 = 0.3;

const OUTLINE_WIDTH: f64 = 1.0;

/// Stable sort, farthest first. Equal depths keep their generation order.
pub fn sort_back_to_front(primitives: &mut [Primitive]) {
    primitives.sort_by(|a, b| b.depth().total_cmp(&a.depth()));
}

/// Draws primitives onto any [`Surface`].
pub struct Renderer<'a, S: Surface> {
    surface: &'a mut S,
}

impl<'a, S: Surface> Renderer<'a, S> {
    pub fn new(surface: &'a mut S) -> Self {
        Renderer { surface }
    }

    /// Sort `primitives` in place and draw them all.
    pub fn paint(&mut self, primitives: &mut [Primitive]) {
        sort_back_to_front(primitives);
        for primitive in primitives.iter() {
            self.draw(primitive);
        }
    }

    pub fn draw(&mut self, primitive: &Primitive) {
        match *primitive {
            Primitive::BasePanel { ref points, color, .. } => {
                self.surface.fill_polygon(points, color);
                self.surface.stroke_polygon(points, color::BLACK, OUTLINE_WIDTH);
            }
            Primitive::Pillar {
                from,
                to,
                width,
                color,
                ..
            } => {
                self.surface.line(from, to, color, width);
                let shine = (width * PILLAR_SHINE_WIDTH).max(1.0);
                self.surface.line(from, to, color::PILLAR_SHINE, shine);
            }
            Primitive::Piece {
                center,
                radius,
                color,
                ..
            } => self.piece(center, radius, color),
            Primitive::Ghost {
                center,
                radius,
                color,
                ..
            } => self.surface.translucent_circle(center, radius, color),
        }
    }

    fn piece(&mut self, center: Point, radius: f64, color: Rgba) {
        let offset = |k: f64| Point::new(center.x - radius * k, center.y - radius * k);

        self.surface.fill_circle(center, radius, color);
        self.surface.fill_circle(
            offset(HIGHLIGHT_OFFSET),
            radius * HIGHLIGHT_RADIUS,
            color.lighten(HIGHLIGHT_LIGHTEN),
        );
        self.surface.fill_circle(
            offset(SPECULAR_OFFSET),
            radius * SPECULAR_RADIUS,
            color::WHITE,
        );
        self.surface
            .stroke_circle(center, radius, color::BLACK, OUTLINE_WIDTH);
    }
}
