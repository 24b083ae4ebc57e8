//! Drawing surface used by the painter, and an RGBA framebuffer backed by a
//! `tiny_skia::Pixmap` implementing it.
//!
//! Shapes are filled without anti-aliasing: a pixel (x, y) is covered when
//! (x + 0.5, y + 0.5) lies inside the shape.

use tiny_skia::{
    Color as SkiaColor, FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap,
    PixmapPaint, Stroke, Transform,
};

use super::color::Rgba;
use super::primitive::Point;

/// Primitive drawing operations the painter needs.
pub trait Surface {
    fn fill_polygon(&mut self, points: &[Point], color: Rgba);

    fn stroke_polygon(&mut self, points: &[Point], color: Rgba, width: f64);

    fn line(&mut self, from: Point, to: Point, color: Rgba, width: f64);

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba);

    fn stroke_circle(&mut self, center: Point, radius: f64, color: Rgba, width: f64);

    /// Fill a circle on a separate layer and blend it in at the colour's
    /// alpha, so overlapping translucent shapes never double up.
    fn translucent_circle(&mut self, center: Point, radius: f64, color: Rgba);
}

fn to_skia_color(color: Rgba) -> SkiaColor {
    SkiaColor::from_rgba8(color.r(), color.g(), color.b(), color.alpha())
}

fn solid_paint(color: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(to_skia_color(color));
    paint.anti_alias = false;
    paint
}

fn polygon_path(points: &[Point]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x as f32, first.y as f32);
    for p in rest {
        pb.line_to(p.x as f32, p.y as f32);
    }
    pb.close();
    pb.finish()
}

fn circle_path(center: Point, radius: f64) -> Option<Path> {
    PathBuilder::from_circle(center.x as f32, center.y as f32, radius as f32)
}

fn stroke(width: f64) -> Stroke {
    Stroke {
        width: width as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    }
}

/// RGBA framebuffer. A zero-sized buffer has no pixmap and ignores drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixmap: Option<Pixmap>,
}

impl PixelBuffer {
    pub fn new(width: usize, height: usize, fill: Rgba) -> Self {
        let pixmap = u32::try_from(width)
            .ok()
            .zip(u32::try_from(height).ok())
            .and_then(|(w, h)| Pixmap::new(w, h));
        let mut buf = PixelBuffer {
            width,
            height,
            pixmap,
        };
        buf.clear(fill);
        buf
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self, color: Rgba) {
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill(to_skia_color(color));
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Rgba> {
        let pixmap = self.pixmap.as_ref()?;
        let pixel = pixmap.pixel(u32::try_from(x).ok()?, u32::try_from(y).ok()?)?;
        let c = pixel.demultiply();
        Some(Rgba::rgba(c.red(), c.green(), c.blue(), c.alpha()))
    }

    fn fill_path(&mut self, path: Option<Path>, color: Rgba) {
        let (Some(pixmap), Some(path)) = (self.pixmap.as_mut(), path) else {
            return;
        };
        pixmap.fill_path(
            &path,
            &solid_paint(color),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    fn stroke_path(&mut self, path: Option<Path>, color: Rgba, width: f64) {
        let (Some(pixmap), Some(path)) = (self.pixmap.as_mut(), path) else {
            return;
        };
        pixmap.stroke_path(
            &path,
            &solid_paint(color),
            &stroke(width),
            Transform::identity(),
            None,
        );
    }
}

impl Surface for PixelBuffer {
    fn fill_polygon(&mut self, points: &[Point], color: Rgba) {
        if points.len() < 3 {
            return;
        }
        self.fill_path(polygon_path(points), color);
    }

    fn stroke_polygon(&mut self, points: &[Point], color: Rgba, width: f64) {
        self.stroke_path(polygon_path(points), color, width);
    }

    fn line(&mut self, from: Point, to: Point, color: Rgba, width: f64) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.x as f32, from.y as f32);
        pb.line_to(to.x as f32, to.y as f32);
        self.stroke_path(pb.finish(), color, width);
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba) {
        self.fill_path(circle_path(center, radius.max(0.5)), color);
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, color: Rgba, width: f64) {
        self.stroke_path(circle_path(center, radius), color, width);
    }

    fn translucent_circle(&mut self, center: Point, radius: f64, color: Rgba) {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        let (Some(mut layer), Some(path)) = (
            Pixmap::new(pixmap.width(), pixmap.height()),
            circle_path(center, radius.max(0.5)),
        ) else {
            return;
        };
        layer.fill_path(
            &path,
            &solid_paint(color.with_alpha(255)),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
        let paint = PixmapPaint {
            opacity: f32::from(color.alpha()) / 255.0,
            ..Default::default()
        };
        pixmap.draw_pixmap(0, 0, layer.as_ref(), &paint, Transform::identity(), None);
    }
}
