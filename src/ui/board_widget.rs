use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::Color,
    widgets::Widget,
};

use crate::render::{PixelBuffer, Rgba};

/// Upper half block: foreground paints the top pixel, background the bottom.
const HALF_BLOCK: &str = "\u{2580}";

/// Pixel dimensions a board area can show.
pub fn pixel_size(area: Rect) -> (usize, usize) {
    (usize::from(area.width), usize::from(area.height) * 2)
}

fn to_color(pixel: Rgba) -> Color {
    Color::Rgb(pixel.r(), pixel.g(), pixel.b())
}

/// Presents a framebuffer with two vertical pixels per terminal cell.
pub struct BoardCanvas<'a> {
    pixels: &'a PixelBuffer,
}

impl<'a> BoardCanvas<'a> {
    pub fn new(pixels: &'a PixelBuffer) -> Self {
        BoardCanvas { pixels }
    }
}

impl Widget for BoardCanvas<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for dy in 0..area.height {
            for dx in 0..area.width {
                let (x, y) = (usize::from(dx), usize::from(dy) * 2);
                let (Some(top), Some(bottom)) = (self.pixels.get(x, y), self.pixels.get(x, y + 1))
                else {
                    continue;
                };
                if let Some(cell) = buf.cell_mut(Position::new(area.x + dx, area.y + dy)) {
                    cell.set_symbol(HALF_BLOCK)
                        .set_fg(to_color(top))
                        .set_bg(to_color(bottom));
                }
            }
        }
    }
}
