//! Software 3D rendering of the board: projection, scene building, depth
//! sorting and rasterisation into an RGBA framebuffer.

pub mod camera;
pub mod color;
mod painter;
mod primitive;
mod scene;
mod surface;

pub use camera::{CameraState, Projection, Viewport};
pub use color::Rgba;
pub use painter::{sort_back_to_front, Renderer};
pub use primitive::{Point, Primitive};
pub use scene::{build_scene, FrameContext, Scene};
pub use surface::{PixelBuffer, Surface};

/// Build, sort and draw one frame into `target`, returning the hover column.
pub fn render_frame(ctx: &FrameContext, target: &mut PixelBuffer) -> Option<crate::game::Column> {
    let mut scene = build_scene(ctx);
    target.clear(color::BACKGROUND);
    Renderer::new(target).paint(&mut scene.primitives);
    scene.hover
}
