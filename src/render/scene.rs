//! Turns board and camera state into a flat list of depth-tagged primitives.

use super::camera::{CameraState, Projection, Viewport};
use super::color::{self, Rgba};
use super::primitive::{Point, Primitive};
use crate::game::{BoardState, Cell, Column, Player};

/// Half width of a base tile, in board units.
const PLATE_HALF: f64 = 0.4;
const PLATE_TOP_Y: f64 = -0.1;
const PLATE_BOTTOM_Y: f64 = -0.3;

/// Extra depth pushing pillars behind pieces at the same position.
const PILLAR_DEPTH_BIAS: f64 = 0.1;
/// Pillar width at scale 1, in reference pixels.
const PILLAR_WIDTH: f64 = 12.0;
const PILLAR_MIN_WIDTH: f64 = 3.0;

/// Piece radius at scale 1, in board units.
const PIECE_RADIUS: f64 = 0.35;
/// Pointer must be strictly closer than this to a drop point, in board units.
const HOVER_RADIUS: f64 = 0.6;

/// Everything one frame needs, fixed for the duration of the build.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    pub camera: CameraState,
    pub viewport: Viewport,
    pub board: BoardState,
    /// Pointer position in viewport pixels.
    pub pointer: Option<Point>,
    pub current_player: Player,
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// In generation order; the painter sorts them.
    pub primitives: Vec<Primitive>,
    pub hover: Option<Column>,
}

struct Builder<'a> {
    ctx: &'a FrameContext,
    primitives: Vec<Primitive>,
}

impl Builder<'_> {
    fn project(&self, x: f64, y: f64, z: f64) -> Projection {
        self.ctx.camera.project(&self.ctx.viewport, x, y, z)
    }

    fn panel(&mut self, corners: [(f64, f64, f64); 4], color: Rgba) {
        let projected = corners.map(|(x, y, z)| self.project(x, y, z));
        if !projected.iter().all(|p| p.visible) {
            return;
        }
        let depth = projected.iter().map(|p| p.depth).sum::<f64>() / 4.0;
        self.primitives.push(Primitive::BasePanel {
            points: projected.map(|p| Point::new(p.x, p.y)),
            color,
            depth,
        });
    }

    fn base_plate(&mut self) {
        let w = PLATE_HALF;
        let (top, bottom) = (PLATE_TOP_Y, PLATE_BOTTOM_Y);
        for column in Column::all() {
            let (x, z) = (column.col as f64, column.row as f64);
            self.panel(
                [
                    (x - w, top, z - w),
                    (x + w, top, z - w),
                    (x + w, top, z + w),
                    (x - w, top, z + w),
                ],
                color::PLATE_TOP,
            );

            let walls = [
                ((x - w, z - w), (x + w, z - w)),
                ((x + w, z - w), (x + w, z + w)),
                ((x + w, z + w), (x - w, z + w)),
                ((x - w, z + w), (x - w, z - w)),
            ];
            for ((x1, z1), (x2, z2)) in walls {
                self.panel(
                    [
                        (x1, top, z1),
                        (x2, top, z2),
                        (x2, bottom, z2),
                        (x1, bottom, z1),
                    ],
                    color::PLATE_SIDE,
                );
            }
        }
    }

    fn pillars(&mut self) {
        let top_level = crate::game::SIZE - 1;
        for column in Column::all() {
            let (x, z) = (column.col as f64, column.row as f64);
            for level in 0..crate::game::SIZE {
                let d = level as f64;
                let start = if level == 0 { -0.2 } else { d - 0.5 };
                let end = if level == top_level { 3.5 } else { d + 0.5 };

                let (a, b) = (self.project(x, start, z), self.project(x, end, z));
                if !(a.visible && b.visible) {
                    continue;
                }
                let scale = (a.scale + b.scale) / 2.0;
                let width = self
                    .ctx
                    .viewport
                    .px((PILLAR_WIDTH * scale).floor().max(PILLAR_MIN_WIDTH));
                self.primitives.push(Primitive::Pillar {
                    from: Point::new(a.x, a.y),
                    to: Point::new(b.x, b.y),
                    width,
                    color: color::PILLAR,
                    depth: (a.depth + b.depth) / 2.0 + PILLAR_DEPTH_BIAS,
                });
            }
        }
    }

    fn cell_projection(&self, cell: Cell) -> Projection {
        self.project(cell.col as f64, cell.depth as f64, cell.row as f64)
    }

    fn pieces(&mut self) {
        let board = self.ctx.board;
        for cell in Cell::all() {
            let Some(player) = board.occupant(cell) else {
                continue;
            };
            let p = self.cell_projection(cell);
            if !p.visible {
                continue;
            }
            self.primitives.push(Primitive::Piece {
                center: Point::new(p.x, p.y),
                radius: PIECE_RADIUS * self.ctx.viewport.unit * p.scale,
                color: color::piece_color(player),
                depth: p.depth,
            });
        }
    }

    /// Pick the drop point nearest the pointer and emit its ghost.
    fn hover(&mut self) -> Option<Column> {
        let pointer = self.ctx.pointer?;
        let board = self.ctx.board;
        let threshold = HOVER_RADIUS * self.ctx.viewport.unit;

        let mut best: Option<(f64, Column, Projection)> = None;
        for column in Column::all() {
            let Some(depth) = board.lowest_free_depth(column) else {
                continue;
            };
            let p = self.cell_projection(column.cell(depth));
            if !p.visible {
                continue;
            }
            let dist = pointer.distance(Point::new(p.x, p.y));
            let nearest = best.as_ref().map_or(threshold, |(d, _, _)| *d);
            if dist < nearest {
                best = Some((dist, column, p));
            }
        }

        let (_, column, p) = best?;
        self.primitives.push(Primitive::Ghost {
            center: Point::new(p.x, p.y),
            radius: PIECE_RADIUS * self.ctx.viewport.unit * p.scale,
            color: color::ghost_color(self.ctx.current_player),
            depth: p.depth,
        });
        Some(column)
    }
}

/// Build the primitives of one frame and resolve the hover column.
pub fn build_scene(ctx: &FrameContext) -> Scene {
    let mut builder = Builder {
        ctx,
        primitives: Vec::with_capacity(256),
    };
    builder.base_plate();
    builder.pillars();
    builder.pieces();
    let hover = builder.hover();
    Scene {
        primitives: builder.primitives,
        hover,
    }
}
