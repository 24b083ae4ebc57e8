//! RGBA colours and the fixed palette of the scene.

use crate::game::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba([r, g, b, 255])
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba([r, g, b, a])
    }

    pub fn r(self) -> u8 {
        self.0[0]
    }

    pub fn g(self) -> u8 {
        self.0[1]
    }

    pub fn b(self) -> u8 {
        self.0[2]
    }

    pub fn alpha(self) -> u8 {
        self.0[3]
    }

    pub fn with_alpha(self, alpha: u8) -> Self {
        Rgba([self.0[0], self.0[1], self.0[2], alpha])
    }

    /// Add `amount` to each colour channel, saturating at 255.
    pub fn lighten(self, amount: u8) -> Self {
        Rgba([
            self.0[0].saturating_add(amount),
            self.0[1].saturating_add(amount),
            self.0[2].saturating_add(amount),
            self.0[3],
        ])
    }
}

pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
pub const BACKGROUND: Rgba = Rgba::rgb(30, 30, 30);
pub const RED: Rgba = Rgba::rgb(220, 20, 20);
pub const YELLOW: Rgba = Rgba::rgb(220, 220, 20);
pub const PLATE_TOP: Rgba = Rgba::rgb(139, 69, 19);
pub const PLATE_SIDE: Rgba = Rgba::rgb(80, 40, 10);
pub const PILLAR: Rgba = Rgba::rgb(120, 120, 120);
pub const PILLAR_SHINE: Rgba = Rgba::rgb(180, 180, 180);

/// Alpha of the hover preview.
pub const GHOST_ALPHA: u8 = 150;

/// Solid piece colour.
pub fn piece_color(player: Player) -> Rgba {
    match player {
        Player::A => RED,
        Player::B => YELLOW,
    }
}

/// Translucent hover preview colour.
pub fn ghost_color(player: Player) -> Rgba {
    match player {
        Player::A => Rgba::rgba(255, 100, 100, GHOST_ALPHA),
        Player::B => Rgba::rgba(255, 255, 100, GHOST_ALPHA),
    }
}
