//! Player-centric display-space projection.
//!
//! Pure functions only: every value here is re-derived per frame from the
//! current player reference, with no persisted orientation state. The two
//! sign/axis conventions (the forward sine negation over in
//! [`crate::entity::Rotation`], and the display-space axis pair below) are
//! empirically reverse-engineered constants of the observed engine.
//! Preserve them exactly; there is no independent reference to re-derive
//! them from.

use serde::Serialize;

use crate::entity::{EntityKind, Frame, Position, Rotation};

/// Output viewport in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= 0.0 && x < self.width as f32 && y >= 0.0 && y < self.height as f32
    }
}

/// World-space offset of an entity from the player. Planar components are
/// rotated downstream; z is carried through untouched.
pub fn relative(entity: Position, player: Position) -> Position {
    Position::new(
        entity.x - player.x,
        entity.y - player.y,
        entity.z - player.z,
    )
}

/// Un-rotate a world-relative planar offset into the player's local frame,
/// where the player's forward axis is the +X-like reference axis.
pub fn to_player_local(rel: (f32, f32), rot: Rotation) -> (f32, f32) {
    (
        rot.cos * rel.0 - rot.sin * rel.1,
        rot.sin * rel.0 + rot.cos * rel.1,
    )
}

/// Fixed axis permutation into display space: forward renders up, lateral
/// offsets keep intuitive left/right handedness. Must be applied as this
/// exact pair or handedness breaks.
pub fn to_display_space(local: (f32, f32)) -> (f32, f32) {
    (-local.1, -local.0)
}

/// Uniform scale from display space to screen pixels. `range` is the
/// caller's zoom parameter: world units from center to the vertical edge.
pub fn to_screen(display: (f32, f32), range: f32, viewport: Viewport) -> (f32, f32) {
    let scale = viewport.height as f32 / (2.0 * range);
    let (cx, cy) = viewport.center();
    (cx + display.0 * scale, cy + display.1 * scale)
}

/// Map a world-space direction vector into a unit display-space direction.
/// Zero-length input yields `None` — no facing indicator, never a divide
/// by zero.
pub fn transform_direction(dir: (f32, f32), rot: Rotation) -> Option<(f32, f32)> {
    let mapped = to_display_space(to_player_local(dir, rot));
    let len = (mapped.0 * mapped.0 + mapped.1 * mapped.1).sqrt();
    if len == 0.0 {
        return None;
    }
    Some((mapped.0 / len, mapped.1 / len))
}

/// Full 3-D Euclidean distance, independent of the 2-D display transform.
/// Used for range culling and on-screen labels.
pub fn distance(a: Position, b: Position) -> f32 {
    let d = relative(a, b);
    (d.x * d.x + d.y * d.y + d.z * d.z).sqrt()
}

/// One positioned entity ready for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayMarker {
    pub kind: EntityKind,
    pub screen_x: f32,
    pub screen_y: f32,
    /// Unit display-space facing, absent without decoded rotation.
    pub direction: Option<(f32, f32)>,
    pub distance: f32,
    pub health: f32,
    pub heading_degrees: Option<f32>,
    pub alerted: bool,
}

/// Everything the renderer consumes for one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayFrame {
    pub markers: Vec<DisplayMarker>,
    /// All entities the scan retained, including ones culled off-screen.
    pub entity_count: usize,
    pub player_found: bool,
    pub player_heading_degrees: Option<f32>,
}

impl DisplayFrame {
    pub fn alerted_count(&self) -> usize {
        self.markers
            .iter()
            .filter(|m| m.kind == EntityKind::Enemy && m.alerted)
            .count()
    }
}

/// Project one frame into display space around its player.
///
/// Without a player (or with a player whose rotation failed to decode)
/// there is nothing to orient the view around: the marker list stays empty
/// and the status flags say why. That is a valid per-tick outcome, not an
/// error.
pub fn project(frame: &Frame, range: f32, viewport: Viewport) -> DisplayFrame {
    let Some(player) = frame.player() else {
        return DisplayFrame {
            markers: Vec::new(),
            entity_count: frame.len(),
            player_found: false,
            player_heading_degrees: None,
        };
    };
    let Some(player_rot) = player.rotation else {
        return DisplayFrame {
            markers: Vec::new(),
            entity_count: frame.len(),
            player_found: true,
            player_heading_degrees: None,
        };
    };

    let mut markers = Vec::with_capacity(frame.len());
    for entity in frame.entities() {
        let rel = relative(entity.position, player.position);
        let display = to_display_space(to_player_local((rel.x, rel.y), player_rot));
        let (screen_x, screen_y) = to_screen(display, range, viewport);
        if !viewport.contains(screen_x, screen_y) {
            continue;
        }

        markers.push(DisplayMarker {
            kind: entity.kind,
            screen_x,
            screen_y,
            direction: entity
                .forward
                .and_then(|f| transform_direction(f, player_rot)),
            distance: distance(entity.position, player.position),
            health: entity.health,
            heading_degrees: entity.rotation.map(|r| r.heading_degrees()),
            alerted: entity.is_alerted(),
        });
    }

    DisplayFrame {
        markers,
        entity_count: frame.len(),
        player_found: true,
        player_heading_degrees: Some(player_rot.heading_degrees()),
    }
}
