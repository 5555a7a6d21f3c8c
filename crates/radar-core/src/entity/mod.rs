//! Entity values reconstructed from one scan.
//!
//! Entities are value types regenerated every frame. The observed process
//! reallocates entity storage during play, so nothing here carries identity
//! or addresses across frames.

use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

/// Coarse sanity bound on world coordinates. Stale or garbage pointers
/// decode to wild floating-point bit patterns; any component at or past
/// this magnitude marks the whole record as a misread, not a far-away
/// entity.
pub const POSITION_BOUND: f32 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// All three components strictly inside the sanity bound.
    pub fn is_valid(&self) -> bool {
        self.x.abs() < POSITION_BOUND && self.y.abs() < POSITION_BOUND && self.z.abs() < POSITION_BOUND
    }
}

/// Orientation as the `(cos θ, sin θ)` pair the engine stores directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub cos: f32,
    pub sin: f32,
}

impl Rotation {
    pub const IDENTITY: Self = Self { cos: 1.0, sin: 0.0 };

    /// World-space forward vector. The sine negation matches the engine's
    /// own rotation convention; keep it exactly as is.
    pub fn forward(&self) -> (f32, f32) {
        (self.cos, -self.sin)
    }

    pub fn heading_degrees(&self) -> f32 {
        self.sin.atan2(self.cos).to_degrees()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, IntoStaticStr,
)]
pub enum EntityKind {
    Player,
    Enemy,
    Npc,
    Object,
}

/// One candidate record decoded from a live pointer slot, before
/// validation and classification. Fields that failed to read are left at
/// their zero/empty defaults; rotation and alertness are only present when
/// fully decoded.
#[derive(Debug, Clone, Default)]
pub struct RawEntityRecord {
    pub source_address: u64,
    pub position: Position,
    pub rotation: Option<Rotation>,
    pub health: f32,
    pub class_name: String,
    pub instance_name: String,
    pub alertness: Option<i16>,
}

impl RawEntityRecord {
    /// Classify from partial evidence. First matching rule wins; the order
    /// is load-bearing: a live entity whose class name happens to contain
    /// "npc" still counts as an enemy because the health rule runs first.
    pub fn classify(&self) -> EntityKind {
        let class = self.class_name.to_lowercase();
        let instance = self.instance_name.to_lowercase();

        if class.contains("player") || instance.contains("player") {
            EntityKind::Player
        } else if self.health > 0.0 {
            EntityKind::Enemy
        } else if class.contains("npc") || instance.contains("friendly") {
            EntityKind::Npc
        } else {
            EntityKind::Object
        }
    }
}

/// A validated, classified game-world object from a single scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub position: Position,
    pub rotation: Option<Rotation>,
    /// World-space forward vector, present when rotation decoded.
    pub forward: Option<(f32, f32)>,
    pub health: f32,
    pub class_name: String,
    pub instance_name: String,
    pub alertness: Option<i16>,
    #[serde(skip)]
    pub source_address: u64,
}

impl Entity {
    pub fn from_record(record: RawEntityRecord) -> Self {
        let kind = record.classify();
        Self {
            kind,
            position: record.position,
            rotation: record.rotation,
            forward: record.rotation.map(|r| r.forward()),
            health: record.health,
            class_name: record.class_name,
            instance_name: record.instance_name,
            alertness: record.alertness,
            source_address: record.source_address,
        }
    }

    /// Alertness convention of the observed engine: `-1` calm, `0` alerted.
    pub fn is_alerted(&self) -> bool {
        self.alertness == Some(0)
    }
}

/// The ordered entities of one scan plus the identified player, if any.
///
/// Owned by the caller of one scan and discarded once the transform has
/// consumed it.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    entities: Vec<Entity>,
    player: Option<usize>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entity in slot order. The first Player encountered becomes
    /// the frame's player; further Player records are kept as entities but
    /// do not displace it (degenerate case, not expected in practice).
    pub fn push(&mut self, entity: Entity) {
        if entity.kind == EntityKind::Player && self.player.is_none() {
            self.player = Some(self.entities.len());
        }
        self.entities.push(entity);
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn player(&self) -> Option<&Entity> {
        self.player.map(|i| &self.entities[i])
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
