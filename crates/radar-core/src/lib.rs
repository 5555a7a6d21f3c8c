//! # radar-core
//!
//! Core library for the TEW entity radar.
//!
//! This crate provides:
//! - Read-only process memory access (Windows live reads, mockable trait)
//! - Per-build memory layout profiles (pointer table geometry + field maps)
//! - The per-frame entity acquisition engine (walk, decode, classify)
//! - The player-centric display-space transform
//!
//! The core is renderer-free: each tick it hands the caller one
//! [`transform::DisplayFrame`] of typed, positioned entities and consumes
//! nothing back except the requested display range. All access to the
//! observed process is read-only introspection.

pub mod config;
pub mod entity;
pub mod error;
pub mod memory;
pub mod radar;
pub mod scan;
pub mod transform;

pub use config::{
    BuildProfile, FieldSpec, FieldTable, FieldType, RadarSettings, builtin_profile, load_profile,
    save_profile,
};
pub use entity::{
    Entity, EntityKind, Frame, POSITION_BOUND, Position, RawEntityRecord, Rotation,
};
pub use error::{Error, Result};
pub use memory::{ADDRESS_FLOOR, ReadMemory};
#[cfg(target_os = "windows")]
pub use memory::{MemoryReader, ProcessHandle};
pub use radar::Radar;
pub use scan::{EntityScanner, FieldValue, MAX_NAME_LEN};
pub use transform::{DisplayFrame, DisplayMarker, Viewport, project};
