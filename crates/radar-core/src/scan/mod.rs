//! Entity acquisition engine.
//!
//! Every invocation re-walks the pointer table from scratch and rebuilds
//! the frame from raw memory. Nothing is cached between scans: the game
//! reallocates entity storage mid-play, and a cached address would go
//! stale silently. Slot- and field-level read faults are absorbed locally;
//! only process detach propagates.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace};

use crate::config::{BuildProfile, FieldSpec, FieldType};
use crate::entity::{Entity, Frame, Position, RawEntityRecord, Rotation};
use crate::error::{Error, Result};
use crate::memory::{ADDRESS_FLOOR, ReadMemory};

/// Longest string field read from a record. Names past this are truncated.
pub const MAX_NAME_LEN: usize = 50;

/// One decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float(f32),
    Int(i64),
    Short(i16),
    Text(String),
}

impl FieldValue {
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<i16> {
        match self {
            Self::Short(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// Walks the entity pointer table of one attached process.
pub struct EntityScanner<'a, R: ReadMemory> {
    reader: &'a R,
    profile: &'a BuildProfile,
}

impl<'a, R: ReadMemory> EntityScanner<'a, R> {
    pub fn new(reader: &'a R, profile: &'a BuildProfile) -> Self {
        Self { reader, profile }
    }

    /// Produce one frame, visiting every slot.
    pub fn scan(&self) -> Result<Frame> {
        self.scan_interruptible(&AtomicBool::new(false))
    }

    /// Produce one frame, checking `stop` between slots so a caller can
    /// cap worst-case scan latency. A tripped flag returns the partial
    /// frame accumulated so far.
    pub fn scan_interruptible(&self, stop: &AtomicBool) -> Result<Frame> {
        if !self.reader.is_alive() {
            return Err(Error::ProcessDetached);
        }

        let table = self.reader.base_address() + self.profile.entity_list_offset;
        let mut frame = Frame::new();

        for slot in 0..self.profile.max_slots {
            if stop.load(Ordering::Relaxed) {
                debug!("Scan interrupted at slot {}", slot);
                break;
            }

            let pointer_address = table + slot as u64 * self.profile.pointer_stride;
            let entity_address = match self.reader.read_pointer(pointer_address) {
                Ok(address) => address,
                // Empty or unreadable slots are expected and normal.
                Err(_) => continue,
            };
            if entity_address <= ADDRESS_FLOOR {
                continue;
            }

            if let Some(entity) = self.read_entity(entity_address) {
                frame.push(entity);
            }
        }

        debug!(
            "Scan complete: {} entities, player {}",
            frame.len(),
            if frame.player().is_some() {
                "found"
            } else {
                "not found"
            }
        );
        Ok(frame)
    }

    /// Decode, validate and classify one candidate record.
    fn read_entity(&self, address: u64) -> Option<Entity> {
        let record = self.decode_record(address);
        if !record.position.is_valid() {
            trace!(
                "Rejected record at {:#x}: position out of bounds ({}, {}, {})",
                address, record.position.x, record.position.y, record.position.z
            );
            return None;
        }
        Some(Entity::from_record(record))
    }

    /// Apply the whole field table to one base address. A failed field is
    /// zeroed/empty rather than discarding the record; the double-indirect
    /// string fields fault far more often than the scalar floats.
    fn decode_record(&self, address: u64) -> RawEntityRecord {
        let fields = &self.profile.fields;

        let cos = self.scalar(address, &fields.rot_cos);
        let sin = self.scalar(address, &fields.rot_sin);

        RawEntityRecord {
            source_address: address,
            position: Position::new(
                self.scalar(address, &fields.x).unwrap_or(0.0),
                self.scalar(address, &fields.y).unwrap_or(0.0),
                self.scalar(address, &fields.z).unwrap_or(0.0),
            ),
            rotation: match (cos, sin) {
                (Some(cos), Some(sin)) => Some(Rotation { cos, sin }),
                _ => None,
            },
            health: self.scalar(address, &fields.health).unwrap_or(0.0),
            class_name: self.text(address, &fields.class_name),
            instance_name: self.text(address, &fields.instance_name),
            alertness: fields
                .alertness
                .as_ref()
                .and_then(|spec| self.decode_field(address, spec))
                .and_then(|v| v.as_i16()),
        }
    }

    /// Interpret one field spec against a record base address.
    pub fn decode_field(&self, base: u64, spec: &FieldSpec) -> Option<FieldValue> {
        let value_address = match spec {
            FieldSpec::Direct { offset, .. } => base + offset,
            FieldSpec::Indirect {
                pointer_offset,
                value_offset,
                ..
            } => {
                let pointer = self.reader.read_pointer(base + pointer_offset).ok()?;
                if pointer <= ADDRESS_FLOOR {
                    return None;
                }
                pointer + value_offset
            }
        };

        match spec.ty() {
            FieldType::Float32 => self.reader.read_f32(value_address).ok().map(FieldValue::Float),
            FieldType::Int64 => self.reader.read_i64(value_address).ok().map(FieldValue::Int),
            FieldType::Int16 => self.reader.read_i16(value_address).ok().map(FieldValue::Short),
            FieldType::Text => self
                .reader
                .read_string(value_address, MAX_NAME_LEN)
                .ok()
                .map(FieldValue::Text),
        }
    }

    fn scalar(&self, base: u64, spec: &FieldSpec) -> Option<f32> {
        self.decode_field(base, spec).and_then(|v| v.as_f32())
    }

    fn text(&self, base: u64, spec: &FieldSpec) -> String {
        self.decode_field(base, spec)
            .and_then(FieldValue::into_text)
            .unwrap_or_default()
    }
}
