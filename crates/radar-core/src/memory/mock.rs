//! In-memory fake of [`ReadMemory`] for tests.
//!
//! Seeded regions stand in for mapped pages; everything outside them
//! faults, which is exactly how empty slots and torn records show up
//! against a live process.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::config::{BuildProfile, FieldSpec, FieldTable};
use crate::error::{Error, Result};
use crate::memory::ReadMemory;

pub struct MockMemoryBuilder {
    base_address: u64,
    regions: BTreeMap<u64, Vec<u8>>,
    faulty: HashSet<u64>,
}

impl MockMemoryBuilder {
    pub fn new(base_address: u64) -> Self {
        Self {
            base_address,
            regions: BTreeMap::new(),
            faulty: HashSet::new(),
        }
    }

    /// Seed raw bytes at an absolute address.
    pub fn region(mut self, address: u64, bytes: Vec<u8>) -> Self {
        self.regions.insert(address, bytes);
        self
    }

    pub fn u64_at(self, address: u64, value: u64) -> Self {
        self.region(address, value.to_le_bytes().to_vec())
    }

    pub fn f32_at(self, address: u64, value: f32) -> Self {
        self.region(address, value.to_le_bytes().to_vec())
    }

    pub fn i16_at(self, address: u64, value: i16) -> Self {
        self.region(address, value.to_le_bytes().to_vec())
    }

    /// Seed a NUL-terminated string padded with zeros to `padded_len`.
    pub fn str_at(self, address: u64, text: &str, padded_len: usize) -> Self {
        let mut bytes = text.as_bytes().to_vec();
        bytes.resize(padded_len.max(bytes.len() + 1), 0);
        self.region(address, bytes)
    }

    /// Force every read starting at `address` to fault, seeded or not.
    pub fn fail_at(mut self, address: u64) -> Self {
        self.faulty.insert(address);
        self
    }

    /// Seed a pointer-table slot with an entity address.
    pub fn slot(self, profile: &BuildProfile, slot: usize, entity_address: u64) -> Self {
        let table = self.base_address + profile.entity_list_offset;
        let pointer_address = table + slot as u64 * profile.pointer_stride;
        self.u64_at(pointer_address, entity_address)
    }

    /// Seed a whole entity record per the profile's field table.
    pub fn entity(mut self, fields: &FieldTable, base: u64, staged: &StagedEntity) -> Self {
        self = self
            .field_f32(base, &fields.x, staged.x)
            .field_f32(base, &fields.y, staged.y)
            .field_f32(base, &fields.z, staged.z)
            .field_f32(base, &fields.health, staged.health)
            .field_str(base, &fields.class_name, &staged.class_name)
            .field_str(base, &fields.instance_name, &staged.instance_name);
        if let Some((cos, sin)) = staged.rotation {
            self = self
                .field_f32(base, &fields.rot_cos, cos)
                .field_f32(base, &fields.rot_sin, sin);
        }
        if let (Some(spec), Some(value)) = (&fields.alertness, staged.alertness) {
            self = self.field_i16(base, spec, value);
        }
        self
    }

    pub fn field_f32(self, base: u64, spec: &FieldSpec, value: f32) -> Self {
        let (this, address) = self.resolve(base, spec);
        this.f32_at(address, value)
    }

    pub fn field_i16(self, base: u64, spec: &FieldSpec, value: i16) -> Self {
        let (this, address) = self.resolve(base, spec);
        this.i16_at(address, value)
    }

    pub fn field_str(self, base: u64, spec: &FieldSpec, text: &str) -> Self {
        let (this, address) = self.resolve(base, spec);
        this.str_at(address, text, 50)
    }

    /// Compute the value address for a spec, planting the intermediate
    /// pointer for indirect fields at a synthetic target block.
    fn resolve(self, base: u64, spec: &FieldSpec) -> (Self, u64) {
        match spec {
            FieldSpec::Direct { offset, .. } => (self, base + offset),
            FieldSpec::Indirect {
                pointer_offset,
                value_offset,
                ..
            } => {
                // Deterministic per-field target well above the floor.
                let target = base + 0x0100_0000 + pointer_offset * 0x100;
                let this = self.u64_at(base + pointer_offset, target);
                (this, target + value_offset)
            }
        }
    }

    pub fn build(self) -> MockMemoryReader {
        MockMemoryReader {
            base_address: self.base_address,
            regions: self.regions,
            faulty: self.faulty,
            alive: AtomicBool::new(true),
            reads: AtomicUsize::new(0),
        }
    }
}

/// Field values for one staged entity record.
#[derive(Debug, Clone, Default)]
pub struct StagedEntity {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub rotation: Option<(f32, f32)>,
    pub health: f32,
    pub class_name: String,
    pub instance_name: String,
    pub alertness: Option<i16>,
}

pub struct MockMemoryReader {
    base_address: u64,
    regions: BTreeMap<u64, Vec<u8>>,
    faulty: HashSet<u64>,
    alive: AtomicBool,
    reads: AtomicUsize,
}

impl MockMemoryReader {
    /// Simulate the observed process exiting mid-run.
    pub fn detach(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Number of backing reads actually issued (floor-rejected reads
    /// never reach here).
    pub fn reads_issued(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl ReadMemory for MockMemoryReader {
    fn base_address(&self) -> u64 {
        self.base_address
    }

    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        if !self.is_alive() {
            return Err(Error::MemoryReadFailed {
                address,
                message: "process has exited".to_string(),
            });
        }
        if self.faulty.contains(&address) {
            return Err(Error::MemoryReadFailed {
                address,
                message: "injected fault".to_string(),
            });
        }

        let (start, bytes) =
            self.regions
                .range(..=address)
                .next_back()
                .ok_or(Error::MemoryReadFailed {
                    address,
                    message: "address not mapped".to_string(),
                })?;
        let offset = (address - start) as usize;
        if offset + size > bytes.len() {
            return Err(Error::MemoryReadFailed {
                address,
                message: "read past end of mapped region".to_string(),
            });
        }
        Ok(bytes[offset..offset + size].to_vec())
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmapped_address_faults() {
        let reader = MockMemoryBuilder::new(0x1000).build();
        assert!(reader.read_bytes(0x20000, 4).is_err());
    }

    #[test]
    fn reads_within_region_offset() {
        let reader = MockMemoryBuilder::new(0x1000)
            .region(0x20000, vec![1, 2, 3, 4, 5, 6])
            .build();
        assert_eq!(reader.read_bytes(0x20002, 2).unwrap(), vec![3, 4]);
    }

    #[test]
    fn injected_fault_wins_over_seeded_region() {
        let reader = MockMemoryBuilder::new(0x1000)
            .u64_at(0x20000, 42)
            .fail_at(0x20000)
            .build();
        assert!(reader.read_bytes(0x20000, 8).is_err());
    }

    #[test]
    fn detached_reader_fails_every_read() {
        let reader = MockMemoryBuilder::new(0x1000).u64_at(0x20000, 42).build();
        assert!(reader.read_bytes(0x20000, 8).is_ok());
        reader.detach();
        assert!(!reader.is_alive());
        assert!(reader.read_bytes(0x20000, 8).is_err());
    }
}
