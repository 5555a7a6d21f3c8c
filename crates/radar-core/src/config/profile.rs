//! Per-build memory layout profiles.
//!
//! Everything the acquisition engine needs to know about one build of the
//! observed game is data: where the pointer table lives, how wide its slots
//! are, and how each entity attribute is decoded from a record. Supporting
//! another build is a profile swap, not a code change.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Scalar type of one decoded entity attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Float32,
    Int64,
    Int16,
    Text,
}

/// How to decode one entity attribute from a record base address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldSpec {
    /// Read `ty` at `base + offset`.
    Direct { offset: u64, ty: FieldType },
    /// Read a pointer at `base + pointer_offset`, then `ty` at
    /// `pointer + value_offset`.
    Indirect {
        pointer_offset: u64,
        value_offset: u64,
        ty: FieldType,
    },
}

impl FieldSpec {
    pub fn ty(&self) -> FieldType {
        match self {
            Self::Direct { ty, .. } => *ty,
            Self::Indirect { ty, .. } => *ty,
        }
    }
}

/// The full field map of one entity record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldTable {
    pub class_name: FieldSpec,
    pub instance_name: FieldSpec,
    pub health: FieldSpec,
    pub x: FieldSpec,
    pub y: FieldSpec,
    pub z: FieldSpec,
    pub rot_cos: FieldSpec,
    pub rot_sin: FieldSpec,
    /// Not every build exposes the alertness flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alertness: Option<FieldSpec>,
}

/// Static memory geometry for one supported build of the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildProfile {
    /// Human-readable variant selector, e.g. "steam-1.04".
    pub name: String,
    /// Executable name to attach to.
    pub process_name: String,
    /// Offset of the entity pointer table from the module base.
    pub entity_list_offset: u64,
    /// Distance between consecutive pointer slots.
    pub pointer_stride: u64,
    /// Number of slots walked per scan (bounded iteration).
    pub max_slots: usize,
    pub fields: FieldTable,
}

impl BuildProfile {
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty()
            && !self.process_name.is_empty()
            && self.entity_list_offset != 0
            && self.pointer_stride != 0
            && self.max_slots != 0
    }
}

/// The one build this tool was reverse-engineered against.
pub fn builtin_profile() -> BuildProfile {
    use FieldType::*;

    BuildProfile {
        name: "steam".to_string(),
        process_name: "EvilWithin.exe".to_string(),
        entity_list_offset: 0x01E7_AF20,
        pointer_stride: 0x18,
        max_slots: 100,
        fields: FieldTable {
            class_name: FieldSpec::Indirect {
                pointer_offset: 0x18,
                value_offset: 0xA4,
                ty: Text,
            },
            instance_name: FieldSpec::Indirect {
                pointer_offset: 0x08,
                value_offset: 0x00,
                ty: Text,
            },
            health: FieldSpec::Direct {
                offset: 0x8C4,
                ty: Float32,
            },
            x: FieldSpec::Direct {
                offset: 0x6C8,
                ty: Float32,
            },
            y: FieldSpec::Direct {
                offset: 0x6CC,
                ty: Float32,
            },
            z: FieldSpec::Direct {
                offset: 0x6D0,
                ty: Float32,
            },
            rot_cos: FieldSpec::Direct {
                offset: 0x6D4,
                ty: Float32,
            },
            rot_sin: FieldSpec::Direct {
                offset: 0x6E0,
                ty: Float32,
            },
            alertness: Some(FieldSpec::Direct {
                offset: 0xF44,
                ty: Int16,
            }),
        },
    }
}

/// Load a build profile from a JSON file.
pub fn load_profile(path: &Path) -> Result<BuildProfile> {
    let json = fs::read_to_string(path)?;
    let profile: BuildProfile = serde_json::from_str(&json)?;
    if !profile.is_valid() {
        return Err(Error::InvalidProfile(format!(
            "{}: missing name or zero geometry",
            path.display()
        )));
    }
    Ok(profile)
}

/// Save a build profile as pretty-printed JSON.
pub fn save_profile(profile: &BuildProfile, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(profile)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_profile_is_valid() {
        assert!(builtin_profile().is_valid());
    }

    #[test]
    fn zero_stride_is_invalid() {
        let mut profile = builtin_profile();
        profile.pointer_stride = 0;
        assert!(!profile.is_valid());
    }

    #[test]
    fn profile_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");

        let profile = builtin_profile();
        save_profile(&profile, &path).unwrap();
        let loaded = load_profile(&path).unwrap();

        assert_eq!(loaded, profile);
    }

    #[test]
    fn load_rejects_invalid_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");

        let mut profile = builtin_profile();
        profile.max_slots = 0;
        save_profile(&profile, &path).unwrap();

        assert!(matches!(
            load_profile(&path),
            Err(Error::InvalidProfile(_))
        ));
    }

    #[test]
    fn field_spec_tagged_representation() {
        let spec = FieldSpec::Indirect {
            pointer_offset: 0x18,
            value_offset: 0xA4,
            ty: FieldType::Text,
        };
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains("\"kind\":\"indirect\""));
        let back: FieldSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }
}
