//! # Runtime Metadata
//!
//! Parsed form of a network's metadata blob: a portable type registry plus
//! the pallet table that maps call indices to call enums.
//!
//! ## Blob Layout
//!
//! ```text
//! "meta" · version (1) · spec_name · spec_version u32le
//!        · compact(n) types · compact(m) pallets
//! ```
//!
//! Type definitions are tagged:
//!
//! | Tag | Definition |
//! |-----|------------|
//! | 0 | primitive |
//! | 1 | composite (fields) |
//! | 2 | variant (name, index, fields) |
//! | 3 | sequence of type |
//! | 4 | fixed array |
//! | 5 | tuple |
//! | 6 | compact-encoded integer |
//! | 7 | runtime call (length-delimited nested call) |

use crate::codec::{encode_compact, encode_str, ByteReader};
use crate::errors::CodecError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Magic prefix of every metadata blob.
pub const METADATA_MAGIC: &[u8; 4] = b"meta";

/// Supported blob format version.
pub const METADATA_FORMAT_VERSION: u8 = 1;

/// Type id in the registry.
pub type TypeId = u32;

/// Scalar primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Primitive {
    Bool,
    Str,
    U8,
    U16,
    U32,
    U64,
    U128,
    I8,
    I16,
    I32,
    I64,
    I128,
}

impl Primitive {
    const TABLE: [Primitive; 12] = [
        Primitive::Bool,
        Primitive::Str,
        Primitive::U8,
        Primitive::U16,
        Primitive::U32,
        Primitive::U64,
        Primitive::U128,
        Primitive::I8,
        Primitive::I16,
        Primitive::I32,
        Primitive::I64,
        Primitive::I128,
    ];

    fn tag(self) -> u8 {
        Self::TABLE.iter().position(|p| *p == self).unwrap_or(0) as u8
    }

    fn from_tag(tag: u8) -> Result<Self, CodecError> {
        Self::TABLE
            .get(usize::from(tag))
            .copied()
            .ok_or(CodecError::UnknownTag {
                what: "primitive",
                tag,
            })
    }

    /// Byte width for fixed-size integers; `None` for `Str`.
    pub fn width(self) -> Option<usize> {
        match self {
            Primitive::Bool | Primitive::U8 | Primitive::I8 => Some(1),
            Primitive::U16 | Primitive::I16 => Some(2),
            Primitive::U32 | Primitive::I32 => Some(4),
            Primitive::U64 | Primitive::I64 => Some(8),
            Primitive::U128 | Primitive::I128 => Some(16),
            Primitive::Str => None,
        }
    }

    /// Whether the primitive is a signed integer.
    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Primitive::I8 | Primitive::I16 | Primitive::I32 | Primitive::I64 | Primitive::I128
        )
    }
}

/// A named or positional field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field name; `None` for tuple-like composites.
    pub name: Option<String>,
    /// Field type.
    pub ty: TypeId,
    /// Declared type name as written in the runtime source, e.g. `BalanceOf<T>`.
    pub type_name: Option<String>,
}

impl Field {
    /// Named field.
    pub fn named(name: &str, ty: TypeId, type_name: Option<&str>) -> Self {
        Self {
            name: Some(name.to_string()),
            ty,
            type_name: type_name.map(str::to_string),
        }
    }

    /// Positional field.
    pub fn unnamed(ty: TypeId) -> Self {
        Self {
            name: None,
            ty,
            type_name: None,
        }
    }

    /// Whether the declared type name marks a balance amount.
    pub fn is_balance(&self) -> bool {
        self.type_name
            .as_deref()
            .is_some_and(|name| name.contains("Balance"))
    }
}

/// One variant of an enum type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDef {
    /// Variant name.
    pub name: String,
    /// Encoded discriminant.
    pub index: u8,
    /// Variant payload.
    pub fields: Vec<Field>,
}

/// Shape of a registry type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeDef {
    Primitive(Primitive),
    Composite(Vec<Field>),
    Variant(Vec<VariantDef>),
    Sequence(TypeId),
    Array { len: u32, ty: TypeId },
    Tuple(Vec<TypeId>),
    Compact(TypeId),
    /// A nested runtime call, encoded as `compact(len) · pallet · call · args`.
    Call,
}

/// A registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortableType {
    /// Fully qualified path, e.g. `["sp_core", "crypto", "AccountId32"]`.
    pub path: Vec<String>,
    /// Definition.
    pub def: TypeDef,
}

impl PortableType {
    /// Type without a path.
    pub fn anonymous(def: TypeDef) -> Self {
        Self {
            path: Vec::new(),
            def,
        }
    }

    /// Type with a `::`-separated path.
    pub fn with_path(path: &str, def: TypeDef) -> Self {
        Self {
            path: path.split("::").map(str::to_string).collect(),
            def,
        }
    }

    /// Whether values of this type render as an account identifier.
    pub fn is_account_id(&self) -> bool {
        self.path
            .last()
            .is_some_and(|last| last.starts_with("AccountId"))
    }
}

/// Pallet table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PalletMeta {
    /// Pallet name.
    pub name: String,
    /// Encoded pallet index (first byte of a call).
    pub index: u8,
    /// Variant type listing the pallet's calls, if it has any.
    pub calls: Option<TypeId>,
}

/// Parsed metadata blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeMetadata {
    /// Runtime name.
    pub spec_name: String,
    /// Runtime version.
    pub spec_version: u32,
    /// Type registry; a type's id is its position.
    pub types: Vec<PortableType>,
    /// Pallet table.
    pub pallets: Vec<PalletMeta>,
}

impl RuntimeMetadata {
    /// Look up a type by id.
    pub fn resolve(&self, id: TypeId) -> Option<&PortableType> {
        self.types.get(id as usize)
    }

    /// Look up a pallet by its encoded index.
    pub fn pallet(&self, index: u8) -> Option<&PalletMeta> {
        self.pallets.iter().find(|p| p.index == index)
    }

    /// Serialize to a blob.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(METADATA_MAGIC);
        out.push(METADATA_FORMAT_VERSION);
        encode_str(&self.spec_name, &mut out);
        out.extend_from_slice(&self.spec_version.to_le_bytes());

        encode_compact(self.types.len() as u128, &mut out);
        for ty in &self.types {
            encode_compact(ty.path.len() as u128, &mut out);
            for segment in &ty.path {
                encode_str(segment, &mut out);
            }
            encode_type_def(&ty.def, &mut out);
        }

        encode_compact(self.pallets.len() as u128, &mut out);
        for pallet in &self.pallets {
            encode_str(&pallet.name, &mut out);
            out.push(pallet.index);
            match pallet.calls {
                Some(id) => {
                    out.push(1);
                    encode_compact(u128::from(id), &mut out);
                }
                None => out.push(0),
            }
        }
        out
    }

    /// Parse and validate a blob.
    ///
    /// Every type reference must point inside the registry, pallet indices
    /// must be unique, and pallet call types must be variants.
    pub fn decode(blob: &[u8]) -> Result<Self, CodecError> {
        let mut reader = ByteReader::new(blob);
        if reader.read_bytes(METADATA_MAGIC.len())? != METADATA_MAGIC {
            return Err(CodecError::Invalid("missing metadata magic".into()));
        }
        let version = reader.read_u8()?;
        if version != METADATA_FORMAT_VERSION {
            return Err(CodecError::UnknownTag {
                what: "metadata version",
                tag: version,
            });
        }
        let spec_name = reader.read_string()?;
        let spec_version = reader.read_u32()?;

        let type_count = reader.read_compact_len()?;
        let mut types = Vec::with_capacity(type_count.min(reader.remaining()));
        for _ in 0..type_count {
            let path_len = reader.read_compact_len()?;
            let mut path = Vec::with_capacity(path_len.min(reader.remaining()));
            for _ in 0..path_len {
                path.push(reader.read_string()?);
            }
            let def = decode_type_def(&mut reader)?;
            types.push(PortableType { path, def });
        }

        let pallet_count = reader.read_compact_len()?;
        let mut pallets = Vec::with_capacity(pallet_count.min(reader.remaining()));
        for _ in 0..pallet_count {
            let name = reader.read_string()?;
            let index = reader.read_u8()?;
            let calls = if reader.read_option_tag()? {
                Some(reader.read_compact_u32()?)
            } else {
                None
            };
            pallets.push(PalletMeta { name, index, calls });
        }
        reader.finish()?;

        let metadata = Self {
            spec_name,
            spec_version,
            types,
            pallets,
        };
        metadata.validate()?;
        Ok(metadata)
    }

    fn validate(&self) -> Result<(), CodecError> {
        let count = self.types.len() as u32;
        let check = |id: TypeId| -> Result<(), CodecError> {
            if id < count {
                Ok(())
            } else {
                Err(CodecError::Invalid(format!("type id {id} out of range")))
            }
        };

        for ty in &self.types {
            match &ty.def {
                TypeDef::Primitive(_) | TypeDef::Call => {}
                TypeDef::Composite(fields) => fields.iter().try_for_each(|f| check(f.ty))?,
                TypeDef::Variant(variants) => {
                    let mut seen = BTreeSet::new();
                    for variant in variants {
                        if !seen.insert(variant.index) {
                            return Err(CodecError::Invalid(format!(
                                "duplicate variant index {}",
                                variant.index
                            )));
                        }
                        variant.fields.iter().try_for_each(|f| check(f.ty))?;
                    }
                }
                TypeDef::Sequence(id) | TypeDef::Compact(id) => check(*id)?,
                TypeDef::Array { ty, .. } => check(*ty)?,
                TypeDef::Tuple(ids) => ids.iter().try_for_each(|id| check(*id))?,
            }
        }

        let mut seen = BTreeSet::new();
        for pallet in &self.pallets {
            if !seen.insert(pallet.index) {
                return Err(CodecError::Invalid(format!(
                    "duplicate pallet index {}",
                    pallet.index
                )));
            }
            if let Some(id) = pallet.calls {
                check(id)?;
                if !matches!(self.types[id as usize].def, TypeDef::Variant(_)) {
                    return Err(CodecError::Invalid(format!(
                        "calls of pallet {} are not a variant type",
                        pallet.name
                    )));
                }
            }
        }
        Ok(())
    }
}

fn encode_fields(fields: &[Field], out: &mut Vec<u8>) {
    encode_compact(fields.len() as u128, out);
    for field in fields {
        encode_opt_str(field.name.as_deref(), out);
        encode_compact(u128::from(field.ty), out);
        encode_opt_str(field.type_name.as_deref(), out);
    }
}

fn encode_opt_str(value: Option<&str>, out: &mut Vec<u8>) {
    match value {
        Some(s) => {
            out.push(1);
            encode_str(s, out);
        }
        None => out.push(0),
    }
}

fn encode_type_def(def: &TypeDef, out: &mut Vec<u8>) {
    match def {
        TypeDef::Primitive(p) => {
            out.push(0);
            out.push(p.tag());
        }
        TypeDef::Composite(fields) => {
            out.push(1);
            encode_fields(fields, out);
        }
        TypeDef::Variant(variants) => {
            out.push(2);
            encode_compact(variants.len() as u128, out);
            for variant in variants {
                encode_str(&variant.name, out);
                out.push(variant.index);
                encode_fields(&variant.fields, out);
            }
        }
        TypeDef::Sequence(id) => {
            out.push(3);
            encode_compact(u128::from(*id), out);
        }
        TypeDef::Array { len, ty } => {
            out.push(4);
            out.extend_from_slice(&len.to_le_bytes());
            encode_compact(u128::from(*ty), out);
        }
        TypeDef::Tuple(ids) => {
            out.push(5);
            encode_compact(ids.len() as u128, out);
            for id in ids {
                encode_compact(u128::from(*id), out);
            }
        }
        TypeDef::Compact(id) => {
            out.push(6);
            encode_compact(u128::from(*id), out);
        }
        TypeDef::Call => out.push(7),
    }
}

fn decode_opt_str(reader: &mut ByteReader<'_>) -> Result<Option<String>, CodecError> {
    if reader.read_option_tag()? {
        Ok(Some(reader.read_string()?))
    } else {
        Ok(None)
    }
}

fn decode_fields(reader: &mut ByteReader<'_>) -> Result<Vec<Field>, CodecError> {
    let count = reader.read_compact_len()?;
    let mut fields = Vec::with_capacity(count.min(reader.remaining()));
    for _ in 0..count {
        fields.push(Field {
            name: decode_opt_str(reader)?,
            ty: reader.read_compact_u32()?,
            type_name: decode_opt_str(reader)?,
        });
    }
    Ok(fields)
}

fn decode_type_def(reader: &mut ByteReader<'_>) -> Result<TypeDef, CodecError> {
    let tag = reader.read_u8()?;
    let def = match tag {
        0 => TypeDef::Primitive(Primitive::from_tag(reader.read_u8()?)?),
        1 => TypeDef::Composite(decode_fields(reader)?),
        2 => {
            let count = reader.read_compact_len()?;
            let mut variants = Vec::with_capacity(count.min(reader.remaining()));
            for _ in 0..count {
                variants.push(VariantDef {
                    name: reader.read_string()?,
                    index: reader.read_u8()?,
                    fields: decode_fields(reader)?,
                });
            }
            TypeDef::Variant(variants)
        }
        3 => TypeDef::Sequence(reader.read_compact_u32()?),
        4 => TypeDef::Array {
            len: reader.read_u32()?,
            ty: reader.read_compact_u32()?,
        },
        5 => {
            let count = reader.read_compact_len()?;
            let mut ids = Vec::with_capacity(count.min(reader.remaining()));
            for _ in 0..count {
                ids.push(reader.read_compact_u32()?);
            }
            TypeDef::Tuple(ids)
        }
        6 => TypeDef::Compact(reader.read_compact_u32()?),
        7 => TypeDef::Call,
        tag => {
            return Err(CodecError::UnknownTag {
                what: "type definition",
                tag,
            })
        }
    };
    Ok(def)
}
