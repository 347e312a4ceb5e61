//! # Call Decoding
//!
//! Walks call bytes against the runtime type registry and builds the card
//! tree. Any failure inside a call becomes an error card at that call's
//! position. Nested calls are length-delimited, so a broken inner call never
//! desynchronizes its siblings.

use super::balance::format_balance;
use super::cards::{Card, CardContent};
use super::errors::CallError;
use shared_types::{
    ByteReader, Field, NetworkSpecs, PortableType, Primitive, RuntimeMetadata, TypeDef, TypeId,
};

/// Decoder bound to one metadata version and network.
pub struct CallDecoder<'a> {
    metadata: &'a RuntimeMetadata,
    network: &'a NetworkSpecs,
    max_depth: u32,
}

impl<'a> CallDecoder<'a> {
    /// New decoder.
    pub fn new(metadata: &'a RuntimeMetadata, network: &'a NetworkSpecs, max_depth: u32) -> Self {
        Self {
            metadata,
            network,
            max_depth,
        }
    }

    /// Decode one complete call. Never fails: errors become an error card.
    pub fn decode_call(&self, bytes: &[u8], depth: u32) -> Card {
        self.call_at(bytes, depth, 0)
    }

    fn call_at(&self, bytes: &[u8], depth: u32, level: u32) -> Card {
        self.try_call(bytes, depth, level)
            .unwrap_or_else(|e| Card::error(e.to_string(), depth))
    }

    fn try_call(&self, bytes: &[u8], depth: u32, level: u32) -> Result<Card, CallError> {
        if level > self.max_depth {
            return Err(CallError::TooDeep(self.max_depth));
        }
        let mut reader = ByteReader::new(bytes);

        let pallet_index = reader.read_u8()?;
        let pallet = self
            .metadata
            .pallet(pallet_index)
            .ok_or(CallError::UnknownPallet(pallet_index))?;
        let calls_ty = pallet
            .calls
            .ok_or_else(|| CallError::NoCalls(pallet.name.clone()))?;
        let TypeDef::Variant(variants) = &self.resolve(calls_ty)?.def else {
            return Err(CallError::NotAVariant(calls_ty));
        };

        let call_index = reader.read_u8()?;
        let variant = variants
            .iter()
            .find(|v| v.index == call_index)
            .ok_or_else(|| CallError::UnknownCall {
                pallet: pallet.name.clone(),
                index: call_index,
            })?;

        let children = self.fields(&mut reader, &variant.fields, depth + 1, level + 1)?;
        if !reader.is_empty() {
            return Err(CallError::TrailingBytes(reader.remaining()));
        }

        Ok(Card::with_children(
            CardContent::Call {
                pallet: pallet.name.clone(),
                method: variant.name.clone(),
            },
            depth,
            children,
        ))
    }

    fn resolve(&self, id: TypeId) -> Result<&'a PortableType, CallError> {
        self.metadata.resolve(id).ok_or(CallError::UnknownType(id))
    }

    fn fields(
        &self,
        reader: &mut ByteReader<'_>,
        fields: &[Field],
        depth: u32,
        level: u32,
    ) -> Result<Vec<Card>, CallError> {
        // Newtype wrappers render as their inner value.
        if let [field] = fields {
            if field.name.is_none() {
                return self.value(reader, field.ty, depth, level, field.is_balance());
            }
        }

        let mut cards = Vec::with_capacity(fields.len());
        for (position, field) in fields.iter().enumerate() {
            let header = match &field.name {
                Some(name) => CardContent::FieldName {
                    name: name.clone(),
                    type_name: field.type_name.clone(),
                },
                None => CardContent::FieldNumber(position),
            };
            let values = self.value(reader, field.ty, depth + 1, level + 1, field.is_balance())?;
            cards.push(Card::with_children(header, depth, values));
        }
        Ok(cards)
    }

    fn value(
        &self,
        reader: &mut ByteReader<'_>,
        id: TypeId,
        depth: u32,
        level: u32,
        balance: bool,
    ) -> Result<Vec<Card>, CallError> {
        if level > self.max_depth {
            return Err(CallError::TooDeep(self.max_depth));
        }
        let ty = self.resolve(id)?;
        if ty.is_account_id() {
            let len = self.account_id_len(&ty.def);
            let bytes = reader.read_bytes(len)?;
            return Ok(vec![Card::new(CardContent::Id(hex::encode(bytes)), depth)]);
        }

        match &ty.def {
            TypeDef::Primitive(primitive) => {
                Ok(vec![self.primitive(reader, *primitive, depth, balance)?])
            }

            TypeDef::Composite(fields) if fields.is_empty() => {
                Ok(vec![Card::new(CardContent::None, depth)])
            }
            TypeDef::Composite(fields) => self.fields(reader, fields, depth, level + 1),

            TypeDef::Variant(variants) => {
                let index = reader.read_u8()?;
                let variant = variants
                    .iter()
                    .find(|v| v.index == index)
                    .ok_or(CallError::UnknownVariant { ty: id, index })?;
                let children = self.fields(reader, &variant.fields, depth + 1, level + 1)?;
                Ok(vec![Card::with_children(
                    CardContent::EnumVariant(variant.name.clone()),
                    depth,
                    children,
                )])
            }

            TypeDef::Sequence(element) => {
                let len = reader.read_compact_len()?;
                if len > reader.remaining() {
                    return Err(CallError::SequenceTooLong {
                        len,
                        remaining: reader.remaining(),
                    });
                }
                self.elements(reader, *element, len, depth, level)
            }

            TypeDef::Array { len, ty: element } => {
                let len = *len as usize;
                if len > reader.remaining() {
                    return Err(CallError::SequenceTooLong {
                        len,
                        remaining: reader.remaining(),
                    });
                }
                self.elements(reader, *element, len, depth, level)
            }

            TypeDef::Tuple(ids) if ids.is_empty() => Ok(vec![Card::new(CardContent::None, depth)]),
            TypeDef::Tuple(ids) => {
                let mut cards = Vec::with_capacity(ids.len());
                for (position, element) in ids.iter().enumerate() {
                    let values = self.value(reader, *element, depth + 1, level + 1, false)?;
                    cards.push(Card::with_children(
                        CardContent::FieldNumber(position),
                        depth,
                        values,
                    ));
                }
                Ok(cards)
            }

            TypeDef::Compact(_) => {
                let value = reader.read_compact()?;
                Ok(vec![self.integer(value.to_string(), value, depth, balance)])
            }

            TypeDef::Call => {
                let nested = reader.read_len_prefixed()?;
                Ok(vec![self.call_at(nested, depth, level + 1)])
            }
        }
    }

    fn elements(
        &self,
        reader: &mut ByteReader<'_>,
        element: TypeId,
        len: usize,
        depth: u32,
        level: u32,
    ) -> Result<Vec<Card>, CallError> {
        if matches!(self.resolve(element)?.def, TypeDef::Primitive(Primitive::U8)) {
            let bytes = reader.read_bytes(len)?;
            return Ok(vec![Card::new(CardContent::Bytes(hex::encode(bytes)), depth)]);
        }
        let mut cards = Vec::new();
        for _ in 0..len {
            cards.extend(self.value(reader, element, depth, level + 1, false)?);
        }
        Ok(cards)
    }

    fn primitive(
        &self,
        reader: &mut ByteReader<'_>,
        primitive: Primitive,
        depth: u32,
        balance: bool,
    ) -> Result<Card, CallError> {
        let content = match primitive {
            Primitive::Bool => match reader.read_u8()? {
                0 => CardContent::Bool(false),
                1 => CardContent::Bool(true),
                other => return Err(CallError::InvalidBool(other)),
            },
            Primitive::Str => CardContent::Text(reader.read_string()?),
            _ => {
                let width = primitive.width().unwrap_or(16);
                let raw = read_le(reader, width)?;
                if primitive.is_signed() {
                    let shift = 128 - 8 * width as u32;
                    let signed = ((raw << shift) as i128) >> shift;
                    CardContent::Number(signed.to_string())
                } else {
                    return Ok(self.integer(raw.to_string(), raw, depth, balance));
                }
            }
        };
        Ok(Card::new(content, depth))
    }

    fn integer(&self, text: String, value: u128, depth: u32, balance: bool) -> Card {
        if balance {
            let formatted = format_balance(value, self.network.decimals, &self.network.unit);
            Card::new(CardContent::Balance(formatted), depth)
        } else {
            Card::new(CardContent::Number(text), depth)
        }
    }

    fn account_id_len(&self, def: &TypeDef) -> usize {
        match def {
            TypeDef::Array { len, .. } => *len as usize,
            TypeDef::Composite(fields) if fields.len() == 1 => {
                match self.metadata.resolve(fields[0].ty) {
                    Some(PortableType {
                        def: TypeDef::Array { len, .. },
                        ..
                    }) => *len as usize,
                    _ => 32,
                }
            }
            _ => 32,
        }
    }
}

fn read_le(reader: &mut ByteReader<'_>, width: usize) -> Result<u128, CallError> {
    let bytes = reader.read_bytes(width)?;
    Ok(bytes
        .iter()
        .rev()
        .fold(0u128, |acc, byte| (acc << 8) | u128::from(*byte)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cards::Trust;
    use shared_types::{encode_compact, Encryption, PalletMeta, VariantDef};

    // Type ids of the test registry.
    const U8: TypeId = 0;
    const U128: TypeId = 1;
    const ACCOUNT: TypeId = 2;
    const BYTES: TypeId = 3;
    const CALL: TypeId = 4;
    const CALLS: TypeId = 5;
    const BALANCES_CALLS: TypeId = 6;
    const UTILITY_CALLS: TypeId = 7;
    const SYSTEM_CALLS: TypeId = 8;
    const ARRAY32: TypeId = 9;
    const BOOL: TypeId = 10;
    const I32: TypeId = 11;
    const COMPACT_U128: TypeId = 12;
    const MAYBE: TypeId = 13;
    const LOOP: TypeId = 14;

    fn network() -> NetworkSpecs {
        NetworkSpecs {
            genesis_hash: [1; 32],
            name: "westend".into(),
            title: "Westend".into(),
            unit: "WND".into(),
            decimals: 12,
            base58_prefix: 42,
            encryption: Encryption::Ed25519,
            default_path: "//westend".into(),
        }
    }

    fn metadata() -> RuntimeMetadata {
        let types = vec![
            PortableType::anonymous(TypeDef::Primitive(Primitive::U8)),
            PortableType::anonymous(TypeDef::Primitive(Primitive::U128)),
            PortableType::with_path(
                "sp_core::crypto::AccountId32",
                TypeDef::Composite(vec![Field::unnamed(ARRAY32)]),
            ),
            PortableType::anonymous(TypeDef::Sequence(U8)),
            PortableType::anonymous(TypeDef::Call),
            PortableType::anonymous(TypeDef::Sequence(CALL)),
            PortableType::anonymous(TypeDef::Variant(vec![VariantDef {
                name: "transfer".into(),
                index: 0,
                fields: vec![
                    Field::named("dest", ACCOUNT, Some("AccountIdLookupOf<T>")),
                    Field::named("value", COMPACT_U128, Some("BalanceOf<T>")),
                ],
            }])),
            PortableType::anonymous(TypeDef::Variant(vec![VariantDef {
                name: "batch".into(),
                index: 0,
                fields: vec![Field::named("calls", CALLS, Some("Vec<RuntimeCall>"))],
            }])),
            PortableType::anonymous(TypeDef::Variant(vec![VariantDef {
                name: "remark".into(),
                index: 1,
                fields: vec![
                    Field::named("remark", BYTES, Some("Vec<u8>")),
                    Field::named("flag", BOOL, None),
                    Field::named("delta", I32, None),
                    Field::named("choice", MAYBE, None),
                ],
            }])),
            PortableType::anonymous(TypeDef::Array { len: 32, ty: U8 }),
            PortableType::anonymous(TypeDef::Primitive(Primitive::Bool)),
            PortableType::anonymous(TypeDef::Primitive(Primitive::I32)),
            PortableType::anonymous(TypeDef::Compact(U128)),
            PortableType::anonymous(TypeDef::Variant(vec![
                VariantDef {
                    name: "None".into(),
                    index: 0,
                    fields: vec![],
                },
                VariantDef {
                    name: "Some".into(),
                    index: 1,
                    fields: vec![Field::unnamed(U128)],
                },
            ])),
            PortableType::anonymous(TypeDef::Tuple(vec![LOOP])),
        ];
        RuntimeMetadata {
            spec_name: "westend".into(),
            spec_version: 9430,
            types,
            pallets: vec![
                PalletMeta {
                    name: "System".into(),
                    index: 0,
                    calls: Some(SYSTEM_CALLS),
                },
                PalletMeta {
                    name: "Balances".into(),
                    index: 4,
                    calls: Some(BALANCES_CALLS),
                },
                PalletMeta {
                    name: "Utility".into(),
                    index: 16,
                    calls: Some(UTILITY_CALLS),
                },
                PalletMeta {
                    name: "Loop".into(),
                    index: 20,
                    calls: Some(LOOP),
                },
            ],
        }
    }

    fn transfer(amount: u128) -> Vec<u8> {
        let mut call = vec![4, 0];
        call.extend_from_slice(&[0xaa; 32]);
        encode_compact(amount, &mut call);
        call
    }

    fn batch(calls: &[Vec<u8>]) -> Vec<u8> {
        let mut out = vec![16, 0];
        encode_compact(calls.len() as u128, &mut out);
        for call in calls {
            encode_compact(call.len() as u128, &mut out);
            out.extend_from_slice(call);
        }
        out
    }

    fn decode(bytes: &[u8]) -> Card {
        let metadata = metadata();
        let network = network();
        CallDecoder::new(&metadata, &network, 32).decode_call(bytes, 0)
    }

    #[test]
    fn test_transfer() {
        let card = decode(&transfer(1_000_000_000_000));
        assert_eq!(
            card.content,
            CardContent::Call {
                pallet: "Balances".into(),
                method: "transfer".into()
            }
        );
        let flat = card.flatten();
        assert_eq!(flat[2].content, CardContent::Id(hex::encode([0xaa; 32])));
        match &flat[4].content {
            CardContent::Balance(balance) => assert_eq!(balance.to_string(), "1.000000000000 WND"),
            other => panic!("expected balance, got {other:?}"),
        }
        assert_eq!(flat[4].depth, 2);
    }

    #[test]
    fn test_batch_with_unknown_call_keeps_sibling() {
        let card = decode(&batch(&[transfer(5), vec![99, 0, 1, 2]]));
        assert!(!matches!(card.content, CardContent::Error(_)));

        let calls_field = &card.children[0];
        assert_eq!(calls_field.children.len(), 2);
        assert!(matches!(
            calls_field.children[0].content,
            CardContent::Call { .. }
        ));
        assert_eq!(
            calls_field.children[1].content,
            CardContent::Error("Unknown pallet index 99".into())
        );
        assert_eq!(calls_field.children[1].trust, Trust::Warning);
    }

    #[test]
    fn test_primitives() {
        let mut call = vec![0, 1];
        encode_compact(3, &mut call);
        call.extend_from_slice(b"hey");
        call.push(1);
        call.extend_from_slice(&(-5i32).to_le_bytes());
        call.push(1);
        call.extend_from_slice(&7u128.to_le_bytes());

        let contents: Vec<CardContent> = decode(&call)
            .flatten()
            .iter()
            .map(|c| c.content.clone())
            .collect();
        assert!(contents.contains(&CardContent::Bytes(hex::encode(b"hey"))));
        assert!(contents.contains(&CardContent::Bool(true)));
        assert!(contents.contains(&CardContent::Number("-5".into())));
        assert!(contents.contains(&CardContent::EnumVariant("Some".into())));
        assert!(contents.contains(&CardContent::Number("7".into())));
    }

    #[test]
    fn test_trailing_bytes_fail_the_call() {
        let mut call = transfer(1);
        call.push(0);
        assert_eq!(
            decode(&call).content,
            CardContent::Error("1 unread bytes after call arguments".into())
        );
    }

    #[test]
    fn test_unknown_call_index() {
        assert_eq!(
            decode(&[4, 9]).content,
            CardContent::Error("Unknown call index 9 in pallet Balances".into())
        );
    }

    #[test]
    fn test_invalid_bool() {
        let mut call = vec![0, 1, 0];
        call.push(2);
        assert_eq!(
            decode(&call).content,
            CardContent::Error("Invalid bool byte 0x02".into())
        );
    }

    #[test]
    fn test_self_referencing_type_is_bounded() {
        // Pallet "Loop" points at a tuple type; not a variant.
        assert_eq!(
            decode(&[20, 0]).content,
            CardContent::Error(format!("Type {LOOP} is not a call enum"))
        );

        let metadata = metadata();
        let network = network();
        let decoder = CallDecoder::new(&metadata, &network, 8);
        let mut reader = ByteReader::new(&[]);
        assert_eq!(
            decoder.value(&mut reader, LOOP, 0, 0, false),
            Err(CallError::TooDeep(8))
        );
    }

    #[test]
    fn test_nested_batches() {
        let inner = batch(&[transfer(1)]);
        let card = decode(&batch(&[inner, transfer(2)]));
        assert!(!card.has_errors());
        let depth_of_inner_transfer = card
            .flatten()
            .iter()
            .filter(|c| {
                matches!(&c.content, CardContent::Call { method, .. } if method == "transfer")
            })
            .map(|c| c.depth)
            .max();
        assert_eq!(depth_of_inner_transfer, Some(4));
    }
}
