mod error;

pub use error::TypeEncoderError;

use std::{
    any::TypeId,
    collections::{BTreeMap, HashMap},
};

use log::debug;

use synchrony_serde::{BitReader, BitWrite, Serde, UnsignedVariableInteger};

use crate::{
    protocol::SyncProtocol,
    types::{read_count, write_count},
};

/// Compact wire identifier of a registered type
pub type TypeCode = u32;

struct TypeEntry {
    type_id: TypeId,
    name: String,
}

/// Bidirectional table between registered types and the codes written on
/// the wire. Each root owns one. Codes are assigned lazily, in order, from
/// zero, and the table never shrinks.
#[derive(Default)]
pub struct TypeEncoder {
    codes: HashMap<TypeId, TypeCode>,
    entries: BTreeMap<TypeCode, TypeEntry>,
    pending: Vec<TypeCode>,
}

impl TypeEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the code for `type_id`, assigning the next free code and
    /// queueing its announcement on first use
    pub fn write_type(
        &mut self,
        protocol: &SyncProtocol,
        type_id: TypeId,
        type_name: &'static str,
    ) -> Result<TypeCode, TypeEncoderError> {
        if let Some(code) = self.codes.get(&type_id) {
            return Ok(*code);
        }
        let Some(name) = protocol.type_name(&type_id) else {
            return Err(TypeEncoderError::TypeNotRegistered { type_name });
        };

        let code = self.next_code();
        debug!("Assigned type code {} to `{}`", code, name);
        self.codes.insert(type_id, code);
        self.entries.insert(
            code,
            TypeEntry {
                type_id,
                name: name.to_string(),
            },
        );
        self.pending.push(code);
        Ok(code)
    }

    fn next_code(&self) -> TypeCode {
        self.entries
            .keys()
            .next_back()
            .map(|code| code + 1)
            .unwrap_or(0)
    }

    /// Writes queued announcements, or the complete table for a full frame
    /// so a replica without prior state can resolve every code
    pub fn write_announcements(&mut self, writer: &mut dyn BitWrite, full: bool) {
        let codes: Vec<TypeCode> = if full {
            self.entries.keys().copied().collect()
        } else {
            self.pending.clone()
        };
        self.pending.clear();

        write_count(codes.len(), writer);
        for code in codes {
            let Some(entry) = self.entries.get(&code) else {
                continue;
            };
            UnsignedVariableInteger::<7>::new(code).ser(writer);
            entry.name.ser(writer);
        }
    }

    /// Applies announcements in the order received
    pub fn read_announcements(
        &mut self,
        reader: &mut BitReader,
        protocol: &SyncProtocol,
    ) -> Result<(), TypeEncoderError> {
        let count = read_count(reader)?;
        for _ in 0..count {
            let code: TypeCode = UnsignedVariableInteger::<7>::de(reader)?.to()?;
            let name = String::de(reader)?;

            if let Some(existing) = self.entries.get(&code) {
                if existing.name == name {
                    continue;
                }
                return Err(TypeEncoderError::TypeCodeConflict {
                    code,
                    existing: existing.name.clone(),
                    announced: name,
                });
            }

            let Some(type_id) = protocol.type_id_by_name(&name) else {
                return Err(TypeEncoderError::UnknownType { name });
            };
            debug!("Type code {} announced as `{}`", code, name);
            self.codes.insert(type_id, code);
            self.entries.insert(code, TypeEntry { type_id, name });
        }
        Ok(())
    }

    pub fn read_type(&self, code: TypeCode) -> Result<TypeId, TypeEncoderError> {
        self.entries
            .get(&code)
            .map(|entry| entry.type_id)
            .ok_or(TypeEncoderError::UnknownTypeCode { code })
    }

    pub fn code_of(&self, type_id: &TypeId) -> Option<TypeCode> {
        self.codes.get(type_id).copied()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
