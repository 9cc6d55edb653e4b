use std::collections::HashSet;

use synchrony_shared::{
    read_count, BitReader, BoxedValue, FrameHeader, MapSchema, MemberIndex, ReferenceId,
    ResolvedSchema, ResolvedShape, SchemaCache, Serde, SyncProtocol, TypeCode, TypeEncoder,
    TypeEncoderError, UnsignedVariableInteger, WireValue,
};

use crate::error::TargetError;

/// Members or map operations carried by one frame entry
pub(crate) enum DecodedPayload {
    Object(Vec<(MemberIndex, WireValue)>),
    Map {
        inserts: Vec<(BoxedValue, ReferenceId)>,
        removals: Vec<BoxedValue>,
    },
}

pub(crate) struct DecodedEntry {
    pub id: ReferenceId,
    pub shape: ResolvedShape,
    /// Whether the entry carried a type code, i.e. is a snapshot
    pub announced: bool,
    pub payload: DecodedPayload,
}

pub(crate) struct DecodedFrame {
    pub header: FrameHeader,
    /// Identifiers listed as removed. Always empty for a full frame.
    pub removed: Vec<ReferenceId>,
    pub entries: Vec<DecodedEntry>,
    carried: HashSet<ReferenceId>,
}

impl DecodedFrame {
    pub fn new(header: FrameHeader, removed: Vec<ReferenceId>, entries: Vec<DecodedEntry>) -> Self {
        let carried = entries.iter().map(|entry| entry.id).collect();
        Self {
            header,
            removed,
            entries,
            carried,
        }
    }

    pub fn carries(&self, id: &ReferenceId) -> bool {
        self.carried.contains(id)
    }
}

/// Decodes a whole frame before anything is applied, so that entries can
/// reference identifiers added later in the same frame
pub(crate) struct FrameReader<'r> {
    pub encoder: &'r mut TypeEncoder,
    pub protocol: &'r SyncProtocol,
    pub schemas: &'r mut SchemaCache,
    pub max_entries: usize,
}

impl FrameReader<'_> {
    /// `known` returns the shape of an already tracked identifier
    pub fn read(
        &mut self,
        bytes: &[u8],
        known: impl Fn(&ReferenceId) -> Option<ResolvedShape>,
    ) -> Result<DecodedFrame, TargetError> {
        let mut reader = BitReader::new(bytes);

        let header = FrameHeader::de(&mut reader)?;
        self.encoder.read_announcements(&mut reader, self.protocol)?;

        let mut removed = Vec::new();
        if !header.full {
            let count = self.bounded_count(&mut reader)?;
            for _ in 0..count {
                removed.push(ReferenceId::de(&mut reader)?);
            }
        }

        let count = self.bounded_count(&mut reader)?;
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let id = ReferenceId::de(&mut reader)?;
            let announced = bool::de(&mut reader)?;
            let shape = if announced {
                let code: TypeCode = UnsignedVariableInteger::<7>::de(&mut reader)?.to()?;
                self.shape_of(code)?
            } else {
                known(&id).ok_or(TargetError::UnknownReference { id })?
            };
            let payload = match &shape {
                ResolvedShape::Object(schema) => Self::read_object(&mut reader, schema)?,
                ResolvedShape::Map(schema) => Self::read_map(&mut reader, schema.as_ref())?,
            };
            entries.push(DecodedEntry {
                id,
                shape,
                announced,
                payload,
            });
        }

        Ok(DecodedFrame::new(header, removed, entries))
    }

    fn bounded_count(&self, reader: &mut BitReader) -> Result<usize, TargetError> {
        let count = read_count(reader)?;
        if count > self.max_entries {
            return Err(TargetError::FrameTooLarge {
                count,
                max: self.max_entries,
            });
        }
        Ok(count)
    }

    fn shape_of(&mut self, code: TypeCode) -> Result<ResolvedShape, TargetError> {
        let type_id = self.encoder.read_type(code)?;
        self.schemas
            .resolve(self.protocol, &type_id)?
            .ok_or(TargetError::TypeEncoder(TypeEncoderError::UnknownTypeCode { code }))
    }

    fn read_object(
        reader: &mut BitReader,
        schema: &ResolvedSchema,
    ) -> Result<DecodedPayload, TargetError> {
        let count = read_count(reader)?;
        let mut members = Vec::with_capacity(count.min(schema.member_count()));
        for _ in 0..count {
            let index: MemberIndex = UnsignedVariableInteger::<7>::de(reader)?.to()?;
            let Some(slot) = schema.slot(index) else {
                return Err(TargetError::MemberIndexOutOfRange {
                    type_name: schema.type_name().to_string(),
                    index,
                });
            };
            members.push((index, slot.read(reader)?));
        }
        Ok(DecodedPayload::Object(members))
    }

    fn read_map(reader: &mut BitReader, schema: &dyn MapSchema) -> Result<DecodedPayload, TargetError> {
        let count = read_count(reader)?;
        let mut inserts = Vec::new();
        for _ in 0..count {
            let key = schema.read_key(reader)?;
            let id = ReferenceId::de(reader)?;
            inserts.push((key, id));
        }

        let count = read_count(reader)?;
        let mut removals = Vec::new();
        for _ in 0..count {
            removals.push(schema.read_key(reader)?);
        }

        Ok(DecodedPayload::Map { inserts, removals })
    }
}
