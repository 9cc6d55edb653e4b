mod map;
mod object;

pub(crate) use map::MapSourceSynchronizer;
pub(crate) use object::ObjectSourceSynchronizer;

use std::rc::Rc;

use synchrony_shared::{
    write_count, AnyRef, BitWrite, BoxedValue, MapSchema, MemberIndex, ReferenceId,
    ResolvedSchema, Serde, UnsignedVariableInteger, WireValue,
};

use crate::{error::SourceError, reference_pool::SourceReferencePool};

/// Detects what changed on one tracked object since the last frame
pub(crate) trait SourceSynchronizer {
    /// Tracked objects directly reachable from `object`
    fn children(&self, object: &AnyRef) -> Result<Vec<AnyRef>, SourceError>;

    /// Every member, unconditionally. Resets the diff baseline.
    fn snapshot(&mut self, object: &AnyRef, pool: &SourceReferencePool) -> Result<Payload, SourceError>;

    /// Members that differ from what was last sent
    fn changes(&mut self, object: &AnyRef, pool: &SourceReferencePool) -> Result<Payload, SourceError>;
}

/// The per-object part of a frame entry
pub(crate) enum Payload {
    Object {
        schema: Rc<ResolvedSchema>,
        members: Vec<(MemberIndex, WireValue)>,
    },
    Map {
        schema: Rc<dyn MapSchema>,
        inserts: Vec<(BoxedValue, ReferenceId)>,
        removals: Vec<BoxedValue>,
    },
}

impl Payload {
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Object { members, .. } => members.is_empty(),
            Payload::Map {
                inserts, removals, ..
            } => inserts.is_empty() && removals.is_empty(),
        }
    }

    pub fn write(&self, writer: &mut dyn BitWrite) -> Result<(), SourceError> {
        match self {
            Payload::Object { schema, members } => {
                write_count(members.len(), writer);
                for (index, value) in members {
                    let Some(slot) = schema.slot(*index) else {
                        return Err(SourceError::Schema(
                            synchrony_shared::SchemaError::MemberIndexOutOfRange {
                                type_name: schema.type_name().to_string(),
                                index: usize::from(*index),
                            },
                        ));
                    };
                    UnsignedVariableInteger::<7>::new(*index).ser(writer);
                    slot.write(value, writer)?;
                }
            }
            Payload::Map {
                schema,
                inserts,
                removals,
            } => {
                write_count(inserts.len(), writer);
                for (key, id) in inserts {
                    schema.write_key(key.as_ref(), writer)?;
                    id.ser(writer);
                }
                write_count(removals.len(), writer);
                for key in removals {
                    schema.write_key(key.as_ref(), writer)?;
                }
            }
        }
        Ok(())
    }
}

/// Maps a reference to the identifier it is tracked under
pub(crate) fn reference_id(
    pool: &SourceReferencePool,
    parent: &str,
    reference: &AnyRef,
) -> Result<ReferenceId, SourceError> {
    pool.id_of(reference)
        .ok_or_else(|| SourceError::UntrackedReference {
            parent: parent.to_string(),
            reference: reference.type_name(),
        })
}
