use std::{rc::Rc, time::Duration};

use log::trace;

use synchrony_shared::{AnyRef, BoxedValue, Instant, MapSchema, ResolvedShape, Tick};

use crate::{error::TargetError, frame_reader::DecodedPayload};

use super::{ApplyContext, ApplyKind, TargetSynchronizer};

pub(crate) struct MapTargetSynchronizer {
    schema: Rc<dyn MapSchema>,
}

impl MapTargetSynchronizer {
    pub fn new(schema: Rc<dyn MapSchema>) -> Self {
        Self { schema }
    }
}

impl TargetSynchronizer for MapTargetSynchronizer {
    fn shape(&self) -> ResolvedShape {
        ResolvedShape::Map(self.schema.clone())
    }

    fn apply(
        &mut self,
        object: &AnyRef,
        payload: &DecodedPayload,
        kind: ApplyKind,
        context: &ApplyContext,
    ) -> Result<bool, TargetError> {
        let DecodedPayload::Map { inserts, removals } = payload else {
            return Ok(false);
        };

        let mut touched = false;

        // a snapshot lists every entry, so anything else is stale
        if kind == ApplyKind::Snapshot {
            let keep: Vec<BoxedValue> = inserts.iter().map(|(key, _)| key.clone()).collect();
            for key in self.schema.retain_keys(object, &keep)? {
                trace!("Dropped {:?} from {} absent from snapshot", key, context.id);
                touched = true;
            }
        }

        for (key, id) in inserts {
            let Some(value) = context.resolve(Some(*id))? else {
                continue;
            };
            self.schema.insert(object, key.clone(), value)?;
            touched = true;
        }

        for key in removals {
            self.schema.remove(object, key.as_ref())?;
            touched = true;
        }

        Ok(touched)
    }

    fn update(&mut self, _object: &AnyRef, _now: Instant, _update_rate: Duration) -> Result<bool, TargetError> {
        Ok(false)
    }

    fn stamp(&mut self, member: &str, _tick: Tick) -> Result<(), TargetError> {
        Err(TargetError::UnknownMember {
            type_name: self.schema.type_name().to_string(),
            member: member.to_string(),
        })
    }
}
