mod map;
mod object;

pub(crate) use map::MapTargetSynchronizer;
pub(crate) use object::ObjectTargetSynchronizer;

use std::time::Duration;

use synchrony_shared::{AnyRef, Instant, ReferenceId, ResolvedShape, Tick};

use crate::{error::TargetError, frame_reader::DecodedPayload, reference_pool::TargetReferencePool};

/// How an entry relates to the replica's existing state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ApplyKind {
    /// The object was constructed from this entry during the current read
    Constructed,
    /// A full-frame entry for an object that already existed
    Snapshot,
    /// An incremental entry
    Update,
}

pub(crate) struct ApplyContext<'a> {
    pub id: ReferenceId,
    pub tick: Tick,
    pub now: Instant,
    /// Whether `Interpolated` members may blend rather than snap
    pub smoothing: bool,
    pub pool: &'a TargetReferencePool,
}

impl ApplyContext<'_> {
    pub fn resolve(&self, id: Option<ReferenceId>) -> Result<Option<AnyRef>, TargetError> {
        let Some(id) = id else {
            return Ok(None);
        };
        self.pool
            .resolve(&id)
            .cloned()
            .map(Some)
            .ok_or(TargetError::UnresolvedReference {
                id,
                referrer: self.id,
            })
    }
}

/// Applies decoded entries to one replicated object
pub(crate) trait TargetSynchronizer {
    fn shape(&self) -> ResolvedShape;

    /// Returns whether anything on the object was written or started blending
    fn apply(
        &mut self,
        object: &AnyRef,
        payload: &DecodedPayload,
        kind: ApplyKind,
        context: &ApplyContext,
    ) -> Result<bool, TargetError>;

    /// Advances running interpolations. Returns whether any member moved.
    fn update(&mut self, object: &AnyRef, now: Instant, update_rate: Duration) -> Result<bool, TargetError>;

    /// Marks `member` as locally written at `tick`
    fn stamp(&mut self, member: &str, tick: Tick) -> Result<(), TargetError>;
}

pub(crate) fn new_synchronizer(shape: &ResolvedShape) -> Box<dyn TargetSynchronizer> {
    match shape {
        ResolvedShape::Object(schema) => Box::new(ObjectTargetSynchronizer::new(schema.clone())),
        ResolvedShape::Map(schema) => Box::new(MapTargetSynchronizer::new(schema.clone())),
    }
}
