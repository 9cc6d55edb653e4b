use std::collections::BTreeMap;

use log::trace;

use synchrony_shared::{AnyRef, ReferenceId};

/// Replica-side registry of objects constructed from frames, keyed by the
/// identifiers the authority assigned them
#[derive(Default)]
pub struct TargetReferencePool {
    objects: BTreeMap<ReferenceId, AnyRef>,
}

impl TargetReferencePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the object previously registered under `id`, if any
    pub fn register(&mut self, id: ReferenceId, object: AnyRef) -> Option<AnyRef> {
        trace!("Registered {} as {}", object.type_name(), id);
        self.objects.insert(id, object)
    }

    pub fn resolve(&self, id: &ReferenceId) -> Option<&AnyRef> {
        self.objects.get(id)
    }

    /// Drops every listed identifier, returning the objects that were tracked
    pub fn remove(&mut self, ids: &[ReferenceId]) -> Vec<(ReferenceId, AnyRef)> {
        ids.iter()
            .filter_map(|id| self.objects.remove(id).map(|object| (*id, object)))
            .collect()
    }

    pub fn contains(&self, id: &ReferenceId) -> bool {
        self.objects.contains_key(id)
    }

    /// Tracked identifiers, ascending
    pub fn ids(&self) -> impl Iterator<Item = ReferenceId> + '_ {
        self.objects.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
