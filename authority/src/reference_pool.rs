use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::trace;

use synchrony_shared::{AnyRef, RefKey, ReferenceId};

use crate::error::SourceError;

/// Authority-side registry of tracked objects.
///
/// Identifiers are allocated smallest-first from 2 upward, 1 being the
/// root. An identifier released by a removal is only handed out again after
/// [`commit_released`](Self::commit_released), which the root calls once
/// the frame reporting the removal has been written.
pub struct SourceReferencePool {
    objects: BTreeMap<ReferenceId, AnyRef>,
    ids: HashMap<RefKey, ReferenceId>,
    free: BTreeSet<u32>,
    released: Vec<ReferenceId>,
    next_id: u32,
}

impl SourceReferencePool {
    pub fn new(root: AnyRef) -> Self {
        let mut pool = Self {
            objects: BTreeMap::new(),
            ids: HashMap::new(),
            free: BTreeSet::new(),
            released: Vec::new(),
            next_id: ReferenceId::ROOT.value() + 1,
        };
        pool.insert(ReferenceId::ROOT, root);
        pool
    }

    /// Reserves the smallest identifier not in use
    pub fn allocate(&mut self) -> Result<ReferenceId, SourceError> {
        if let Some(raw) = self.free.pop_first() {
            return ReferenceId::new(raw).ok_or(SourceError::PoolExhausted);
        }
        let raw = self.next_id;
        self.next_id = raw.checked_add(1).ok_or(SourceError::PoolExhausted)?;
        ReferenceId::new(raw).ok_or(SourceError::PoolExhausted)
    }

    pub fn track(&mut self, object: AnyRef) -> Result<ReferenceId, SourceError> {
        let id = self.allocate()?;
        trace!("Tracking {} as {}", object.type_name(), id);
        self.insert(id, object);
        Ok(id)
    }

    fn insert(&mut self, id: ReferenceId, object: AnyRef) {
        self.ids.insert(object.key(), id);
        self.objects.insert(id, object);
    }

    pub fn resolve(&self, id: &ReferenceId) -> Option<&AnyRef> {
        self.objects.get(id)
    }

    pub fn id_of(&self, object: &AnyRef) -> Option<ReferenceId> {
        self.ids.get(&object.key()).copied()
    }

    /// Stops tracking `id`. The identifier is reported as removed by the
    /// next frame.
    pub fn remove(&mut self, id: &ReferenceId) -> Option<AnyRef> {
        let object = self.objects.remove(id)?;
        self.ids.remove(&object.key());
        self.released.push(*id);
        Some(object)
    }

    /// Identifiers removed since the last written frame
    pub fn released(&self) -> &[ReferenceId] {
        &self.released
    }

    /// Makes released identifiers available to [`allocate`](Self::allocate)
    pub fn commit_released(&mut self) {
        self.free
            .extend(self.released.drain(..).map(|id| id.value()));
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
