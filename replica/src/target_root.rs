use std::{
    any::type_name,
    collections::{HashMap, HashSet},
    mem,
    time::Duration,
};

use log::{debug, info, warn};

use synchrony_shared::{
    AnyRef, CallbackMode, Clock, DependencyProvider, Instant, ReferenceId, ResolvedShape,
    SchemaCache, SchemaRole, SyncProtocol, SyncRef, Tick, TypeEncoder,
};

use crate::{
    construction::ConstructionResolver,
    error::TargetError,
    events::TargetEvent,
    frame_reader::{DecodedFrame, FrameReader},
    reference_pool::TargetReferencePool,
    synchronizer::{new_synchronizer, ApplyContext, ApplyKind, TargetSynchronizer},
    target_config::TargetConfig,
};

/// Replica end of a replication session. Rebuilds the authority's object
/// graph from frames and keeps it current.
pub struct TargetRoot {
    protocol: SyncProtocol,
    config: TargetConfig,
    dependencies: Box<dyn DependencyProvider>,
    schemas: SchemaCache,
    encoder: TypeEncoder,
    pool: TargetReferencePool,
    synchronizers: HashMap<ReferenceId, Box<dyn TargetSynchronizer>>,
    clock: Clock,
    events: Vec<TargetEvent>,
}

impl TargetRoot {
    /// Applies `initial_frame`, which must deliver the root
    pub fn new(
        protocol: SyncProtocol,
        config: TargetConfig,
        dependencies: impl DependencyProvider + 'static,
        initial_frame: &[u8],
    ) -> Result<Self, TargetError> {
        let mut protocol = protocol;
        if !protocol.is_locked() {
            protocol.lock();
        }

        let mut target_root = Self {
            protocol,
            config,
            dependencies: Box::new(dependencies),
            schemas: SchemaCache::new(SchemaRole::Target),
            encoder: TypeEncoder::new(),
            pool: TargetReferencePool::new(),
            synchronizers: HashMap::new(),
            clock: Clock::new(),
            events: Vec::new(),
        };
        target_root.read(initial_frame)?;

        let Some(root) = target_root.pool.resolve(&ReferenceId::ROOT) else {
            return Err(TargetError::MissingRoot);
        };
        info!("Target root built {}", root.type_name());
        Ok(target_root)
    }

    // Reading

    pub fn read(&mut self, bytes: &[u8]) -> Result<(), TargetError> {
        self.read_at(Instant::now(), bytes)
    }

    /// Applies one frame as received at `now`. Frames must be read in the
    /// order they were written.
    pub fn read_at(&mut self, now: Instant, bytes: &[u8]) -> Result<(), TargetError> {
        self.clock.record_read(now);
        self.events.push(TargetEvent::BeginRead);

        let frame = {
            let synchronizers = &self.synchronizers;
            let mut reader = FrameReader {
                encoder: &mut self.encoder,
                protocol: &self.protocol,
                schemas: &mut self.schemas,
                max_entries: self.config.max_frame_entries,
            };
            reader.read(bytes, |id| synchronizers.get(id).map(|sync| sync.shape()))?
        };
        let tick = frame.header.tick;
        self.clock.set_other_tick(tick);

        self.apply_frame(&frame, now)?;

        debug!(
            "Read {} frame at tick {}: {} entries, {} tracked",
            if frame.header.full { "full" } else { "incremental" },
            tick,
            frame.entries.len(),
            self.pool.len()
        );
        self.events.push(TargetEvent::EndRead(tick));
        Ok(())
    }

    fn apply_frame(&mut self, frame: &DecodedFrame, now: Instant) -> Result<(), TargetError> {
        let tick = frame.header.tick;

        // Additions, including identifiers the authority reused for an
        // object of another type
        let mut pending = HashMap::new();
        let mut replaced = Vec::new();
        for (index, entry) in frame.entries.iter().enumerate() {
            match self.synchronizers.get(&entry.id) {
                Some(sync) if entry.announced && sync.shape().type_name() != entry.shape.type_name() => {
                    replaced.push(entry.id);
                    pending.insert(entry.id, index);
                }
                Some(_) => {}
                None if entry.announced => {
                    pending.insert(entry.id, index);
                }
                None => return Err(TargetError::UnknownReference { id: entry.id }),
            }
        }
        self.remove_references(&replaced);

        let constructed = ConstructionResolver::new(
            &frame.entries,
            pending,
            self.dependencies.as_ref(),
        )
        .construct_all(&mut self.pool)?;

        // Members
        let smoothing = self.config.interpolate && !self.clock.update_rate().is_zero();
        let mut touched = Vec::new();
        for entry in &frame.entries {
            let kind = if constructed.contains(&entry.id) {
                self.synchronizers
                    .insert(entry.id, new_synchronizer(&entry.shape));
                ApplyKind::Constructed
            } else if entry.announced {
                ApplyKind::Snapshot
            } else {
                ApplyKind::Update
            };

            let (Some(object), Some(synchronizer)) = (
                self.pool.resolve(&entry.id),
                self.synchronizers.get_mut(&entry.id),
            ) else {
                return Err(TargetError::UnknownReference { id: entry.id });
            };
            let context = ApplyContext {
                id: entry.id,
                tick,
                now,
                smoothing,
                pool: &self.pool,
            };
            let changed = synchronizer.apply(object, &entry.payload, kind, &context)?;

            if kind == ApplyKind::Constructed {
                self.events.push(TargetEvent::Constructed(entry.id));
            } else if changed {
                self.events.push(TargetEvent::Changed(entry.id));
                touched.push(entry.id);
            }
        }

        // Callbacks, once every member of the frame is in place
        for entry in &frame.entries {
            if constructed.contains(&entry.id) {
                self.invoke_callback(&entry.id, None)?;
            }
        }
        for id in &touched {
            self.invoke_callback(id, Some(CallbackMode::EveryUpdate))?;
        }

        // Removals
        let candidates: Vec<ReferenceId> = if frame.header.full {
            self.pool.ids().filter(|id| !frame.carries(id)).collect()
        } else {
            frame.removed.clone()
        };
        let mut removals = Vec::with_capacity(candidates.len());
        for id in candidates {
            if id.is_root() {
                warn!("Ignored removal of the root reference at tick {}", tick);
            } else if constructed.contains(&id) {
                debug!("Ignored removal of {}, added by the same frame", id);
            } else {
                removals.push(id);
            }
        }
        self.remove_references(&removals);

        Ok(())
    }

    /// Runs the type's callback if it fires in `mode`, or in any mode when
    /// `mode` is `None`
    fn invoke_callback(&self, id: &ReferenceId, mode: Option<CallbackMode>) -> Result<(), TargetError> {
        let (Some(object), Some(synchronizer)) = (self.pool.resolve(id), self.synchronizers.get(id))
        else {
            return Ok(());
        };
        let ResolvedShape::Object(schema) = synchronizer.shape() else {
            return Ok(());
        };
        let Some(callback) = schema.callback() else {
            return Ok(());
        };
        if mode.is_some_and(|mode| mode != callback.mode) {
            return Ok(());
        }
        schema.invoke_callback(object)?;
        Ok(())
    }

    fn remove_references(&mut self, ids: &[ReferenceId]) {
        for (id, object) in self.pool.remove(ids) {
            self.synchronizers.remove(&id);
            debug!("Removed {} ({})", id, object.type_name());
            self.events.push(TargetEvent::Removed(id));
        }
    }

    // Updating

    /// Advances the replica's own tick and moves interpolated members
    /// towards their latest values
    pub fn update(&mut self, now: Instant) -> Result<(), TargetError> {
        self.clock.advance();
        let update_rate = self.clock.update_rate();

        for (id, synchronizer) in self.synchronizers.iter_mut() {
            let Some(object) = self.pool.resolve(id) else {
                continue;
            };
            synchronizer.update(object, now, update_rate)?;
        }

        self.events.push(TargetEvent::Updated);
        Ok(())
    }

    /// Marks `member` of the object tracked as `id` as locally written at
    /// `tick`. `HighestTick` members then reject older incoming values.
    pub fn stamp_member(&mut self, id: ReferenceId, member: &str, tick: Tick) -> Result<(), TargetError> {
        let Some(synchronizer) = self.synchronizers.get_mut(&id) else {
            return Err(TargetError::UnknownReference { id });
        };
        synchronizer.stamp(member, tick)
    }

    pub fn take_events(&mut self) -> Vec<TargetEvent> {
        mem::take(&mut self.events)
    }

    // Access

    pub fn root<T: 'static>(&self) -> Result<SyncRef<T>, TargetError> {
        let root = self
            .pool
            .resolve(&ReferenceId::ROOT)
            .ok_or(TargetError::MissingRoot)?;
        root.downcast::<T>()
            .ok_or_else(|| TargetError::RootTypeMismatch {
                expected: type_name::<T>(),
                found: root.type_name(),
            })
    }

    /// The object tracked as `id`, if it is a `T`
    pub fn resolve<T: 'static>(&self, id: ReferenceId) -> Option<SyncRef<T>> {
        self.pool.resolve(&id)?.downcast::<T>()
    }

    pub fn reference_id<T: 'static>(&self, object: &SyncRef<T>) -> Option<ReferenceId> {
        let object = AnyRef::from(object);
        self.pool
            .ids()
            .find(|id| self.pool.resolve(id).is_some_and(|tracked| tracked.ptr_eq(&object)))
    }

    pub fn tracked_count(&self) -> usize {
        self.pool.len()
    }

    pub fn reference_pool(&self) -> &TargetReferencePool {
        &self.pool
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Wall time between the two latest reads
    pub fn update_rate(&self) -> Duration {
        self.clock.update_rate()
    }

    /// Progress through the current read interval, within `[0, 1]`
    pub fn interpolation_factor(&self, now: Instant) -> f32 {
        self.clock.interpolation_factor(now)
    }

    pub fn protocol(&self) -> &SyncProtocol {
        &self.protocol
    }

    pub fn config(&self) -> &TargetConfig {
        &self.config
    }
}
