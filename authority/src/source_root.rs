use std::{
    any::{type_name, TypeId},
    collections::{HashMap, HashSet, VecDeque},
};

use log::{debug, info};

use synchrony_shared::{
    AnyRef, FrameHeader, ReferenceId, ResolvedShape, SchemaCache, SchemaRole, SyncProtocol,
    SyncRef, Tick, TypeEncoder, TypeEncoderError,
};

use crate::{
    error::SourceError,
    frame_writer::{FrameWriter, OutgoingEntry},
    reference_pool::SourceReferencePool,
    synchronizer::{MapSourceSynchronizer, ObjectSourceSynchronizer, SourceSynchronizer},
};

struct SourceEntry {
    synchronizer: Box<dyn SourceSynchronizer>,
    object_type: TypeId,
    type_name: &'static str,
    /// Not yet written to any frame
    is_new: bool,
}

/// Authority end of a replication session. Owns the reference pool and type
/// encoder for one object graph and turns it into frames.
pub struct SourceRoot {
    protocol: SyncProtocol,
    schemas: SchemaCache,
    encoder: TypeEncoder,
    pool: SourceReferencePool,
    entries: HashMap<ReferenceId, SourceEntry>,
    tick: Tick,
}

impl SourceRoot {
    /// Tracks `root` under [`ReferenceId::ROOT`]. Objects reachable from it
    /// are tracked as frames are written.
    pub fn new<T: 'static>(protocol: SyncProtocol, root: &SyncRef<T>) -> Result<Self, SourceError> {
        let mut protocol = protocol;
        if !protocol.is_locked() {
            protocol.lock();
        }

        let root = AnyRef::from(root);
        let mut source_root = Self {
            protocol,
            schemas: SchemaCache::new(SchemaRole::Source),
            encoder: TypeEncoder::new(),
            pool: SourceReferencePool::new(root.clone()),
            entries: HashMap::new(),
            tick: 0,
        };
        let Some(entry) = source_root.new_entry(&root)? else {
            return Err(SourceError::TypeEncoder(
                TypeEncoderError::TypeNotRegistered {
                    type_name: root.type_name(),
                },
            ));
        };
        source_root.entries.insert(ReferenceId::ROOT, entry);

        info!("Source root tracking {}", root.type_name());
        Ok(source_root)
    }

    // Ticks

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn set_tick(&mut self, tick: Tick) {
        self.tick = tick;
    }

    pub fn advance_tick(&mut self) -> Tick {
        self.tick = self.tick.wrapping_add(1);
        self.tick
    }

    // Tracked references

    pub fn tracked_count(&self) -> usize {
        self.pool.len()
    }

    pub fn reference_pool(&self) -> &SourceReferencePool {
        &self.pool
    }

    pub fn reference_id<T: 'static>(&self, object: &SyncRef<T>) -> Option<ReferenceId> {
        self.pool.id_of(&AnyRef::from(object))
    }

    pub fn root<T: 'static>(&self) -> Result<SyncRef<T>, SourceError> {
        let root = self
            .pool
            .resolve(&ReferenceId::ROOT)
            .ok_or(SourceError::MissingRoot)?;
        root.downcast::<T>()
            .ok_or_else(|| SourceError::RootTypeMismatch {
                expected: type_name::<T>(),
                found: root.type_name(),
            })
    }

    pub fn protocol(&self) -> &SyncProtocol {
        &self.protocol
    }

    // Frames

    /// Serializes every tracked reference and all of its members
    pub fn write_full(&mut self) -> Result<Vec<u8>, SourceError> {
        self.write_frame(true)
    }

    /// Serializes references added and removed since the last frame, plus
    /// members that changed on the others
    pub fn write_changes(&mut self) -> Result<Vec<u8>, SourceError> {
        self.write_frame(false)
    }

    fn write_frame(&mut self, full: bool) -> Result<Vec<u8>, SourceError> {
        self.collect_graph()?;

        let ids: Vec<ReferenceId> = self.pool.ids().collect();
        let mut outgoing = Vec::new();
        for id in ids {
            let Some(object) = self.pool.resolve(&id) else {
                continue;
            };
            let Some(entry) = self.entries.get_mut(&id) else {
                continue;
            };

            if full || entry.is_new {
                let type_code =
                    self.encoder
                        .write_type(&self.protocol, entry.object_type, entry.type_name)?;
                let payload = entry.synchronizer.snapshot(object, &self.pool)?;
                outgoing.push(OutgoingEntry {
                    id,
                    type_code: Some(type_code),
                    payload,
                });
            } else {
                let payload = entry.synchronizer.changes(object, &self.pool)?;
                if !payload.is_empty() {
                    outgoing.push(OutgoingEntry {
                        id,
                        type_code: None,
                        payload,
                    });
                }
            }
        }

        let header = FrameHeader::new(self.tick, full);
        let bytes = FrameWriter::write(header, &mut self.encoder, self.pool.released(), &outgoing)?;

        debug!(
            "Wrote {} frame at tick {}: {} entries, {} removed, {} bytes",
            if full { "full" } else { "incremental" },
            self.tick,
            outgoing.len(),
            self.pool.released().len(),
            bytes.len()
        );

        for entry in self.entries.values_mut() {
            entry.is_new = false;
        }
        self.pool.commit_released();

        Ok(bytes)
    }

    /// Walks the graph from the root, tracking newly reachable objects and
    /// releasing tracked objects that are no longer reachable
    fn collect_graph(&mut self) -> Result<(), SourceError> {
        let mut reached = HashSet::from([ReferenceId::ROOT]);
        let mut queue = VecDeque::from([ReferenceId::ROOT]);

        while let Some(id) = queue.pop_front() {
            let (Some(object), Some(entry)) = (self.pool.resolve(&id), self.entries.get(&id)) else {
                continue;
            };
            let children = entry.synchronizer.children(object)?;
            let parent_name = entry.type_name;

            for child in children {
                let child_id = match self.pool.id_of(&child) {
                    Some(child_id) => child_id,
                    None => self.track(child, parent_name)?,
                };
                if reached.insert(child_id) {
                    queue.push_back(child_id);
                }
            }
        }

        let unreachable: Vec<ReferenceId> = self
            .pool
            .ids()
            .filter(|id| !reached.contains(id))
            .collect();
        for id in unreachable {
            if let Some(object) = self.pool.remove(&id) {
                debug!("Released {} ({})", id, object.type_name());
            }
            self.entries.remove(&id);
        }

        Ok(())
    }

    fn track(&mut self, object: AnyRef, parent: &str) -> Result<ReferenceId, SourceError> {
        let Some(entry) = self.new_entry(&object)? else {
            return Err(SourceError::UntrackedReference {
                parent: parent.to_string(),
                reference: object.type_name(),
            });
        };
        let id = self.pool.track(object)?;
        self.entries.insert(id, entry);
        Ok(id)
    }

    fn new_entry(&mut self, object: &AnyRef) -> Result<Option<SourceEntry>, SourceError> {
        let Some(shape) = self.schemas.resolve(&self.protocol, &object.object_type())? else {
            return Ok(None);
        };
        let synchronizer: Box<dyn SourceSynchronizer> = match shape {
            ResolvedShape::Object(schema) => Box::new(ObjectSourceSynchronizer::new(schema, object)?),
            ResolvedShape::Map(schema) => Box::new(MapSourceSynchronizer::new(schema)),
        };
        Ok(Some(SourceEntry {
            synchronizer,
            object_type: object.object_type(),
            type_name: object.type_name(),
            is_new: true,
        }))
    }
}
