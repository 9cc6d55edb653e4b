use std::time::Duration;

use log::debug;

use synchrony_authority::SourceRoot;
use synchrony_replica::{TargetConfig, TargetEvent, TargetRoot};
use synchrony_shared::{DependencyMap, Instant, ReferenceId, SyncRef};

use crate::test_protocol::{protocol, Spawner};

/// Dependencies every replica in these tests is built with
pub fn replica_dependencies() -> DependencyMap {
    let mut dependencies = DependencyMap::new();
    dependencies.insert(Spawner {
        region: "north".to_string(),
    });
    dependencies
}

/// An authority and one replica, connected by handing frames over directly.
/// Time is simulated: each sync reads the frame `step` after the previous
/// one.
pub struct TestSession {
    pub source: SourceRoot,
    pub target: TargetRoot,
    pub now: Instant,
    pub step: Duration,
}

impl TestSession {
    pub fn new<T: 'static>(root: &SyncRef<T>) -> Self {
        Self::with_config(root, TargetConfig::default())
    }

    pub fn with_config<T: 'static>(root: &SyncRef<T>, config: TargetConfig) -> Self {
        let mut source = SourceRoot::new(protocol(), root).expect("root type is registered");
        let frame = source.write_full().expect("initial frame is writable");
        let target = TargetRoot::new(protocol(), config, replica_dependencies(), &frame)
            .expect("initial frame is readable");
        Self {
            source,
            target,
            now: Instant::now(),
            step: Duration::from_millis(100),
        }
    }

    /// Advances the authority tick, writes a diff and reads it on the replica.
    /// Returns the diff.
    pub fn sync(&mut self) -> Vec<u8> {
        self.source.advance_tick();
        let frame = self.source.write_changes().expect("diff is writable");
        self.deliver(&frame);
        frame
    }

    /// Like [`sync`](Self::sync), with a full frame
    pub fn sync_full(&mut self) -> Vec<u8> {
        self.source.advance_tick();
        let frame = self.source.write_full().expect("full frame is writable");
        self.deliver(&frame);
        frame
    }

    /// Writes a diff that never reaches the replica
    pub fn drop_frame(&mut self) -> Vec<u8> {
        self.source.advance_tick();
        self.source.write_changes().expect("diff is writable")
    }

    pub fn deliver(&mut self, frame: &[u8]) {
        self.now += self.step;
        debug!("Delivering {} byte frame", frame.len());
        self.target
            .read_at(self.now, frame)
            .expect("frame is readable");
    }

    /// Runs a replica update `elapsed` after the latest read
    pub fn update_after(&mut self, elapsed: Duration) {
        self.target
            .update(self.now + elapsed)
            .expect("update succeeds");
    }

    pub fn replica_root<T: 'static>(&self) -> SyncRef<T> {
        self.target.root::<T>().expect("replica root has the authority's type")
    }

    /// The replica object tracked under the same identifier as `object`
    pub fn replica_of<T: 'static>(&self, object: &SyncRef<T>) -> SyncRef<T> {
        let id = self.authority_id(object);
        self.target
            .resolve::<T>(id)
            .expect("object is tracked on the replica")
    }

    pub fn authority_id<T: 'static>(&self, object: &SyncRef<T>) -> ReferenceId {
        self.source
            .reference_id(object)
            .expect("object is tracked on the authority")
    }

    pub fn events(&mut self) -> Vec<TargetEvent> {
        self.target.take_events()
    }
}
