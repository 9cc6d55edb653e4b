use synchrony_shared::{CallbackMode, SchemaBuilder, SyncCallback, SyncPolicy, SyncProtocol};

/// A ball sliding back and forth along a rail
#[derive(Default)]
pub struct Ball {
    pub position: f32,
    pub bounces: u32,
    pub reached: u32,
}

pub struct Rail {
    pub length: f32,
    pub ball: Option<synchrony_shared::SyncRef<Ball>>,
}

impl Default for Rail {
    fn default() -> Self {
        Self {
            length: 10.0,
            ball: None,
        }
    }
}

pub fn protocol() -> SyncProtocol {
    let mut protocol = SyncProtocol::builder();
    protocol
        .add_type(
            SchemaBuilder::<Rail>::new("Rail")
                .value("length", SyncPolicy::Construction, |r| r.length, |r, v| r.length = v)
                .reference("ball", SyncPolicy::TakeSynchronized, |r| r.ball.clone(), |r, v| r.ball = v)
                .default_constructor(),
        )
        .add_type(
            SchemaBuilder::<Ball>::new("Ball")
                .value("position", SyncPolicy::Interpolated, |b| b.position, |b, v| b.position = v)
                .value("bounces", SyncPolicy::HighestTick, |b| b.bounces, |b, v| b.bounces = v)
                .default_constructor()
                .on_synchronized(SyncCallback::new(
                    "count_frames",
                    CallbackMode::EveryUpdate,
                    |b: &mut Ball| b.reached += 1,
                )),
        );
    protocol.build()
}
