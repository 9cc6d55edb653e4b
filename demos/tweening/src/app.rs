use std::error::Error;

use log::info;

use synchrony_authority::SourceRoot;
use synchrony_replica::{TargetConfig, TargetEvent, TargetRoot};
use synchrony_shared::{Instant, NoDependencies, SyncRef};

use crate::protocol::{protocol, Ball, Rail};

/// The authority writes a frame once every this many replica updates
const UPDATES_PER_FRAME: u32 = 4;
const STEP: f32 = 1.5;

pub struct App {
    rail: SyncRef<Rail>,
    ball: SyncRef<Ball>,
    direction: f32,
    source: SourceRoot,
    target: TargetRoot,
    update_count: u32,
}

impl App {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        info!("Tweening demo started");

        let ball = SyncRef::new(Ball::default());
        let rail = SyncRef::new(Rail {
            ball: Some(ball.clone()),
            ..Rail::default()
        });

        let mut source = SourceRoot::new(protocol(), &rail)?;
        let frame = source.write_full()?;
        info!("Initial frame is {} bytes", frame.len());

        let target = TargetRoot::new(protocol(), TargetConfig::default(), NoDependencies, &frame)?;

        Ok(App {
            rail,
            ball,
            direction: 1.0,
            source,
            target,
            update_count: 0,
        })
    }

    pub fn update(&mut self) -> Result<(), Box<dyn Error>> {
        if self.update_count % UPDATES_PER_FRAME == 0 {
            self.tick_authority()?;
        }
        self.update_count += 1;

        let now = Instant::now();
        self.target.update(now)?;

        for event in self.target.take_events() {
            match event {
                TargetEvent::Constructed(id) => info!("Replica constructed {}", id),
                TargetEvent::Removed(id) => info!("Replica removed {}", id),
                TargetEvent::EndRead(tick) => info!("Replica read authority tick {}", tick),
                _ => {}
            }
        }

        let replica = self.target.root::<Rail>()?;
        if let Some(ball) = replica.borrow().ball.as_ref() {
            let ball = ball.borrow();
            info!(
                "position {:>6.3} (authority {:>6.3}), factor {:.2}, bounces {}, frames {}",
                ball.position,
                self.ball.borrow().position,
                self.target.interpolation_factor(now),
                ball.bounces,
                ball.reached,
            );
        }
        Ok(())
    }

    fn tick_authority(&mut self) -> Result<(), Box<dyn Error>> {
        let length = self.rail.borrow().length;
        {
            let mut ball = self.ball.borrow_mut();
            let next = ball.position + STEP * self.direction;
            if next <= 0.0 || next >= length {
                self.direction = -self.direction;
                ball.bounces += 1;
            }
            ball.position = next.clamp(0.0, length);
        }

        self.source.advance_tick();
        let frame = self.source.write_changes()?;
        info!("Authority tick {}, diff is {} bytes", self.source.tick(), frame.len());
        self.target.read(&frame)?;
        Ok(())
    }
}
