mod app;
mod protocol;

use std::{thread::sleep, time::Duration};

use app::App;

const FRAMES: u32 = 40;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut app = match App::new() {
        Ok(app) => app,
        Err(error) => {
            log::error!("Could not start the demo: {}", error);
            return;
        }
    };

    for _ in 0..FRAMES {
        if let Err(error) = app.update() {
            log::error!("Demo stopped: {}", error);
            return;
        }
        sleep(Duration::from_millis(25));
    }
}
