//! Pulpit Run headless driver
//!
//! Runs the board with a scripted player on a fixed timestep and reports the
//! final score. Usage: `pulpit-run [diary.json] [seed]`

use pulpit_run::consts::*;
use pulpit_run::{Session, Settings};

/// Simulated seconds a demo run lasts
const RUN_SECONDS: f32 = 90.0;
/// Frame time the driver pretends the host delivers
const FRAME_DT: f32 = 1.0 / 50.0;
/// Player hops once its pulpit has less than this left
const HOP_MARGIN: f32 = 0.75;

struct Driver {
    session: Session,
    accumulator: f32,
    /// Remaining travel time to the pulpit being hopped to
    in_flight: Option<f32>,
}

impl Driver {
    fn new(session: Session) -> Self {
        Self {
            session,
            accumulator: 0.0,
            in_flight: None,
        }
    }

    /// Run simulation ticks for one host frame
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.session.tick(SIM_DT);
            self.steer(SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
    }

    /// Scripted player: hop to the newest pulpit when the current one is about to go
    fn steer(&mut self, dt: f32) {
        if self.session.game_over().is_over() {
            return;
        }

        let manager = self.session.manager();
        let current = self.session.current_pulpit().and_then(|id| manager.get(id));
        let newest = manager.active().last().map(|p| p.id());

        if let Some(left) = self.in_flight.as_mut() {
            *left -= dt;
            if *left > 0.0 {
                return;
            }
            self.in_flight = None;
            if let Some(id) = newest {
                if let Some(from) = self.session.current_pulpit() {
                    self.session.player_exit(from);
                }
                self.session.player_enter(id);
            }
            return;
        }

        match current {
            Some(pulpit) if pulpit.remaining() > HOP_MARGIN => {}
            Some(pulpit) if newest != Some(pulpit.id()) => {
                let speed = self.session.settings().player_data.speed.max(0.1);
                let step = self.session.manager().tuning().grid_step;
                self.in_flight = Some((step / speed).min(HOP_MARGIN * 0.5));
            }
            Some(_) => {}
            None => {
                // Standing on nothing
                self.session.observe_player_height(FALL_THRESHOLD - 1.0);
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let diary = args.next().unwrap_or_else(|| "DoofusDiary.json".to_string());
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);

    let settings = Settings::load_or_default(&diary);
    let mut session = Session::new(settings, seed);
    let first = match session.start() {
        Ok(id) => id,
        Err(err) => {
            log::error!("Cannot start: {}", err);
            std::process::exit(1);
        }
    };
    session.player_enter(first);

    let mut driver = Driver::new(session);
    let mut elapsed = 0.0;
    while elapsed < RUN_SECONDS && !driver.session.game_over().is_over() {
        driver.update(FRAME_DT);
        elapsed += FRAME_DT;
    }

    let session = &driver.session;
    println!(
        "seed {}: score {} after {:.1}s ({} pulpits spawned, {} live){}",
        session.seed(),
        session.score(),
        session.manager().now(),
        session.manager().spawned_total(),
        session.manager().active_count(),
        if session.game_over().is_over() { ", fell" } else { "" }
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {}
