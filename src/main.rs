//! Rewind Arena headless demo
//!
//! Runs a scripted two-player match on the particle engine and logs the
//! per-owner counts. Rendering and real input belong to the game shell; here
//! a seeded RNG stands in for the keyboard.

use std::rc::Rc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use rewind_arena::EngineSettings;
use rewind_arena::sim::{Color, ParticleManager, ParticleOwner, Player, Vector2};

/// Frames to simulate
const MATCH_FRAMES: u64 = 400;
/// Player A fires its time well this often
const WELL_INTERVAL: u64 = 40;
/// Scripted input changes this often
const INPUT_INTERVAL: u64 = 10;
const SEED: u64 = 0x5eed;

/// Movement forces, matching the arrow/WASD bindings
const MOVES: [Vector2; 5] = [
    Vector2::new(1.0, 0.0),
    Vector2::new(-1.0, 0.0),
    Vector2::new(0.0, -1.0),
    Vector2::new(0.0, 1.0),
    Vector2::ZERO,
];

/// Match instance holding all state
struct Match {
    manager: ParticleManager,
    players: Vec<Rc<Player>>,
    rng: Pcg32,
    frame: u64,
}

impl Match {
    fn new(settings: EngineSettings, seed: u64) -> rewind_arena::Result<Self> {
        let (w, h) = settings.world_extent;
        let mut manager = ParticleManager::from_settings(settings)?;

        let players = vec![
            Rc::new(Player::new(
                "playerA",
                Color::rgb(255, 0, 0),
                Vector2::new(50.0, 50.0),
            )),
            Rc::new(Player::new(
                "playerB",
                Color::rgb(0, 0, 255),
                Vector2::new(w as f64 - 50.0, h as f64 - 50.0),
            )),
        ];
        for player in &players {
            manager.enqueue(player.spawn_swarm());
        }
        manager.commit()?;

        Ok(Self {
            manager,
            players,
            rng: Pcg32::seed_from_u64(seed),
            frame: 0,
        })
    }

    /// Advance one frame: input, player cores, particles, skills
    fn update(&mut self) -> rewind_arena::Result<()> {
        self.frame += 1;

        if self.frame % INPUT_INTERVAL == 0 {
            for player in &self.players {
                let force = MOVES[self.rng.random_range(0..MOVES.len())];
                player.set_input_force(force);
            }
        }

        for player in &self.players {
            player.step()?;
        }
        let summary = self.manager.tick()?;
        if summary.dropped() > 0 {
            log::debug!("frame {}: {} particles left the arena", self.frame, summary.dropped());
        }

        if self.frame % WELL_INTERVAL == 0 {
            let well = self.players[0].time_well();
            let rewound = self.manager.rewind_by(well.as_period_fn())?;
            log::info!(
                "frame {}: {} fires a time well at ({:.1}, {:.1}), {} cells rewound",
                self.frame,
                self.players[0].identity(),
                well.center.x,
                well.center.y,
                rewound
            );
        }
        Ok(())
    }

    fn report(&self) {
        log::info!("frame {}: {}", self.frame, self.manager.summary());
    }
}

fn run() -> rewind_arena::Result<()> {
    // Coarser cells than the default keep the demo's history small
    let settings = EngineSettings {
        cell_interval: (8, 8),
        ..EngineSettings::default()
    };
    let mut game = Match::new(settings, SEED)?;
    game.report();

    while game.frame < MATCH_FRAMES {
        game.update()?;
        if game.frame % 100 == 0 {
            game.report();
        }
    }

    let vertices = game.manager.vertices();
    log::info!(
        "Match over: {} particles on screen ({} vertex bytes)",
        vertices.len(),
        bytemuck::cast_slice::<_, u8>(&vertices).len()
    );
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Rewind Arena (headless) starting...");

    if let Err(e) = run() {
        log::error!("Simulation failed: {e}");
        std::process::exit(1);
    }
}
