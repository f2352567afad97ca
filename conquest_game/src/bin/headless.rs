//! Seeded AI-vs-AI game without a frontend. Usage:
//!
//!     headless [seed] [--neutral]

use conquest_ai::AiDriver;
use conquest_engine::{Game, GameConfig};
use rand::RngCore;

fn main() {
    let mut seed = None;
    let mut neutral = false;
    for arg in std::env::args().skip(1) {
        if arg == "--neutral" {
            neutral = true;
        } else {
            seed = Some(arg.parse().expect("seed must be an integer"));
        }
    }
    let seed = seed.unwrap_or_else(|| rand::thread_rng().next_u64());

    let mut game = Game::new(GameConfig {
        neutral,
        human: None,
        seed,
    });
    let mut driver = AiDriver::seeded(seed);
    let winner = driver
        .run_to_completion(&mut game)
        .expect("a finished game has a winner");

    println!("Seed {seed}: {} wins", winner.name());
}
