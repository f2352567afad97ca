//! Platform boundary: a [`Frontend`] renders the game and collects
//! input, the [`Controller`] owns the rules and the autonomous parties
//! and is stepped once per frame.

use std::time::Duration;

use conquest_ai::AiDriver;
use rand_xoshiro::Xoshiro256StarStar;

pub use conquest_engine::effect::Effect;
pub use conquest_engine::event::Event;
pub use conquest_engine::{Game, GameConfig};

/// Everything platform-specific lives behind this trait: drawing,
/// sounds, and turning raw input into [`Event`]s. The rules never call
/// into a platform directly.
pub trait Frontend {
    /// Next pending input event, if any.
    fn poll_event(&mut self) -> Option<Event>;

    /// Presents one effect produced by the rules: a sound cue, an
    /// invalid-move notice, a dice result.
    fn present(&mut self, game: &Game, effect: &Effect);

    /// Called once per step after all events and effects settled.
    fn render(&mut self, game: &Game);
}

pub struct Controller<F: Frontend> {
    game: Game,
    driver: AiDriver<Xoshiro256StarStar>,
    frontend: F,
}

impl<F: Frontend> Controller<F> {
    pub fn new(config: GameConfig, frontend: F) -> Self {
        let seed = config.seed;
        Self {
            game: Game::new(config),
            driver: AiDriver::seeded(seed),
            frontend,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn frontend_mut(&mut self) -> &mut F {
        &mut self.frontend
    }

    /// One frame: feed pending input to the rules, let the autonomous
    /// parties act, and hand every produced effect to the frontend.
    /// Returns `false` once the game is over.
    pub fn step(&mut self, now: Duration) -> bool {
        while let Some(event) = self.frontend.poll_event() {
            for effect in self.game.handle(event) {
                self.frontend.present(&self.game, &effect);
            }
        }

        if self.driver.poll(&mut self.game, now) {
            for effect in self.game.drain_effects() {
                self.frontend.present(&self.game, &effect);
            }
        }

        self.frontend.render(&self.game);
        !self.game.over()
    }
}
