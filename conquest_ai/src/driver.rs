//! Frame-style driver that plays every autonomous party.

use std::time::Duration;

use conquest_engine::phase::{GamePhase, MainPhase};
use conquest_engine::Game;
use conquest_shared::party::PartyId;
use rand::Rng;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

use crate::policy;

/// Delay between consecutive autonomous actions.
pub const ACTION_PACE: Duration = Duration::from_secs(1);

/// How long selected trade-in cards stay on display before the commit.
pub const TRADE_IN_REVIEW: Duration = Duration::from_secs(3);

/// Polled once per frame with the current clock; performs at most one
/// game action per call so the autonomous parties play at a watchable
/// pace. A frontend without pacing needs can feed it an ever-growing
/// synthetic clock instead.
pub struct AiDriver<R: Rng> {
    rng: R,
    ready_at: Duration,
    commit_at: Option<Duration>,
}

impl AiDriver<Xoshiro256StarStar> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(Xoshiro256StarStar::seed_from_u64(seed))
    }
}

impl<R: Rng> AiDriver<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            ready_at: Duration::ZERO,
            commit_at: None,
        }
    }

    /// Performs the next pending autonomous action, if its time has
    /// come. Returns whether anything happened.
    pub fn poll(&mut self, game: &mut Game, now: Duration) -> bool {
        if now < self.ready_at {
            return false;
        }
        match game.phase() {
            GamePhase::Preparation => self.poll_preparation(game, now),
            GamePhase::Main => self.poll_main(game, now),
            _ => false,
        }
    }

    /// Runs an all-autonomous game to its end on a synthetic clock.
    pub fn run_to_completion(&mut self, game: &mut Game) -> Option<PartyId> {
        assert!(game.human().is_none());

        let mut now = Duration::ZERO;
        let mut stalls = 0;
        while !game.over() {
            if self.poll(game, now) {
                stalls = 0;
            } else {
                stalls += 1;
                assert!(stalls < 4, "Autonomous game stopped making progress");
            }
            now += TRADE_IN_REVIEW;
            game.drain_effects();
        }
        game.winner()
    }

    fn pace(&mut self, now: Duration) {
        self.ready_at = now + ACTION_PACE;
    }

    fn poll_preparation(&mut self, game: &mut Game, now: Duration) -> bool {
        let Some((actor, placing)) = game.prep_turn() else {
            return false;
        };
        if !game.party(actor).info.autonomous {
            return false;
        }

        let target = if Some(placing) == game.neutral_party() {
            policy::neutral_placement_target(game, actor)
        } else if game.regions.values().any(|x| x.troops == 0) {
            policy::claim_target(game, &mut self.rng)
        } else {
            policy::reinforcement_target(game, actor)
        };

        assert!(game.prep_place(actor, target.unwrap()));
        self.pace(now);
        true
    }

    fn poll_main(&mut self, game: &mut Game, now: Duration) -> bool {
        let Some(p) = game.active_party() else {
            return false;
        };
        if !game.party(p).info.autonomous {
            return false;
        }
        if game.defense_pending() {
            // The defense count is the input-driven party's choice.
            return false;
        }

        match game.main_phase(p) {
            MainPhase::TradeInCards | MainPhase::BattleTradeInCards => {
                self.poll_trade_in(game, p, now)
            }
            MainPhase::Reinforcement => {
                let target = policy::reinforcement_target(game, p).unwrap();
                assert!(game.reinforce(p, target));
                self.pace(now);
                true
            }
            MainPhase::Battle => self.poll_battle(game, p, now),
            MainPhase::Movement => {
                match policy::movement_plan(game, p) {
                    Some(plan) => {
                        assert!(game.move_troops(p, plan.from, plan.to, plan.count));
                    }
                    None => game.end_turn(p),
                }
                self.pace(now);
                true
            }
            MainPhase::WaitingForOther => false,
        }
    }

    fn poll_battle(&mut self, game: &mut Game, p: PartyId, now: Duration) -> bool {
        if game.occupy_pending() {
            let count = policy::occupy_count(game, p);
            assert!(game.occupy_move(p, count));
            self.pace(now);
            return true;
        }

        // A staged battle whose defense count has been settled resolves
        // on the next tick.
        if game.attacking().is_some() && game.defending().is_some() {
            game.resolve_battle(p);
            self.pace(now);
            return true;
        }

        match policy::battle_plan(game, p, &mut self.rng) {
            Some(plan) => game.stage_attack(p, plan.from, plan.to, plan.count),
            None => game.end_battle_phase(p),
        }
        self.pace(now);
        true
    }

    fn poll_trade_in(&mut self, game: &mut Game, p: PartyId, now: Duration) -> bool {
        let forced = game.main_phase(p) == MainPhase::BattleTradeInCards;

        if let Some(commit_at) = self.commit_at {
            if now < commit_at {
                return false;
            }
            self.commit_at = None;
            assert!(game.trade_in_selected(p));
            self.pace(now);
            return true;
        }

        match policy::trade_in_selection(game, p, forced) {
            Some(indices) => {
                for index in indices {
                    game.select_card(p, index, true);
                }
                // Leave the selection on display before committing.
                self.commit_at = Some(now + TRADE_IN_REVIEW);
            }
            None => {
                assert!(game.skip_trade_in(p));
                self.pace(now);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conquest_engine::GameConfig;

    #[test]
    fn a_two_party_game_plays_itself_out() {
        let mut game = Game::new(GameConfig {
            neutral: false,
            human: None,
            seed: 42,
        });
        let mut driver = AiDriver::seeded(42);
        let winner = driver.run_to_completion(&mut game);
        assert!(winner.is_some());
        assert!(game.over());
    }

    #[test]
    fn the_neutral_variant_plays_itself_out() {
        let mut game = Game::new(GameConfig {
            neutral: true,
            human: None,
            seed: 7,
        });
        let mut driver = AiDriver::seeded(7);
        let winner = driver.run_to_completion(&mut game);
        // The neutral faction never takes a turn, so it cannot win
        assert_ne!(winner, game.neutral_party());
        assert!(winner.is_some());
    }

    #[test]
    fn the_driver_leaves_the_input_driven_party_alone() {
        use conquest_shared::map::RegionId;

        let mut game = Game::new(GameConfig {
            neutral: false,
            human: Some(PartyId::Red),
            seed: 3,
        });
        let mut driver = AiDriver::seeded(3);

        // Red opens the preparation phase and is not autonomous, so the
        // driver stays idle until Red has placed
        assert!(!game.party(PartyId::Red).info.autonomous);
        assert!(!driver.poll(&mut game, Duration::ZERO));
        assert!(game.prep_place(PartyId::Red, RegionId::Mithlond));
        assert!(driver.poll(&mut game, Duration::ZERO));
    }

    #[test]
    fn polls_before_the_pace_interval_do_nothing() {
        let mut game = Game::new(GameConfig {
            neutral: false,
            human: None,
            seed: 1,
        });
        let mut driver = AiDriver::seeded(1);
        assert!(driver.poll(&mut game, Duration::ZERO));
        assert!(!driver.poll(&mut game, Duration::from_millis(500)));
        assert!(driver.poll(&mut game, ACTION_PACE));
    }
}
