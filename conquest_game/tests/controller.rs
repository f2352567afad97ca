use std::collections::VecDeque;
use std::time::Duration;

use conquest_engine::phase::GamePhase;
use conquest_game::{Controller, Effect, Event, Frontend, Game, GameConfig};
use conquest_shared::map::RegionId;
use conquest_shared::party::PartyId;

#[derive(Default)]
struct ScriptedFrontend {
    queue: VecDeque<Event>,
    invalid_moves: usize,
}

impl Frontend for ScriptedFrontend {
    fn poll_event(&mut self) -> Option<Event> {
        self.queue.pop_front()
    }

    fn present(&mut self, _: &Game, effect: &Effect) {
        if matches!(effect, Effect::InvalidMove(_)) {
            self.invalid_moves += 1;
        }
    }

    fn render(&mut self, _: &Game) {}
}

#[test]
fn an_autonomous_game_steps_to_its_end() {
    let mut controller = Controller::new(
        GameConfig {
            neutral: false,
            human: None,
            seed: 9,
        },
        ScriptedFrontend::default(),
    );

    let mut now = Duration::ZERO;
    let mut steps = 0;
    while controller.step(now) {
        now += Duration::from_secs(3);
        steps += 1;
        assert!(steps < 100_000);
    }

    assert_eq!(controller.game().phase(), GamePhase::GameOver);
    assert!(controller.game().winner().is_some());
}

#[test]
fn human_clicks_flow_through_the_controller() {
    let mut controller = Controller::new(
        GameConfig {
            neutral: false,
            human: Some(PartyId::Red),
            seed: 2,
        },
        ScriptedFrontend::default(),
    );

    let mut now = Duration::ZERO;
    let mut steps = 0;
    while controller.game().phase() == GamePhase::Preparation {
        if let Some((actor, placing)) = controller.game().prep_turn() {
            if actor == PartyId::Red {
                // Claim the first open region, then pile onto an own one
                let game = controller.game();
                let region = RegionId::ALL
                    .into_iter()
                    .find(|&x| game.regions[x].troops == 0)
                    .or_else(|| {
                        RegionId::ALL
                            .into_iter()
                            .find(|&x| game.regions[x].owner == Some(placing))
                    })
                    .unwrap();
                controller
                    .frontend_mut()
                    .queue
                    .push_back(Event::RegionClicked(region));
            }
        }

        controller.step(now);
        now += Duration::from_secs(1);
        steps += 1;
        assert!(steps < 1_000);
    }

    assert_eq!(controller.game().phase(), GamePhase::Main);
    assert_eq!(controller.frontend_mut().invalid_moves, 0);
}
