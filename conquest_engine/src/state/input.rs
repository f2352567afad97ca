use conquest_shared::map::{RegionId, EDGES};
use conquest_shared::party::PartyId;

use crate::connect::friendly_connection;
use crate::effect::{Effect, SoundClip};
use crate::event::Event;
use crate::phase::{GamePhase, MainPhase, Prompt, PromptPurpose};
use crate::state::Game;

impl Game {
    /// Feeds one input event from the input-driven party through the
    /// phase machine and returns the effects it produced.
    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        if self.human.is_none() {
            return Vec::new();
        }
        match self.phase {
            GamePhase::Initialization | GamePhase::GameOver => {}
            GamePhase::Preparation => self.handle_preparation(event),
            GamePhase::Main => self.handle_main(event),
        }
        self.drain_effects()
    }

    fn handle_preparation(&mut self, event: Event) {
        let Event::RegionClicked(region) = event else {
            return;
        };
        let human = self.human.unwrap();
        // Clicks while the opponents place their troops are dropped.
        if self.prep_turn().map(|(actor, _)| actor) == Some(human) {
            self.prep_place(human, region);
        }
    }

    fn handle_main(&mut self, event: Event) {
        let human = self.human.unwrap();

        // Numeric prompts eat keystrokes no matter whose turn it is; the
        // defense prompt in particular opens during an opponent's turn.
        match event {
            Event::Digit(digit) => {
                if let Some(prompt) = &mut self.prompt {
                    prompt.push_digit(digit);
                }
                return;
            }
            Event::Backspace => {
                if let Some(prompt) = &mut self.prompt {
                    prompt.pop_digit();
                }
                return;
            }
            Event::Confirm if self.prompt.is_some() => {
                let prompt = self.prompt.take().unwrap();
                self.finish_prompt(human, prompt);
                return;
            }
            _ => {}
        }

        match self.main_phase[human] {
            MainPhase::TradeInCards | MainPhase::BattleTradeInCards => {
                self.handle_trade_in(human, event)
            }
            MainPhase::Reinforcement => {
                if let Event::RegionClicked(region) = event {
                    self.reinforce(human, region);
                }
            }
            MainPhase::Battle => self.handle_battle(human, event),
            MainPhase::Movement => self.handle_movement(human, event),
            MainPhase::WaitingForOther => {}
        }
    }

    fn finish_prompt(&mut self, human: PartyId, prompt: Prompt) {
        let value = prompt.value;
        match prompt.purpose {
            PromptPurpose::AttackCount => self.confirm_attack_count(human, value),
            PromptPurpose::OccupyCount => {
                if !self.occupy_move(human, value) {
                    self.prompt = Some(Prompt::new(PromptPurpose::OccupyCount));
                }
            }
            PromptPurpose::MoveCount => {
                let from = self.origin.unwrap();
                let to = self.destination.unwrap();
                if !self.move_troops(human, from, to, value) {
                    self.prompt = Some(Prompt::new(PromptPurpose::MoveCount));
                }
            }
            PromptPurpose::DefenseCount => {
                if !self.set_defense_count(value) {
                    self.prompt = Some(Prompt::new(PromptPurpose::DefenseCount));
                }
            }
        }
    }

    /// An invalid attack count drops the whole attack selection rather
    /// than reopening the prompt.
    fn confirm_attack_count(&mut self, human: PartyId, value: u32) {
        let from = self.attacking.unwrap();
        let to = self.defending.unwrap();

        let mut count = value;
        if !(1..=3).contains(&count) {
            self.invalid("Invalid number of attacking armies.");
            count = 0;
        } else if self.regions[from].troops < count {
            self.invalid("Insufficient armies in the attacking region.");
            count = 0;
        } else if self.regions[from].troops < count + 1 {
            self.invalid(
                "Cannot attack with this many armies (at least one must be left behind).",
            );
            count = 0;
        }

        if count == 0 {
            self.attacking = None;
            self.defending = None;
            return;
        }

        self.attack_count = count;
        // When the input-driven party attacks, the defense never needs a
        // prompt: opponents and the neutral faction defend with as many
        // armies as they can.
        self.defense_count = Some(std::cmp::min(2, self.regions[to].troops));
        self.resolve_battle(human);
    }

    fn handle_battle(&mut self, human: PartyId, event: Event) {
        // While the occupy prompt is open, region clicks and the phase
        // skip would corrupt the staged conquest.
        if self.awaiting_occupy {
            return;
        }

        match event {
            Event::RegionClicked(region) => {
                self.prompt = None;
                if !self.select_battle_region(human, region) {
                    return;
                }
                if self.attacking.is_some() && self.defending.is_some() {
                    self.prompt = Some(Prompt::new(PromptPurpose::AttackCount));
                }
            }
            Event::Skip => {
                self.prompt = None;
                self.end_battle_phase(human);
            }
            _ => {}
        }
    }

    fn select_battle_region(&mut self, human: PartyId, region: RegionId) -> bool {
        if self.attacking.is_none() {
            if self.regions[region].owner != Some(human) {
                self.invalid("This region does not belong to you.");
                return false;
            }
            if self.regions[region].troops < 2 {
                self.invalid("To attack, you need at least two armies.");
                return false;
            }
            self.attacking = Some(region);
            self.sound(SoundClip::Confirm);
        } else if self.attacking == Some(region) {
            self.attacking = None;
            self.defending = None;
            self.sound(SoundClip::Cancel);
        } else if self.defending.is_none() {
            if self.regions[region].owner == Some(human) {
                self.invalid("You can only attack enemy-controlled regions.");
                return false;
            }
            // No empty regions during regular gameplay
            assert!(self.regions[region].troops > 0);
            if !EDGES[self.attacking.unwrap()].contains(&region) {
                self.invalid(
                    "You can only attack regions which share a border with the attacking region.",
                );
                return false;
            }
            self.defending = Some(region);
            self.sound(SoundClip::Confirm);
        } else if self.defending == Some(region) {
            self.defending = None;
            self.sound(SoundClip::Cancel);
        } else {
            self.invalid("Battles only involve two regions.");
            return false;
        }
        true
    }

    fn handle_movement(&mut self, human: PartyId, event: Event) {
        match event {
            Event::RegionClicked(region) => {
                self.prompt = None;
                if !self.select_movement_region(human, region) {
                    return;
                }
                if self.origin.is_some() && self.destination.is_some() {
                    self.prompt = Some(Prompt::new(PromptPurpose::MoveCount));
                }
            }
            Event::Skip => {
                self.prompt = None;
                self.end_turn(human);
            }
            _ => {}
        }
    }

    fn select_movement_region(&mut self, human: PartyId, region: RegionId) -> bool {
        if self.origin.is_none() {
            if self.regions[region].owner != Some(human) {
                self.invalid("This region does not belong to you.");
                return false;
            }
            if self.regions[region].troops < 2 {
                self.invalid(
                    "To move troops, you need at least two armies in the origin region.",
                );
                return false;
            }
            self.origin = Some(region);
            self.sound(SoundClip::Confirm);
        } else if self.origin == Some(region) {
            self.origin = None;
            self.destination = None;
            self.sound(SoundClip::Cancel);
        } else if self.destination.is_none() {
            if self.regions[region].owner != Some(human) {
                self.invalid("This region does not belong to you.");
                return false;
            }
            assert!(self.regions[region].troops > 0);
            if !friendly_connection(&self.regions, human, self.origin.unwrap(), region) {
                self.invalid("You cannot move troops through enemy regions.");
                return false;
            }
            self.destination = Some(region);
            self.sound(SoundClip::Confirm);
        } else if self.destination == Some(region) {
            self.destination = None;
            self.sound(SoundClip::Cancel);
        } else {
            self.invalid("Movement is allowed only between two regions.");
            return false;
        }
        true
    }

    fn handle_trade_in(&mut self, human: PartyId, event: Event) {
        match event {
            Event::CardClicked(index) => {
                if index >= self.parties[human].hand.len() {
                    return;
                }
                let selected = self.parties[human].hand.cards()[index].selected;
                self.select_card(human, index, !selected);
            }
            Event::Confirm => {
                self.trade_in_selected(human);
            }
            Event::Skip => {
                self.skip_trade_in(human);
            }
            _ => {}
        }
    }
}
