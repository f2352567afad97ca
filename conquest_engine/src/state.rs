use conquest_shared::map::{ContinentId, RegionId, EDGES, REGION_COUNT};
use conquest_shared::party::{Party, PartyId, MAX_PARTIES};
use conquest_shared::{Card, Region};
use enum_map::EnumMap;
use rand::prelude::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

use crate::cards::{is_valid_set, Deck, Hand};
use crate::combat;
use crate::connect::friendly_connection;
use crate::effect::{Effect, SoundClip};
use crate::phase::{GamePhase, MainPhase, Prompt, PromptPurpose};
use crate::{trade_in_bonus, MAX_HAND_SIZE};

mod input;

/// Initial army counts for the full-size 42-region map, indexed by party
/// count. Scaled down to the regions actually in play, rounding up.
const INITIAL_TROOPS_REFERENCE: [u32; MAX_PARTIES + 1] = [0, 45, 35, 30];

#[derive(Clone, Copy, Debug)]
pub struct GameConfig {
    /// Adds a third faction that defends its regions and passively gains
    /// troops, but never takes a turn. Starting regions are then dealt at
    /// random instead of being claimed one by one.
    pub neutral: bool,
    /// Which party is driven by input events; `None` runs every party
    /// under the opponent policy.
    pub human: Option<PartyId>,
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            neutral: true,
            human: Some(PartyId::Red),
            seed: 0,
        }
    }
}

pub struct PartyState {
    pub info: Party,
    pub in_play: bool,
    pub defeated: bool,
    /// Troops granted but not yet placed on the map.
    pub pool: u32,
    pub hand: Hand,
}

/// The whole game state plus the phase machine driving it. All rule-level
/// mutation goes through the operations on this type; they validate the
/// acting party's move and report rule violations as
/// [`Effect::InvalidMove`] without touching the state.
pub struct Game {
    pub regions: EnumMap<RegionId, Region>,
    parties: EnumMap<PartyId, PartyState>,
    deck: Deck,
    phase: GamePhase,
    main_phase: EnumMap<PartyId, MainPhase>,
    human: Option<PartyId>,

    // Preparation rotation: whose placement cycle it is and how far into
    // the cycle they are. With a neutral faction a cycle is two own
    // placements plus one neutral placement, otherwise a single one.
    prep_active: PartyId,
    prep_index: u32,

    attacking: Option<RegionId>,
    defending: Option<RegionId>,
    attack_count: u32,
    defense_count: Option<u32>,
    /// A conquest happened and the attacker may still move extra troops
    /// into the captured region.
    awaiting_occupy: bool,
    /// The attacker absorbed an eliminated opponent's hand and must trade
    /// in cards once the pending occupy move is done.
    forced_trade_in: bool,

    origin: Option<RegionId>,
    destination: Option<RegionId>,

    prompt: Option<Prompt>,
    card_earned: bool,
    trade_in_sets: u32,

    rng: Xoshiro256StarStar,
    effects: Vec<Effect>,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        let party_count = if config.neutral { MAX_PARTIES } else { 2 };

        let parties = EnumMap::from_fn(|id: PartyId| {
            let in_play = (id as usize) < party_count;
            let info = if config.neutral && id as usize == party_count - 1 {
                Party::neutral(id)
            } else if Some(id) == config.human {
                Party::human(id)
            } else {
                Party::ai(id)
            };
            PartyState {
                info,
                in_play,
                // Out-of-play parties count as defeated so the turn
                // rotation and the win check skip them uniformly.
                defeated: !in_play,
                pool: 0,
                hand: Hand::default(),
            }
        });

        if let Some(human) = config.human {
            assert!(
                parties[human].in_play && parties[human].info.takes_turns,
                "The input-driven party must be a regular one"
            );
        }

        let mut game = Game {
            regions: EnumMap::from_fn(Region::new),
            parties,
            deck: Deck::default(),
            phase: GamePhase::Initialization,
            main_phase: EnumMap::from_fn(|_| MainPhase::WaitingForOther),
            human: config.human,
            prep_active: PartyId::Red,
            prep_index: 0,
            attacking: None,
            defending: None,
            attack_count: 0,
            defense_count: None,
            awaiting_occupy: false,
            forced_trade_in: false,
            origin: None,
            destination: None,
            prompt: None,
            card_earned: false,
            trade_in_sets: 0,
            rng: Xoshiro256StarStar::seed_from_u64(config.seed),
            effects: Vec::new(),
        };
        game.begin_preparation();
        game
    }

    fn begin_preparation(&mut self) {
        assert_eq!(self.phase, GamePhase::Initialization);

        let party_count = self.parties.values().filter(|x| x.in_play).count();
        let initial =
            (INITIAL_TROOPS_REFERENCE[party_count] * REGION_COUNT as u32).div_ceil(42);
        for party in self.parties.values_mut().filter(|x| x.in_play) {
            party.pool = initial;
        }

        if let Some(neutral) = self.neutral_party() {
            // Nobody chooses their starting regions; they are dealt from a
            // shuffled stack, one per party and round. A single leftover
            // region goes to the neutral faction; with exactly one region
            // short of a full round, the neutral faction sits it out.
            let mut stack = Vec::from(RegionId::ALL);
            stack.shuffle(&mut self.rng);

            let mut i = 0;
            while i < stack.len() {
                let left = stack.len() - i;
                if left == 1 {
                    self.deal_region(stack[i], neutral);
                    i += 1;
                } else if left == party_count - 1 {
                    for p in PartyId::ALL {
                        if self.parties[p].in_play && p != neutral {
                            self.deal_region(stack[i], p);
                            i += 1;
                        }
                    }
                } else {
                    for p in PartyId::ALL {
                        if i >= stack.len() {
                            break;
                        }
                        if self.parties[p].in_play {
                            self.deal_region(stack[i], p);
                            i += 1;
                        }
                    }
                }
            }

            // Round the neutral pool up so the regular parties place the
            // same number of neutral troops each.
            let placers = (party_count - 1) as u32;
            let rest = self.parties[neutral].pool % placers;
            if rest != 0 {
                self.parties[neutral].pool += placers - rest;
            }
        }

        self.phase = GamePhase::Preparation;
    }

    fn deal_region(&mut self, region: RegionId, p: PartyId) {
        self.regions[region].owner = Some(p);
        self.regions[region].troops = 1;
        self.parties[p].pool -= 1;
    }

    fn begin_main(&mut self) {
        self.phase = GamePhase::Main;
        self.deck = Deck::shuffled(&mut self.rng);
        for p in PartyId::ALL {
            self.main_phase[p] = MainPhase::WaitingForOther;
        }
        self.switch_main_phase(PartyId::Red, MainPhase::START);
    }

    fn switch_main_phase(&mut self, p: PartyId, new: MainPhase) {
        match new {
            MainPhase::WaitingForOther => {
                if self.phase == GamePhase::Main {
                    let np = self.next_turn_taker(p);
                    self.switch_main_phase(np, MainPhase::START);
                    if np == p {
                        // Sole remaining party; it keeps the turn.
                        return;
                    }
                }
            }
            MainPhase::TradeInCards => {
                if !self.parties[p].hand.has_any_set() {
                    self.switch_main_phase(p, MainPhase::Reinforcement);
                    return;
                }
            }
            MainPhase::BattleTradeInCards => {
                assert!(self.parties[p].hand.has_any_set());
            }
            MainPhase::Reinforcement => {
                let mut regions_taken = 0;
                let mut continents_taken: EnumMap<ContinentId, bool> =
                    EnumMap::from_fn(|_| true);
                for region in self.regions.values() {
                    if region.owner == Some(p) {
                        regions_taken += 1;
                    } else {
                        continents_taken[region.id.continent()] = false;
                    }
                }

                // Minimum of 2 rather than the usual 3; the map is much
                // smaller than the full 42 regions.
                let mut grant = std::cmp::max(2, regions_taken / 3);
                for continent in ContinentId::ALL {
                    if continents_taken[continent] {
                        grant += continent.bonus();
                    }
                }
                self.parties[p].pool += grant;
            }
            MainPhase::Battle => {}
            MainPhase::Movement => {
                // The card for conquering at least one region this turn is
                // drawn when the battle phase closes, whether or not any
                // troops end up being moved.
                if self.card_earned {
                    self.draw_card(p);
                    self.card_earned = false;
                }
            }
        }

        self.main_phase[p] = new;
    }

    fn next_turn_taker(&self, p: PartyId) -> PartyId {
        let mut np = p.next();
        loop {
            let state = &self.parties[np];
            if !state.defeated && state.info.takes_turns {
                return np;
            }
            assert_ne!(np, p, "No party can take a turn");
            np = np.next();
        }
    }

    fn draw_card(&mut self, p: PartyId) {
        // An exhausted stack simply stops producing cards.
        if let Some(card) = self.deck.draw() {
            assert!(self.parties[p].hand.len() < MAX_HAND_SIZE);
            self.parties[p].hand.push(card);
        }
    }

    // ---- Preparation ----

    /// During preparation: whose input is awaited, and which party's pool
    /// the next placement draws from (the neutral faction's troops are
    /// placed by the regular parties).
    pub fn prep_turn(&self) -> Option<(PartyId, PartyId)> {
        if self.phase != GamePhase::Preparation {
            return None;
        }
        let placing = if self.prep_index == 2 {
            self.neutral_party().unwrap()
        } else {
            self.prep_active
        };
        Some((self.prep_active, placing))
    }

    /// Places one troop during preparation: claiming an unclaimed region,
    /// reinforcing an own region, or reinforcing a neutral region when the
    /// cycle asks for it.
    pub fn prep_place(&mut self, actor: PartyId, region: RegionId) -> bool {
        let Some((active, placing)) = self.prep_turn() else {
            return false;
        };
        if actor != active {
            // Not this party's placement cycle; the click is dropped.
            return false;
        }
        assert!(self.parties[placing].pool > 0);

        let unclaimed = self.regions.values().filter(|x| x.troops == 0).count();
        if self.neutral_party().is_some() {
            // The random deal claimed everything up front.
            assert!(unclaimed == 0 && self.regions[region].troops > 0);
        }

        if self.regions[region].troops > 0 {
            if self.regions[region].owner != Some(placing) {
                self.invalid(if placing == actor {
                    "Cannot place troops on enemy-controlled region."
                } else {
                    "Cannot place troops on non-neutral region."
                });
                return false;
            }
            if unclaimed > 0 {
                self.invalid(
                    "All regions must be taken before you can place reinforcements.",
                );
                return false;
            }
            self.regions[region].troops += 1;
        } else {
            self.regions[region].owner = Some(placing);
            self.regions[region].troops = 1;
        }

        self.parties[placing].pool -= 1;
        self.sound(SoundClip::Reinforcements);
        self.advance_preparation();
        true
    }

    fn advance_preparation(&mut self) {
        if self.parties.values().all(|x| x.pool == 0) {
            self.begin_main();
            return;
        }

        let cycle_len = if self.neutral_party().is_some() { 3 } else { 1 };
        loop {
            self.prep_index += 1;
            if self.prep_index >= cycle_len {
                self.prep_index = 0;
                self.prep_active = self.next_turn_taker(self.prep_active);
            }
            let placing = if self.prep_index == 2 {
                self.neutral_party().unwrap()
            } else {
                self.prep_active
            };
            // Slots whose pool has run dry are skipped; some pool is
            // non-empty, so this terminates.
            if self.parties[placing].pool > 0 {
                break;
            }
        }
    }

    // ---- Main phase operations ----

    /// Places one troop from the pool. Ends the reinforcement step once
    /// the pool runs dry.
    pub fn reinforce(&mut self, p: PartyId, region: RegionId) -> bool {
        assert_eq!(self.main_phase[p], MainPhase::Reinforcement);
        assert!(self.parties[p].pool > 0);
        assert!(self.regions[region].troops > 0);

        if self.regions[region].owner != Some(p) {
            self.invalid("Cannot place troops on enemy-controlled region.");
            return false;
        }

        self.regions[region].troops += 1;
        self.parties[p].pool -= 1;
        self.sound(SoundClip::Reinforcements);

        if self.parties[p].pool == 0 {
            self.switch_main_phase(p, MainPhase::Battle);
        }
        true
    }

    /// Stages an attack on behalf of an autonomous party. The defense
    /// count is chosen automatically unless the defender is controlled by
    /// the input-driven party (directly, or as the neutral faction's
    /// caretaker), in which case a prompt is opened and the battle stays
    /// pending until [`Game::set_defense_count`] succeeds.
    pub fn stage_attack(&mut self, p: PartyId, from: RegionId, to: RegionId, count: u32) {
        assert_eq!(self.main_phase[p], MainPhase::Battle);
        assert_eq!(self.regions[from].owner, Some(p));
        assert_ne!(self.regions[to].owner, Some(p));
        assert!(EDGES[from].contains(&to));
        assert!((1..=3).contains(&count) && self.regions[from].troops > count);

        self.attacking = Some(from);
        self.defending = Some(to);
        self.attack_count = count;

        let defender = self.regions[to].owner.unwrap();
        let human_defends = self.human.is_some()
            && (Some(defender) == self.human || self.parties[defender].info.is_neutral());

        if human_defends && self.regions[to].troops > 1 {
            self.defense_count = None;
            self.prompt = Some(Prompt::new(PromptPurpose::DefenseCount));
            self.notify(if Some(defender) == self.human {
                "Choose how many armies you want to defend with."
            } else {
                "Choose how many neutral armies should be used for defense."
            });
            self.sound(SoundClip::Notification);
        } else {
            self.defense_count = Some(std::cmp::min(2, self.regions[to].troops));
        }
        self.sound(SoundClip::Confirm);
    }

    /// Whether a staged battle is blocked on a defense-count choice.
    pub fn defense_pending(&self) -> bool {
        self.defending.is_some() && self.attack_count > 0 && self.defense_count.is_none()
    }

    pub fn set_defense_count(&mut self, count: u32) -> bool {
        assert!(self.defense_pending());
        let to = self.defending.unwrap();

        if !(1..=2).contains(&count) {
            self.invalid("Invalid number of defending armies.");
            return false;
        }
        if self.regions[to].troops < count {
            self.invalid("Not enough armies in the defending region.");
            return false;
        }

        self.defense_count = Some(count);
        true
    }

    /// Rolls the dice for the staged battle and applies the losses.
    /// Returns whether the defending region was conquered; if so, the
    /// surviving attack troops have already moved in and an extra occupy
    /// move may still be pending.
    pub fn resolve_battle(&mut self, p: PartyId) -> bool {
        assert_eq!(self.main_phase[p], MainPhase::Battle);
        let from = self.attacking.unwrap();
        let to = self.defending.unwrap();
        let attack_count = self.attack_count;
        let defense_count = self.defense_count.unwrap();
        assert!((1..=3).contains(&attack_count) && (1..=2).contains(&defense_count));

        let attacker_dice = combat::roll_sorted(&mut self.rng, attack_count as usize);
        let defender_dice = combat::roll_sorted(&mut self.rng, defense_count as usize);
        let losses = combat::paired_losses(&attacker_dice, &defender_dice);
        self.effects.push(Effect::DiceRolled {
            attacker: attacker_dice,
            defender: defender_dice,
        });

        self.regions[from].troops -= losses.attacker;
        self.regions[to].troops -= losses.defender;

        if self.regions[to].troops > 0 {
            self.sound(SoundClip::Battle);
            self.clear_battle_selection();
            return false;
        }

        let survivors = attack_count - losses.attacker;
        let defender = self.regions[to].owner.unwrap();

        self.regions[to].owner = Some(p);
        self.regions[from].troops -= survivors;
        self.regions[to].troops += survivors;
        self.sound(SoundClip::Capture);
        self.card_earned = true;

        assert!(!self.parties[defender].defeated);
        self.check_win_condition();

        if self.parties[defender].defeated && self.phase != GamePhase::GameOver {
            let mut loser_hand = std::mem::take(&mut self.parties[defender].hand);
            self.parties[p].hand.absorb(&mut loser_hand);
            if self.parties[p].hand.len() >= MAX_HAND_SIZE {
                self.forced_trade_in = true;
            }
        }

        if self.phase == GamePhase::GameOver {
            return true;
        }

        self.awaiting_occupy = self.regions[from].troops > 1;
        if self.awaiting_occupy {
            if Some(p) == self.human {
                self.prompt = Some(Prompt::new(PromptPurpose::OccupyCount));
            }
        } else {
            self.finish_conquest(p);
        }
        true
    }

    /// Whether a conquest still allows moving extra troops from the
    /// attacking region.
    pub fn occupy_pending(&self) -> bool {
        self.awaiting_occupy
    }

    /// Moves `count` extra troops into the freshly conquered region.
    /// Zero is a valid choice.
    pub fn occupy_move(&mut self, p: PartyId, count: u32) -> bool {
        assert!(self.awaiting_occupy);
        let from = self.attacking.unwrap();
        let to = self.defending.unwrap();
        assert_eq!(self.regions[from].owner, Some(p));

        if self.regions[from].troops < count {
            self.invalid("Insufficient armies in the attacking region.");
            return false;
        }
        if self.regions[from].troops == count {
            self.invalid("At least one army has to stay behind.");
            return false;
        }

        self.regions[from].troops -= count;
        self.regions[to].troops += count;
        if count > 0 {
            self.sound(SoundClip::Reinforcements);
        }
        self.finish_conquest(p);
        true
    }

    fn clear_battle_selection(&mut self) {
        self.attacking = None;
        self.defending = None;
        self.attack_count = 0;
        self.defense_count = None;
    }

    fn finish_conquest(&mut self, p: PartyId) {
        self.clear_battle_selection();
        self.awaiting_occupy = false;
        if self.forced_trade_in {
            self.forced_trade_in = false;
            self.switch_main_phase(p, MainPhase::BattleTradeInCards);
        }
    }

    /// Closes the battle phase and moves on to troop movement.
    pub fn end_battle_phase(&mut self, p: PartyId) {
        assert_eq!(self.main_phase[p], MainPhase::Battle);
        assert!(!self.awaiting_occupy);
        self.clear_battle_selection();
        self.switch_main_phase(p, MainPhase::Movement);
    }

    /// The end-of-turn movement: any number of troops (but one stays
    /// behind) from one region to another one connected through friendly
    /// territory. Ends the turn.
    pub fn move_troops(&mut self, p: PartyId, from: RegionId, to: RegionId, count: u32) -> bool {
        assert_eq!(self.main_phase[p], MainPhase::Movement);
        assert_eq!(self.regions[from].owner, Some(p));
        assert_eq!(self.regions[to].owner, Some(p));
        assert!(friendly_connection(&self.regions, p, from, to));

        if count == 0 {
            self.invalid("Invalid number of armies to move.");
            return false;
        }
        if self.regions[from].troops < count {
            self.invalid("Insufficient armies in the origin region.");
            return false;
        }
        if self.regions[from].troops == count {
            self.invalid("At least one army has to stay behind.");
            return false;
        }

        self.regions[from].troops -= count;
        self.regions[to].troops += count;
        self.sound(SoundClip::Movement);

        self.origin = None;
        self.destination = None;
        self.switch_main_phase(p, MainPhase::WaitingForOther);
        true
    }

    /// Ends the turn without moving troops.
    pub fn end_turn(&mut self, p: PartyId) {
        assert_eq!(self.main_phase[p], MainPhase::Movement);
        self.origin = None;
        self.destination = None;
        self.switch_main_phase(p, MainPhase::WaitingForOther);
    }

    // ---- Trade-in ----

    pub fn select_card(&mut self, p: PartyId, index: usize, selected: bool) {
        assert!(self.main_phase[p].is_trade_in());
        self.parties[p].hand.set_selected(index, selected);
        self.sound(if selected {
            SoundClip::Confirm
        } else {
            SoundClip::Cancel
        });
    }

    /// Trades in the three selected cards. On success the trader's pool
    /// grows by the escalating set bonus, and every traded card whose
    /// region the trader owns puts two troops directly on that region.
    pub fn trade_in_selected(&mut self, p: PartyId) -> bool {
        assert!(self.main_phase[p].is_trade_in());

        let selected: Vec<Card> = self.parties[p].hand.selected().collect();
        if selected.len() != 3 || !is_valid_set([selected[0], selected[1], selected[2]]) {
            self.invalid("This is not a valid set of cards to trade in");
            return false;
        }

        let mut region_match = false;
        for card in &selected {
            if let Some(region) = card.region() {
                if self.regions[region].owner == Some(p) {
                    assert!(self.regions[region].troops > 0);
                    self.regions[region].troops += 2;
                    region_match = true;
                }
            }
        }

        self.parties[p].pool += trade_in_bonus(self.trade_in_sets);
        self.trade_in_sets += 1;
        self.parties[p].hand.drop_selected();

        self.sound(if region_match {
            SoundClip::Reinforcements
        } else {
            SoundClip::Cancel
        });

        match self.main_phase[p] {
            MainPhase::TradeInCards => {
                if !self.parties[p].hand.has_any_set() {
                    self.switch_main_phase(p, MainPhase::Reinforcement);
                }
            }
            MainPhase::BattleTradeInCards => {
                // Forced trade-ins continue until the hand is legal again.
                if self.parties[p].hand.len() < 5 || !self.parties[p].hand.has_any_set() {
                    self.parties[p].hand.deselect_all();
                    self.switch_main_phase(p, MainPhase::Battle);
                }
            }
            _ => unreachable!(),
        }
        true
    }

    /// Declines the start-of-turn trade-in. Not allowed with five or more
    /// cards in hand.
    pub fn skip_trade_in(&mut self, p: PartyId) -> bool {
        if self.main_phase[p] != MainPhase::TradeInCards
            || self.parties[p].hand.len() >= 5
        {
            return false;
        }
        self.parties[p].hand.deselect_all();
        self.switch_main_phase(p, MainPhase::Reinforcement);
        true
    }

    // ---- Win condition ----

    fn check_win_condition(&mut self) {
        let mut opponents_active = 0;
        let mut turn_takers_active = 0;

        for p in PartyId::ALL {
            if self.parties[p].defeated {
                continue;
            }

            let has_region = self
                .regions
                .values()
                .any(|x| x.troops > 0 && x.owner == Some(p));
            if !has_region {
                self.parties[p].defeated = true;
                continue;
            }

            if self.parties[p].info.takes_turns {
                turn_takers_active += 1;
                if Some(p) != self.human {
                    opponents_active += 1;
                }
            }
        }

        let over = match self.human {
            Some(human) => self.parties[human].defeated || opponents_active == 0,
            None => turn_takers_active <= 1,
        };
        if over {
            self.game_over();
        }
    }

    fn game_over(&mut self) {
        self.phase = GamePhase::GameOver;
        for p in PartyId::ALL {
            self.main_phase[p] = MainPhase::WaitingForOther;
        }
        self.clear_battle_selection();
        self.origin = None;
        self.destination = None;
        self.awaiting_occupy = false;
        self.forced_trade_in = false;
        self.prompt = None;

        let human_defeated = self.human.is_some_and(|h| self.parties[h].defeated);
        if !human_defeated {
            self.sound(SoundClip::Victory);
        }
    }

    // ---- Accessors ----

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn main_phase(&self, p: PartyId) -> MainPhase {
        self.main_phase[p]
    }

    /// The party whose turn it is during the main phase.
    pub fn active_party(&self) -> Option<PartyId> {
        if self.phase != GamePhase::Main {
            return None;
        }
        let active = PartyId::ALL
            .into_iter()
            .find(|&p| self.main_phase[p] != MainPhase::WaitingForOther);
        assert!(active.is_some());
        active
    }

    pub fn party(&self, p: PartyId) -> &PartyState {
        &self.parties[p]
    }

    pub fn human(&self) -> Option<PartyId> {
        self.human
    }

    pub fn neutral_party(&self) -> Option<PartyId> {
        PartyId::ALL
            .into_iter()
            .find(|&p| self.parties[p].in_play && self.parties[p].info.is_neutral())
    }

    pub fn prompt(&self) -> Option<Prompt> {
        self.prompt
    }

    pub fn attacking(&self) -> Option<RegionId> {
        self.attacking
    }

    pub fn defending(&self) -> Option<RegionId> {
        self.defending
    }

    pub fn origin(&self) -> Option<RegionId> {
        self.origin
    }

    pub fn destination(&self) -> Option<RegionId> {
        self.destination
    }

    pub fn over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// The sole remaining turn-taking party, once there is one.
    pub fn winner(&self) -> Option<PartyId> {
        let mut active = PartyId::ALL
            .into_iter()
            .filter(|&p| !self.parties[p].defeated && self.parties[p].info.takes_turns);
        match (active.next(), active.next()) {
            (Some(p), None) => Some(p),
            _ => None,
        }
    }

    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    fn sound(&mut self, clip: SoundClip) {
        self.effects.push(Effect::Sound(clip));
    }

    fn invalid(&mut self, message: &'static str) {
        self.effects.push(Effect::InvalidMove(message));
    }

    fn notify(&mut self, message: &'static str) {
        self.effects.push(Effect::Notify(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;

    fn two_party_config(seed: u64) -> GameConfig {
        GameConfig {
            neutral: false,
            human: Some(PartyId::Red),
            seed,
        }
    }

    /// Runs the preparation phase with a simple policy: claim the first
    /// unclaimed region, otherwise reinforce the placing party's first
    /// region. Red ends up with the even-numbered regions and a tall
    /// stack on Mithlond, Blue with the odd ones and a tall Fornarnor.
    fn two_party_game() -> Game {
        let mut game = Game::new(two_party_config(1));
        while game.phase() == GamePhase::Preparation {
            let (actor, placing) = game.prep_turn().unwrap();
            let region = RegionId::ALL
                .into_iter()
                .find(|&x| game.regions[x].troops == 0)
                .or_else(|| {
                    RegionId::ALL
                        .into_iter()
                        .find(|&x| game.regions[x].owner == Some(placing))
                })
                .unwrap();
            assert!(game.prep_place(actor, region));
        }
        game.drain_effects();
        game
    }

    fn game_in_battle_phase() -> Game {
        let mut game = two_party_game();
        game.handle(Event::RegionClicked(RegionId::Mithlond));
        game.handle(Event::RegionClicked(RegionId::Mithlond));
        assert_eq!(game.main_phase(PartyId::Red), MainPhase::Battle);
        game
    }

    #[test]
    fn initial_pools_are_scaled_down() {
        let game = Game::new(two_party_config(1));
        assert_eq!(game.phase(), GamePhase::Preparation);
        assert_eq!(game.party(PartyId::Red).pool, 14);
        assert_eq!(game.party(PartyId::Blue).pool, 14);
        assert!(!game.party(PartyId::Gray).in_play);
        assert!(game.regions.values().all(|x| x.owner.is_none()));
    }

    #[test]
    fn neutral_variant_deals_all_regions() {
        let game = Game::new(GameConfig {
            neutral: true,
            human: Some(PartyId::Red),
            seed: 7,
        });
        let owned =
            |p| game.regions.values().filter(|x| x.owner == Some(p)).count();
        assert_eq!(owned(PartyId::Red), 5);
        assert_eq!(owned(PartyId::Blue), 5);
        assert_eq!(owned(PartyId::Gray), 6);
        assert_eq!(game.party(PartyId::Red).pool, 7);
        assert_eq!(game.party(PartyId::Blue).pool, 7);
        assert_eq!(game.party(PartyId::Gray).pool, 6);
        assert_eq!(game.neutral_party(), Some(PartyId::Gray));
        assert_eq!(game.prep_turn(), Some((PartyId::Red, PartyId::Red)));
    }

    #[test]
    fn preparation_runs_to_the_first_turn() {
        let game = two_party_game();
        assert_eq!(game.phase(), GamePhase::Main);
        assert_eq!(game.active_party(), Some(PartyId::Red));
        // Empty hand, so the trade-in step falls through
        assert_eq!(game.main_phase(PartyId::Red), MainPhase::Reinforcement);
        // 8 regions each and no full continent: the minimum grant
        assert_eq!(game.party(PartyId::Red).pool, 2);

        let red_troops: u32 = game
            .regions
            .values()
            .filter(|x| x.owner == Some(PartyId::Red))
            .map(|x| x.troops)
            .sum();
        assert_eq!(red_troops, 14);
    }

    #[test]
    fn the_reinforcement_grant_scales_with_regions_taken() {
        let mut game = two_party_game();
        // Nine regions, still no full continent
        game.regions[RegionId::Fornarnor].owner = Some(PartyId::Red);
        game.parties[PartyId::Red].pool = 0;
        game.switch_main_phase(PartyId::Red, MainPhase::Reinforcement);
        assert_eq!(game.party(PartyId::Red).pool, 3);
    }

    #[test]
    fn a_full_continent_pays_its_bonus() {
        let mut game = two_party_game();
        for region in ContinentId::Eriador.iter_regions() {
            game.regions[region].owner = Some(PartyId::Red);
        }
        game.parties[PartyId::Red].pool = 0;
        game.switch_main_phase(PartyId::Red, MainPhase::Reinforcement);
        // 11 regions: max(2, 11 / 3) plus the Eriador bonus
        assert_eq!(game.party(PartyId::Red).pool, 3 + 4);
    }

    #[test]
    fn reinforcement_rejects_enemy_regions() {
        let mut game = two_party_game();
        let effects = game.handle(Event::RegionClicked(RegionId::Fornarnor));
        assert!(effects.contains(&Effect::InvalidMove(
            "Cannot place troops on enemy-controlled region."
        )));
        assert_eq!(game.party(PartyId::Red).pool, 2);
    }

    #[test]
    fn a_battle_applies_the_paired_dice_losses() {
        let mut game = game_in_battle_phase();

        game.handle(Event::RegionClicked(RegionId::Mithlond));
        game.handle(Event::RegionClicked(RegionId::Fornarnor));
        assert_eq!(
            game.prompt().map(|x| x.purpose),
            Some(PromptPurpose::AttackCount)
        );

        game.handle(Event::Digit(3));
        let effects = game.handle(Event::Confirm);

        let (attacker, defender) = effects
            .iter()
            .find_map(|x| match x {
                Effect::DiceRolled { attacker, defender } => {
                    Some((attacker.clone(), defender.clone()))
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(attacker.len(), 3);
        assert_eq!(defender.len(), 2);

        let losses = crate::combat::paired_losses(&attacker, &defender);
        assert_eq!(
            game.regions[RegionId::Mithlond].troops,
            9 - losses.attacker
        );
        assert_eq!(
            game.regions[RegionId::Fornarnor].troops,
            7 - losses.defender
        );
        // The defender held at least 5 troops, so the selection is done
        assert!(game.attacking().is_none() && game.defending().is_none());
    }

    #[test]
    fn attacks_need_a_shared_border() {
        let mut game = game_in_battle_phase();
        game.handle(Event::RegionClicked(RegionId::Mithlond));
        let effects = game.handle(Event::RegionClicked(RegionId::Angrenost));
        assert!(effects.contains(&Effect::InvalidMove(
            "You can only attack regions which share a border with the attacking region."
        )));
        assert!(game.defending().is_none());
    }

    #[test]
    fn an_unreasonable_attack_count_drops_the_selection() {
        let mut game = game_in_battle_phase();
        game.handle(Event::RegionClicked(RegionId::Mithlond));
        game.handle(Event::RegionClicked(RegionId::Fornarnor));
        game.handle(Event::Digit(9));
        let effects = game.handle(Event::Confirm);
        assert!(effects.contains(&Effect::InvalidMove(
            "Invalid number of attacking armies."
        )));
        assert!(game.attacking().is_none() && game.defending().is_none());
    }

    #[test]
    fn conquering_turns_over_the_region_and_earns_a_card() {
        let mut game = game_in_battle_phase();
        game.regions[RegionId::Fornarnor].troops = 1;

        let mut rounds = 0;
        while game.regions[RegionId::Fornarnor].owner == Some(PartyId::Blue) {
            game.regions[RegionId::Mithlond].troops = 9;
            game.stage_attack(
                PartyId::Red,
                RegionId::Mithlond,
                RegionId::Fornarnor,
                3,
            );
            game.resolve_battle(PartyId::Red);
            rounds += 1;
            assert!(rounds < 100);
        }

        // The surviving attack troops moved in; extra troops may follow
        assert!(game.regions[RegionId::Fornarnor].troops >= 1);
        assert!(game.occupy_pending());
        assert!(game.occupy_move(PartyId::Red, 0));
        assert!(!game.occupy_pending());

        game.prompt = None;
        game.handle(Event::Skip);
        assert_eq!(game.main_phase(PartyId::Red), MainPhase::Movement);
        assert_eq!(game.party(PartyId::Red).hand.len(), 1);

        game.handle(Event::Skip);
        assert_eq!(game.main_phase(PartyId::Red), MainPhase::WaitingForOther);
        assert_eq!(game.active_party(), Some(PartyId::Blue));
        assert_eq!(game.main_phase(PartyId::Blue), MainPhase::Reinforcement);
    }

    #[test]
    fn movement_follows_friendly_connections_and_ends_the_turn() {
        let mut game = two_party_game();
        game.main_phase[PartyId::Red] = MainPhase::Movement;

        // Red's Mithlond and Taur-e-Ndaedalos clusters are separated by
        // Blue territory
        game.handle(Event::RegionClicked(RegionId::Mithlond));
        let effects = game.handle(Event::RegionClicked(RegionId::TaurENdaedalos));
        assert!(effects.contains(&Effect::InvalidMove(
            "You cannot move troops through enemy regions."
        )));

        let effects = game.handle(Event::RegionClicked(RegionId::Shire));
        assert!(effects.contains(&Effect::Sound(SoundClip::Confirm)));
        game.handle(Event::Digit(6));
        let effects = game.handle(Event::Confirm);
        assert!(effects.contains(&Effect::Sound(SoundClip::Movement)));

        assert_eq!(game.regions[RegionId::Mithlond].troops, 1);
        assert_eq!(game.regions[RegionId::Shire].troops, 7);
        assert_eq!(game.active_party(), Some(PartyId::Blue));
    }

    #[test]
    fn trading_in_a_set_pays_the_bonus_and_matching_regions() {
        let mut game = two_party_game();
        // Three infantry cards; Mithlond and Taur-e-Ndaedalos are Red's,
        // Cardolan is Blue's
        for id in [0u8, 3, 6] {
            game.parties[PartyId::Red].hand.push(Card::new(id).unwrap());
        }
        game.main_phase[PartyId::Red] = MainPhase::TradeInCards;
        let pool_before = game.party(PartyId::Red).pool;

        game.handle(Event::CardClicked(0));
        game.handle(Event::CardClicked(1));
        game.handle(Event::CardClicked(2));
        let effects = game.handle(Event::Confirm);

        assert!(effects.contains(&Effect::Sound(SoundClip::Reinforcements)));
        assert_eq!(game.regions[RegionId::Mithlond].troops, 9);
        assert_eq!(game.regions[RegionId::TaurENdaedalos].troops, 3);
        assert_eq!(game.regions[RegionId::Cardolan].troops, 1);
        // First set bonus, plus the grant for entering reinforcement
        assert_eq!(game.party(PartyId::Red).pool, pool_before + 4 + 2);
        assert!(game.party(PartyId::Red).hand.is_empty());
        assert_eq!(game.main_phase(PartyId::Red), MainPhase::Reinforcement);
    }

    #[test]
    fn an_invalid_card_selection_is_rejected() {
        let mut game = two_party_game();
        for id in [0u8, 1, 3] {
            game.parties[PartyId::Red].hand.push(Card::new(id).unwrap());
        }
        game.main_phase[PartyId::Red] = MainPhase::TradeInCards;

        // Two infantry and one cavalry are neither a triple nor a rainbow
        game.handle(Event::CardClicked(0));
        game.handle(Event::CardClicked(1));
        game.handle(Event::CardClicked(2));
        game.parties[PartyId::Red].hand.set_selected(1, false);
        let effects = game.handle(Event::Confirm);

        assert!(effects.contains(&Effect::InvalidMove(
            "This is not a valid set of cards to trade in"
        )));
        assert_eq!(game.party(PartyId::Red).hand.len(), 3);
        assert_eq!(game.main_phase(PartyId::Red), MainPhase::TradeInCards);
    }

    #[test]
    fn trade_in_cannot_be_skipped_with_a_full_hand() {
        let mut game = two_party_game();
        for id in 0u8..5 {
            game.parties[PartyId::Red].hand.push(Card::new(id).unwrap());
        }
        game.main_phase[PartyId::Red] = MainPhase::TradeInCards;

        game.handle(Event::Skip);
        assert_eq!(game.main_phase(PartyId::Red), MainPhase::TradeInCards);
    }

    #[test]
    fn a_forced_trade_in_returns_to_the_battle() {
        let mut game = two_party_game();
        for id in 0u8..6 {
            game.parties[PartyId::Red].hand.push(Card::new(id).unwrap());
        }
        game.main_phase[PartyId::Red] = MainPhase::BattleTradeInCards;

        // A rainbow from the first three cards
        game.handle(Event::CardClicked(0));
        game.handle(Event::CardClicked(1));
        game.handle(Event::CardClicked(2));
        game.handle(Event::Confirm);

        assert_eq!(game.party(PartyId::Red).hand.len(), 3);
        assert_eq!(game.main_phase(PartyId::Red), MainPhase::Battle);
    }

    #[test]
    fn a_defeated_party_hands_over_its_cards() {
        let mut game = Game::new(GameConfig {
            neutral: true,
            human: Some(PartyId::Red),
            seed: 4,
        });
        while game.phase() == GamePhase::Preparation {
            let (actor, placing) = game.prep_turn().unwrap();
            let region = RegionId::ALL
                .into_iter()
                .find(|&x| game.regions[x].owner == Some(placing))
                .unwrap();
            assert!(game.prep_place(actor, region));
        }
        let gray = game.neutral_party().unwrap();

        // Corner the neutral party into a lone Fornarnor garrison holding
        // enough cards to push the conqueror past the hand limit
        for region in RegionId::ALL {
            if game.regions[region].owner == Some(gray) {
                game.regions[region].owner = Some(PartyId::Blue);
            }
        }
        game.regions[RegionId::Fornarnor].owner = Some(gray);
        game.regions[RegionId::Fornarnor].troops = 1;
        game.regions[RegionId::Mithlond].owner = Some(PartyId::Red);
        for id in 0u8..2 {
            game.parties[PartyId::Red].hand.push(Card::new(id).unwrap());
        }
        for id in 2u8..6 {
            game.parties[gray].hand.push(Card::new(id).unwrap());
        }
        game.main_phase[PartyId::Red] = MainPhase::Battle;

        let mut rounds = 0;
        while game.regions[RegionId::Fornarnor].owner == Some(gray) {
            game.regions[RegionId::Mithlond].troops = 9;
            game.stage_attack(PartyId::Red, RegionId::Mithlond, RegionId::Fornarnor, 3);
            game.resolve_battle(PartyId::Red);
            rounds += 1;
            assert!(rounds < 100);
        }

        // Blue still takes turns, so the game carries on past the merge
        assert!(game.party(gray).defeated);
        assert_ne!(game.phase(), GamePhase::GameOver);
        assert_eq!(game.party(PartyId::Red).hand.len(), 6);
        assert!(game.party(gray).hand.is_empty());

        assert!(game.occupy_pending());
        assert!(game.occupy_move(PartyId::Red, 0));
        assert_eq!(game.main_phase(PartyId::Red), MainPhase::BattleTradeInCards);

        // The two own cards and the first absorbed one form a rainbow
        game.prompt = None;
        game.handle(Event::CardClicked(0));
        game.handle(Event::CardClicked(1));
        game.handle(Event::CardClicked(2));
        game.handle(Event::Confirm);
        assert_eq!(game.party(PartyId::Red).hand.len(), 3);
        assert_eq!(game.main_phase(PartyId::Red), MainPhase::Battle);
    }

    #[test]
    fn the_defender_chooses_the_defense_count_when_attacked() {
        let mut game = two_party_game();
        game.main_phase[PartyId::Red] = MainPhase::WaitingForOther;
        game.main_phase[PartyId::Blue] = MainPhase::Battle;

        game.stage_attack(PartyId::Blue, RegionId::Fornarnor, RegionId::Mithlond, 3);
        let effects = game.drain_effects();
        assert!(effects.contains(&Effect::Notify(
            "Choose how many armies you want to defend with."
        )));
        assert!(game.defense_pending());
        assert_eq!(
            game.prompt().map(|x| x.purpose),
            Some(PromptPurpose::DefenseCount)
        );

        game.handle(Event::Digit(5));
        let effects = game.handle(Event::Confirm);
        assert!(effects.contains(&Effect::InvalidMove(
            "Invalid number of defending armies."
        )));
        assert!(game.defense_pending());

        game.handle(Event::Digit(2));
        game.handle(Event::Confirm);
        assert!(!game.defense_pending());

        // Mithlond holds 7 troops, so it cannot fall in a single round
        assert!(!game.resolve_battle(PartyId::Blue));
        assert!(game.attacking().is_none());
    }

    #[test]
    fn eliminating_the_last_opponent_ends_the_game() {
        let mut game = game_in_battle_phase();
        for region in RegionId::ALL {
            if game.regions[region].owner == Some(PartyId::Blue)
                && region != RegionId::Fornarnor
            {
                game.regions[region].owner = Some(PartyId::Red);
            }
        }
        game.regions[RegionId::Fornarnor].troops = 1;

        let mut rounds = 0;
        while !game.over() {
            game.regions[RegionId::Mithlond].troops = 9;
            game.stage_attack(
                PartyId::Red,
                RegionId::Mithlond,
                RegionId::Fornarnor,
                3,
            );
            game.resolve_battle(PartyId::Red);
            rounds += 1;
            assert!(rounds < 100);
        }

        assert!(game.party(PartyId::Blue).defeated);
        assert_eq!(game.winner(), Some(PartyId::Red));
        assert!(game
            .drain_effects()
            .contains(&Effect::Sound(SoundClip::Victory)));
    }
}
