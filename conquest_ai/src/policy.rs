//! Heuristic move selection for autonomous parties.
//!
//! Every function reads the game state and picks a single move; the
//! driver decides when to play it. Scores are plain integer heuristics
//! with a little dice noise so repeated games do not unfold identically.

use conquest_engine::cards::{is_valid_set, Hand};
use conquest_engine::connect::friendly_connection;
use conquest_engine::Game;
use conquest_shared::map::{ContinentId, RegionId, EDGES, REGION_COUNT};
use conquest_shared::party::PartyId;
use enum_map::EnumMap;
use rand::prelude::SliceRandom;
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttackPlan {
    pub from: RegionId,
    pub to: RegionId,
    pub count: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MovePlan {
    pub from: RegionId,
    pub to: RegionId,
    pub count: u32,
}

/// Picks a region to claim during the land-grab rounds.
pub fn claim_target(game: &Game, rng: &mut impl Rng) -> Option<RegionId> {
    let unclaimed: Vec<RegionId> = RegionId::ALL
        .into_iter()
        .filter(|&x| game.regions[x].troops == 0)
        .collect();
    unclaimed.choose(rng).copied()
}

fn holds_card_for(game: &Game, p: PartyId, region: RegionId) -> bool {
    game.party(p)
        .hand
        .cards()
        .iter()
        .any(|x| x.card.region() == Some(region))
}

/// Scores every owned region and returns the one most worth a troop.
///
/// Border pressure dominates: regions one conquest away from a full
/// continent and regions facing a stronger neighbor score high, interior
/// regions are written off entirely.
pub fn reinforcement_target(game: &Game, p: PartyId) -> Option<RegionId> {
    let owner = |r: RegionId| game.regions[r].owner;
    let mut scores: EnumMap<RegionId, i32> = EnumMap::default();

    for continent in ContinentId::ALL {
        let missing: Vec<RegionId> = continent
            .iter_regions()
            .filter(|&x| owner(x) != Some(p))
            .collect();

        if let [last] = missing[..] {
            for &n in EDGES[last] {
                if owner(n) == Some(p) {
                    scores[n] += 20;
                }
            }
        }

        // A continent held whole by one opponent pays them every round;
        // lean on its borders.
        if let Some(holder) = owner(continent.iter_regions().next().unwrap()) {
            if holder != p
                && !game.party(holder).info.is_neutral()
                && continent.iter_regions().all(|x| owner(x) == Some(holder))
            {
                for region in continent.iter_regions() {
                    for &n in EDGES[region] {
                        if owner(n) == Some(p) {
                            scores[n] += 5;
                        }
                    }
                }
            }
        }
    }

    let pool = game.party(p).pool as i32;
    let neutral = game.neutral_party();
    let mut best: Option<(RegionId, i32)> = None;

    for region in RegionId::ALL {
        if owner(region) != Some(p) {
            continue;
        }
        let mut score = scores[region];
        let mut hostile_border = false;

        for &n in EDGES[region] {
            let Some(other) = owner(n) else { continue };
            if other == p {
                continue;
            }
            hostile_border = true;
            let diff = game.regions[region].troops as i32 - game.regions[n].troops as i32;
            if Some(other) == neutral && (-2..1).contains(&diff) {
                score += 2;
            } else if diff < -pool {
                // Hopeless even after placing the whole pool
                score -= 20;
            } else if diff < 0 {
                score += -diff + 2;
            } else {
                score += 1;
            }
            if holds_card_for(game, p, region) {
                score += 3;
            }
        }

        if !hostile_border {
            score -= 100;
        }
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((region, score));
        }
    }
    best.map(|(region, _)| region)
}

/// Picks the most promising attack, or `None` to end the battle phase.
pub fn battle_plan(game: &Game, p: PartyId, rng: &mut impl Rng) -> Option<AttackPlan> {
    let owner = |r: RegionId| game.regions[r].owner;
    let mut best: Option<(AttackPlan, i32)> = None;

    for from in RegionId::ALL {
        if owner(from) != Some(p) || game.regions[from].troops < 2 {
            continue;
        }
        let strong = game.regions[from].troops >= 4;

        for &to in EDGES[from] {
            let Some(defender) = owner(to) else { continue };
            if defender == p {
                continue;
            }
            let diff = game.regions[from].troops as i32 - game.regions[to].troops as i32;
            let mut score = diff;

            let continent = to.continent();
            if continent
                .iter_regions()
                .all(|x| x == to || owner(x) == Some(p))
            {
                // One conquest away from the continent bonus
                if strong {
                    score += 5;
                } else if diff > 0 {
                    score += 2;
                }
            }

            let size = continent.region_count() as i32;
            let held = continent
                .iter_regions()
                .filter(|&x| x != to && owner(x) == Some(defender))
                .count() as i32;
            let containment = std::cmp::max(0, 10 * (2 * held - size) / size);
            if strong {
                score += containment;
            } else if diff > 0 {
                score += 2 * containment / 3;
            } else {
                score += containment / 3;
            }

            if score > 0 && holds_card_for(game, p, to) {
                score += 2;
            }
            score -= rng.gen_range(0..3);

            if best.map_or(true, |(_, s)| score > s) {
                let count = std::cmp::min(3, game.regions[from].troops - 1);
                best = Some((AttackPlan { from, to, count }, score));
            }
        }
    }

    let (plan, score) = best?;
    if score <= -rng.gen_range(0..3) {
        return None;
    }
    Some(plan)
}

/// How many extra troops to push into a freshly conquered region.
pub fn occupy_count(game: &Game, p: PartyId) -> u32 {
    let from = game.attacking().unwrap();
    let to = game.defending().unwrap();
    let neutral = game.neutral_party();

    // A neutral border is quiet; only turn-taking opponents count as a
    // reason to hold troops back.
    let fighting_border = EDGES[from].iter().any(|&x| {
        let other = game.regions[x].owner.unwrap();
        other != p && Some(other) != neutral
    });

    let available = game.regions[from].troops - 1;
    let count = if fighting_border {
        let diff = game.regions[from].troops as i32 - game.regions[to].troops as i32;
        std::cmp::max(0, diff / 2) as u32
    } else {
        available
    };
    std::cmp::min(count, available)
}

/// Moves a stack stuck in the interior toward the most contested owned
/// region it can reach. `None` when no interior stack exists.
pub fn movement_plan(game: &Game, p: PartyId) -> Option<MovePlan> {
    let exposure = |region: RegionId| {
        EDGES[region]
            .iter()
            .filter(|&&x| game.regions[x].owner != Some(p))
            .count()
    };

    let mut best: Option<(MovePlan, usize)> = None;
    for from in RegionId::ALL {
        if game.regions[from].owner != Some(p)
            || game.regions[from].troops < 2
            || exposure(from) > 0
        {
            continue;
        }
        for to in RegionId::ALL {
            if to == from || game.regions[to].owner != Some(p) {
                continue;
            }
            let contested = exposure(to);
            if contested == 0 || !friendly_connection(&game.regions, p, from, to) {
                continue;
            }
            if best.map_or(true, |(_, c)| contested > c) {
                let count = game.regions[from].troops - 1;
                best = Some((MovePlan { from, to, count }, contested));
            }
        }
    }
    best.map(|(plan, _)| plan)
}

/// Picks the neutral region whose reinforcement hurts `p` least: away
/// from `p`'s borders, toward the opponents' strength.
pub fn neutral_placement_target(game: &Game, p: PartyId) -> Option<RegionId> {
    let neutral = game.neutral_party()?;
    let mut best: Option<(RegionId, i32)> = None;

    for region in RegionId::ALL {
        if game.regions[region].owner != Some(neutral) {
            continue;
        }
        let mut score = 0;
        for &n in EDGES[region] {
            match game.regions[n].owner {
                Some(other) if other == p => score -= game.regions[n].troops as i32,
                Some(other) if other != neutral => score += game.regions[n].troops as i32,
                _ => {}
            }
        }
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((region, score));
        }
    }
    best.map(|(region, _)| region)
}

/// Chooses three hand indices to trade in, or `None` to hold the cards.
///
/// A forced trade-in never declines. A voluntary one declines only while
/// the hand is small and a held card could still grow into a region
/// bonus: once half the map is owned, sets without a matching region are
/// worth waiting on.
pub fn trade_in_selection(game: &Game, p: PartyId, forced: bool) -> Option<Vec<usize>> {
    let (indices, matches) = best_set(&game.party(p).hand, |region| {
        game.regions[region].owner == Some(p)
    })?;

    if !forced && game.party(p).hand.len() <= 4 {
        let owned = RegionId::ALL
            .into_iter()
            .filter(|&x| game.regions[x].owner == Some(p))
            .count();
        if owned >= REGION_COUNT / 2 && matches == 0 {
            return None;
        }
    }
    Some(indices)
}

/// The best valid set in the hand: most owned-region matches first,
/// wildcards spent last.
fn best_set(hand: &Hand, owns: impl Fn(RegionId) -> bool) -> Option<(Vec<usize>, usize)> {
    let cards = hand.cards();
    let mut best: Option<(Vec<usize>, (usize, usize))> = None;

    for i in 0..cards.len() {
        for j in i + 1..cards.len() {
            for k in j + 1..cards.len() {
                let set = [cards[i].card, cards[j].card, cards[k].card];
                if !is_valid_set(set) {
                    continue;
                }
                let matches = set
                    .iter()
                    .filter(|x| x.region().is_some_and(&owns))
                    .count();
                let real = set.iter().filter(|x| x.region().is_some()).count();
                if best.as_ref().map_or(true, |(_, key)| (matches, real) > *key) {
                    best = Some((vec![i, j, k], (matches, real)));
                }
            }
        }
    }
    best.map(|(indices, (matches, _))| (indices, matches))
}
