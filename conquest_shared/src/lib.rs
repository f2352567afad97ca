pub mod map;
pub mod party;

pub use party::MAX_PARTIES;

use map::{RegionId, REGION_COUNT};
use party::PartyId;

// One wildcard per ~21 regions, as in the full-size deck.
pub const WILDCARD_COUNT: usize = (REGION_COUNT + 10) / 21;
pub const CARD_COUNT: usize = REGION_COUNT + WILDCARD_COUNT;

/// An association card. Ids below `REGION_COUNT` reference their region and
/// carry a design assigned round-robin in region order; the rest are
/// wildcards.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Card(u8);

impl Card {
    pub fn new(v: u8) -> Option<Self> {
        (v < CARD_COUNT as u8).then_some(Self(v))
    }

    pub fn id(self) -> u8 {
        self.0
    }

    pub fn all() -> [Self; CARD_COUNT] {
        std::array::from_fn(|x| Self::new(x as u8).unwrap())
    }

    pub fn region(self) -> Option<RegionId> {
        ((self.0 as usize) < REGION_COUNT).then(|| RegionId::n(self.0).unwrap())
    }

    pub fn design(self) -> CardDesign {
        if (self.0 as usize) < REGION_COUNT {
            CardDesign::n(self.0 % CardDesign::COUNT as u8).unwrap()
        } else {
            CardDesign::Wildcard
        }
    }
}

#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, enumn::N, enum_map::Enum)]
pub enum CardDesign {
    Infantry,
    Cavalry,
    Artillery,
    Wildcard,
}

impl CardDesign {
    /// Number of real designs; `Wildcard` is not one.
    pub const COUNT: usize = 3;

    pub const REAL: [Self; Self::COUNT] = [Self::Infantry, Self::Cavalry, Self::Artillery];
}

#[derive(Debug)]
pub struct Region {
    pub id: RegionId,
    pub owner: Option<PartyId>,
    pub troops: u32,
}

impl Region {
    pub fn new(id: RegionId) -> Self {
        Self {
            id,
            owner: None,
            troops: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deck_has_one_card_per_region_plus_wildcards() {
        assert_eq!(CARD_COUNT, 17);
        assert_eq!(WILDCARD_COUNT, 1);

        let mut regions_seen = [false; REGION_COUNT];
        let mut wildcards = 0;
        for card in Card::all() {
            match card.region() {
                Some(region) => {
                    assert!(!regions_seen[region as usize]);
                    regions_seen[region as usize] = true;
                    assert_ne!(card.design(), CardDesign::Wildcard);
                }
                None => {
                    assert_eq!(card.design(), CardDesign::Wildcard);
                    wildcards += 1;
                }
            }
        }

        assert!(regions_seen.iter().all(|&x| x));
        assert_eq!(wildcards, WILDCARD_COUNT);
    }

    #[test]
    fn designs_rotate_over_regions() {
        let cards = Card::all();
        assert_eq!(cards[0].design(), CardDesign::Infantry);
        assert_eq!(cards[1].design(), CardDesign::Cavalry);
        assert_eq!(cards[2].design(), CardDesign::Artillery);
        assert_eq!(cards[3].design(), CardDesign::Infantry);
    }
}
