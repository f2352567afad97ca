use conquest_shared::{Card, CardDesign};
use enum_map::EnumMap;
use rand::prelude::SliceRandom;
use rand::Rng;

use crate::MAX_HAND_SIZE;

/// The shuffled draw stack. Shuffled once when the main game starts; when
/// it runs out, further draws are no-ops and traded-in cards leave play.
#[derive(Debug, Default)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn shuffled(rng: &mut impl Rng) -> Self {
        let mut cards = Vec::from(Card::all());
        cards.shuffle(rng);
        Self { cards }
    }

    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct HandCard {
    pub card: Card,
    /// Marked during trade-in; the selected triple is what a confirm
    /// attempts to trade.
    pub selected: bool,
}

/// An ordered hand of cards. Drawing caps the hand at six; absorbing an
/// eliminated opponent's hand may push it past that until the forced
/// trade-ins bring it back down.
#[derive(Debug, Default)]
pub struct Hand {
    cards: Vec<HandCard>,
}

impl Hand {
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[HandCard] {
        &self.cards
    }

    pub fn push(&mut self, card: Card) {
        assert!(
            self.cards.len() < MAX_HAND_SIZE,
            "Drew a card into a full hand"
        );
        self.cards.push(HandCard {
            card,
            selected: false,
        });
    }

    pub fn set_selected(&mut self, index: usize, selected: bool) {
        self.cards[index].selected = selected;
    }

    pub fn deselect_all(&mut self) {
        for card in &mut self.cards {
            card.selected = false;
        }
    }

    pub fn selected(&self) -> impl Iterator<Item = Card> + '_ {
        self.cards.iter().filter(|x| x.selected).map(|x| x.card)
    }

    pub fn drop_selected(&mut self) {
        self.cards.retain(|x| !x.selected);
    }

    /// Appends the whole of `other` (an eliminated party's hand) onto this
    /// one. No card is lost or duplicated; the caller is responsible for
    /// forcing trade-ins if the result exceeds the draw cap.
    pub fn absorb(&mut self, other: &mut Hand) {
        assert!(self.cards.len() <= MAX_HAND_SIZE);
        assert!(other.cards.len() <= MAX_HAND_SIZE);
        for card in other.cards.drain(..) {
            self.cards.push(HandCard {
                card: card.card,
                selected: false,
            });
        }
    }

    /// Whether any three cards of this hand form a tradeable set: three of
    /// one design (wildcards filling in), or one of each design (ditto).
    pub fn has_any_set(&self) -> bool {
        let mut design_counts: EnumMap<CardDesign, usize> = EnumMap::default();
        for card in &self.cards {
            design_counts[card.card.design()] += 1;
        }

        let wildcards = design_counts[CardDesign::Wildcard];
        let mut different_designs = wildcards;
        let mut has_single_set = false;

        for design in CardDesign::REAL {
            if design_counts[design] > 0 {
                different_designs += 1;
            }
            if design_counts[design] + wildcards >= 3 {
                has_single_set = true;
            }
        }

        has_single_set || different_designs >= CardDesign::COUNT
    }
}

/// Whether exactly these three cards form a valid trade-in set.
pub fn is_valid_set(cards: [Card; 3]) -> bool {
    let mut design_counts: EnumMap<CardDesign, usize> = EnumMap::default();
    for card in cards {
        design_counts[card.design()] += 1;
    }

    let wildcards = design_counts[CardDesign::Wildcard];
    let mut different_designs = wildcards;
    let mut has_single_set = false;
    for design in CardDesign::REAL {
        if design_counts[design] > 0 {
            different_designs += 1;
        }
        if design_counts[design] + wildcards >= 3 {
            has_single_set = true;
        }
    }

    different_designs >= CardDesign::COUNT || has_single_set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_of_design(design: CardDesign, skip: usize) -> Card {
        Card::all()
            .into_iter()
            .filter(|x| x.design() == design)
            .nth(skip)
            .unwrap()
    }

    fn hand_of(cards: &[Card]) -> Hand {
        let mut hand = Hand::default();
        for &card in cards {
            hand.push(card);
        }
        hand
    }

    #[test]
    fn three_of_a_kind_is_a_set() {
        let cards = [
            card_of_design(CardDesign::Infantry, 0),
            card_of_design(CardDesign::Infantry, 1),
            card_of_design(CardDesign::Infantry, 2),
        ];
        assert!(is_valid_set(cards));
        assert!(hand_of(&cards).has_any_set());
    }

    #[test]
    fn rainbow_is_a_set() {
        assert!(is_valid_set([
            card_of_design(CardDesign::Infantry, 0),
            card_of_design(CardDesign::Cavalry, 0),
            card_of_design(CardDesign::Artillery, 0),
        ]));
    }

    #[test]
    fn wildcard_substitutes_either_way() {
        assert!(is_valid_set([
            card_of_design(CardDesign::Infantry, 0),
            card_of_design(CardDesign::Infantry, 1),
            card_of_design(CardDesign::Wildcard, 0),
        ]));
        assert!(is_valid_set([
            card_of_design(CardDesign::Infantry, 0),
            card_of_design(CardDesign::Cavalry, 0),
            card_of_design(CardDesign::Wildcard, 0),
        ]));
    }

    #[test]
    fn mixed_pair_is_not_a_set() {
        assert!(!is_valid_set([
            card_of_design(CardDesign::Infantry, 0),
            card_of_design(CardDesign::Infantry, 1),
            card_of_design(CardDesign::Cavalry, 0),
        ]));

        let hand = hand_of(&[
            card_of_design(CardDesign::Infantry, 0),
            card_of_design(CardDesign::Infantry, 1),
            card_of_design(CardDesign::Cavalry, 0),
        ]);
        assert!(!hand.has_any_set());
    }

    #[test]
    fn deck_is_exhaustible_and_never_duplicates() {
        let mut rng = <rand_xoshiro::Xoshiro256StarStar as rand::SeedableRng>::seed_from_u64(7);
        let mut deck = Deck::shuffled(&mut rng);

        let mut drawn = Vec::new();
        while let Some(card) = deck.draw() {
            assert!(!drawn.contains(&card));
            drawn.push(card);
        }

        assert_eq!(drawn.len(), conquest_shared::CARD_COUNT);
        assert!(deck.draw().is_none());
    }

    #[test]
    fn absorbed_hands_keep_every_card() {
        let all = Card::all();
        let mut winner = hand_of(&all[0..2]);
        let mut loser = hand_of(&all[2..5]);

        winner.absorb(&mut loser);
        assert_eq!(winner.len(), 5);
        assert!(loser.is_empty());

        let held: Vec<Card> = winner.cards().iter().map(|x| x.card).collect();
        assert_eq!(held, &all[0..5]);
    }
}
