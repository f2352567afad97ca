use rand::Rng;

pub const MAX_ATTACK_DICE: usize = 3;
pub const MAX_DEFENSE_DICE: usize = 2;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Losses {
    pub attacker: u32,
    pub defender: u32,
}

/// Rolls `count` six-sided dice and returns them sorted descending, so
/// pairing just walks both slices front to front.
pub fn roll_sorted(rng: &mut impl Rng, count: usize) -> Vec<u8> {
    let mut dice: Vec<u8> = (0..count).map(|_| rng.gen_range(1..=6)).collect();
    dice.sort_unstable_by_key(|&x| std::cmp::Reverse(x));
    dice
}

/// Pairs the highest attack die with the highest defense die and so on,
/// one loss per pair. Ties go to the defender. Both slices must be sorted
/// descending.
pub fn paired_losses(attacker_dice: &[u8], defender_dice: &[u8]) -> Losses {
    debug_assert!(attacker_dice.windows(2).all(|w| w[0] >= w[1]));
    debug_assert!(defender_dice.windows(2).all(|w| w[0] >= w[1]));

    let mut losses = Losses::default();
    for (&attack, &defense) in attacker_dice.iter().zip(defender_dice) {
        if attack > defense {
            losses.defender += 1;
        } else {
            losses.attacker += 1;
        }
    }
    losses
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    #[test]
    fn rolls_are_sorted_and_in_range() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        for _ in 0..100 {
            let dice = roll_sorted(&mut rng, MAX_ATTACK_DICE);
            assert_eq!(dice.len(), MAX_ATTACK_DICE);
            assert!(dice.iter().all(|&x| (1..=6).contains(&x)));
            assert!(dice.windows(2).all(|w| w[0] >= w[1]));
        }
    }

    #[test]
    fn ties_favor_the_defender() {
        assert_eq!(
            paired_losses(&[4, 4], &[4, 4]),
            Losses {
                attacker: 2,
                defender: 0
            }
        );
    }

    #[test]
    fn pairing_is_highest_against_highest() {
        // 6 beats 5, 3 loses to 3. The attacker's 1 is unpaired.
        assert_eq!(
            paired_losses(&[6, 3, 1], &[5, 3]),
            Losses {
                attacker: 1,
                defender: 1
            }
        );
    }

    #[test]
    fn unpaired_dice_cost_nothing() {
        assert_eq!(
            paired_losses(&[6, 6, 6], &[1]),
            Losses {
                attacker: 0,
                defender: 1
            }
        );
        assert_eq!(
            paired_losses(&[2], &[6, 6]),
            Losses {
                attacker: 1,
                defender: 0
            }
        );
    }
}
