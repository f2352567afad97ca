pub mod cards;
pub mod combat;
pub mod connect;
pub mod effect;
pub mod event;
pub mod phase;
pub mod state;

pub use state::{Game, GameConfig};

/// Cap on drawing. Only a hand-merge after eliminating an opponent can
/// push a hand past this, and a forced trade-in follows right away.
pub const MAX_HAND_SIZE: usize = 6;

/// Escalating bonus for the first six traded-in sets; +5 per set after that.
pub const TRADE_IN_TROOPS: [u32; 6] = [4, 6, 8, 10, 12, 15];
pub const TRADE_IN_TROOPS_STEP: u32 = 5;

pub fn trade_in_bonus(sets_already_redeemed: u32) -> u32 {
    TRADE_IN_TROOPS
        .get(sets_already_redeemed as usize)
        .copied()
        .unwrap_or_else(|| {
            TRADE_IN_TROOPS[TRADE_IN_TROOPS.len() - 1]
                + (sets_already_redeemed - TRADE_IN_TROOPS.len() as u32 + 1) * TRADE_IN_TROOPS_STEP
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trade_in_bonus_schedule() {
        let bonuses: Vec<u32> = (0..9).map(trade_in_bonus).collect();
        assert_eq!(bonuses, [4, 6, 8, 10, 12, 15, 20, 25, 30]);
    }
}
