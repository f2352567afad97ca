#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GamePhase {
    Initialization,
    Preparation,
    Main,
    GameOver,
}

/// Per-party sub-phase of the main loop. At most one party is in a
/// non-waiting sub-phase at a time.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MainPhase {
    WaitingForOther,
    TradeInCards,
    Reinforcement,
    Battle,
    BattleTradeInCards,
    Movement,
}

impl MainPhase {
    /// A turn starts with the optional trade-in; it falls through to
    /// reinforcement when the hand holds no valid set.
    pub const START: MainPhase = MainPhase::TradeInCards;

    pub fn is_trade_in(self) -> bool {
        matches!(self, MainPhase::TradeInCards | MainPhase::BattleTradeInCards)
    }
}

/// What an in-progress numeric entry will be used for once confirmed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PromptPurpose {
    AttackCount,
    OccupyCount,
    MoveCount,
    DefenseCount,
}

/// Keystroke-editable numeric entry, erased digit by digit with backspace.
#[derive(Clone, Copy, Debug)]
pub struct Prompt {
    pub purpose: PromptPurpose,
    pub value: u32,
    pub chars: u32,
}

impl Prompt {
    pub fn new(purpose: PromptPurpose) -> Self {
        Self {
            purpose,
            value: 0,
            chars: 0,
        }
    }

    pub fn push_digit(&mut self, digit: u8) {
        debug_assert!(digit < 10);
        if self.value >= 100 {
            return;
        }
        self.value = self.value * 10 + digit as u32;
        self.chars += 1;
    }

    pub fn pop_digit(&mut self) {
        if self.chars > 0 {
            self.value /= 10;
            self.chars -= 1;
        }
    }
}
