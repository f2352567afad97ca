pub const MAX_PARTIES: usize = 3;

#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, enumn::N, enum_map::Enum)]
pub enum PartyId {
    Red,
    Blue,
    Gray,
}

impl PartyId {
    pub const ALL: [PartyId; MAX_PARTIES] = [PartyId::Red, PartyId::Blue, PartyId::Gray];

    const unsafe fn _count_check() {
        #[allow(clippy::useless_transmute)]
        unsafe {
            std::mem::transmute::<[u8; MAX_PARTIES], [u8; <Self as enum_map::Enum>::LENGTH]>(
                [0; MAX_PARTIES],
            );
        }
    }

    pub fn next(self) -> PartyId {
        PartyId::n((self as u8 + 1) % MAX_PARTIES as u8).unwrap()
    }

    pub const fn name(self) -> &'static str {
        ["red", "blue", "gray"][self as usize]
    }
}

/// Capabilities of a faction, kept as runtime data so both game variants
/// (with and without the neutral faction) run from one binary.
#[derive(Clone, Copy, Debug)]
pub struct Party {
    pub id: PartyId,
    /// Driven by the opponent policy rather than by input events.
    pub autonomous: bool,
    /// Gets a slot in the main-loop turn rotation. The neutral faction
    /// never does; it only defends and gains troops passively.
    pub takes_turns: bool,
}

impl Party {
    pub fn human(id: PartyId) -> Self {
        Self {
            id,
            autonomous: false,
            takes_turns: true,
        }
    }

    pub fn ai(id: PartyId) -> Self {
        Self {
            id,
            autonomous: true,
            takes_turns: true,
        }
    }

    pub fn neutral(id: PartyId) -> Self {
        Self {
            id,
            autonomous: true,
            takes_turns: false,
        }
    }

    pub fn is_neutral(&self) -> bool {
        !self.takes_turns
    }
}
