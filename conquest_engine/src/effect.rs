/// Sound cues the presentation layer is asked to play. Fire-and-forget;
/// the engine never depends on whether they were heard.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SoundClip {
    /// A selection was made.
    Confirm,
    /// A selection was undone.
    Cancel,
    Battle,
    Capture,
    Movement,
    Notification,
    Reinforcements,
    Victory,
}

/// Output commands produced by state transitions and consumed by the
/// presentation adapter. Keeping these as data is what makes the phase
/// machine testable without any rendering stub.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Effect {
    Sound(SoundClip),
    /// A rule violation by the acting player. State is unchanged; the
    /// player may retry immediately.
    InvalidMove(&'static str),
    /// An in-game notification that is not an error (e.g. the player is
    /// asked to pick a defense count during an opponent's turn).
    Notify(&'static str),
    /// Dice shown for the battle that was just resolved, sorted
    /// descending, values 1..=6.
    DiceRolled {
        attacker: Vec<u8>,
        defender: Vec<u8>,
    },
}
