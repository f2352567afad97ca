use conquest_shared::map::RegionId;

/// Input events driving the human-controlled party. The input adapter is
/// responsible for hit-testing pointer coordinates down to a region and for
/// keycode translation; the engine only sees rule-level events.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Event {
    RegionClicked(RegionId),
    /// Click on the human hand, by card index.
    CardClicked(usize),
    /// 0..=9, appended to the active numeric prompt.
    Digit(u8),
    Backspace,
    /// Enter: commit the numeric prompt or the selected trade-in cards.
    Confirm,
    /// Space: skip the current optional step (trade-in, battle, movement).
    Skip,
}
