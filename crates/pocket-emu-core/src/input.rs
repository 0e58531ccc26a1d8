//! Logical joypad buttons and the keyboard alphabet frontends report in.

/// One of the eight buttons wired into the JOYP matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Right,
    Left,
    Up,
    Down,
    A,
    B,
    Select,
    Start,
}

impl Button {
    pub const ALL: [Button; 8] = [
        Button::Right,
        Button::Left,
        Button::Up,
        Button::Down,
        Button::A,
        Button::B,
        Button::Select,
        Button::Start,
    ];

    /// Bit of this button within its row (P10-P13).
    pub const fn line_mask(self) -> u8 {
        match self {
            Button::Right | Button::A => 0x01,
            Button::Left | Button::B => 0x02,
            Button::Up | Button::Select => 0x04,
            Button::Down | Button::Start => 0x08,
        }
    }

    pub const fn is_direction(self) -> bool {
        matches!(
            self,
            Button::Right | Button::Left | Button::Up | Button::Down
        )
    }
}

/// Keys a presentation collaborator can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    A,
    S,
    X,
    Z,
    Up,
    Down,
    Left,
    Right,
    Space,
    LShift,
    /// Function key F1-F12.
    F(u8),
    Other,
}

/// Default keyboard layout: A/S for A/B, X for Select, Z for Start and the
/// arrow keys for the pad.
pub fn button_for_key(key: Key) -> Option<Button> {
    match key {
        Key::A => Some(Button::A),
        Key::S => Some(Button::B),
        Key::X => Some(Button::Select),
        Key::Z => Some(Button::Start),
        Key::Up => Some(Button::Up),
        Key::Down => Some(Button::Down),
        Key::Left => Some(Button::Left),
        Key::Right => Some(Button::Right),
        _ => None,
    }
}

/// Save-state slot bound to a function key.
pub fn slot_for_key(key: Key) -> Option<u8> {
    match key {
        Key::F(n @ 1..=12) => Some(n),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_share_line_masks() {
        assert_eq!(Button::Right.line_mask(), Button::A.line_mask());
        assert_eq!(Button::Down.line_mask(), Button::Start.line_mask());
        let directions = Button::ALL.iter().filter(|b| b.is_direction()).count();
        assert_eq!(directions, 4);
    }

    #[test]
    fn function_keys_map_to_slots() {
        assert_eq!(slot_for_key(Key::F(1)), Some(1));
        assert_eq!(slot_for_key(Key::F(12)), Some(12));
        assert_eq!(slot_for_key(Key::F(13)), None);
        assert_eq!(slot_for_key(Key::A), None);
        assert_eq!(button_for_key(Key::Z), Some(Button::Start));
        assert_eq!(button_for_key(Key::Space), None);
    }
}
