pub const KEY_COUNT: usize = 16;

/// Hex keypad state, written by whatever polls the real keyboard and read
/// by the key-skip and wait-for-key instructions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Keypad {
    keys: [bool; KEY_COUNT]
}

impl Keypad {

    pub fn new() -> Self {
        Keypad { keys: [false; KEY_COUNT] }
    }

    pub fn is_down(&self, key: u8) -> bool {
        self.keys[(key & 0xF) as usize]
    }

    pub fn is_up(&self, key: u8) -> bool {
        !self.is_down(key)
    }

    /// Lowest-numbered key currently held, if any.
    pub fn first_down(&self) -> Option<u8> {
        (0..KEY_COUNT as u8).find(|key| self.is_down(*key))
    }

    pub fn set_key(&mut self, key: u8, down: bool) {
        self.keys[(key & 0xF) as usize] = down;
    }

    pub fn release_all(&mut self) {
        self.keys = [false; KEY_COUNT];
    }
}
