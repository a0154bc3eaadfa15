pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;
pub const ROW_BYTES: usize = WIDTH / 8;
pub const DISPLAY_SIZE: usize = ROW_BYTES * HEIGHT;

pub const FONT_GLYPH_SIZE: usize = 5;

pub const DEFAULT_SPRITES: [[u8; FONT_GLYPH_SIZE]; 16] = [
    [0xF0, 0x90, 0x90, 0x90, 0xF0], // 0
    [0x20, 0x60, 0x20, 0x20, 0x70], // 1
    [0xF0, 0x10, 0xF0, 0x80, 0xF0], // 2
    [0xF0, 0x10, 0xF0, 0x10, 0xF0], // 3
    [0x90, 0x90, 0xF0, 0x10, 0x10], // 4
    [0xF0, 0x80, 0xF0, 0x10, 0xF0], // 5
    [0xF0, 0x80, 0xF0, 0x90, 0xF0], // 6
    [0xF0, 0x10, 0x20, 0x40, 0x40], // 7
    [0xF0, 0x90, 0xF0, 0x90, 0xF0], // 8
    [0xF0, 0x90, 0xF0, 0x10, 0xF0], // 9
    [0xF0, 0x90, 0xF0, 0x90, 0x90], // A
    [0xE0, 0x90, 0xE0, 0x90, 0xE0], // B
    [0xF0, 0x80, 0x80, 0x80, 0xF0], // C
    [0xE0, 0x90, 0x90, 0x90, 0xE0], // D
    [0xF0, 0x80, 0xF0, 0x80, 0xF0], // E
    [0xF0, 0x80, 0xF0, 0x80, 0x80], // F
];

/// Packed monochrome framebuffer: 64x32 pixels, 8 per byte, row-major,
/// most significant bit is the leftmost pixel.
pub struct Display {
    screen: [u8; DISPLAY_SIZE]
}

impl Display {
    pub fn new() -> Self {
        Display { screen: [0; DISPLAY_SIZE] }
    }

    pub fn reset(&mut self) {
        self.screen = [0; DISPLAY_SIZE];
    }

    /// Byte offset and bit mask of a logical pixel.
    fn locate(row: usize, column: usize) -> (usize, u8) {
        (row * ROW_BYTES + (column >> 3), 0x80 >> (column & 7))
    }

    pub fn get_pixel(&self, row: usize, column: usize) -> u8 {
        if row >= HEIGHT || column >= WIDTH { return 0 }

        let (index, mask) = Self::locate(row, column);
        (self.screen[index] & mask != 0) as u8
    }

    /// XORs one sprite row onto the screen. Pixels past the right edge are
    /// clipped. Returns whether a lit pixel was switched off.
    pub fn draw_byte(&mut self, row: usize, starting_column: usize, byte: u8) -> bool {
        let mut at_least_1_flipped: bool = false;
        if row >= HEIGHT { return false }

        for i in 0..8 {
            let col = starting_column + i;
            if col >= WIDTH { break }
            if (byte >> (7 - i)) & 1 == 0 { continue }

            let (index, mask) = Self::locate(row, col);
            if self.screen[index] & mask != 0 { at_least_1_flipped = true }
            self.screen[index] ^= mask;
        }

        at_least_1_flipped
    }

    pub fn as_bytes(&self) -> &[u8; DISPLAY_SIZE] {
        &self.screen
    }

    #[cfg(test)]
    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8; DISPLAY_SIZE] {
        &mut self.screen
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod display_test {

    #[test]
    fn get_pixel_test() {
        let dis = super::Display::new();
        assert_eq!(dis.get_pixel(0, 0), 0u8);
        assert_eq!(dis.get_pixel(100, 1), 0u8);
    }

    #[test]
    fn draw_packs_msb_first() {
        let mut dis = super::Display::new();
        assert!(!dis.draw_byte(0, 0, 0b1010_0000));

        assert_eq!(dis.get_pixel(0, 0), 1);
        assert_eq!(dis.get_pixel(0, 1), 0);
        assert_eq!(dis.get_pixel(0, 2), 1);
        assert_eq!(dis.as_bytes()[0], 0xA0);
    }

    #[test]
    fn unaligned_draw_spans_two_bytes() {
        let mut dis = super::Display::new();
        dis.draw_byte(31, 12, 0xFF);

        assert_eq!(dis.as_bytes()[31 * 8 + 1], 0x0F);
        assert_eq!(dis.as_bytes()[31 * 8 + 2], 0xF0);
    }

    #[test]
    fn redraw_erases_and_reports_collision() {
        let mut dis = super::Display::new();
        dis.draw_byte(5, 8, 0xFF);
        assert!(dis.draw_byte(5, 8, 0x80));

        assert_eq!(dis.as_bytes()[5 * 8 + 1], 0x7F);
    }

    #[test]
    fn right_edge_clips() {
        let mut dis = super::Display::new();
        dis.draw_byte(0, 60, 0xFF);

        assert_eq!(dis.as_bytes()[7], 0x0F);
        assert_eq!(dis.as_bytes()[8], 0x00);
    }

    #[test]
    fn reset_clears_everything() {
        let mut dis = super::Display::new();
        dis.as_bytes_mut().fill(0xFF);
        dis.reset();
        assert!(dis.as_bytes().iter().all(|b| *b == 0));
    }
}
