use super::display::FONT_GLYPH_SIZE;
use super::error::{Chip8Error, Result};

pub const MEMORY_SIZE: usize = 0x1000;
pub const PROGRAM_START: u16 = 0x0200;
pub const FONT_START: u16 = 0x0000;

/// Lowest address of the call stack, and the value of `sp` when it is empty.
pub const STACK_BOTTOM: u16 = 0x0EA0;
/// Value of `sp` once all 128 frames are in use. The last frame ends at 0x0F9F.
pub const STACK_TOP: u16 = STACK_BOTTOM + 0x100;

/// Flat 4 KiB address space. Every access is bounds checked.
pub struct Memory {
    address_space: [u8; MEMORY_SIZE]
}

impl Memory {

    pub fn new() -> Self {
        Memory {
            address_space: [0; MEMORY_SIZE]
        }
    }

    pub fn write_u8(&mut self, addr: usize, data: u8) -> Result<()> {
        match self.address_space.get_mut(addr) {
            Some(cell) => { *cell = data; Ok(()) }

            None => Err(Chip8Error::MemoryOutOfBounds { address: addr })
        }
    }

    pub fn read_u8(&self, addr: usize) -> Result<u8> {
        match self.address_space.get(addr) {
            Some(cell) => Ok(*cell),

            None => Err(Chip8Error::MemoryOutOfBounds { address: addr })
        }
    }

    /// Big-endian, like instruction words and stack frames.
    pub fn write_u16(&mut self, addr: usize, data: u16) -> Result<()> {
        let [hi, lo] = data.to_be_bytes();
        self.write_u8(addr, hi)?;
        self.write_u8(addr + 1, lo)
    }

    pub fn read_u16(&self, addr: usize) -> Result<u16> {
        let hi = self.read_u8(addr)?;
        let lo = self.read_u8(addr + 1)?;

        Ok(u16::from_be_bytes([hi, lo]))
    }

    /// Writes the hex digit glyphs back to back from `FONT_START`.
    pub fn load_font(&mut self, glyphs: &[[u8; FONT_GLYPH_SIZE]]) {
        for (digit, glyph) in glyphs.iter().enumerate() {
            let start = FONT_START as usize + digit * FONT_GLYPH_SIZE;
            self.address_space[start..start + FONT_GLYPH_SIZE].copy_from_slice(glyph);
        }
    }

    /// Copies `data` into memory starting at `addr`, all or nothing.
    pub fn write_slice(&mut self, addr: usize, data: &[u8]) -> Result<()> {
        let end = addr + data.len();
        match self.address_space.get_mut(addr..end) {
            Some(region) => { region.copy_from_slice(data); Ok(()) }

            None => Err(Chip8Error::MemoryOutOfBounds { address: end.max(1) - 1 })
        }
    }

    pub fn slice(&self, addr: usize, len: usize) -> Result<&[u8]> {
        let end = addr + len;
        self.address_space
            .get(addr..end)
            .ok_or(Chip8Error::MemoryOutOfBounds { address: end.max(1) - 1 })
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod memory_test {
    use super::super::error::Chip8Error;

    #[test]
    fn access_out_of_bounds() {
        let memory = super::Memory::new();
        assert_eq!(memory.read_u8(0x1000), Err(Chip8Error::MemoryOutOfBounds { address: 0x1000 }));
    }

    #[test]
    fn u16_straddling_the_end_fails() {
        let mut memory = super::Memory::new();
        assert!(memory.read_u16(0x0FFF).is_err());
        assert!(memory.write_u16(0x0FFF, 0xBEEF).is_err());
    }

    #[test]
    fn write_read_u8_test() {
        let mut memory = super::Memory::new();

        memory.write_u8(0x0213, 0xFE).unwrap();
        assert_eq!(memory.read_u8(0x0213), Ok(0xFE));
    }

    #[test]
    fn write_read_u16_test() {
        let mut memory = super::Memory::new();

        memory.write_u16(0x0213, 0x12FE).unwrap();
        assert_eq!(memory.read_u16(0x0213), Ok(0x12FE));

        assert_eq!(memory.read_u8(0x0213), Ok(0x12));
        assert_eq!(memory.read_u8(0x0214), Ok(0xFE));

        memory.write_u8(0x0300, 0x12).unwrap();
        memory.write_u8(0x0301, 0x13).unwrap();
        assert_eq!(memory.read_u16(0x0300), Ok(0x1213));
    }

    #[test]
    fn write_slice_is_all_or_nothing() {
        let mut memory = super::Memory::new();

        memory.write_slice(0x0FFE, &[1, 2]).unwrap();
        assert_eq!(memory.slice(0x0FFE, 2).unwrap(), &[1, 2]);

        assert_eq!(
            memory.write_slice(0x0FFF, &[9, 9]),
            Err(Chip8Error::MemoryOutOfBounds { address: 0x1000 })
        );
        assert_eq!(memory.read_u8(0x0FFF), Ok(2));
    }

    #[test]
    fn stack_region_holds_128_frames() {
        assert_eq!((super::STACK_TOP - super::STACK_BOTTOM) / 2, 128);
        assert!((super::STACK_TOP as usize) <= super::MEMORY_SIZE);
    }
}
