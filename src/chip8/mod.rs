use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

pub mod cpu;
pub mod dispatch;
pub mod display;
pub mod error;
pub mod keypad;
pub mod memory;
mod ops;

pub use dispatch::{disassemble, Instruction};
pub use error::{Chip8Error, Result};
pub use keypad::Keypad;

use memory::{MEMORY_SIZE, PROGRAM_START, STACK_BOTTOM, STACK_TOP};

/// What a single step did, as far as the driving loop cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// The framebuffer changed.
    Drawn,
    /// `Fx0A` found no key down; `pc` still points at it.
    AwaitingKey,
}

/// Complete interpreter state for one session.
pub struct Chip8 {
    pub cpu: cpu::CPU,
    pub memory: memory::Memory,
    pub display: display::Display,
    pub keypad: keypad::Keypad,

    /// Word most recently fetched.
    pub opcode: u16,

    rng: Box<dyn RngCore + Send>,
    rom: Vec<u8>,
}

impl Chip8 {

    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Same as `new`, with `RND` drawing from `rng`.
    pub fn with_rng<R: RngCore + Send + 'static>(rng: R) -> Self {
        let mut mem = memory::Memory::new();
        mem.load_font(&display::DEFAULT_SPRITES);

        Chip8 {
            cpu: cpu::CPU::new(),
            memory: mem,
            display: display::Display::new(),
            keypad: keypad::Keypad::new(),

            opcode: 0,

            rng: Box::new(rng),
            rom: vec![],
        }
    }

    pub fn set_rng<R: RngCore + Send + 'static>(&mut self, rng: R) {
        self.rng = Box::new(rng);
    }

    /// Copies a program image to 0x200 and remembers it for `reset`.
    pub fn load(&mut self, program: &[u8]) -> Result<()> {
        let max = MEMORY_SIZE - PROGRAM_START as usize;
        if program.len() > max {
            return Err(Chip8Error::RomTooLarge { size: program.len(), max });
        }

        self.memory.write_slice(PROGRAM_START as usize, program)?;
        self.rom = program.to_vec();
        crate::trace!("loaded {} bytes at {:#05x}", program.len(), PROGRAM_START);
        Ok(())
    }

    /// Back to the power-on state, with the last loaded program in place.
    pub fn reset(&mut self) -> Result<()> {
        let mut mem = memory::Memory::new();
        mem.load_font(&display::DEFAULT_SPRITES);

        self.cpu = cpu::CPU::new();
        self.memory = mem;
        self.display.reset();
        self.keypad.release_all();
        self.opcode = 0;

        self.memory.write_slice(PROGRAM_START as usize, &self.rom)
    }

    pub fn fetch(&mut self) -> Result<u16> {
        self.opcode = self.memory.read_u16(self.cpu.read_pc() as usize)?;
        Ok(self.opcode)
    }

    /// Fetch, resolve and execute the instruction at `pc`.
    pub fn step(&mut self) -> Result<Step> {
        let pc = self.cpu.read_pc();
        let opcode = self.fetch()?;
        let instruction = dispatch::resolve(opcode)?;

        if crate::log::enabled(crate::log::Level::Trace) {
            let text = disassemble(opcode).unwrap_or_else(|_| format!("{:04X}", opcode));
            crate::trace!("{:#05x}: {:04X}  {}", pc, opcode, text);
        }

        instruction.execute(self)
    }

    /// One 60 Hz timer tick. Never called by `step`.
    pub fn tick_timers(&mut self) {
        self.cpu.tick_timers();
    }

    pub fn sound_active(&self) -> bool {
        self.cpu.sound > 0
    }

    /// 64x32 packed bitmap for a renderer to read between steps.
    pub fn framebuffer(&self) -> &[u8; display::DISPLAY_SIZE] {
        self.display.as_bytes()
    }

    pub fn stack_depth(&self) -> usize {
        (self.cpu.get_sp().saturating_sub(STACK_BOTTOM) / 2) as usize
    }

    /// `sp` sits on a frame boundary inside the stack region.
    fn frame_aligned(sp: u16) -> bool {
        (STACK_BOTTOM..=STACK_TOP).contains(&sp) && (sp - STACK_BOTTOM) % 2 == 0
    }

    pub fn stack_push(&mut self, value: u16) -> Result<()> {
        let sp = self.cpu.get_sp();
        match sp {
            STACK_TOP => Err(Chip8Error::StackOverflow { pc: self.cpu.read_pc() }),
            _ if !Self::frame_aligned(sp) => Err(Chip8Error::MemoryOutOfBounds { address: sp as usize }),
            _ => {
                self.memory.write_u16(sp as usize, value)?;
                self.cpu.set_sp(sp + 2);
                crate::trace!("stack push {:#05x} (depth {})", value, self.stack_depth());
                Ok(())
            }
        }
    }

    pub fn stack_pop(&mut self) -> Result<u16> {
        let sp = self.cpu.get_sp();
        match sp {
            STACK_BOTTOM => Err(Chip8Error::StackUnderflow { pc: self.cpu.read_pc() }),
            _ if !Self::frame_aligned(sp) => Err(Chip8Error::MemoryOutOfBounds { address: sp as usize }),
            _ => {
                let value = self.memory.read_u16(sp as usize - 2)? & 0x0FFF;
                self.cpu.set_sp(sp - 2);
                crate::trace!("stack pop {:#05x} (depth {})", value, self.stack_depth());
                Ok(value)
            }
        }
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}
