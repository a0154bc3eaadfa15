use super::error::{Chip8Error, Result};
use super::memory::{PROGRAM_START, STACK_BOTTOM};

pub const REGISTER_COUNT: usize = 16;
/// VF doubles as the carry, borrow and collision flag.
pub const FLAG: usize = 0xF;

pub struct CPU {
    pub v_registers: [u8; REGISTER_COUNT],
    pub i_register: u16,

    pub delay: u8,
    pub sound: u8,

    pub program_counter: u16,
    pub stack_pointer: u16
}

impl CPU {
    pub fn new() -> Self {
        CPU {
            v_registers: [0; REGISTER_COUNT],
            i_register: 0,

            delay: 0,
            sound: 0,

            program_counter: PROGRAM_START,
            stack_pointer: STACK_BOTTOM
        }
    }

    pub fn register(&self, index: usize) -> Result<u8> {
        self.v_registers
            .get(index)
            .copied()
            .ok_or(Chip8Error::RegisterOutOfBounds { index })
    }

    pub fn set_register(&mut self, index: usize, value: u8) -> Result<()> {
        match self.v_registers.get_mut(index) {
            Some(reg) => { *reg = value; Ok(()) }
            None => Err(Chip8Error::RegisterOutOfBounds { index })
        }
    }

    pub fn set_flag(&mut self, set: bool) {
        self.v_registers[FLAG] = set as u8;
    }

    pub fn read_pc(&self) -> u16 { self.program_counter }

    pub fn increment_pc(&mut self) {
        self.program_counter = self.program_counter.wrapping_add(2);
    }

    pub fn skip_next(&mut self) {
        self.program_counter = self.program_counter.wrapping_add(4);
    }

    pub fn set_pc(&mut self, pc: u16) { self.program_counter = pc }

    pub fn get_sp(&self) -> u16 { self.stack_pointer }
    pub fn set_sp(&mut self, sp: u16) { self.stack_pointer = sp }

    /// One 60 Hz tick: both timers count down toward zero.
    pub fn tick_timers(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }
}

impl Default for CPU {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod cpu_test {
    use super::*;

    #[test]
    fn initial_state() {
        let cpu = CPU::new();
        assert_eq!(cpu.v_registers.len(), 16);
        assert_eq!(cpu.read_pc(), 0x0200);
        assert_eq!(cpu.get_sp(), 0x0EA0);
        assert_eq!(cpu.i_register, 0);
    }

    #[test]
    fn register_access_is_bounds_checked() {
        let mut cpu = CPU::new();
        cpu.set_register(0xF, 7).unwrap();
        assert_eq!(cpu.register(0xF), Ok(7));

        assert_eq!(cpu.register(16), Err(Chip8Error::RegisterOutOfBounds { index: 16 }));
        assert_eq!(cpu.set_register(16, 1), Err(Chip8Error::RegisterOutOfBounds { index: 16 }));
    }

    #[test]
    fn timers_stop_at_zero() {
        let mut cpu = CPU::new();
        cpu.delay = 2;
        cpu.sound = 1;

        cpu.tick_timers();
        assert_eq!((cpu.delay, cpu.sound), (1, 0));
        cpu.tick_timers();
        cpu.tick_timers();
        assert_eq!((cpu.delay, cpu.sound), (0, 0));
    }
}
