//! CHIP-8 interpreter core: machine state, table-driven decode and the
//! instruction set, plus the logging used by the `chip8` binary.

pub mod chip8;
pub mod log;

pub use chip8::{disassemble, Chip8, Chip8Error, Instruction, Keypad, Step};
