use thiserror::Error;

/// Everything that can stop the interpreter mid-step.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Chip8Error {
    /// No handler is registered for the word's dispatch key.
    #[error("unrecognized instruction {opcode:#06X} (dispatch key {key:#06X})")]
    Decode { opcode: u16, key: u16 },

    /// The family resolved, but this interpreter has no sub-operation for the word.
    #[error("unsupported instruction {opcode:#06X}")]
    Unsupported { opcode: u16 },

    #[error("stack overflow: call at {pc:#05X} with a full call stack")]
    StackOverflow { pc: u16 },

    #[error("stack underflow: return at {pc:#05X} with an empty call stack")]
    StackUnderflow { pc: u16 },

    #[error("memory access out of bounds at address {address:#06X}")]
    MemoryOutOfBounds { address: usize },

    #[error("register index {index:#X} out of bounds")]
    RegisterOutOfBounds { index: usize },

    #[error("ROM is too large ({size} bytes), max size is {max} bytes")]
    RomTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, Chip8Error>;

#[cfg(test)]
mod error_test {
    use super::Chip8Error;

    #[test]
    fn messages_carry_hex_context() {
        let err = Chip8Error::Decode { opcode: 0x0123, key: 0x0023 };
        assert_eq!(err.to_string(), "unrecognized instruction 0x0123 (dispatch key 0x0023)");

        let err = Chip8Error::MemoryOutOfBounds { address: 0x1000 };
        assert_eq!(err.to_string(), "memory access out of bounds at address 0x1000");
    }

    #[test]
    fn decode_and_unsupported_are_distinct() {
        let decode = Chip8Error::Decode { opcode: 0xE0FF, key: 0xE000 };
        let unsupported = Chip8Error::Unsupported { opcode: 0xE0FF };
        assert_ne!(decode, unsupported);
    }
}
