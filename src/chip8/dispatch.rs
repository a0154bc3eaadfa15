//! Instruction word → operation resolution.
//!
//! Every word is reduced to a 16-bit dispatch key. The key is the leading
//! nibble shifted into place, except for the two families that overload it:
//! `0x0...` folds in the whole low byte (`00E0` vs `00EE`) and `0x8...`
//! folds in only the last nibble (`8xy0`..`8xyE`), since `x` and `y` there
//! are operands. The key then indexes one flat table built on first use.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::error::{Chip8Error, Result};
use super::{Chip8, Step};

/// The operation set, one variant per table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    Cls,
    Ret,
    JpAddr,
    CallAddr,
    SeVxByte,
    SneVxByte,
    SeVxVy,
    LdVxByte,
    AddVxByte,
    LdVxVy,
    OrVxVy,
    AndVxVy,
    XorVxVy,
    AddVxVy,
    SubVxVy,
    ShrVx,
    SubnVxVy,
    ShlVx,
    SneVxVy,
    LdIAddr,
    JpV0Addr,
    RndVxByte,
    DrwVxVyNibble,
    /// `Ex..` family, sub-operation picked from the low byte.
    KeySkip,
    /// `Fx..` family, sub-operation picked from the low byte.
    Misc,
}

/// Sub-operations of the `Ex..` family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOp {
    SkipIfDown,
    SkipIfUp,
}

impl KeyOp {
    pub fn decode(opcode: u16) -> Result<Self> {
        match opcode & 0x00FF {
            0x9E => Ok(KeyOp::SkipIfDown),
            0xA1 => Ok(KeyOp::SkipIfUp),
            _ => Err(Chip8Error::Unsupported { opcode }),
        }
    }
}

/// Sub-operations of the `Fx..` family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiscOp {
    LdVxDt,
    LdVxK,
    LdDtVx,
    LdStVx,
    AddIVx,
    LdFVx,
    LdBVx,
    LdIVx,
    LdVxI,
}

impl MiscOp {
    pub fn decode(opcode: u16) -> Result<Self> {
        match opcode & 0x00FF {
            0x07 => Ok(MiscOp::LdVxDt),
            0x0A => Ok(MiscOp::LdVxK),
            0x15 => Ok(MiscOp::LdDtVx),
            0x18 => Ok(MiscOp::LdStVx),
            0x1E => Ok(MiscOp::AddIVx),
            0x29 => Ok(MiscOp::LdFVx),
            0x33 => Ok(MiscOp::LdBVx),
            0x55 => Ok(MiscOp::LdIVx),
            0x65 => Ok(MiscOp::LdVxI),
            _ => Err(Chip8Error::Unsupported { opcode }),
        }
    }
}

static HANDLER_TABLE: Lazy<HashMap<u16, Instruction>> = Lazy::new(|| {
    use Instruction::*;
    HashMap::from([
        (0x00E0, Cls),
        (0x00EE, Ret),
        (0x1000, JpAddr),
        (0x2000, CallAddr),
        (0x3000, SeVxByte),
        (0x4000, SneVxByte),
        (0x5000, SeVxVy),
        (0x6000, LdVxByte),
        (0x7000, AddVxByte),
        (0x8000, LdVxVy),
        (0x8001, OrVxVy),
        (0x8002, AndVxVy),
        (0x8003, XorVxVy),
        (0x8004, AddVxVy),
        (0x8005, SubVxVy),
        (0x8006, ShrVx),
        (0x8007, SubnVxVy),
        (0x800E, ShlVx),
        (0x9000, SneVxVy),
        (0xA000, LdIAddr),
        (0xB000, JpV0Addr),
        (0xC000, RndVxByte),
        (0xD000, DrwVxVyNibble),
        (0xE000, KeySkip),
        (0xF000, Misc),
    ])
});

pub fn dispatch_key(opcode: u16) -> u16 {
    let family = opcode & 0xF000;

    match family >> 12 {
        0x0 => family | (opcode & 0x00FF),
        0x8 => family | (opcode & 0x000F),
        _ => family,
    }
}

pub fn resolve(opcode: u16) -> Result<Instruction> {
    let key = dispatch_key(opcode);
    HANDLER_TABLE
        .get(&key)
        .copied()
        .ok_or(Chip8Error::Decode { opcode, key })
}

/// Resolves the word currently at `pc`. Re-resolve after every `pc` change.
pub fn resolve_at(chip: &Chip8) -> Result<Instruction> {
    let opcode = chip.memory.read_u16(chip.cpu.read_pc() as usize)?;
    resolve(opcode)
}

impl Instruction {
    pub fn execute(self, chip: &mut Chip8) -> Result<Step> {
        use Instruction::*;
        match self {
            Cls => chip.cls(),
            Ret => chip.ret(),
            JpAddr => chip.jp_addr(),
            CallAddr => chip.call_addr(),
            SeVxByte => chip.se_vx_byte(),
            SneVxByte => chip.sne_vx_byte(),
            SeVxVy => chip.se_vx_vy(),
            LdVxByte => chip.ld_vx_byte(),
            AddVxByte => chip.add_vx_byte(),
            LdVxVy => chip.ld_vx_vy(),
            OrVxVy => chip.or_vx_vy(),
            AndVxVy => chip.and_vx_vy(),
            XorVxVy => chip.xor_vx_vy(),
            AddVxVy => chip.add_vx_vy(),
            SubVxVy => chip.sub_vx_vy(),
            ShrVx => chip.shr_vx(),
            SubnVxVy => chip.subn_vx_vy(),
            ShlVx => chip.shl_vx(),
            SneVxVy => chip.sne_vx_vy(),
            LdIAddr => chip.ld_i_addr(),
            JpV0Addr => chip.jp_v0_addr(),
            RndVxByte => chip.rnd_vx_byte(),
            DrwVxVyNibble => chip.drw_vx_vy_nibble(),
            KeySkip => chip.key_skip(),
            Misc => chip.misc(),
        }
    }
}

/// Conventional assembler mnemonic for `opcode`.
pub fn disassemble(opcode: u16) -> Result<String> {
    let x = (opcode & 0x0F00) >> 8;
    let y = (opcode & 0x00F0) >> 4;
    let addr = opcode & 0x0FFF;
    let byte = opcode & 0x00FF;

    let text = match resolve(opcode)? {
        Instruction::Cls => "CLS".to_owned(),
        Instruction::Ret => "RET".to_owned(),
        Instruction::JpAddr => format!("JP {:#06x}", addr),
        Instruction::CallAddr => format!("CALL {:#06x}", addr),
        Instruction::SeVxByte => format!("SE V{:1x}, {:#04x}", x, byte),
        Instruction::SneVxByte => format!("SNE V{:1x}, {:#04x}", x, byte),
        Instruction::SeVxVy => format!("SE V{:1x}, V{:1x}", x, y),
        Instruction::LdVxByte => format!("LD V{:1x}, {:#04x}", x, byte),
        Instruction::AddVxByte => format!("ADD V{:1x}, {:#04x}", x, byte),
        Instruction::LdVxVy => format!("LD V{:1x}, V{:1x}", x, y),
        Instruction::OrVxVy => format!("OR V{:1x}, V{:1x}", x, y),
        Instruction::AndVxVy => format!("AND V{:1x}, V{:1x}", x, y),
        Instruction::XorVxVy => format!("XOR V{:1x}, V{:1x}", x, y),
        Instruction::AddVxVy => format!("ADD V{:1x}, V{:1x}", x, y),
        Instruction::SubVxVy => format!("SUB V{:1x}, V{:1x}", x, y),
        Instruction::ShrVx => format!("SHR V{:1x}", x),
        Instruction::SubnVxVy => format!("SUBN V{:1x}, V{:1x}", x, y),
        Instruction::ShlVx => format!("SHL V{:1x}", x),
        Instruction::SneVxVy => format!("SNE V{:1x}, V{:1x}", x, y),
        Instruction::LdIAddr => format!("LD I, {:#06x}", addr),
        Instruction::JpV0Addr => format!("JP V0, {:#06x}", addr),
        Instruction::RndVxByte => format!("RND V{:1x}, {:#04x}", x, byte),
        Instruction::DrwVxVyNibble => format!("DRW V{:1x}, V{:1x}, {:#03x}", x, y, opcode & 0x000F),
        Instruction::KeySkip => match KeyOp::decode(opcode)? {
            KeyOp::SkipIfDown => format!("SKP V{:1x}", x),
            KeyOp::SkipIfUp => format!("SKNP V{:1x}", x),
        },
        Instruction::Misc => match MiscOp::decode(opcode)? {
            MiscOp::LdVxDt => format!("LD V{:1x}, DT", x),
            MiscOp::LdVxK => format!("LD V{:1x}, K", x),
            MiscOp::LdDtVx => format!("LD DT, V{:1x}", x),
            MiscOp::LdStVx => format!("LD ST, V{:1x}", x),
            MiscOp::AddIVx => format!("ADD I, V{:1x}", x),
            MiscOp::LdFVx => format!("LD F, V{:1x}", x),
            MiscOp::LdBVx => format!("LD B, V{:1x}", x),
            MiscOp::LdIVx => format!("LD [I], V{:1x}", x),
            MiscOp::LdVxI => format!("LD V{:1x}, [I]", x),
        },
    };

    Ok(text)
}

#[cfg(test)]
mod dispatch_test {
    use super::*;

    #[test]
    fn every_table_key_resolves_to_its_own_entry() {
        for (key, instruction) in HANDLER_TABLE.iter() {
            assert_eq!(dispatch_key(*key), *key);
            assert_eq!(resolve(*key), Ok(*instruction));
        }
        assert_eq!(HANDLER_TABLE.len(), 25);
    }

    #[test]
    fn operand_nibbles_do_not_change_the_key() {
        assert_eq!(resolve(0x1ABC), Ok(Instruction::JpAddr));
        assert_eq!(resolve(0x3F00), Ok(Instruction::SeVxByte));
        assert_eq!(resolve(0xD12F), Ok(Instruction::DrwVxVyNibble));
        assert_eq!(resolve(0x8AB4), Ok(Instruction::AddVxVy));
        assert_eq!(resolve(0x8FFE), Ok(Instruction::ShlVx));
        assert_eq!(resolve(0xE59E), Ok(Instruction::KeySkip));
    }

    #[test]
    fn zero_family_uses_whole_low_byte() {
        assert_eq!(dispatch_key(0x00E0), 0x00E0);
        assert_eq!(dispatch_key(0x00EE), 0x00EE);
        assert_eq!(resolve(0x00E0), Ok(Instruction::Cls));
        assert_eq!(resolve(0x00EE), Ok(Instruction::Ret));
    }

    #[test]
    fn unregistered_keys_are_decode_errors() {
        assert_eq!(resolve(0x0123), Err(Chip8Error::Decode { opcode: 0x0123, key: 0x0023 }));
        assert_eq!(resolve(0x8128), Err(Chip8Error::Decode { opcode: 0x8128, key: 0x8008 }));
        assert_eq!(resolve(0x0000), Err(Chip8Error::Decode { opcode: 0x0000, key: 0x0000 }));
    }

    #[test]
    fn family_sub_operations() {
        assert_eq!(KeyOp::decode(0xE3A1), Ok(KeyOp::SkipIfUp));
        assert_eq!(MiscOp::decode(0xF233), Ok(MiscOp::LdBVx));
        assert_eq!(MiscOp::decode(0xF2FF), Err(Chip8Error::Unsupported { opcode: 0xF2FF }));
    }

    #[test]
    fn mnemonics() {
        assert_eq!(disassemble(0x00E0).unwrap(), "CLS");
        assert_eq!(disassemble(0x2345).unwrap(), "CALL 0x0345");
        assert_eq!(disassemble(0x6A0F).unwrap(), "LD Va, 0x0f");
        assert_eq!(disassemble(0x8126).unwrap(), "SHR V1");
        assert_eq!(disassemble(0xD125).unwrap(), "DRW V1, V2, 0x5");
        assert_eq!(disassemble(0xF065).unwrap(), "LD V0, [I]");
        assert_eq!(disassemble(0xE012), Err(Chip8Error::Unsupported { opcode: 0xE012 }));
    }
}
