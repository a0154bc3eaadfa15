//! Instruction handlers. Each one reads its operands from `self.opcode`,
//! mutates the machine, and leaves `pc` at the next instruction to run.

use rand::Rng;

use super::dispatch::{KeyOp, MiscOp};
use super::display::{FONT_GLYPH_SIZE, HEIGHT, WIDTH};
use super::error::{Chip8Error, Result};
use super::memory::FONT_START;
use super::{Chip8, Step};

impl Chip8 {

    fn x(&self) -> usize { ((self.opcode & 0x0F00) >> 8) as usize }
    fn y(&self) -> usize { ((self.opcode & 0x00F0) >> 4) as usize }
    fn byte(&self) -> u8 { (self.opcode & 0x00FF) as u8 }
    fn addr(&self) -> u16 { self.opcode & 0x0FFF }
    fn nibble(&self) -> usize { (self.opcode & 0x000F) as usize }

    fn vx(&self) -> Result<u8> { self.cpu.register(self.x()) }
    fn vy(&self) -> Result<u8> { self.cpu.register(self.y()) }

    fn skip_if(&mut self, condition: bool) -> Result<Step> {
        if condition {
            self.cpu.skip_next();
        } else {
            self.cpu.increment_pc();
        }
        Ok(Step::Continue)
    }

    /// Stores `value` in Vx and steps past the instruction.
    fn store_vx(&mut self, value: u8) -> Result<Step> {
        self.cpu.set_register(self.x(), value)?;
        self.cpu.increment_pc();
        Ok(Step::Continue)
    }

    /// Flag first, result second: with x = F the result wins.
    fn store_vx_with_flag(&mut self, value: u8, flag: bool) -> Result<Step> {
        self.cpu.set_flag(flag);
        self.store_vx(value)
    }

    pub(super) fn cls(&mut self) -> Result<Step> {
        self.display.reset();
        self.cpu.increment_pc();
        Ok(Step::Drawn)
    }

    pub(super) fn ret(&mut self) -> Result<Step> {
        let new_pc = self.stack_pop()?;
        self.cpu.set_pc(new_pc);
        Ok(Step::Continue)
    }

    pub(super) fn jp_addr(&mut self) -> Result<Step> {
        self.cpu.set_pc(self.addr());
        Ok(Step::Continue)
    }

    pub(super) fn call_addr(&mut self) -> Result<Step> {
        let return_to = self.cpu.read_pc().wrapping_add(2);
        self.stack_push(return_to)?;

        self.cpu.set_pc(self.addr());
        Ok(Step::Continue)
    }

    pub(super) fn se_vx_byte(&mut self) -> Result<Step> {
        let equal = self.vx()? == self.byte();
        self.skip_if(equal)
    }

    pub(super) fn sne_vx_byte(&mut self) -> Result<Step> {
        let unequal = self.vx()? != self.byte();
        self.skip_if(unequal)
    }

    pub(super) fn se_vx_vy(&mut self) -> Result<Step> {
        let equal = self.vx()? == self.vy()?;
        self.skip_if(equal)
    }

    pub(super) fn ld_vx_byte(&mut self) -> Result<Step> {
        self.store_vx(self.byte())
    }

    pub(super) fn add_vx_byte(&mut self) -> Result<Step> {
        let sum = self.vx()?.wrapping_add(self.byte());
        self.store_vx(sum)
    }

    pub(super) fn ld_vx_vy(&mut self) -> Result<Step> {
        let vy = self.vy()?;
        self.store_vx(vy)
    }

    pub(super) fn or_vx_vy(&mut self) -> Result<Step> {
        let value = self.vx()? | self.vy()?;
        self.store_vx(value)
    }

    pub(super) fn and_vx_vy(&mut self) -> Result<Step> {
        let value = self.vx()? & self.vy()?;
        self.store_vx(value)
    }

    pub(super) fn xor_vx_vy(&mut self) -> Result<Step> {
        let value = self.vx()? ^ self.vy()?;
        self.store_vx(value)
    }

    pub(super) fn add_vx_vy(&mut self) -> Result<Step> {
        let sum = self.vx()? as u16 + self.vy()? as u16;
        self.store_vx_with_flag((sum & 0x00FF) as u8, sum > 0x00FF)
    }

    pub(super) fn sub_vx_vy(&mut self) -> Result<Step> {
        let (vx, vy) = (self.vx()?, self.vy()?);
        self.store_vx_with_flag(vx.wrapping_sub(vy), vx > vy)
    }

    pub(super) fn shr_vx(&mut self) -> Result<Step> {
        let vx = self.vx()?;
        self.store_vx_with_flag(vx >> 1, vx & 0x01 != 0)
    }

    pub(super) fn subn_vx_vy(&mut self) -> Result<Step> {
        let (vx, vy) = (self.vx()?, self.vy()?);
        self.store_vx_with_flag(vy.wrapping_sub(vx), vy > vx)
    }

    pub(super) fn shl_vx(&mut self) -> Result<Step> {
        let vx = self.vx()?;
        self.store_vx_with_flag(vx << 1, vx & 0x80 != 0)
    }

    pub(super) fn sne_vx_vy(&mut self) -> Result<Step> {
        let unequal = self.vx()? != self.vy()?;
        self.skip_if(unequal)
    }

    pub(super) fn ld_i_addr(&mut self) -> Result<Step> {
        self.cpu.i_register = self.addr();
        self.cpu.increment_pc();
        Ok(Step::Continue)
    }

    pub(super) fn jp_v0_addr(&mut self) -> Result<Step> {
        let v0 = self.cpu.register(0x0)? as u16;
        self.cpu.set_pc(self.addr() + v0);
        Ok(Step::Continue)
    }

    pub(super) fn rnd_vx_byte(&mut self) -> Result<Step> {
        let rand: u8 = self.rng.gen();
        self.store_vx(rand & self.byte())
    }

    pub(super) fn drw_vx_vy_nibble(&mut self) -> Result<Step> {
        let column = self.vx()? as usize % WIDTH;
        let top = self.vy()? as usize % HEIGHT;

        // Read the whole sprite first so a bad I never leaves a half-drawn frame.
        let sprite = self.memory.slice(self.cpu.i_register as usize, self.nibble())?;

        let mut collision = false;
        for (offset, byte) in sprite.iter().enumerate() {
            let row = top + offset;
            if row >= HEIGHT { break }
            collision |= self.display.draw_byte(row, column, *byte);
        }

        self.cpu.set_flag(collision);
        self.cpu.increment_pc();
        Ok(Step::Drawn)
    }

    pub(super) fn key_skip(&mut self) -> Result<Step> {
        let key = self.vx()?;
        match KeyOp::decode(self.opcode)? {
            KeyOp::SkipIfDown => {
                let down = self.keypad.is_down(key);
                self.skip_if(down)
            }
            KeyOp::SkipIfUp => {
                let up = self.keypad.is_up(key);
                self.skip_if(up)
            }
        }
    }

    pub(super) fn misc(&mut self) -> Result<Step> {
        match MiscOp::decode(self.opcode)? {
            MiscOp::LdVxDt => self.store_vx(self.cpu.delay),
            MiscOp::LdVxK => self.ld_vx_k(),
            MiscOp::LdDtVx => {
                self.cpu.delay = self.vx()?;
                self.cpu.increment_pc();
                Ok(Step::Continue)
            }
            MiscOp::LdStVx => {
                self.cpu.sound = self.vx()?;
                self.cpu.increment_pc();
                Ok(Step::Continue)
            }
            MiscOp::AddIVx => {
                self.cpu.i_register = self.cpu.i_register.wrapping_add(self.vx()? as u16);
                self.cpu.increment_pc();
                Ok(Step::Continue)
            }
            MiscOp::LdFVx => {
                let digit = (self.vx()? & 0x0F) as u16;
                self.cpu.i_register = FONT_START + digit * FONT_GLYPH_SIZE as u16;
                self.cpu.increment_pc();
                Ok(Step::Continue)
            }
            MiscOp::LdBVx => self.ld_b_vx(),
            MiscOp::LdIVx => self.ld_i_vx(),
            MiscOp::LdVxI => self.ld_vx_i(),
        }
    }

    fn ld_vx_k(&mut self) -> Result<Step> {
        match self.keypad.first_down() {
            Some(key) => self.store_vx(key),
            None => Ok(Step::AwaitingKey),
        }
    }

    fn ld_b_vx(&mut self) -> Result<Step> {
        let vx = self.vx()?;
        let digits = [vx / 100, (vx / 10) % 10, vx % 10];

        self.memory.write_slice(self.cpu.i_register as usize, &digits)?;
        self.cpu.increment_pc();
        Ok(Step::Continue)
    }

    fn ld_i_vx(&mut self) -> Result<Step> {
        let count = self.x() + 1;
        let values = self
            .cpu
            .v_registers
            .get(..count)
            .ok_or(Chip8Error::RegisterOutOfBounds { index: self.x() })?;

        self.memory.write_slice(self.cpu.i_register as usize, values)?;
        self.cpu.increment_pc();
        Ok(Step::Continue)
    }

    fn ld_vx_i(&mut self) -> Result<Step> {
        let count = self.x() + 1;
        let values = self.memory.slice(self.cpu.i_register as usize, count)?;

        for (index, value) in values.iter().enumerate() {
            self.cpu.set_register(index, *value)?;
        }
        self.cpu.increment_pc();
        Ok(Step::Continue)
    }
}
