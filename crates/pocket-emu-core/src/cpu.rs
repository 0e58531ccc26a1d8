use crate::{error::EmulatorError, mmu::Mmu};

// CPU flag bits as documented in gbdev.io/pandocs/The_CPU_Flags.html
pub const FLAG_Z: u8 = 0x80; // Zero
pub const FLAG_N: u8 = 0x40; // Subtract
pub const FLAG_H: u8 = 0x20; // Half Carry
pub const FLAG_C: u8 = 0x10; // Carry

// Post-boot CPU state from gbdev.io/pandocs/Power_Up_State.html
const BOOT_PC: u16 = 0x0100;
const BOOT_SP: u16 = 0xFFFE;
const BOOT_A: u8 = 0x01;
const BOOT_F: u8 = 0xB0;
const BOOT_B: u8 = 0x00;
const BOOT_C: u8 = 0x13;
const BOOT_D: u8 = 0x00;
const BOOT_E: u8 = 0xD8;
const BOOT_H: u8 = 0x01;
const BOOT_L: u8 = 0x4D;

/// Clock cycles per machine cycle.
pub const CYCLES_PER_M_CYCLE: u32 = 4;

/// A 16-bit view over two 8-bit registers (or SP itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterPair {
    AF,
    BC,
    DE,
    HL,
    SP,
}

impl RegisterPair {
    /// `rr` operand encoding used by LD rr,d16 / INC rr / ADD HL,rr.
    fn from_rr(bits: u8) -> Self {
        match bits & 0x03 {
            0 => RegisterPair::BC,
            1 => RegisterPair::DE,
            2 => RegisterPair::HL,
            _ => RegisterPair::SP,
        }
    }

    /// PUSH/POP encoding, where AF takes the place of SP.
    fn from_qq(bits: u8) -> Self {
        match bits & 0x03 {
            0 => RegisterPair::BC,
            1 => RegisterPair::DE,
            2 => RegisterPair::HL,
            _ => RegisterPair::AF,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cpu {
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,
    /// Cost in clock cycles of the instruction executed by the last `step`.
    pub num_cycles: u32,
    pub ime: bool,
    pub halted: bool,
    /// Countdown until a pending EI sets IME.
    pub ime_enable_delay: u8,
}

impl Cpu {
    /// Create a CPU holding the post-boot register snapshot.
    pub fn new() -> Self {
        Self {
            a: BOOT_A,
            f: BOOT_F,
            b: BOOT_B,
            c: BOOT_C,
            d: BOOT_D,
            e: BOOT_E,
            h: BOOT_H,
            l: BOOT_L,
            sp: BOOT_SP,
            pc: BOOT_PC,
            num_cycles: 0,
            ime: false,
            halted: false,
            ime_enable_delay: 0,
        }
    }

    pub fn pair(&self, pair: RegisterPair) -> u16 {
        let join = |hi: u8, lo: u8| ((hi as u16) << 8) | lo as u16;
        match pair {
            RegisterPair::AF => join(self.a, self.f),
            RegisterPair::BC => join(self.b, self.c),
            RegisterPair::DE => join(self.d, self.e),
            RegisterPair::HL => join(self.h, self.l),
            RegisterPair::SP => self.sp,
        }
    }

    pub fn set_pair(&mut self, pair: RegisterPair, val: u16) {
        let hi = (val >> 8) as u8;
        let lo = val as u8;
        match pair {
            RegisterPair::AF => {
                self.a = hi;
                self.f = lo & 0xF0;
            }
            RegisterPair::BC => {
                self.b = hi;
                self.c = lo;
            }
            RegisterPair::DE => {
                self.d = hi;
                self.e = lo;
            }
            RegisterPair::HL => {
                self.h = hi;
                self.l = lo;
            }
            RegisterPair::SP => self.sp = val,
        }
    }

    pub fn get_af(&self) -> u16 {
        self.pair(RegisterPair::AF)
    }

    pub fn set_af(&mut self, val: u16) {
        self.set_pair(RegisterPair::AF, val);
    }

    pub fn get_bc(&self) -> u16 {
        self.pair(RegisterPair::BC)
    }

    pub fn set_bc(&mut self, val: u16) {
        self.set_pair(RegisterPair::BC, val);
    }

    pub fn get_de(&self) -> u16 {
        self.pair(RegisterPair::DE)
    }

    pub fn set_de(&mut self, val: u16) {
        self.set_pair(RegisterPair::DE, val);
    }

    pub fn get_hl(&self) -> u16 {
        self.pair(RegisterPair::HL)
    }

    pub fn set_hl(&mut self, val: u16) {
        self.set_pair(RegisterPair::HL, val);
    }

    #[inline]
    pub fn flag(&self, mask: u8) -> bool {
        self.f & mask != 0
    }

    pub(crate) fn cancel_ime_enable(&mut self) {
        self.ime_enable_delay = 0;
    }

    /// Formatted CPU state string for debugging.
    pub fn debug_state(&self) -> String {
        format!(
            "AF:{:04X} BC:{:04X} DE:{:04X} HL:{:04X} PC:{:04X} SP:{:04X} IME:{} HALT:{}",
            self.get_af(),
            self.get_bc(),
            self.get_de(),
            self.get_hl(),
            self.pc,
            self.sp,
            self.ime as u8,
            self.halted as u8,
        )
    }

    #[inline(always)]
    fn tick(&mut self, m_cycles: u32) {
        self.num_cycles += CYCLES_PER_M_CYCLE * m_cycles;
    }

    #[inline(always)]
    fn fetch8(&mut self, mmu: &Mmu) -> u8 {
        let val = mmu.read_byte(self.pc);
        self.pc = self.pc.wrapping_add(1);
        self.tick(1);
        val
    }

    #[inline(always)]
    fn fetch16(&mut self, mmu: &Mmu) -> u16 {
        let lo = self.fetch8(mmu) as u16;
        let hi = self.fetch8(mmu) as u16;
        (hi << 8) | lo
    }

    #[inline(always)]
    fn read8(&mut self, mmu: &Mmu, addr: u16) -> u8 {
        self.tick(1);
        mmu.read_byte(addr)
    }

    #[inline(always)]
    fn write8(&mut self, mmu: &mut Mmu, addr: u16, val: u8) {
        self.tick(1);
        mmu.write_byte(addr, val);
    }

    fn push_stack(&mut self, mmu: &mut Mmu, val: u16) {
        self.sp = self.sp.wrapping_sub(1);
        self.write8(mmu, self.sp, (val >> 8) as u8);
        self.sp = self.sp.wrapping_sub(1);
        self.write8(mmu, self.sp, val as u8);
    }

    fn pop_stack(&mut self, mmu: &Mmu) -> u16 {
        let lo = self.read8(mmu, self.sp) as u16;
        self.sp = self.sp.wrapping_add(1);
        let hi = self.read8(mmu, self.sp) as u16;
        self.sp = self.sp.wrapping_add(1);
        (hi << 8) | lo
    }

    fn read_reg(&mut self, mmu: &Mmu, index: u8) -> u8 {
        match index {
            0 => self.b,
            1 => self.c,
            2 => self.d,
            3 => self.e,
            4 => self.h,
            5 => self.l,
            6 => self.read8(mmu, self.get_hl()),
            7 => self.a,
            _ => unreachable!(),
        }
    }

    fn write_reg(&mut self, mmu: &mut Mmu, index: u8, val: u8) {
        match index {
            0 => self.b = val,
            1 => self.c = val,
            2 => self.d = val,
            3 => self.e = val,
            4 => self.h = val,
            5 => self.l = val,
            6 => {
                let addr = self.get_hl();
                self.write8(mmu, addr, val);
            }
            7 => self.a = val,
            _ => unreachable!(),
        }
    }

    /// Condition encoded in bits 3-4 of JR/JP/CALL/RET cc.
    fn condition(&self, opcode: u8) -> bool {
        match (opcode >> 3) & 0x03 {
            0 => !self.flag(FLAG_Z),
            1 => self.flag(FLAG_Z),
            2 => !self.flag(FLAG_C),
            _ => self.flag(FLAG_C),
        }
    }

    fn add8(&mut self, val: u8, use_carry: bool) {
        let carry_in = (use_carry && self.flag(FLAG_C)) as u8;
        let sum = self.a as u16 + val as u16 + carry_in as u16;
        let res = sum as u8;
        self.f = if res == 0 { FLAG_Z } else { 0 }
            | if (self.a & 0x0F) + (val & 0x0F) + carry_in > 0x0F {
                FLAG_H
            } else {
                0
            }
            | if sum > 0xFF { FLAG_C } else { 0 };
        self.a = res;
    }

    /// Shared SUB/SBC/CP flag computation; returns the difference.
    fn sub8_flags(&mut self, val: u8, use_carry: bool) -> u8 {
        let carry_in = (use_carry && self.flag(FLAG_C)) as i16;
        let diff = self.a as i16 - val as i16 - carry_in;
        let half = (self.a & 0x0F) as i16 - (val & 0x0F) as i16 - carry_in;
        let res = diff as u8;
        self.f = FLAG_N
            | if res == 0 { FLAG_Z } else { 0 }
            | if half < 0 { FLAG_H } else { 0 }
            | if diff < 0 { FLAG_C } else { 0 };
        res
    }

    /// Accumulator ALU group: ADD ADC SUB SBC AND XOR OR CP.
    fn alu(&mut self, op: u8, val: u8) {
        match op & 0x07 {
            0 => self.add8(val, false),
            1 => self.add8(val, true),
            2 => self.a = self.sub8_flags(val, false),
            3 => self.a = self.sub8_flags(val, true),
            4 => {
                self.a &= val;
                self.f = if self.a == 0 { FLAG_Z } else { 0 } | FLAG_H;
            }
            5 => {
                self.a ^= val;
                self.f = if self.a == 0 { FLAG_Z } else { 0 };
            }
            6 => {
                self.a |= val;
                self.f = if self.a == 0 { FLAG_Z } else { 0 };
            }
            _ => {
                self.sub8_flags(val, false);
            }
        }
    }

    fn inc8(&mut self, val: u8) -> u8 {
        let res = val.wrapping_add(1);
        self.f = (self.f & FLAG_C)
            | if res == 0 { FLAG_Z } else { 0 }
            | if val & 0x0F == 0x0F { FLAG_H } else { 0 };
        res
    }

    fn dec8(&mut self, val: u8) -> u8 {
        let res = val.wrapping_sub(1);
        self.f = (self.f & FLAG_C)
            | FLAG_N
            | if res == 0 { FLAG_Z } else { 0 }
            | if val & 0x0F == 0 { FLAG_H } else { 0 };
        res
    }

    fn add_hl(&mut self, val: u16) {
        let hl = self.get_hl();
        let (res, carry) = hl.overflowing_add(val);
        self.f = (self.f & FLAG_Z)
            | if (hl & 0x0FFF) + (val & 0x0FFF) > 0x0FFF {
                FLAG_H
            } else {
                0
            }
            | if carry { FLAG_C } else { 0 };
        self.set_hl(res);
    }

    /// SP plus a signed offset; flags come from the unsigned low-byte add.
    fn sp_offset(&mut self, offset: u8) -> u16 {
        let val = offset as i8 as i16 as u16;
        let sp = self.sp;
        self.f = if (sp & 0x0F) + (val & 0x0F) > 0x0F {
            FLAG_H
        } else {
            0
        } | if (sp & 0xFF) + (val & 0xFF) > 0xFF {
            FLAG_C
        } else {
            0
        };
        sp.wrapping_add(val)
    }

    fn daa(&mut self) {
        let mut a = self.a;
        let mut carry = self.flag(FLAG_C);
        if !self.flag(FLAG_N) {
            if carry || a > 0x99 {
                a = a.wrapping_add(0x60);
                carry = true;
            }
            if self.flag(FLAG_H) || a & 0x0F > 0x09 {
                a = a.wrapping_add(0x06);
            }
        } else {
            if carry {
                a = a.wrapping_sub(0x60);
            }
            if self.flag(FLAG_H) {
                a = a.wrapping_sub(0x06);
            }
        }
        self.a = a;
        self.f = (self.f & FLAG_N)
            | if a == 0 { FLAG_Z } else { 0 }
            | if carry { FLAG_C } else { 0 };
    }

    /// Rotate/shift group shared by the CB table and the accumulator forms:
    /// RLC RRC RL RR SLA SRA SWAP SRL.
    fn rotate_shift(&mut self, op: u8, val: u8) -> u8 {
        let carry_in = self.flag(FLAG_C) as u8;
        let (res, carry) = match op & 0x07 {
            0 => (val.rotate_left(1), val & 0x80 != 0),
            1 => (val.rotate_right(1), val & 0x01 != 0),
            2 => ((val << 1) | carry_in, val & 0x80 != 0),
            3 => ((val >> 1) | (carry_in << 7), val & 0x01 != 0),
            4 => (val << 1, val & 0x80 != 0),
            5 => ((val >> 1) | (val & 0x80), val & 0x01 != 0),
            6 => (val.rotate_left(4), false),
            _ => (val >> 1, val & 0x01 != 0),
        };
        self.f = if res == 0 { FLAG_Z } else { 0 } | if carry { FLAG_C } else { 0 };
        res
    }

    fn handle_cb(&mut self, mmu: &mut Mmu) {
        let opcode = self.fetch8(mmu);
        let r = opcode & 0x07;
        let bit = (opcode >> 3) & 0x07;
        match opcode {
            0x00..=0x3F => {
                let val = self.read_reg(mmu, r);
                let res = self.rotate_shift(bit, val);
                self.write_reg(mmu, r, res);
            }
            0x40..=0x7F => {
                let val = self.read_reg(mmu, r);
                self.f =
                    (self.f & FLAG_C) | FLAG_H | if val & (1 << bit) == 0 { FLAG_Z } else { 0 };
            }
            0x80..=0xBF => {
                let val = self.read_reg(mmu, r);
                self.write_reg(mmu, r, val & !(1 << bit));
            }
            0xC0..=0xFF => {
                let val = self.read_reg(mmu, r);
                self.write_reg(mmu, r, val | (1 << bit));
            }
        }
    }

    /// Execute one instruction and return its cost in clock cycles.
    pub fn step(&mut self, mmu: &mut Mmu) -> Result<u32, EmulatorError> {
        self.num_cycles = 0;

        #[cfg(feature = "cpu-trace")]
        log::trace!("{}", self.debug_state());

        let enable_after = self.ime_enable_delay == 1;
        let opcode = self.fetch8(mmu);
        match opcode {
            0x00 => {}
            0x01 | 0x11 | 0x21 | 0x31 => {
                let val = self.fetch16(mmu);
                self.set_pair(RegisterPair::from_rr(opcode >> 4), val);
            }
            0x02 | 0x12 => {
                let addr = self.pair(RegisterPair::from_rr(opcode >> 4));
                self.write8(mmu, addr, self.a);
            }
            0x22 | 0x32 => {
                let addr = self.get_hl();
                self.write8(mmu, addr, self.a);
                self.set_hl(if opcode == 0x22 {
                    addr.wrapping_add(1)
                } else {
                    addr.wrapping_sub(1)
                });
            }
            0x0A | 0x1A => {
                let addr = self.pair(RegisterPair::from_rr(opcode >> 4));
                self.a = self.read8(mmu, addr);
            }
            0x2A | 0x3A => {
                let addr = self.get_hl();
                self.a = self.read8(mmu, addr);
                self.set_hl(if opcode == 0x2A {
                    addr.wrapping_add(1)
                } else {
                    addr.wrapping_sub(1)
                });
            }
            0x03 | 0x13 | 0x23 | 0x33 => {
                let pair = RegisterPair::from_rr(opcode >> 4);
                self.set_pair(pair, self.pair(pair).wrapping_add(1));
                self.tick(1);
            }
            0x0B | 0x1B | 0x2B | 0x3B => {
                let pair = RegisterPair::from_rr(opcode >> 4);
                self.set_pair(pair, self.pair(pair).wrapping_sub(1));
                self.tick(1);
            }
            0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => {
                let r = (opcode >> 3) & 0x07;
                let val = self.read_reg(mmu, r);
                let res = self.inc8(val);
                self.write_reg(mmu, r, res);
            }
            0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => {
                let r = (opcode >> 3) & 0x07;
                let val = self.read_reg(mmu, r);
                let res = self.dec8(val);
                self.write_reg(mmu, r, res);
            }
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => {
                let val = self.fetch8(mmu);
                self.write_reg(mmu, (opcode >> 3) & 0x07, val);
            }
            0x07 | 0x0F | 0x17 | 0x1F => {
                // RLCA/RRCA/RLA/RRA: same as the CB forms but Z is always clear.
                self.a = self.rotate_shift(opcode >> 3, self.a);
                self.f &= !FLAG_Z;
            }
            0x08 => {
                let addr = self.fetch16(mmu);
                self.write8(mmu, addr, self.sp as u8);
                self.write8(mmu, addr.wrapping_add(1), (self.sp >> 8) as u8);
            }
            0x09 | 0x19 | 0x29 | 0x39 => {
                let val = self.pair(RegisterPair::from_rr(opcode >> 4));
                self.add_hl(val);
                self.tick(1);
            }
            0x10 => {
                // STOP carries a padding byte; low-power mode is not emulated.
                self.pc = self.pc.wrapping_add(1);
            }
            0x18 => {
                let offset = self.fetch8(mmu) as i8;
                self.pc = self.pc.wrapping_add(offset as u16);
                self.tick(1);
            }
            0x20 | 0x28 | 0x30 | 0x38 => {
                let offset = self.fetch8(mmu) as i8;
                if self.condition(opcode) {
                    self.pc = self.pc.wrapping_add(offset as u16);
                    self.tick(1);
                }
            }
            0x27 => self.daa(),
            0x2F => {
                self.a = !self.a;
                self.f = (self.f & (FLAG_Z | FLAG_C)) | FLAG_N | FLAG_H;
            }
            0x37 => {
                self.f = (self.f & FLAG_Z) | FLAG_C;
            }
            0x3F => {
                self.f = (self.f & FLAG_Z) | if self.flag(FLAG_C) { 0 } else { FLAG_C };
            }
            0x76 => {
                // Stay on the HALT opcode so it re-executes every step until
                // an interrupt wakes the CPU and moves PC past it.
                self.halted = true;
                self.pc = self.pc.wrapping_sub(1);
            }
            0x40..=0x7F => {
                let val = self.read_reg(mmu, opcode & 0x07);
                self.write_reg(mmu, (opcode >> 3) & 0x07, val);
            }
            0x80..=0xBF => {
                let val = self.read_reg(mmu, opcode & 0x07);
                self.alu(opcode >> 3, val);
            }
            0xC0 | 0xC8 | 0xD0 | 0xD8 => {
                self.tick(1);
                if self.condition(opcode) {
                    self.pc = self.pop_stack(mmu);
                    self.tick(1);
                }
            }
            0xC1 | 0xD1 | 0xE1 | 0xF1 => {
                let val = self.pop_stack(mmu);
                self.set_pair(RegisterPair::from_qq(opcode >> 4), val);
            }
            0xC2 | 0xCA | 0xD2 | 0xDA => {
                let addr = self.fetch16(mmu);
                if self.condition(opcode) {
                    self.pc = addr;
                    self.tick(1);
                }
            }
            0xC3 => {
                self.pc = self.fetch16(mmu);
                self.tick(1);
            }
            0xC4 | 0xCC | 0xD4 | 0xDC => {
                let addr = self.fetch16(mmu);
                if self.condition(opcode) {
                    self.tick(1);
                    self.push_stack(mmu, self.pc);
                    self.pc = addr;
                }
            }
            0xC5 | 0xD5 | 0xE5 | 0xF5 => {
                let val = self.pair(RegisterPair::from_qq(opcode >> 4));
                self.tick(1);
                self.push_stack(mmu, val);
            }
            0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => {
                let val = self.fetch8(mmu);
                self.alu(opcode >> 3, val);
            }
            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
                self.tick(1);
                self.push_stack(mmu, self.pc);
                self.pc = (opcode & 0x38) as u16;
            }
            0xC9 => {
                self.pc = self.pop_stack(mmu);
                self.tick(1);
            }
            0xD9 => {
                self.pc = self.pop_stack(mmu);
                self.tick(1);
                self.ime = true;
                self.ime_enable_delay = 0;
            }
            0xCB => self.handle_cb(mmu),
            0xCD => {
                let addr = self.fetch16(mmu);
                self.tick(1);
                self.push_stack(mmu, self.pc);
                self.pc = addr;
            }
            0xE0 => {
                let addr = 0xFF00 | self.fetch8(mmu) as u16;
                self.write8(mmu, addr, self.a);
            }
            0xF0 => {
                let addr = 0xFF00 | self.fetch8(mmu) as u16;
                self.a = self.read8(mmu, addr);
            }
            0xE2 => {
                let addr = 0xFF00 | self.c as u16;
                self.write8(mmu, addr, self.a);
            }
            0xF2 => {
                let addr = 0xFF00 | self.c as u16;
                self.a = self.read8(mmu, addr);
            }
            0xE8 => {
                let offset = self.fetch8(mmu);
                self.sp = self.sp_offset(offset);
                self.tick(2);
            }
            0xF8 => {
                let offset = self.fetch8(mmu);
                let res = self.sp_offset(offset);
                self.set_hl(res);
                self.tick(1);
            }
            0xE9 => self.pc = self.get_hl(),
            0xF9 => {
                self.sp = self.get_hl();
                self.tick(1);
            }
            0xEA => {
                let addr = self.fetch16(mmu);
                self.write8(mmu, addr, self.a);
            }
            0xFA => {
                let addr = self.fetch16(mmu);
                self.a = self.read8(mmu, addr);
            }
            0xF3 => {
                self.ime = false;
                self.ime_enable_delay = 0;
            }
            0xFB => {
                if !self.ime {
                    self.ime_enable_delay = 2;
                }
            }
            0xD3 | 0xDB | 0xDD | 0xE3 | 0xE4 | 0xEB | 0xEC | 0xED | 0xF4 | 0xFC | 0xFD => {
                let pc = self.pc.wrapping_sub(1);
                self.pc = pc;
                return Err(EmulatorError::IllegalOpcode { opcode, pc });
            }
        }

        if enable_after && self.ime_enable_delay > 0 {
            self.ime = true;
        }
        if self.ime_enable_delay > 0 {
            self.ime_enable_delay -= 1;
        }
        Ok(self.num_cycles)
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpu_with(a: u8, f: u8) -> Cpu {
        Cpu {
            a,
            f,
            ..Cpu::new()
        }
    }

    #[test]
    fn add_then_sub_restores_accumulator() {
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                let mut cpu = cpu_with(a, 0);
                cpu.add8(b, false);
                cpu.alu(2, b);
                assert_eq!(cpu.a, a, "a={a:02X} b={b:02X}");
            }
        }
    }

    #[test]
    fn sub_borrow_flags_track_operands() {
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                let mut cpu = cpu_with(a, 0);
                cpu.alu(2, b);
                assert_eq!(cpu.flag(FLAG_C), b > a, "a={a:02X} b={b:02X}");
                assert_eq!(cpu.flag(FLAG_H), (b & 0x0F) > (a & 0x0F));
                assert!(cpu.flag(FLAG_N));
                assert_eq!(cpu.f & 0x0F, 0);
            }
        }
    }

    #[test]
    fn cp_sets_flags_without_storing() {
        let mut cpu = cpu_with(0x3C, 0);
        cpu.alu(7, 0x3C);
        assert_eq!(cpu.a, 0x3C);
        assert_eq!(cpu.f, FLAG_Z | FLAG_N);
    }

    #[test]
    fn daa_corrects_bcd_addition() {
        let bcd = |n: u8| ((n / 10) << 4) | (n % 10);
        for x in 0..100u8 {
            for y in 0..100u8 {
                let mut cpu = cpu_with(bcd(x), 0);
                cpu.add8(bcd(y), false);
                cpu.daa();
                let sum = x as u16 + y as u16;
                assert_eq!(cpu.a, bcd((sum % 100) as u8), "{x} + {y}");
                assert_eq!(cpu.flag(FLAG_C), sum >= 100, "{x} + {y}");
                assert!(!cpu.flag(FLAG_H));
                assert_eq!(cpu.flag(FLAG_Z), sum % 100 == 0);
            }
        }
    }

    #[test]
    fn daa_corrects_bcd_subtraction() {
        let bcd = |n: u8| ((n / 10) << 4) | (n % 10);
        let mut cpu = cpu_with(bcd(42), 0);
        cpu.alu(2, bcd(17));
        cpu.daa();
        assert_eq!(cpu.a, bcd(25));
        assert!(!cpu.flag(FLAG_C));
    }

    #[test]
    fn add_hl_uses_bit_11_and_15_carries() {
        let mut cpu = cpu_with(0, FLAG_Z);
        cpu.set_hl(0x0FFF);
        cpu.add_hl(0x0001);
        assert_eq!(cpu.get_hl(), 0x1000);
        assert_eq!(cpu.f, FLAG_Z | FLAG_H);

        cpu.set_hl(0x8000);
        cpu.f = 0;
        cpu.add_hl(0x8000);
        assert_eq!(cpu.get_hl(), 0x0000);
        assert_eq!(cpu.f, FLAG_C);
    }

    #[test]
    fn inc_dec_leave_carry_alone() {
        let mut cpu = cpu_with(0, FLAG_C);
        assert_eq!(cpu.inc8(0xFF), 0x00);
        assert_eq!(cpu.f, FLAG_Z | FLAG_H | FLAG_C);
        assert_eq!(cpu.dec8(0x10), 0x0F);
        assert_eq!(cpu.f, FLAG_N | FLAG_H | FLAG_C);
    }

    #[test]
    fn rotate_shift_variants() {
        let mut cpu = cpu_with(0, FLAG_C);
        assert_eq!(cpu.rotate_shift(2, 0x80), 0x01);
        assert_eq!(cpu.f, FLAG_C);

        cpu.f = 0;
        assert_eq!(cpu.rotate_shift(2, 0x80), 0x00);
        assert_eq!(cpu.f, FLAG_Z | FLAG_C);

        cpu.f = 0;
        assert_eq!(cpu.rotate_shift(5, 0x81), 0xC0);
        assert_eq!(cpu.f, FLAG_C);

        assert_eq!(cpu.rotate_shift(7, 0x81), 0x40);
        assert_eq!(cpu.f, FLAG_C);

        assert_eq!(cpu.rotate_shift(6, 0xF1), 0x1F);
        assert_eq!(cpu.f, 0);
    }

    #[test]
    fn pair_writes_keep_flag_low_nibble_clear() {
        let mut cpu = Cpu::new();
        cpu.set_pair(RegisterPair::AF, 0x12FF);
        assert_eq!(cpu.a, 0x12);
        assert_eq!(cpu.f, 0xF0);
        cpu.set_de(0xBEEF);
        assert_eq!((cpu.d, cpu.e), (0xBE, 0xEF));
        cpu.set_bc(0x0102);
        assert_eq!(cpu.get_bc(), 0x0102);
    }
}
