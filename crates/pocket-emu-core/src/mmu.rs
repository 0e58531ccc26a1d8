use log::{debug, info};

use crate::input::Button;

const ROM_END: u16 = 0x7FFF;
const ECHO_START: u16 = 0xE000;
const ECHO_END: u16 = 0xFDFF;
const ECHO_OFFSET: u16 = 0x2000;
const OAM_START: u16 = 0xFE00;
const OAM_SIZE: u16 = 0xA0;

// Memory-mapped registers (gbdev.io/pandocs/Memory_Map.html)
pub const REG_JOYP: u16 = 0xFF00;
pub const REG_DIV: u16 = 0xFF04;
pub const REG_TIMA: u16 = 0xFF05;
pub const REG_TMA: u16 = 0xFF06;
pub const REG_TAC: u16 = 0xFF07;
pub const REG_IF: u16 = 0xFF0F;
pub const REG_LCDC: u16 = 0xFF40;
pub const REG_STAT: u16 = 0xFF41;
pub const REG_SCY: u16 = 0xFF42;
pub const REG_SCX: u16 = 0xFF43;
pub const REG_LY: u16 = 0xFF44;
pub const REG_LYC: u16 = 0xFF45;
pub const REG_DMA: u16 = 0xFF46;
pub const REG_BGP: u16 = 0xFF47;
pub const REG_OBP0: u16 = 0xFF48;
pub const REG_OBP1: u16 = 0xFF49;
pub const REG_WY: u16 = 0xFF4A;
pub const REG_WX: u16 = 0xFF4B;
pub const REG_IE: u16 = 0xFFFF;

/// First address of the region captured by save states.
pub const STATE_RAM_START: u16 = 0x8000;

// Post-boot I/O register values from gbdev.io/pandocs/Power_Up_State.html
const BOOT_IO: [(u16, u8); 21] = [
    (REG_JOYP, 0xCF),
    (0xFF01, 0x00),
    (0xFF02, 0x7E),
    (REG_DIV, 0xAB),
    (REG_TIMA, 0x00),
    (REG_TMA, 0x00),
    (REG_TAC, 0xF8),
    (REG_IF, 0xE1),
    (REG_LCDC, 0x91),
    (REG_STAT, 0x85),
    (REG_SCY, 0x00),
    (REG_SCX, 0x00),
    (REG_LY, 0x00),
    (REG_LYC, 0x00),
    (REG_DMA, 0xFF),
    (REG_BGP, 0xFC),
    (REG_OBP0, 0xFF),
    (REG_OBP1, 0xFF),
    (REG_WY, 0x00),
    (REG_WX, 0x00),
    (REG_IE, 0x00),
];

/// Flat 64 KiB bus with the DMG's memory-mapped register file.
///
/// Cartridge bytes are resolved directly (no mapper); everything from
/// 0x8000 upward is plain storage except for the handful of registers whose
/// CPU-visible writes have side effects. Peripherals use the named accessors,
/// which bypass those side effects.
pub struct Mmu {
    memory: Box<[u8; 0x10000]>,
    rom: Vec<u8>,
    /// Button row (A, B, Select, Start) in bits 0-3, 0 = pressed.
    pub joypad_buttons: u8,
    /// Direction row (Right, Left, Up, Down) in bits 0-3, 0 = pressed.
    pub joypad_directions: u8,
}

impl Mmu {
    pub fn new() -> Self {
        let mut mmu = Self {
            memory: Box::new([0; 0x10000]),
            rom: Vec::new(),
            joypad_buttons: 0x0F,
            joypad_directions: 0x0F,
        };
        mmu.reset_io();
        mmu
    }

    /// Map a cartridge image at 0x0000. Only the first 32 KiB are visible.
    pub fn load_cart(&mut self, data: Vec<u8>) {
        info!("Loaded cartridge image ({} bytes)", data.len());
        self.rom = data;
    }

    pub fn has_cart(&self) -> bool {
        !self.rom.is_empty()
    }

    /// Title from the cartridge header (0x0134-0x0143), trimmed of padding.
    pub fn cart_title(&self) -> String {
        let end = self.rom.len().min(0x0144);
        let raw = self.rom.get(0x0134..end).unwrap_or(&[]);
        raw.iter()
            .take_while(|&&b| b != 0)
            .filter(|b| b.is_ascii_graphic() || **b == b' ')
            .map(|&b| b as char)
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// Restore every I/O register to its post-boot value. RAM and the
    /// cartridge image are left untouched.
    pub fn reset_io(&mut self) {
        self.memory[0xFF00..=0xFF7F].fill(0);
        for (addr, val) in BOOT_IO {
            self.memory[addr as usize] = val;
        }
        self.joypad_buttons = 0x0F;
        self.joypad_directions = 0x0F;
    }

    pub fn read_byte(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=ROM_END => self.rom.get(addr as usize).copied().unwrap_or(0xFF),
            ECHO_START..=ECHO_END => self.memory[(addr - ECHO_OFFSET) as usize],
            REG_JOYP => self.read_joypad(),
            REG_IF => self.memory[REG_IF as usize] | 0xE0,
            REG_STAT => self.memory[REG_STAT as usize] | 0x80,
            _ => self.memory[addr as usize],
        }
    }

    pub fn write_byte(&mut self, addr: u16, val: u8) {
        match addr {
            0x0000..=ROM_END => {
                debug!("ignored write {val:02X} to ROM address {addr:04X}");
            }
            ECHO_START..=ECHO_END => self.memory[(addr - ECHO_OFFSET) as usize] = val,
            REG_JOYP => {
                let select = val & 0x30;
                self.memory[REG_JOYP as usize] = 0xC0 | select | 0x0F;
            }
            REG_DIV | REG_LY => self.memory[addr as usize] = 0,
            REG_STAT => {
                let stat = self.memory[REG_STAT as usize];
                self.memory[REG_STAT as usize] = (stat & 0x07) | (val & 0x78);
            }
            REG_IF => self.memory[REG_IF as usize] = val | 0xE0,
            REG_DMA => {
                self.memory[REG_DMA as usize] = val;
                self.oam_dma(val);
            }
            _ => self.memory[addr as usize] = val,
        }
    }

    fn read_joypad(&self) -> u8 {
        let select = self.memory[REG_JOYP as usize] & 0x30;
        let mut lines = 0x0F;
        if select & 0x10 == 0 {
            lines &= self.joypad_directions;
        }
        if select & 0x20 == 0 {
            lines &= self.joypad_buttons;
        }
        0xC0 | select | lines
    }

    fn oam_dma(&mut self, page: u8) {
        let src = (page as u16) << 8;
        debug!("OAM DMA from {src:04X}");
        for i in 0..OAM_SIZE {
            let byte = self.read_byte(src.wrapping_add(i));
            self.memory[(OAM_START + i) as usize] = byte;
        }
    }

    /// Mark `button` as held. Returns true when it was previously released.
    pub fn press(&mut self, button: Button) -> bool {
        let bit = button.line_mask();
        let row = if button.is_direction() {
            &mut self.joypad_directions
        } else {
            &mut self.joypad_buttons
        };
        let was_released = *row & bit != 0;
        *row &= !bit;
        was_released
    }

    pub fn release(&mut self, button: Button) {
        let bit = button.line_mask();
        if button.is_direction() {
            self.joypad_directions |= bit;
        } else {
            self.joypad_buttons |= bit;
        }
    }

    /// Raw view of 0x8000-0xFFFF for save states.
    pub fn state_ram(&self) -> &[u8] {
        &self.memory[STATE_RAM_START as usize..]
    }

    pub fn state_ram_mut(&mut self) -> &mut [u8] {
        &mut self.memory[STATE_RAM_START as usize..]
    }

    #[inline]
    fn reg(&self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    #[inline]
    fn set_reg(&mut self, addr: u16, val: u8) {
        self.memory[addr as usize] = val;
    }

    pub fn lcdc(&self) -> u8 {
        self.reg(REG_LCDC)
    }

    pub fn stat(&self) -> u8 {
        self.reg(REG_STAT)
    }

    /// PPU-side STAT update; unlike a CPU write this may touch bits 0-2.
    pub fn set_stat(&mut self, val: u8) {
        self.set_reg(REG_STAT, val);
    }

    pub fn scy(&self) -> u8 {
        self.reg(REG_SCY)
    }

    pub fn scx(&self) -> u8 {
        self.reg(REG_SCX)
    }

    pub fn ly(&self) -> u8 {
        self.reg(REG_LY)
    }

    pub fn set_ly(&mut self, val: u8) {
        self.set_reg(REG_LY, val);
    }

    pub fn lyc(&self) -> u8 {
        self.reg(REG_LYC)
    }

    pub fn bgp(&self) -> u8 {
        self.reg(REG_BGP)
    }

    pub fn obp0(&self) -> u8 {
        self.reg(REG_OBP0)
    }

    pub fn obp1(&self) -> u8 {
        self.reg(REG_OBP1)
    }

    pub fn wy(&self) -> u8 {
        self.reg(REG_WY)
    }

    pub fn wx(&self) -> u8 {
        self.reg(REG_WX)
    }

    pub fn div(&self) -> u8 {
        self.reg(REG_DIV)
    }

    pub fn set_div(&mut self, val: u8) {
        self.set_reg(REG_DIV, val);
    }

    pub fn tima(&self) -> u8 {
        self.reg(REG_TIMA)
    }

    pub fn set_tima(&mut self, val: u8) {
        self.set_reg(REG_TIMA, val);
    }

    pub fn tma(&self) -> u8 {
        self.reg(REG_TMA)
    }

    pub fn tac(&self) -> u8 {
        self.reg(REG_TAC)
    }

    pub fn ie(&self) -> u8 {
        self.reg(REG_IE)
    }

    /// Pending interrupt lines (IF bits 0-4).
    pub fn if_reg(&self) -> u8 {
        self.reg(REG_IF) & 0x1F
    }

    pub fn set_if_reg(&mut self, val: u8) {
        self.set_reg(REG_IF, 0xE0 | (val & 0x1F));
    }
}

impl Default for Mmu {
    fn default() -> Self {
        Self::new()
    }
}
