//! Flat binary snapshots of the whole machine.
//!
//! Layout, all multi-byte fields little-endian:
//!
//! | field | size |
//! |-------|------|
//! | A B C D E F H L | 8 |
//! | SP, PC | 2 + 2 |
//! | IME, halted, EI delay | 3 |
//! | divider counter, timer countdown, frequency | 4 + 4 + 1 |
//! | line counter, mode, lines rendered, coincidence | 4 + 1 + 2 + 1 |
//! | joypad buttons, joypad directions | 2 |
//! | memory 0x8000-0xFFFF | 0x8000 |
//!
//! Bytes past the end of a short snapshot read as zero. Counter fields are
//! brought back into their running ranges on load; every other value is
//! taken as stored.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::info;

use crate::{
    error::SaveStateError,
    gameboy::GameBoy,
    ppu::{LINE_CYCLES, SCREEN_HEIGHT},
    timer::{DIV_PERIOD, TAC_FREQ_MASK, period_for},
};

/// Size in bytes of a complete snapshot.
pub const STATE_SIZE: usize = 8 + 4 + 3 + 9 + 8 + 2 + 0x8000;

/// `<save_dir>/<rom_name>_<slot>.sav`
pub fn slot_path(save_dir: &Path, rom_name: &str, slot: u8) -> PathBuf {
    save_dir.join(format!("{rom_name}_{slot}.sav"))
}

struct StateReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> StateReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn u8(&mut self) -> u8 {
        let val = self.data.get(self.pos).copied().unwrap_or(0);
        self.pos += 1;
        val
    }

    fn bytes<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0; N];
        for b in &mut out {
            *b = self.u8();
        }
        out
    }

    fn u16(&mut self) -> u16 {
        u16::from_le_bytes(self.bytes())
    }

    fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.bytes())
    }

    fn i32(&mut self) -> i32 {
        i32::from_le_bytes(self.bytes())
    }

    fn bool(&mut self) -> bool {
        self.u8() != 0
    }

    fn fill(&mut self, dst: &mut [u8]) {
        for b in dst {
            *b = self.u8();
        }
    }
}

impl GameBoy {
    pub fn save_state(&self) -> Vec<u8> {
        let cpu = &self.cpu;
        let mut out = Vec::with_capacity(STATE_SIZE);
        out.extend_from_slice(&[cpu.a, cpu.b, cpu.c, cpu.d, cpu.e, cpu.f, cpu.h, cpu.l]);
        out.extend_from_slice(&cpu.sp.to_le_bytes());
        out.extend_from_slice(&cpu.pc.to_le_bytes());
        out.push(cpu.ime as u8);
        out.push(cpu.halted as u8);
        out.push(cpu.ime_enable_delay);

        out.extend_from_slice(&self.timer.divider_counter.to_le_bytes());
        out.extend_from_slice(&self.timer.timer_counter.to_le_bytes());
        out.push(self.timer.frequency);

        out.extend_from_slice(&self.ppu.line_counter.to_le_bytes());
        out.push(self.ppu.mode);
        out.extend_from_slice(&self.ppu.lines_rendered.to_le_bytes());
        out.push(self.ppu.coincidence as u8);

        out.push(self.mmu.joypad_buttons);
        out.push(self.mmu.joypad_directions);
        out.extend_from_slice(self.mmu.state_ram());
        out
    }

    pub fn load_state(&mut self, data: &[u8]) {
        let mut r = StateReader::new(data);
        let cpu = &mut self.cpu;
        cpu.a = r.u8();
        cpu.b = r.u8();
        cpu.c = r.u8();
        cpu.d = r.u8();
        cpu.e = r.u8();
        cpu.f = r.u8() & 0xF0;
        cpu.h = r.u8();
        cpu.l = r.u8();
        cpu.sp = r.u16();
        cpu.pc = r.u16();
        cpu.ime = r.bool();
        cpu.halted = r.bool();
        cpu.ime_enable_delay = r.u8().min(2);

        self.timer.divider_counter = r.u32() % DIV_PERIOD;
        let timer_counter = r.i32();
        self.timer.frequency = r.u8() & TAC_FREQ_MASK;
        self.timer.timer_counter = timer_counter.clamp(1, period_for(self.timer.frequency));

        self.ppu.line_counter = r.i32().clamp(1, LINE_CYCLES);
        self.ppu.mode = r.u8() & 0x03;
        self.ppu.lines_rendered = r.u16().min(SCREEN_HEIGHT as u16);
        self.ppu.coincidence = r.bool();

        self.mmu.joypad_buttons = r.u8();
        self.mmu.joypad_directions = r.u8();
        r.fill(self.mmu.state_ram_mut());
    }

    pub fn save_state_file(&self, path: &Path) -> Result<(), SaveStateError> {
        let io_err = |source| SaveStateError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(path, self.save_state()).map_err(io_err)?;
        info!("Saved state to {}", path.display());
        Ok(())
    }

    /// Load a snapshot from disk. On I/O failure the machine is untouched.
    pub fn load_state_file(&mut self, path: &Path) -> Result<(), SaveStateError> {
        let data = fs::read(path).map_err(|source| SaveStateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_state(&data);
        info!("Loaded state from {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_has_fixed_size_and_register_prefix() {
        let gb = GameBoy::new();
        let state = gb.save_state();
        assert_eq!(state.len(), STATE_SIZE);
        assert_eq!(&state[..8], &[0x01, 0x00, 0x13, 0x00, 0xD8, 0xB0, 0x01, 0x4D]);
        assert_eq!(&state[8..12], &[0xFE, 0xFF, 0x00, 0x01]);
    }

    #[test]
    fn short_snapshot_reads_zero() {
        let mut gb = GameBoy::new();
        gb.load_state(&[0x42]);
        assert_eq!(gb.cpu.a, 0x42);
        assert_eq!(gb.cpu.b, 0);
        assert_eq!(gb.cpu.pc, 0);
        assert_eq!(gb.mmu.read_byte(0xC000), 0);
    }

    #[test]
    fn slot_file_naming() {
        let path = slot_path(Path::new("saves"), "tetris", 3);
        assert_eq!(path, Path::new("saves").join("tetris_3.sav"));
    }
}
