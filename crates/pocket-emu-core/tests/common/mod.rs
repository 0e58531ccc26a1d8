#![allow(dead_code)]

use pocket_emu_core::GameBoy;

pub const ENTRY: usize = 0x0100;
const ROM_SIZE: usize = 0x8000;

/// 32 KiB image of NOPs with `program` placed at the entry point.
pub fn rom_with_program(program: &[u8]) -> Vec<u8> {
    let mut rom = vec![0; ROM_SIZE];
    rom[ENTRY..ENTRY + program.len()].copy_from_slice(program);
    rom
}

/// Like `rom_with_program`, with extra code blocks at fixed addresses.
pub fn rom_with_blocks(program: &[u8], blocks: &[(usize, &[u8])]) -> Vec<u8> {
    let mut rom = rom_with_program(program);
    for &(addr, code) in blocks {
        rom[addr..addr + code.len()].copy_from_slice(code);
    }
    rom
}

pub fn machine(program: &[u8]) -> GameBoy {
    GameBoy::with_cartridge(rom_with_program(program))
}

/// Machine with every interrupt line cleared.
pub fn quiet_machine(program: &[u8]) -> GameBoy {
    let mut gb = machine(program);
    gb.mmu.write_byte(0xFF0F, 0x00);
    gb
}

pub fn step_n(gb: &mut GameBoy, n: usize) -> u32 {
    let mut cycles = 0;
    for _ in 0..n {
        cycles += gb.step().expect("step failed");
    }
    cycles
}
