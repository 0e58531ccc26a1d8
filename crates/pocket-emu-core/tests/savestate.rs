mod common;

use common::{machine, step_n};
use pocket_emu_core::{
    GameBoy, SaveStateError,
    savestate::{STATE_SIZE, slot_path},
};

/// A machine that has run for a while with the timer going.
fn busy_machine() -> GameBoy {
    let mut gb = machine(&[
        0x3E, 0x05, // LD A,0x05
        0xE0, 0x07, // LDH (TAC),A
        0x21, 0x00, 0xC0, // LD HL,0xC000
        0x34, // INC (HL)
        0x18, 0xFD, // JR -3
    ]);
    step_n(&mut gb, 5000);
    gb
}

#[test]
fn round_trip_restores_machine() {
    let gb = busy_machine();
    let snapshot = gb.save_state();
    assert_eq!(snapshot.len(), STATE_SIZE);

    let mut restored = GameBoy::with_cartridge(vec![]);
    restored.load_state(&snapshot);
    assert_eq!(restored.cpu.debug_state(), gb.cpu.debug_state());
    assert_eq!(restored.cpu.ime_enable_delay, gb.cpu.ime_enable_delay);
    assert_eq!(restored.timer, gb.timer);
    assert_eq!(restored.ppu.line_counter, gb.ppu.line_counter);
    assert_eq!(restored.ppu.mode, gb.ppu.mode);
    assert_eq!(restored.mmu.read_byte(0xC000), gb.mmu.read_byte(0xC000));
    assert_eq!(restored.save_state(), snapshot);
}

#[test]
fn restored_machine_runs_identically() {
    let mut gb = busy_machine();
    let snapshot = gb.save_state();

    let mut rom = vec![0; 0x8000];
    for addr in 0..0x8000u16 {
        rom[addr as usize] = gb.mmu.read_byte(addr);
    }
    let mut other = GameBoy::with_cartridge(rom);
    other.load_state(&snapshot);

    step_n(&mut gb, 1000);
    step_n(&mut other, 1000);
    assert_eq!(gb.save_state(), other.save_state());
}

#[test]
fn slot_files_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = slot_path(&dir.path().join("saves"), "demo", 4);
    assert!(path.ends_with("saves/demo_4.sav"));

    let gb = busy_machine();
    gb.save_state_file(&path).unwrap();
    assert_eq!(std::fs::read(&path).unwrap().len(), STATE_SIZE);

    let mut restored = GameBoy::new();
    restored.load_state_file(&path).unwrap();
    assert_eq!(restored.save_state(), gb.save_state());
}

#[test]
fn missing_file_leaves_state_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let mut gb = busy_machine();
    let before = gb.save_state();

    let err = gb
        .load_state_file(&dir.path().join("absent.sav"))
        .unwrap_err();
    assert!(matches!(err, SaveStateError::Io { .. }));
    assert_eq!(gb.save_state(), before);
}

#[test]
fn truncated_snapshot_zero_fills() {
    let gb = busy_machine();
    let snapshot = gb.save_state();

    let mut restored = busy_machine();
    restored.load_state(&snapshot[..12]);
    assert_eq!(restored.cpu.pc, gb.cpu.pc);
    assert_eq!(restored.cpu.sp, gb.cpu.sp);
    assert!(!restored.cpu.ime);
    assert_eq!(restored.timer.timer_counter, 1);
    assert_eq!(restored.mmu.read_byte(0xC000), 0);
}

#[test]
fn saturated_snapshot_keeps_running() {
    let mut gb = GameBoy::new();
    gb.load_state(&vec![0xFF; STATE_SIZE]);
    assert!(gb.timer.divider_counter < 256);
    assert_eq!(gb.timer.timer_counter, 1);
    assert_eq!(gb.ppu.line_counter, 456);
    assert_eq!(gb.ppu.lines_rendered, 144);
    step_n(&mut gb, 10_000);
}

#[test]
fn out_of_range_line_counter_is_clamped() {
    let mut snapshot = machine(&[]).save_state();
    // Line counter sits after the registers, CPU flags and timer fields.
    snapshot[24..28].copy_from_slice(&i32::MIN.to_le_bytes());
    snapshot[15..19].copy_from_slice(&u32::MAX.to_le_bytes());

    let mut gb = machine(&[]);
    gb.load_state(&snapshot);
    assert_eq!(gb.ppu.line_counter, 1);
    assert_eq!(gb.timer.divider_counter, u32::MAX % 256);
    step_n(&mut gb, 1000);
}
