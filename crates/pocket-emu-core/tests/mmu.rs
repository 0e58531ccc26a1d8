use pocket_emu_core::{input::Button, mmu::Mmu};

#[test]
fn post_boot_io_values() {
    let mmu = Mmu::new();
    assert_eq!(mmu.read_byte(0xFF40), 0x91);
    assert_eq!(mmu.read_byte(0xFF47), 0xFC);
    assert_eq!(mmu.read_byte(0xFF04), 0xAB);
    assert_eq!(mmu.read_byte(0xFF0F), 0xE1);
    assert_eq!(mmu.read_byte(0xFFFF), 0x00);
}

#[test]
fn cartridge_reads_and_ignored_writes() {
    let mut mmu = Mmu::new();
    assert!(!mmu.has_cart());
    mmu.load_cart(vec![0x12, 0x34]);
    assert_eq!(mmu.read_byte(0x0000), 0x12);
    assert_eq!(mmu.read_byte(0x0001), 0x34);
    // Beyond the image
    assert_eq!(mmu.read_byte(0x0002), 0xFF);
    assert_eq!(mmu.read_byte(0x7FFF), 0xFF);

    mmu.write_byte(0x0000, 0x99);
    assert_eq!(mmu.read_byte(0x0000), 0x12);
}

#[test]
fn cartridge_title_from_header() {
    let mut rom = vec![0; 0x8000];
    rom[0x0134..0x0139].copy_from_slice(b"TETRA");
    let mut mmu = Mmu::new();
    mmu.load_cart(rom);
    assert_eq!(mmu.cart_title(), "TETRA");
}

#[test]
fn echo_ram_mirrors_work_ram() {
    let mut mmu = Mmu::new();
    mmu.write_byte(0xC000, 0xAA);
    assert_eq!(mmu.read_byte(0xE000), 0xAA);
    mmu.write_byte(0xFDFF, 0xBB);
    assert_eq!(mmu.read_byte(0xDDFF), 0xBB);
}

#[test]
fn joypad_rows_follow_select_bits() {
    let mut mmu = Mmu::new();
    assert!(mmu.press(Button::A));
    assert!(mmu.press(Button::Down));
    assert!(!mmu.press(Button::A));

    mmu.write_byte(0xFF00, 0x10); // buttons row
    assert_eq!(mmu.read_byte(0xFF00), 0xDE);

    mmu.write_byte(0xFF00, 0x20); // directions row
    assert_eq!(mmu.read_byte(0xFF00), 0xE7);

    mmu.write_byte(0xFF00, 0x30); // neither row
    assert_eq!(mmu.read_byte(0xFF00), 0xFF);

    mmu.release(Button::A);
    mmu.write_byte(0xFF00, 0x10);
    assert_eq!(mmu.read_byte(0xFF00), 0xDF);
}

#[test]
fn register_write_side_effects() {
    let mut mmu = Mmu::new();
    mmu.write_byte(0xFF04, 0x55);
    assert_eq!(mmu.read_byte(0xFF04), 0);

    mmu.set_ly(90);
    mmu.write_byte(0xFF44, 0x12);
    assert_eq!(mmu.read_byte(0xFF44), 0);

    // STAT bits 0-2 are read-only from the CPU side.
    mmu.set_stat(0x03);
    mmu.write_byte(0xFF41, 0xFF);
    assert_eq!(mmu.read_byte(0xFF41), 0xFB);

    mmu.write_byte(0xFF0F, 0x01);
    assert_eq!(mmu.read_byte(0xFF0F), 0xE1);
    assert_eq!(mmu.if_reg(), 0x01);
}

#[test]
fn oam_dma_copies_160_bytes() {
    let mut mmu = Mmu::new();
    for i in 0..0xA0u16 {
        mmu.write_byte(0xC100 + i, i as u8);
    }
    mmu.write_byte(0xFF46, 0xC1);
    for i in 0..0xA0u16 {
        assert_eq!(mmu.read_byte(0xFE00 + i), i as u8);
    }
}

#[test]
fn reset_io_keeps_ram() {
    let mut mmu = Mmu::new();
    mmu.write_byte(0xC000, 0x42);
    mmu.write_byte(0xFF40, 0x00);
    mmu.reset_io();
    assert_eq!(mmu.read_byte(0xC000), 0x42);
    assert_eq!(mmu.read_byte(0xFF40), 0x91);
}
