use pocket_emu_core::{
    interrupts::Interrupt,
    mmu::Mmu,
    timer::{Timer, period_for},
};

const DIV: u16 = 0xFF04;
const TIMA: u16 = 0xFF05;
const TMA: u16 = 0xFF06;
const TAC: u16 = 0xFF07;

fn setup(tac: u8) -> (Mmu, Timer) {
    let mut mmu = Mmu::new();
    mmu.write_byte(0xFF0F, 0);
    mmu.write_byte(TAC, tac);
    (mmu, Timer::new())
}

#[test]
fn slowest_period_steps_tima_once() {
    let (mut mmu, mut timer) = setup(0x04);
    timer.advance(1023, &mut mmu);
    assert_eq!(mmu.read_byte(TIMA), 0);
    timer.advance(1, &mut mmu);
    assert_eq!(mmu.read_byte(TIMA), 1);
}

#[test]
fn overflow_reloads_tma_and_requests_interrupt() {
    let (mut mmu, mut timer) = setup(0x05);
    mmu.write_byte(TIMA, 0xFF);
    mmu.write_byte(TMA, 0xAB);
    timer.advance(16, &mut mmu);
    assert_eq!(mmu.read_byte(TIMA), 0xAB);
    assert_eq!(mmu.if_reg(), Interrupt::Timer.mask());
}

#[test]
fn several_periods_in_one_advance() {
    let (mut mmu, mut timer) = setup(0x05);
    timer.advance(16 * 3 + 4, &mut mmu);
    assert_eq!(mmu.read_byte(TIMA), 3);
    timer.advance(12, &mut mmu);
    assert_eq!(mmu.read_byte(TIMA), 4);
}

#[test]
fn disabled_timer_holds_tima() {
    let (mut mmu, mut timer) = setup(0x01);
    timer.advance(5000, &mut mmu);
    assert_eq!(mmu.read_byte(TIMA), 0);
    assert_eq!(mmu.if_reg(), 0);
}

#[test]
fn frequency_change_reloads_countdown() {
    let (mut mmu, mut timer) = setup(0x04);
    timer.advance(1000, &mut mmu);
    mmu.write_byte(TAC, 0x06);
    timer.advance(63, &mut mmu);
    assert_eq!(mmu.read_byte(TIMA), 0);
    timer.advance(1, &mut mmu);
    assert_eq!(mmu.read_byte(TIMA), 1);
    assert_eq!(timer.frequency, 2);
}

#[test]
fn divider_counts_every_256_cycles() {
    let (mut mmu, mut timer) = setup(0x00);
    let start = mmu.read_byte(DIV);
    timer.advance(255, &mut mmu);
    assert_eq!(mmu.read_byte(DIV), start);
    timer.advance(1, &mut mmu);
    assert_eq!(mmu.read_byte(DIV), start.wrapping_add(1));
    timer.advance(512, &mut mmu);
    assert_eq!(mmu.read_byte(DIV), start.wrapping_add(3));

    mmu.write_byte(DIV, 0x77);
    assert_eq!(mmu.read_byte(DIV), 0);
}

#[test]
fn periods_match_tac_selector() {
    assert_eq!([0, 1, 2, 3].map(period_for), [1024, 16, 64, 256]);
}
