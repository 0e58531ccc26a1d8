use crate::{cpu::Cpu, mmu::Mmu};

/// Clock cycles spent pushing PC and jumping to a vector (5 M-cycles).
pub const DISPATCH_CYCLES: u32 = 20;

/// Interrupt sources in priority order (gbdev.io/pandocs/Interrupts.html).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    VBlank,
    LcdStat,
    Timer,
    Serial,
    Joypad,
}

impl Interrupt {
    pub const ALL: [Interrupt; 5] = [
        Interrupt::VBlank,
        Interrupt::LcdStat,
        Interrupt::Timer,
        Interrupt::Serial,
        Interrupt::Joypad,
    ];

    #[inline]
    pub const fn mask(self) -> u8 {
        1 << self as u8
    }

    pub const fn vector(self) -> u16 {
        match self {
            Interrupt::VBlank => 0x40,
            Interrupt::LcdStat => 0x48,
            Interrupt::Timer => 0x50,
            Interrupt::Serial => 0x58,
            Interrupt::Joypad => 0x60,
        }
    }

    /// Highest-priority source set in `lines`.
    fn first(lines: u8) -> Option<Interrupt> {
        Self::ALL.into_iter().find(|i| lines & i.mask() != 0)
    }
}

/// Raise an interrupt line. May be called from any component at any cycle.
#[inline]
pub fn request(mmu: &mut Mmu, interrupt: Interrupt) {
    let flags = mmu.if_reg() | interrupt.mask();
    mmu.set_if_reg(flags);
}

/// Run one round of interrupt servicing and return the cycles it consumed.
///
/// A halted CPU wakes as soon as any enabled line is pending, whether or not
/// IME is set. At most one interrupt is dispatched per call.
pub fn service_pending(cpu: &mut Cpu, mmu: &mut Mmu) -> u32 {
    let pending = mmu.if_reg() & mmu.ie() & 0x1F;
    if pending == 0 {
        return 0;
    }

    if cpu.halted {
        cpu.halted = false;
        cpu.pc = cpu.pc.wrapping_add(1);
    }

    if !cpu.ime {
        return 0;
    }
    let Some(interrupt) = Interrupt::first(pending) else {
        return 0;
    };

    cpu.ime = false;
    cpu.cancel_ime_enable();
    mmu.set_if_reg(mmu.if_reg() & !interrupt.mask());

    let pc = cpu.pc;
    cpu.sp = cpu.sp.wrapping_sub(1);
    mmu.write_byte(cpu.sp, (pc >> 8) as u8);
    cpu.sp = cpu.sp.wrapping_sub(1);
    mmu.write_byte(cpu.sp, pc as u8);
    cpu.pc = interrupt.vector();

    DISPATCH_CYCLES
}
