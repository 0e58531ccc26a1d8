use crate::{
    interrupts::{self, Interrupt},
    mmu::Mmu,
};

/// Clock cycles between DIV increments (16384 Hz).
pub const DIV_PERIOD: u32 = 256;

/// TAC bit 2 starts and stops TIMA.
const TAC_ENABLE: u8 = 0x04;
pub(crate) const TAC_FREQ_MASK: u8 = 0x03;

/// Clock cycles per TIMA increment for each TAC frequency selector.
#[inline]
pub const fn period_for(freq: u8) -> i32 {
    match freq & TAC_FREQ_MASK {
        0x00 => 1024, // 4096 Hz
        0x01 => 16,   // 262144 Hz
        0x02 => 64,   // 65536 Hz
        _ => 256,     // 16384 Hz
    }
}

/// Divider and counting timer. DIV/TIMA/TMA/TAC themselves live on the bus;
/// this only tracks the sub-register counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    /// Cycles accumulated towards the next DIV increment.
    pub divider_counter: u32,
    /// Cycles remaining until the next TIMA step.
    pub timer_counter: i32,
    /// Frequency selector the countdown was last derived from.
    pub frequency: u8,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            divider_counter: 0,
            timer_counter: period_for(0),
            frequency: 0,
        }
    }

    /// Advance by `cycles` clock cycles, raising the timer interrupt on
    /// TIMA overflow.
    pub fn advance(&mut self, cycles: u32, mmu: &mut Mmu) {
        self.update_divider(cycles, mmu);

        let tac = mmu.tac();
        let freq = tac & TAC_FREQ_MASK;
        if freq != self.frequency {
            self.frequency = freq;
            self.timer_counter = period_for(freq);
        }

        if tac & TAC_ENABLE == 0 {
            return;
        }

        self.timer_counter -= cycles as i32;
        while self.timer_counter <= 0 {
            self.timer_counter += period_for(self.frequency);
            Self::step_tima(mmu);
        }
    }

    fn update_divider(&mut self, cycles: u32, mmu: &mut Mmu) {
        self.divider_counter += cycles;
        while self.divider_counter >= DIV_PERIOD {
            self.divider_counter -= DIV_PERIOD;
            mmu.set_div(mmu.div().wrapping_add(1));
        }
    }

    fn step_tima(mmu: &mut Mmu) {
        let tima = mmu.tima();
        if tima == 0xFF {
            mmu.set_tima(mmu.tma());
            interrupts::request(mmu, Interrupt::Timer);
        } else {
            mmu.set_tima(tima + 1);
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
