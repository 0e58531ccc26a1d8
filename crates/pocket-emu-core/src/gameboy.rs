use log::info;

use crate::{
    cpu::Cpu,
    error::EmulatorError,
    input::Button,
    interrupts::{self, Interrupt},
    mmu::Mmu,
    ppu::{Frame, Ppu},
    timer::Timer,
};

/// DMG master clock in clock cycles per second.
pub const CYCLES_PER_SECOND: u32 = 4_194_304;

/// Clock cycles emulated per presented frame at 60 Hz.
pub const CYCLES_PER_FRAME: u32 = CYCLES_PER_SECOND / 60;

pub struct GameBoy {
    pub cpu: Cpu,
    pub mmu: Mmu,
    pub timer: Timer,
    pub ppu: Ppu,
}

impl GameBoy {
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            mmu: Mmu::new(),
            timer: Timer::new(),
            ppu: Ppu::new(),
        }
    }

    pub fn with_cartridge(rom: Vec<u8>) -> Self {
        let mut gb = Self::new();
        gb.load_cartridge(rom);
        gb
    }

    pub fn load_cartridge(&mut self, rom: Vec<u8>) {
        self.mmu.load_cart(rom);
        let title = self.mmu.cart_title();
        if !title.is_empty() {
            info!("Cartridge title: {title}");
        }
    }

    /// Reset CPU, timer, PPU and I/O registers to their post-boot values
    /// while keeping RAM and the loaded cartridge.
    pub fn reset(&mut self) {
        self.cpu = Cpu::new();
        self.timer = Timer::new();
        self.ppu = Ppu::new();
        self.mmu.reset_io();
        info!("Reset to power-on state");
    }

    /// Execute one instruction, clock the peripherals by its cost, then
    /// service interrupts. Returns the total clock cycles consumed,
    /// including any interrupt dispatch.
    pub fn step(&mut self) -> Result<u32, EmulatorError> {
        let mut cycles = self.cpu.step(&mut self.mmu)?;
        self.timer.advance(cycles, &mut self.mmu);
        self.ppu.advance(cycles, &mut self.mmu);

        let dispatch = interrupts::service_pending(&mut self.cpu, &mut self.mmu);
        if dispatch > 0 {
            self.timer.advance(dispatch, &mut self.mmu);
            self.ppu.advance(dispatch, &mut self.mmu);
            cycles += dispatch;
        }
        Ok(cycles)
    }

    /// Step until at least `budget` clock cycles have elapsed; returns the
    /// cycles actually run.
    pub fn run_cycles(&mut self, budget: u32) -> Result<u32, EmulatorError> {
        let mut elapsed = 0;
        while elapsed < budget {
            elapsed += self.step()?;
        }
        Ok(elapsed)
    }

    /// Run one 60 Hz frame interval.
    pub fn run_frame(&mut self) -> Result<u32, EmulatorError> {
        self.run_cycles(CYCLES_PER_FRAME)
    }

    /// Hold a button. The joypad interrupt fires only on a released to
    /// pressed transition.
    pub fn press(&mut self, button: Button) {
        if self.mmu.press(button) {
            interrupts::request(&mut self.mmu, Interrupt::Joypad);
        }
    }

    pub fn release(&mut self, button: Button) {
        self.mmu.release(button);
    }

    /// Most recently completed frame.
    pub fn frame(&self) -> &Frame {
        self.ppu.frame()
    }
}

impl Default for GameBoy {
    fn default() -> Self {
        Self::new()
    }
}
