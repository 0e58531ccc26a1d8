//! Presentation seam and the paced run loop that drives it.

use std::{
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

use log::{info, warn};

use crate::{
    error::EmulatorError,
    gameboy::{CYCLES_PER_FRAME, CYCLES_PER_SECOND, GameBoy},
    input::{Key, button_for_key, slot_for_key},
    ppu::Frame,
    savestate::slot_path,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Closed,
    KeyPressed(Key),
    KeyReleased(Key),
}

/// A window, terminal or test harness that shows frames and reports input.
pub trait Frontend {
    fn present(&mut self, frame: &Frame);
    fn poll_events(&mut self) -> Vec<Event>;
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub save_dir: PathBuf,
    /// Stem used for slot files, usually the ROM file name.
    pub rom_name: String,
    /// Sleep to hold presentation at 60 Hz.
    pub pacing: bool,
    /// Cycle budget multiplier while fast-forward is held.
    pub fast_forward_multiplier: u32,
    /// Stop after this many presented frames.
    pub max_frames: Option<u64>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from("saves"),
            rom_name: String::from("rom"),
            pacing: true,
            fast_forward_multiplier: 100,
            max_frames: None,
        }
    }
}

pub struct Emulator<F: Frontend> {
    gb: GameBoy,
    frontend: F,
    options: RunOptions,
    shift_held: bool,
    fast_forward: bool,
    frames: u64,
}

impl<F: Frontend> Emulator<F> {
    pub fn new(gb: GameBoy, frontend: F, options: RunOptions) -> Self {
        Self {
            gb,
            frontend,
            options,
            shift_held: false,
            fast_forward: false,
            frames: 0,
        }
    }

    pub fn gameboy(&self) -> &GameBoy {
        &self.gb
    }

    pub fn gameboy_mut(&mut self) -> &mut GameBoy {
        &mut self.gb
    }

    pub fn frontend(&self) -> &F {
        &self.frontend
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn fast_forward(&self) -> bool {
        self.fast_forward
    }

    pub fn into_parts(self) -> (GameBoy, F) {
        (self.gb, self.frontend)
    }

    /// Run until the frontend reports `Event::Closed` or the frame limit is
    /// reached. Returns the number of frames presented.
    pub fn run(&mut self) -> Result<u64, EmulatorError> {
        let interval = Duration::from_secs_f64(CYCLES_PER_FRAME as f64 / CYCLES_PER_SECOND as f64);
        info!("Starting emulation");
        loop {
            let start = Instant::now();
            if !self.run_one_frame()? {
                break;
            }
            if self.options.max_frames.is_some_and(|max| self.frames >= max) {
                break;
            }
            if self.options.pacing {
                let elapsed = start.elapsed();
                if elapsed < interval {
                    thread::sleep(interval - elapsed);
                }
            }
        }
        info!("Stopped after {} frames", self.frames);
        Ok(self.frames)
    }

    /// Emulate one frame interval, present it and pump events. Returns false
    /// once the frontend has asked to close.
    pub fn run_one_frame(&mut self) -> Result<bool, EmulatorError> {
        let multiplier = if self.fast_forward {
            self.options.fast_forward_multiplier.max(1)
        } else {
            1
        };
        self.gb.run_cycles(CYCLES_PER_FRAME.saturating_mul(multiplier))?;
        self.frontend.present(self.gb.frame());
        self.gb.ppu.clear_frame_flag();
        self.frames += 1;

        let mut open = true;
        for event in self.frontend.poll_events() {
            open &= self.handle_event(event);
        }
        Ok(open)
    }

    /// Apply one input event. Returns false for `Event::Closed`.
    pub fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Closed => return false,
            Event::KeyPressed(Key::LShift) => self.shift_held = true,
            Event::KeyReleased(Key::LShift) => self.shift_held = false,
            Event::KeyPressed(Key::Space) => self.fast_forward = true,
            Event::KeyReleased(Key::Space) => self.fast_forward = false,
            Event::KeyPressed(key) => {
                if let Some(slot) = slot_for_key(key) {
                    if self.shift_held {
                        self.save_slot(slot);
                    } else {
                        self.load_slot(slot);
                    }
                } else if let Some(button) = button_for_key(key) {
                    self.gb.press(button);
                }
            }
            Event::KeyReleased(key) => {
                if let Some(button) = button_for_key(key) {
                    self.gb.release(button);
                }
            }
        }
        true
    }

    pub fn save_slot(&mut self, slot: u8) {
        let path = slot_path(&self.options.save_dir, &self.options.rom_name, slot);
        if let Err(e) = self.gb.save_state_file(&path) {
            warn!("Failed to save slot {slot}: {e}");
        }
    }

    pub fn load_slot(&mut self, slot: u8) {
        let path = slot_path(&self.options.save_dir, &self.options.rom_name, slot);
        if let Err(e) = self.gb.load_state_file(&path) {
            warn!("Failed to load slot {slot}: {e}");
        }
    }
}
