//! Cycle-stepped DMG (monochrome Game Boy) emulation core.
//!
//! This crate contains the platform-agnostic emulator logic (CPU/bus/PPU/timer).
//! Frontends live in separate crates and drive the core via the [`gameboy`]
//! facade or the [`frontend::Emulator`] run loop.

/// LR35902 CPU core.
pub mod cpu;

/// Error types surfaced by the core.
pub mod error;

/// Presentation trait, input events and the paced run loop.
pub mod frontend;

/// High-level facade that wires the CPU, bus, timer and PPU into a single machine.
pub mod gameboy;

/// Joypad buttons and the keyboard mapping.
pub mod input;

/// Interrupt request and dispatch.
pub mod interrupts;

/// Memory map and hardware registers.
pub mod mmu;

/// Pixel Processing Unit (PPU) emulation.
pub mod ppu;

/// Binary save states.
pub mod savestate;

/// Divider/timer unit.
pub mod timer;

pub use error::{EmulatorError, SaveStateError};
pub use gameboy::GameBoy;
