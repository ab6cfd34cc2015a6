//! Nintendo Entertainment System (NES) emulation core.
//!
//! Cycle-accurate emulation of the NTSC NES:
//! - Ricoh 2A03 CPU (via the `cpu-2a03` crate), stepped in whole
//!   instructions
//! - PPU 2C02 stepped one dot at a time, three dots per CPU cycle
//! - iNES cartridge loading with mappers 0 (NROM), 1 (MMC1), 2 (UNROM)
//!   and 3 (CNROM)
//! - Joypad 1 serial input
//!
//! The entry point is [`Console`]: load an iNES image, then call
//! [`Console::step_frame`] once per video frame with a 256x240 RGBA
//! buffer. The APU is a stub (reads 0, writes ignored); audio is out of
//! scope for this core.

mod apu;
mod bus;
mod cartridge;
mod console;
mod joypad;
mod mapper;
mod palette;
pub mod ppu;

pub use bus::NesBus;
pub use cartridge::{Cartridge, LoadError, Mirroring};
pub use console::Console;
pub use joypad::{Button, Joypad};
pub use palette::PALETTE;
pub use ppu::Ppu;

/// Framebuffer width in pixels.
pub const FRAME_WIDTH: usize = 256;
/// Framebuffer height in pixels.
pub const FRAME_HEIGHT: usize = 240;
/// Size of an RGBA framebuffer in bytes.
pub const FRAME_BYTES: usize = FRAME_WIDTH * FRAME_HEIGHT * 4;
