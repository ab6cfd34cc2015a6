//! Shared helpers for the integration tests.

// Each test binary uses a different subset of these helpers
#![allow(dead_code)]

use machine_nes::{Cartridge, Console};

/// Build an NROM iNES image: 16 KiB PRG (mirrored), 8 KiB CHR, reset
/// vector at $8000.
pub fn nrom_image(program: &[u8]) -> Vec<u8> {
    let mut data = vec![0u8; 16 + 0x4000 + 0x2000];
    data[0..4].copy_from_slice(b"NES\x1a");
    data[4] = 1; // PRG banks
    data[5] = 1; // CHR banks
    data[16..16 + program.len()].copy_from_slice(program);
    // Reset vector -> $8000
    data[16 + 0x3FFC] = 0x00;
    data[16 + 0x3FFD] = 0x80;
    data
}

/// Console running `program` from $8000.
pub fn console_with_program(program: &[u8]) -> Console {
    let image = nrom_image(program);
    Console::load(image.as_slice()).expect("test image loads")
}

/// Console whose program is an infinite `JMP $8000` loop.
pub fn idle_console() -> Console {
    console_with_program(&[0x4C, 0x00, 0x80])
}

pub fn test_cartridge() -> Cartridge {
    let image = nrom_image(&[0x4C, 0x00, 0x80]);
    Cartridge::load(image.as_slice()).expect("test image loads")
}
