//! iNES cartridge loading.
//!
//! An iNES image is a 16-byte header, an optional 512-byte trainer, PRG ROM
//! in 16 KiB units, then CHR ROM in 8 KiB units. A CHR count of zero means
//! the board carries 8 KiB of CHR RAM instead.

use std::io::{self, Read};

use log::info;
use thiserror::Error;

use crate::mapper::{Cnrom, Mmc1, Nrom, Unrom};

/// Nametable mirroring mode, as seen by the PPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    Horizontal,
    Vertical,
    SingleScreenLower,
    SingleScreenUpper,
}

/// Errors produced while loading an iNES image.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file does not start with `NES\x1A`.
    #[error("not an iNES image (bad magic)")]
    BadMagic,
    /// The stream ended before the PRG/CHR sizes promised by the header.
    #[error("iNES image truncated")]
    Truncated,
    /// The image uses a mapper outside {0, 1, 2, 3}.
    #[error("unsupported mapper {0}")]
    UnsupportedMapper(u8),
    /// The reader failed for a reason other than a clean end of stream.
    #[error("I/O error reading iNES image")]
    Io(#[from] io::Error),
}

/// A loaded cartridge: one of the four supported mapper boards.
///
/// Dispatch is a `match` over the variants; there are only four, and they
/// are hot on both the CPU and PPU paths.
pub enum Cartridge {
    Nrom(Nrom),
    Mmc1(Mmc1),
    Unrom(Unrom),
    Cnrom(Cnrom),
}

fn read_exact_or_truncated(reader: &mut impl Read, buf: &mut [u8]) -> Result<(), LoadError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => LoadError::Truncated,
        _ => LoadError::Io(e),
    })
}

impl Cartridge {
    /// Parse an iNES image from a reader.
    pub fn load(mut reader: impl Read) -> Result<Self, LoadError> {
        let mut header = [0u8; 16];
        read_exact_or_truncated(&mut reader, &mut header)?;

        if header[0..4] != *b"NES\x1a" {
            return Err(LoadError::BadMagic);
        }

        let prg_banks = usize::from(header[4]);
        let chr_banks = usize::from(header[5]);
        let flags6 = header[6];
        let flags7 = header[7];

        let mapper_number = (flags6 >> 4) | (flags7 & 0xF0);
        let mirroring = if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };
        let has_battery = flags6 & 0x02 != 0;

        if flags6 & 0x04 != 0 {
            // 512-byte trainer precedes PRG ROM; nothing here uses it
            let mut trainer = [0u8; 512];
            read_exact_or_truncated(&mut reader, &mut trainer)?;
        }

        if prg_banks == 0 {
            return Err(LoadError::Truncated);
        }

        let mut prg = vec![0u8; prg_banks * 0x4000];
        read_exact_or_truncated(&mut reader, &mut prg)?;

        // CHR count 0 means 8 KiB of writable CHR RAM
        let chr_writable = chr_banks == 0;
        let mut chr = vec![0u8; chr_banks.max(1) * 0x2000];
        if chr_banks > 0 {
            read_exact_or_truncated(&mut reader, &mut chr)?;
        }

        info!(
            "loaded iNES image: mapper {}, {} KiB PRG, {} KiB CHR{}, {:?} mirroring{}",
            mapper_number,
            prg.len() / 1024,
            chr.len() / 1024,
            if chr_writable { " RAM" } else { "" },
            mirroring,
            if has_battery { ", battery" } else { "" },
        );

        match mapper_number {
            0 => Ok(Cartridge::Nrom(Nrom::new(prg, chr, chr_writable, mirroring))),
            1 => Ok(Cartridge::Mmc1(Mmc1::new(
                prg,
                chr,
                chr_writable,
                has_battery,
                mirroring,
            ))),
            2 => Ok(Cartridge::Unrom(Unrom::new(prg, chr, chr_writable, mirroring))),
            3 => Ok(Cartridge::Cnrom(Cnrom::new(prg, chr, chr_writable, mirroring))),
            n => Err(LoadError::UnsupportedMapper(n)),
        }
    }

    /// CPU read from cartridge space ($4020-$FFFF).
    pub fn cpu_read(&self, addr: u16) -> u8 {
        match self {
            Cartridge::Nrom(m) => m.cpu_read(addr),
            Cartridge::Mmc1(m) => m.cpu_read(addr),
            Cartridge::Unrom(m) => m.cpu_read(addr),
            Cartridge::Cnrom(m) => m.cpu_read(addr),
        }
    }

    /// CPU write to cartridge space (mapper registers, work RAM).
    pub fn cpu_write(&mut self, addr: u16, value: u8) {
        match self {
            Cartridge::Nrom(m) => m.cpu_write(addr, value),
            Cartridge::Mmc1(m) => m.cpu_write(addr, value),
            Cartridge::Unrom(m) => m.cpu_write(addr, value),
            Cartridge::Cnrom(m) => m.cpu_write(addr, value),
        }
    }

    /// PPU read from pattern-table space ($0000-$1FFF).
    pub fn ppu_read(&self, addr: u16) -> u8 {
        match self {
            Cartridge::Nrom(m) => m.ppu_read(addr),
            Cartridge::Mmc1(m) => m.ppu_read(addr),
            Cartridge::Unrom(m) => m.ppu_read(addr),
            Cartridge::Cnrom(m) => m.ppu_read(addr),
        }
    }

    /// PPU write to pattern-table space (CHR RAM boards only).
    pub fn ppu_write(&mut self, addr: u16, value: u8) {
        match self {
            Cartridge::Nrom(m) => m.ppu_write(addr, value),
            Cartridge::Mmc1(m) => m.ppu_write(addr, value),
            Cartridge::Unrom(m) => m.ppu_write(addr, value),
            Cartridge::Cnrom(m) => m.ppu_write(addr, value),
        }
    }

    /// Current nametable mirroring mode. Fixed by the header for most
    /// boards; MMC1 selects it at runtime.
    pub fn mirror_mode(&self) -> Mirroring {
        match self {
            Cartridge::Nrom(m) => m.mirror_mode(),
            Cartridge::Mmc1(m) => m.mirror_mode(),
            Cartridge::Unrom(m) => m.mirror_mode(),
            Cartridge::Cnrom(m) => m.mirror_mode(),
        }
    }

    /// Whether the header declared battery-backed work RAM.
    pub fn has_battery(&self) -> bool {
        matches!(self, Cartridge::Mmc1(m) if m.battery())
    }

    /// Snapshot of the 8 KiB work RAM, for boards that have one.
    pub fn work_ram(&self) -> Option<&[u8]> {
        match self {
            Cartridge::Mmc1(m) => Some(m.work_ram()),
            _ => None,
        }
    }
}
