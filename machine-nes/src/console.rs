//! The composed console: CPU, bus and frame loop.

use std::io::Read;

use cpu_2a03::{Rp2a03, RESET_CYCLES};
use log::debug;
use nes_core::{Bus, Cpu};

use crate::bus::NesBus;
use crate::cartridge::{Cartridge, LoadError};
use crate::joypad::Button;
use crate::ppu::Ppu;
use crate::FRAME_BYTES;

/// A complete NES: 2A03 CPU plus the memory-mapped bus holding the PPU,
/// APU stub, joypad and cartridge.
///
/// The CPU advances in whole instructions; the PPU advances three dots per
/// CPU cycle after each instruction completes. A frame is delimited by the
/// rising edge of the PPU's NMI line (dot 1 of scanline 241 with NMI
/// enabled); when the running program keeps NMI disabled, the PPU frame
/// counter delimits it instead.
pub struct Console {
    cpu: Rp2a03,
    bus: NesBus,
}

impl Console {
    /// Load an iNES image and power on: the CPU reset sequence runs (7
    /// cycles) and the PPU is settled by the matching 21 dots.
    pub fn load(reader: impl Read) -> Result<Self, LoadError> {
        Ok(Self::from_cartridge(Cartridge::load(reader)?))
    }

    /// Power on a console around an already-loaded cartridge.
    pub fn from_cartridge(cart: Cartridge) -> Self {
        let mut bus = NesBus::new(cart);
        let mut cpu = Rp2a03::new();
        cpu.reset(&mut bus);
        let mut console = Self { cpu, bus };
        console.step_ppu(3 * RESET_CYCLES);
        console
    }

    /// Re-run the CPU reset sequence.
    pub fn reset(&mut self) {
        self.cpu.reset(&mut self.bus);
        self.step_ppu(3 * RESET_CYCLES);
    }

    /// Run emulation until the frame ends, then copy the finished 256x240
    /// RGBA image into `frame`.
    pub fn step_frame(&mut self, frame: &mut [u8; FRAME_BYTES]) {
        let start_frame = self.bus.ppu.frame();
        loop {
            let (_, nmi_edge) = self.step_once();
            if nmi_edge {
                break;
            }
            // NMI disabled: delimit by the frame counter instead. With NMI
            // enabled the edge arrives at dot 1 of scanline 241, so keep
            // going past the wrap.
            if self.bus.ppu.frame() != start_frame && !self.bus.ppu.nmi_enabled() {
                break;
            }
        }
        frame.copy_from_slice(self.bus.ppu.frame_buffer());
    }

    /// Execute one CPU instruction (plus any OAM DMA stall) and advance
    /// the PPU three dots per cycle. Returns the CPU cycles consumed.
    pub fn step(&mut self) -> u32 {
        self.step_once().0
    }

    /// Update a joypad 1 button.
    pub fn set_button(&mut self, button: Button, pressed: bool) {
        self.bus.joypad1.set_button(button, pressed);
    }

    pub fn cpu(&self) -> &Rp2a03 {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Rp2a03 {
        &mut self.cpu
    }

    pub fn ppu(&self) -> &Ppu {
        &self.bus.ppu
    }

    pub fn bus(&self) -> &NesBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut NesBus {
        &mut self.bus
    }

    /// One instruction plus its PPU dots. The bool reports a rising edge
    /// of the NMI line across the dot batch; the CPU NMI input is pulsed
    /// when it rises.
    fn step_once(&mut self) -> (u32, bool) {
        let mut cycles = self.cpu.step(&mut self.bus);
        if let Some(page) = self.bus.take_oam_dma() {
            cycles += self.run_oam_dma(page);
        }

        let before = self.bus.ppu.nmi_triggered();
        self.step_ppu(3 * cycles);
        let after = self.bus.ppu.nmi_triggered();

        let edge = !before && after;
        if edge {
            <Rp2a03 as Cpu<NesBus>>::nmi(&mut self.cpu);
        }
        (cycles, edge)
    }

    fn step_ppu(&mut self, dots: u32) {
        let NesBus { ppu, cart, .. } = &mut self.bus;
        for _ in 0..dots {
            ppu.step(cart);
        }
    }

    /// Copy 256 bytes from CPU page `page` into OAM through the OAMDATA
    /// port. The CPU stalls 513 cycles, 514 when the transfer starts on an
    /// odd cycle.
    fn run_oam_dma(&mut self, page: u8) -> u32 {
        debug!("OAM DMA from page ${page:02X}");
        let base = u16::from(page) << 8;
        for offset in 0..256u16 {
            let value = self.bus.read(base + offset);
            self.bus.ppu.write_oam_data(value);
        }
        let stall = 513 + u32::from(self.cpu.cycles() % 2 == 1);
        self.cpu.stall(stall);
        stall
    }
}
