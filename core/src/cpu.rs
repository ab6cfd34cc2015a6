use crate::Bus;

/// A CPU that can execute instructions.
///
/// The type parameter `B` is the bus type this CPU operates on.
pub trait Cpu<B: Bus> {
    /// Execute one instruction. Returns cycles consumed, including any
    /// addressing-mode penalties and interrupt service sequences.
    fn step(&mut self, bus: &mut B) -> u32;

    /// Reset the CPU: load the reset vector and restore power-on register
    /// state.
    fn reset(&mut self, bus: &mut B);

    /// Latch a non-maskable interrupt, serviced at the next `step`.
    fn nmi(&mut self);

    /// Latch a maskable interrupt request, serviced at the next `step`
    /// unless the I flag is set.
    fn irq(&mut self);

    /// Current program counter.
    fn pc(&self) -> u16;
}
