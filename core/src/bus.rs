/// A bus that supports memory read/write operations.
///
/// The 6502 family is fully memory-mapped, so a single address space covers
/// RAM, ROM and every peripheral register. Reads may have side effects
/// (clearing status flags, advancing shift registers), which is why `read`
/// takes `&mut self`.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);

    /// Advance the system clock without performing a memory operation.
    ///
    /// Used for internal CPU operations (register transfers, ALU work,
    /// page-cross fixups) that consume cycles but don't access the bus.
    /// Implementations that account for time at instruction grain may
    /// ignore this.
    fn tick(&mut self, cycles: u32);
}
