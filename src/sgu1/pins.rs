//! SGU-1 Pin Bus
//!
//! All chip pins are packed into one `u64` per tick:
//!
//! | Pins   | Bits  | Direction                         |
//! |--------|-------|-----------------------------------|
//! | A0-A5  | 0-5   | in                                |
//! | D0-D7  | 16-23 | in (write) / out (read)           |
//! | RW     | 24    | in, 1 = read (same as 6502 RW)    |
//! | CS     | 40    | in, chip select                   |
//! | SAMPLE | 41    | out, virtual "sample ready" pin   |
//!
//! These helpers are the only way the chip touches the bus value. Every encoder
//! replaces its own field and leaves every other bit untouched.

/// Address bus pin A0
pub const PIN_A0: u32 = 0;
/// Data bus pin D0
pub const PIN_D0: u32 = 16;
/// Read/write pin
pub const PIN_RW: u32 = 24;
/// Chip-select pin
pub const PIN_CS: u32 = 40;
/// Virtual "audio sample ready" pin
pub const PIN_SAMPLE: u32 = 41;

/// Address field mask (A0-A5), unshifted
pub const ADDR_MASK: u64 = 0x3F;
/// Data field mask (D0-D7), in bus position
pub const DATA_MASK: u64 = 0xFF << PIN_D0;
/// Read/write pin mask
pub const RW: u64 = 1 << PIN_RW;
/// Chip-select pin mask
pub const CS: u64 = 1 << PIN_CS;
/// Sample-ready pin mask
pub const SAMPLE: u64 = 1 << PIN_SAMPLE;

/// Every bit the chip defines; all other bits are cleared in `tick` output
pub const PIN_MASK: u64 = (ADDR_MASK << PIN_A0) | DATA_MASK | RW | CS | SAMPLE;

/// Highest external address, reserved for the channel-select latch
pub const CHANNEL_SELECT_ADDR: u8 = 0x3F;

/// Extract the 6-bit register address
#[inline]
pub fn address(pins: u64) -> u8 {
    ((pins >> PIN_A0) & ADDR_MASK) as u8
}

/// Replace the address field
#[inline]
pub fn with_address(pins: u64, addr: u8) -> u64 {
    (pins & !(ADDR_MASK << PIN_A0)) | ((u64::from(addr) & ADDR_MASK) << PIN_A0)
}

/// Extract the 8-bit data bus
#[inline]
pub fn data(pins: u64) -> u8 {
    ((pins & DATA_MASK) >> PIN_D0) as u8
}

/// Merge an 8-bit value into the data bus
#[inline]
pub fn with_data(pins: u64, value: u8) -> u64 {
    (pins & !DATA_MASK) | ((u64::from(value) << PIN_D0) & DATA_MASK)
}

/// Set or clear the sample-ready pin
#[inline]
pub fn with_sample_ready(pins: u64, ready: bool) -> u64 {
    if ready {
        pins | SAMPLE
    } else {
        pins & !SAMPLE
    }
}

/// True when chip select is asserted
#[inline]
pub fn is_selected(pins: u64) -> bool {
    pins & CS != 0
}

/// True when the RW pin requests a register read
#[inline]
pub fn is_read(pins: u64) -> bool {
    pins & RW != 0
}

/// True when the chip produced a sample on this tick
#[inline]
pub fn is_sample_ready(pins: u64) -> bool {
    pins & SAMPLE != 0
}

/// Pin value for a register read of `addr`
pub fn read_request(addr: u8) -> u64 {
    with_address(CS | RW, addr)
}

/// Pin value for a register write of `value` to `addr`
pub fn write_request(addr: u8, value: u8) -> u64 {
    with_data(with_address(CS, addr), value)
}
