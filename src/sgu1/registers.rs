//! SGU-1 Channel Register Definitions
//!
//! Layout of one channel's register block as seen through the external
//! address window. Offsets 0x20-0x3E are plain storage; 0x3F is never a
//! channel register because the bus routes it to the channel-select latch.

use std::fmt;

use super::CHANNEL_REGISTERS;

/// Channel register offset within a channel block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// Frequency (low byte)
    FreqLo = 0x00,
    /// Frequency (high byte)
    FreqHi = 0x01,
    /// Signed volume
    Volume = 0x02,
    /// Signed panning (negative = left)
    Pan = 0x03,
    /// Waveform and filter control
    Flags0 = 0x04,
    /// Phase reset, PCM loop and sweep enables
    Flags1 = 0x05,
    /// Filter cutoff (low byte)
    CutoffLo = 0x06,
    /// Filter cutoff (high byte)
    CutoffHi = 0x07,
    /// Pulse duty
    Duty = 0x08,
    /// Filter resonance
    Resonance = 0x09,
    /// PCM position (low byte)
    PcmPosLo = 0x0A,
    /// PCM position (high byte)
    PcmPosHi = 0x0B,
    /// PCM bound (low byte)
    PcmBoundLo = 0x0C,
    /// PCM bound (high byte)
    PcmBoundHi = 0x0D,
    /// PCM restart (low byte)
    PcmRestartLo = 0x0E,
    /// PCM restart (high byte)
    PcmRestartHi = 0x0F,
    /// Frequency sweep speed (low byte)
    FreqSweepSpeedLo = 0x10,
    /// Frequency sweep speed (high byte)
    FreqSweepSpeedHi = 0x11,
    /// Frequency sweep amount
    FreqSweepAmount = 0x12,
    /// Frequency sweep bound
    FreqSweepBound = 0x13,
    /// Volume sweep speed (low byte)
    VolSweepSpeedLo = 0x14,
    /// Volume sweep speed (high byte)
    VolSweepSpeedHi = 0x15,
    /// Volume sweep amount
    VolSweepAmount = 0x16,
    /// Volume sweep bound
    VolSweepBound = 0x17,
    /// Cutoff sweep speed (low byte)
    CutSweepSpeedLo = 0x18,
    /// Cutoff sweep speed (high byte)
    CutSweepSpeedHi = 0x19,
    /// Cutoff sweep amount
    CutSweepAmount = 0x1A,
    /// Cutoff sweep bound
    CutSweepBound = 0x1B,
    /// Special register 1C
    Special1C = 0x1C,
    /// Special register 1D
    Special1D = 0x1D,
    /// Restart timer (low byte)
    RestimerLo = 0x1E,
    /// Restart timer (high byte)
    RestimerHi = 0x1F,
}

const ALL: [Register; 32] = [
    Register::FreqLo,
    Register::FreqHi,
    Register::Volume,
    Register::Pan,
    Register::Flags0,
    Register::Flags1,
    Register::CutoffLo,
    Register::CutoffHi,
    Register::Duty,
    Register::Resonance,
    Register::PcmPosLo,
    Register::PcmPosHi,
    Register::PcmBoundLo,
    Register::PcmBoundHi,
    Register::PcmRestartLo,
    Register::PcmRestartHi,
    Register::FreqSweepSpeedLo,
    Register::FreqSweepSpeedHi,
    Register::FreqSweepAmount,
    Register::FreqSweepBound,
    Register::VolSweepSpeedLo,
    Register::VolSweepSpeedHi,
    Register::VolSweepAmount,
    Register::VolSweepBound,
    Register::CutSweepSpeedLo,
    Register::CutSweepSpeedHi,
    Register::CutSweepAmount,
    Register::CutSweepBound,
    Register::Special1C,
    Register::Special1D,
    Register::RestimerLo,
    Register::RestimerHi,
];

impl Register {
    /// Convert a channel register offset to a `Register`
    ///
    /// Returns `None` for the storage-only range 0x20-0x3F.
    pub fn from_offset(offset: u8) -> Option<Self> {
        ALL.get(offset as usize).copied()
    }

    /// Offset within the channel block
    pub fn offset(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Register::FreqLo => "Frequency Low",
            Register::FreqHi => "Frequency High",
            Register::Volume => "Volume",
            Register::Pan => "Panning",
            Register::Flags0 => "Control Flags 0",
            Register::Flags1 => "Control Flags 1",
            Register::CutoffLo => "Cutoff Low",
            Register::CutoffHi => "Cutoff High",
            Register::Duty => "Duty",
            Register::Resonance => "Resonance",
            Register::PcmPosLo => "PCM Position Low",
            Register::PcmPosHi => "PCM Position High",
            Register::PcmBoundLo => "PCM Bound Low",
            Register::PcmBoundHi => "PCM Bound High",
            Register::PcmRestartLo => "PCM Restart Low",
            Register::PcmRestartHi => "PCM Restart High",
            Register::FreqSweepSpeedLo => "Sweep Freq Speed Low",
            Register::FreqSweepSpeedHi => "Sweep Freq Speed High",
            Register::FreqSweepAmount => "Sweep Freq Amount",
            Register::FreqSweepBound => "Sweep Freq Bound",
            Register::VolSweepSpeedLo => "Sweep Volume Speed Low",
            Register::VolSweepSpeedHi => "Sweep Volume Speed High",
            Register::VolSweepAmount => "Sweep Volume Amount",
            Register::VolSweepBound => "Sweep Volume Bound",
            Register::CutSweepSpeedLo => "Sweep Cutoff Speed Low",
            Register::CutSweepSpeedHi => "Sweep Cutoff Speed High",
            Register::CutSweepAmount => "Sweep Cutoff Amount",
            Register::CutSweepBound => "Sweep Cutoff Bound",
            Register::Special1C => "Special 1C",
            Register::Special1D => "Special 1D",
            Register::RestimerLo => "Restart Timer Low",
            Register::RestimerHi => "Restart Timer High",
        };
        write!(f, "R{:02X} ({})", self.offset(), name)
    }
}

/// Absolute engine register index, displayed as channel and register name
///
/// Used when tracing bus writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterIndex(pub usize);

impl RegisterIndex {
    /// Channel whose block holds this index
    pub fn channel(&self) -> usize {
        self.0 / CHANNEL_REGISTERS
    }

    /// Offset within the channel block
    pub fn offset(&self) -> u8 {
        (self.0 % CHANNEL_REGISTERS) as u8
    }

    /// Named register at this index, if the offset has one
    pub fn register(&self) -> Option<Register> {
        Register::from_offset(self.offset())
    }
}

impl fmt::Display for RegisterIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.register() {
            Some(reg) => write!(f, "ch{} {}", self.channel(), reg),
            None => write!(f, "ch{} R{:02X} (Storage)", self.channel(), self.offset()),
        }
    }
}
