//! RDA5807M Register Model
//!
//! Typed views of the chip's 16-bit registers: writable control records
//! 0x02..=0x08 and the decoded status block 0x0A..=0x0F.

pub mod control;
pub mod status;
