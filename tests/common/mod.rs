//! Shared test doubles: a recording bus and a manually advanced clock.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use rda5807m::hal::i2c::{BusAddress, Transport};
use rda5807m::hal::timer::Clock;

/// One recorded bus transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BusOp {
    /// Plain write
    Write { address: u8, bytes: Vec<u8> },
    /// Plain read of `requested` bytes
    Read { address: u8, requested: usize },
    /// Write followed by a repeated-start read
    WriteRead {
        address: u8,
        bytes: Vec<u8>,
        requested: usize,
    },
}

/// Transport failure injected by the mock
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nack;

/// Recording transport answering like an RDA5807M
pub struct MockBus {
    /// Every transaction, in order
    pub ops: Vec<BusOp>,
    /// Values returned by random-access reads, indexed by register
    pub registers: [u16; 0x10],
    /// Bytes served by sequential (status burst) reads
    pub status: [u8; 12],
    /// Cap on the byte count any read reports
    pub short_read: Option<usize>,
    /// Number of further writes that succeed before NACKing
    pub writes_before_nack: Option<usize>,
    /// NACK every read
    pub fail_reads: bool,
}

impl MockBus {
    pub fn new() -> Self {
        let mut registers = [0u16; 0x10];
        registers[0x00] = 0x5804;
        Self {
            ops: Vec::new(),
            registers,
            status: [0; 12],
            short_read: None,
            writes_before_nack: None,
            fail_reads: false,
        }
    }

    /// Set the status burst from six register words
    pub fn set_status_words(&mut self, words: [u16; 6]) {
        for (chunk, word) in self.status.chunks_exact_mut(2).zip(words) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
    }

    /// Register writes as (address, word), in order
    pub fn register_writes(&self) -> Vec<(u8, u16)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                BusOp::Write { address: 0x11, bytes } if bytes.len() == 3 => {
                    Some((bytes[0], u16::from_be_bytes([bytes[1], bytes[2]])))
                }
                _ => None,
            })
            .collect()
    }

    /// Number of status burst reads
    pub fn burst_reads(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, BusOp::Read { address: 0x10, .. }))
            .count()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

impl Transport for MockBus {
    type Error = Nack;

    fn write(&mut self, address: BusAddress, bytes: &[u8]) -> Result<(), Nack> {
        if let Some(remaining) = self.writes_before_nack.as_mut() {
            if *remaining == 0 {
                return Err(Nack);
            }
            *remaining -= 1;
        }
        self.ops.push(BusOp::Write {
            address: address.addr(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }

    fn read(&mut self, address: BusAddress, buffer: &mut [u8]) -> Result<usize, Nack> {
        self.ops.push(BusOp::Read {
            address: address.addr(),
            requested: buffer.len(),
        });
        if self.fail_reads {
            return Err(Nack);
        }
        let available = self
            .short_read
            .unwrap_or(buffer.len())
            .min(buffer.len())
            .min(self.status.len());
        buffer[..available].copy_from_slice(&self.status[..available]);
        Ok(available)
    }

    fn write_read(
        &mut self,
        address: BusAddress,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<usize, Nack> {
        self.ops.push(BusOp::WriteRead {
            address: address.addr(),
            bytes: bytes.to_vec(),
            requested: buffer.len(),
        });
        if self.fail_reads {
            return Err(Nack);
        }
        let register = usize::from(bytes[0]) % self.registers.len();
        let word = self.registers[register].to_be_bytes();
        let available = self.short_read.unwrap_or(2).min(buffer.len()).min(2);
        buffer[..available].copy_from_slice(&word[..available]);
        Ok(available)
    }
}

/// Clock advanced by hand; clones share the same time
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}
