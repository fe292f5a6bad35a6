//! Status registers 0x0A..=0x0F
//!
//! Decoding of the status burst and the rate-limited snapshot cache.

use crate::config::{
    MAX_SIGNAL_STRENGTH, STATUS_BURST_BYTES, STATUS_REFRESH_MS, STATUS_REGISTER_COUNT,
};
use crate::hal::timer::RateLimiter;
use crate::types::BlockErrors;

/// Decoded status registers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Status {
    /// New RDS/RBDS group ready (`RDSR`)
    pub rds_ready: bool,
    /// Seek or tune completed (`STC`)
    pub tune_complete: bool,
    /// Seek found no channel above the threshold (`SF`)
    pub seek_failed: bool,
    /// RDS decoder synchronized (`RDSS`, verbose mode only)
    pub rds_synchronized: bool,
    /// RDS block E found (`BLK_E`)
    pub block_e_found: bool,
    /// Stereo indicator (`ST`)
    pub stereo: bool,
    /// Current channel number (`READCHAN`)
    pub channel: u16,
    /// Signal strength 0..=127, logarithmic (`RSSI`)
    pub signal_strength: u8,
    /// Current channel is a station (`FM_TRUE`)
    pub station: bool,
    /// FM ready (`FM_READY`)
    pub fm_ready: bool,
    /// Registers 0x0C..=0x0F hold block E rather than A..D (`ABCD_E`)
    pub rbds_block_e: bool,
    /// Error level of block A (`BLERA`)
    pub block_a_errors: BlockErrors,
    /// Error level of block B (`BLERB`)
    pub block_b_errors: BlockErrors,
    /// Raw RDS blocks A, B, C, D
    pub blocks: [u16; 4],
}

impl Status {
    /// Decode the six status words
    #[must_use]
    pub const fn from_words(words: &[u16; STATUS_REGISTER_COUNT]) -> Self {
        let r0a = words[0];
        let r0b = words[1];
        Self {
            rds_ready: r0a & 0x8000 != 0,
            tune_complete: r0a & 0x4000 != 0,
            seek_failed: r0a & 0x2000 != 0,
            rds_synchronized: r0a & 0x1000 != 0,
            block_e_found: r0a & 0x0800 != 0,
            stereo: r0a & 0x0400 != 0,
            channel: r0a & 0x03FF,
            signal_strength: ((r0b >> 9) as u8) & MAX_SIGNAL_STRENGTH,
            station: r0b & 0x0100 != 0,
            fm_ready: r0b & 0x0080 != 0,
            rbds_block_e: r0b & 0x0010 != 0,
            block_a_errors: BlockErrors::from_bits(r0b >> 2),
            block_b_errors: BlockErrors::from_bits(r0b),
            blocks: [words[2], words[3], words[4], words[5]],
        }
    }

    /// Raw RDS block A
    #[must_use]
    pub const fn block_a(&self) -> u16 {
        self.blocks[0]
    }

    /// Raw RDS block B
    #[must_use]
    pub const fn block_b(&self) -> u16 {
        self.blocks[1]
    }

    /// Raw RDS block C
    #[must_use]
    pub const fn block_c(&self) -> u16 {
        self.blocks[2]
    }

    /// Raw RDS block D
    #[must_use]
    pub const fn block_d(&self) -> u16 {
        self.blocks[3]
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Status {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Status(ch={} rssi={} stc={} sf={} st={} rds={})",
            self.channel,
            self.signal_strength,
            self.tune_complete,
            self.seek_failed,
            self.stereo,
            self.rds_ready
        );
    }
}

/// Outcome of a status refresh
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Snapshot {
    /// All six registers came from the last burst
    Complete(Status),
    /// The last burst was short: only `words_read` leading registers are
    /// new, the rest are carried over from earlier reads
    Degraded {
        /// Best-effort decode
        status: Status,
        /// Number of registers updated by the last burst
        words_read: usize,
    },
}

impl Snapshot {
    /// Decoded status, regardless of completeness
    #[must_use]
    pub const fn status(&self) -> &Status {
        match self {
            Self::Complete(status) | Self::Degraded { status, .. } => status,
        }
    }

    /// Whether every register was updated by the last burst
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }
}

/// Rate-limited cache of the status registers
#[derive(Clone, Debug)]
pub struct StatusCache {
    words: [u16; STATUS_REGISTER_COUNT],
    words_read: usize,
    limiter: RateLimiter,
}

impl StatusCache {
    /// Create an empty cache refreshing at most every `interval_ms`
    #[must_use]
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            words: [0; STATUS_REGISTER_COUNT],
            words_read: 0,
            limiter: RateLimiter::new(interval_ms),
        }
    }

    /// Whether a refresh at `now_ms` can be served from the cache
    #[must_use]
    pub fn is_fresh(&self, now_ms: u64) -> bool {
        self.limiter.is_limited(now_ms)
    }

    /// Fold a burst into the cache
    ///
    /// Only complete big-endian words among the first `available` bytes are
    /// taken; the remaining registers keep their previous values. The
    /// refresh time is recorded either way.
    pub fn update(&mut self, burst: &[u8], available: usize, now_ms: u64) -> Snapshot {
        let available = available.min(burst.len()).min(STATUS_BURST_BYTES);
        let words_read = available / 2;
        for (word, bytes) in self
            .words
            .iter_mut()
            .zip(burst.chunks_exact(2))
            .take(words_read)
        {
            *word = u16::from_be_bytes([bytes[0], bytes[1]]);
        }
        self.words_read = words_read;
        self.limiter.mark(now_ms);
        self.snapshot()
    }

    /// Current contents as a snapshot
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let status = Status::from_words(&self.words);
        if self.words_read == STATUS_REGISTER_COUNT {
            Snapshot::Complete(status)
        } else {
            Snapshot::Degraded {
                status,
                words_read: self.words_read,
            }
        }
    }

    /// Raw status words 0x0A..=0x0F
    #[must_use]
    pub const fn words(&self) -> &[u16; STATUS_REGISTER_COUNT] {
        &self.words
    }

    /// Force the next refresh to hit the bus
    pub fn invalidate(&mut self) {
        self.limiter.reset();
    }
}

impl Default for StatusCache {
    fn default() -> Self {
        Self::new(STATUS_REFRESH_MS)
    }
}
