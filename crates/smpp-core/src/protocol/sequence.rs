//! Process-wide sequence number source.
//!
//! Every request PDU carries a sequence number that the peer echoes in
//! its response, which is how the session layer pairs them back up. The
//! generator also feeds the one-byte message reference used to stamp the
//! parts of a concatenated message.
//!
//! Both counters live behind one mutex and are seeded lazily to a random
//! starting point, so two processes restarting against the same message
//! center do not replay the same window of numbers. Wraparound is an
//! expected, correctness-neutral event: numbers only need to stay unique
//! across the outstanding-request window, not forever.
//!
//! Construct one generator per process and hand it to whatever issues
//! PDUs; nothing here is hidden global state, which keeps tests free to
//! substitute their own instance.

use std::sync::Mutex;

use rand::Rng;

/// Largest value the 32-bit counter will emit.
const SEQUENCE_MAX: u32 = 0x7FFF_FFFF;

#[derive(Debug, Default)]
struct Counters {
    /// 32-bit PDU sequence; 0 means "not yet seeded".
    sequence: u32,
    /// 8-bit message reference; 0 means "not yet seeded".
    reference: u8,
}

/// Thread-safe source of PDU sequence numbers and message references.
///
/// # Examples
///
/// ```rust
/// use smpp_core::protocol::sequence::SequenceGenerator;
///
/// let sequencer = SequenceGenerator::new();
/// let first = sequencer.next_sequence();
/// let second = sequencer.next_sequence();
/// assert_ne!(first, 0);
/// assert_ne!(first, second);
/// ```
#[derive(Debug, Default)]
pub struct SequenceGenerator {
    counters: Mutex<Counters>,
}

impl SequenceGenerator {
    /// Creates a generator whose counters seed themselves on first use.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next PDU sequence number, always in
    /// `[1, 0x7FFF_FFFF]`; 0 is reserved to mean "unset".
    ///
    /// The counter seeds itself on first use to a random value in
    /// `[1, 0x7FFF_FFFE]` and resets to 1 before the increment that
    /// would pass the maximum.
    pub fn next_sequence(&self) -> u32 {
        let mut counters = self.lock();
        if counters.sequence == 0 {
            counters.sequence = rand::thread_rng().gen_range(1..=SEQUENCE_MAX - 1);
        }
        if counters.sequence == SEQUENCE_MAX {
            counters.sequence = 1;
        }
        counters.sequence += 1;
        counters.sequence
    }

    /// Returns the next message reference byte, always in `[1, 255]`,
    /// following the same seed-and-wrap pattern as the PDU counter.
    pub fn next_reference(&self) -> u8 {
        let mut counters = self.lock();
        if counters.reference == 0 {
            counters.reference = rand::thread_rng().gen_range(1..u8::MAX);
        }
        if counters.reference == u8::MAX {
            counters.reference = 1;
        }
        counters.reference += 1;
        counters.reference
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Counters> {
        // A panic while holding the lock cannot leave the counters in an
        // illegal state, so a poisoned lock is still usable.
        self.counters.lock().unwrap_or_else(|e| e.into_inner())
    }
}
