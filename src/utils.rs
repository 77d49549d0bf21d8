//! Small helpers: the gameplay RNG and the device id derivation

use core::fmt::Write;

use heapless::String;

/// 32-bit xorshift generator.
///
/// The mole schedule must be reproducible from a fixed seed, so the
/// generator is deliberately tiny and deterministic. Not a source of
/// cryptographic randomness.
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

/// Derive the stable device id from the factory-programmed flash serial.
///
/// The last 5 bytes rendered as 10 lowercase hex characters. The host
/// bridge uses this string for topic routing, so it must never change
/// for a given board.
pub fn device_id_from_serial(serial: &[u8; 8]) -> String<10> {
    let mut id = String::new();
    for byte in &serial[3..] {
        // Cannot overflow: 5 bytes always format to exactly 10 chars
        let _ = write!(id, "{:02x}", byte);
    }
    id
}
