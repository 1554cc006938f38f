//! Absorb/squeeze sponge backends.
//!
//! Cache generation alternates `absorb(seed)` and `squeeze(64 bytes)` on a
//! single sponge instance until the cache buffer is full. Absorbing after a
//! squeeze is allowed and changes all later output.

/// A stateful sponge that interleaves absorbing input and squeezing output.
pub trait Sponge {
    /// Feed `data` into the sponge state.
    fn absorb(&mut self, data: &[u8]);

    /// Fill `out` with the next output bytes.
    fn squeeze(&mut self, out: &mut [u8]);
}

/// Transcript sponge over the BLAKE3 extendable output function.
///
/// Absorbed bytes are appended to a running BLAKE3 transcript. Each squeeze
/// reads the XOF of the transcript so far, starting at the total number of
/// bytes already squeezed, so consecutive squeezes never repeat output even
/// when nothing new was absorbed in between.
#[derive(Clone, Debug)]
pub struct Blake3Sponge {
    transcript: ::blake3::Hasher,
    squeezed: u64,
}

/// Domain separation key for the cache sponge.
const SPONGE_CONTEXT: &str = "Satox v1 kawpow-cache-sponge";

impl Blake3Sponge {
    /// Create an empty sponge.
    pub fn new() -> Self {
        Self {
            transcript: ::blake3::Hasher::new_derive_key(SPONGE_CONTEXT),
            squeezed: 0,
        }
    }
}

impl Default for Blake3Sponge {
    fn default() -> Self {
        Self::new()
    }
}

impl Sponge for Blake3Sponge {
    fn absorb(&mut self, data: &[u8]) {
        self.transcript.update(data);
    }

    fn squeeze(&mut self, out: &mut [u8]) {
        let mut reader = self.transcript.finalize_xof();
        reader.set_position(self.squeezed);
        reader.fill(out);
        self.squeezed += out.len() as u64;
    }
}
