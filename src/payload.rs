use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// Symbols random values are drawn from.
pub const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz\
ABCDEFGHIJKLMNOPQRSTUVWXYZ\
0123456789\
!@#$%^&*()-=_+|{}[];<>,./?:";

const SEED_MULTIPLIER: u64 = 1_103_515_245;

/// The single pseudo random stream of a run. Workload payloads and
/// workspace names are both drawn from it, so a fixed seed reproduces both.
pub struct RandomStream {
    rng: StdRng,
}

impl RandomStream {
    /// Stream with a fixed seed.
    pub fn seeded(seed: u64) -> RandomStream {
        RandomStream {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Stream seeded from the current time and process id.
    pub fn from_time() -> RandomStream {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let value = now.as_secs()
            ^ (u64::from(now.subsec_nanos()) << 16)
            ^ u64::from(std::process::id());

        RandomStream::seeded(value.wrapping_mul(SEED_MULTIPLIER))
    }

    /// Random string for a buffer of `length` bytes, the last one being
    /// reserved as terminator. The result therefore holds `length - 1`
    /// symbols from [`CHARSET`], or nothing for a `length` of zero.
    pub fn random_string(&mut self, length: usize) -> Vec<u8> {
        (0..length.saturating_sub(1))
            .map(|_| CHARSET[self.rng.gen_range(0..CHARSET.len())])
            .collect()
    }

    /// Zero padded decimal key drawn uniformly from `[0, bound)`.
    pub fn random_key(&mut self, bound: usize, width: usize) -> String {
        let n = if bound == 0 {
            0
        } else {
            self.rng.gen_range(0..bound)
        };
        format!("{:0width$}", n, width = width)
    }

    /// Next raw 64 bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }
}
