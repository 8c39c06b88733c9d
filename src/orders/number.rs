//! Order number generation
//!
//! Human-readable numbers of the form `ORD-YYYYMMDDHHMMSS-XXXX`, local
//! time plus four random characters from A-Z0-9. Uniqueness is not
//! guaranteed here; checkout passes a batch of candidates and the storage
//! layer picks the first one absent from the `orders_by_number` index.

use chrono::Local;
use rand::Rng;

pub const ORDER_NUMBER_PREFIX: &str = "ORD";

const SUFFIX_LEN: usize = 4;
const SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate one order number candidate, e.g. `ORD-20260825143012-7KQ2`.
pub fn generate() -> String {
    let timestamp = Local::now().format("%Y%m%d%H%M%S");
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char)
        .collect();
    format!("{ORDER_NUMBER_PREFIX}-{timestamp}-{suffix}")
}

/// A batch of candidates for one checkout attempt.
pub fn generate_candidates(count: usize) -> Vec<String> {
    (0..count).map(|_| generate()).collect()
}
