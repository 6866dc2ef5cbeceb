use std::sync::atomic::{AtomicI64, Ordering};

use rand::Rng;

use crate::core::time::unix_ms_now;

const FILE_ID_PREFIX: &str = "file_";
const ALPHABET: &[u8] = b"abcdefghjkmnpqrstuvwxyz23456789";

static LAST_ISSUED_MS: AtomicI64 = AtomicI64::new(0);

/// Millisecond-timestamp record id. The atomic bumps past the last issued
/// value so back-to-back calls within the same millisecond stay unique.
pub fn generate_id() -> String {
    next_monotonic_ms().to_string()
}

pub fn generate_file_id() -> String {
    format!("{}{}_{}", FILE_ID_PREFIX, next_monotonic_ms(), random_suffix(6))
}

/// Timestamp embedded in a blob file id; eviction orders by this.
pub fn file_id_timestamp(id: &str) -> Option<i64> {
    let rest = id.strip_prefix(FILE_ID_PREFIX)?;
    let (timestamp, _) = rest.split_once('_')?;
    timestamp.parse().ok()
}

fn next_monotonic_ms() -> i64 {
    let now = unix_ms_now();
    LAST_ISSUED_MS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(now.max(last + 1)))
        .map(|last| now.max(last + 1))
        .unwrap_or(now)
}

fn random_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    let mut output = String::with_capacity(len);
    for _ in 0..len {
        let index = rng.gen_range(0..ALPHABET.len());
        output.push(ALPHABET[index] as char);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rapid_ids_stay_unique() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(generate_id()));
        }
    }

    #[test]
    fn ids_are_monotonic() {
        let first: i64 = generate_id().parse().expect("numeric id");
        let second: i64 = generate_id().parse().expect("numeric id");
        assert!(second > first);
    }

    #[test]
    fn file_id_roundtrips_timestamp() {
        let id = generate_file_id();
        let timestamp = file_id_timestamp(&id).expect("embedded timestamp");
        assert!(timestamp > 0);
    }

    #[test]
    fn file_ids_order_by_embedded_timestamp() {
        let first = generate_file_id();
        let second = generate_file_id();
        assert!(file_id_timestamp(&first).unwrap() < file_id_timestamp(&second).unwrap());
    }

    #[test]
    fn file_id_timestamp_rejects_foreign_ids() {
        assert_eq!(file_id_timestamp("not-a-file-id"), None);
        assert_eq!(file_id_timestamp("file_abc_def"), None);
    }
}
