//! # Placement Hash
//!
//! 32-bit polynomial rolling hash over UTF-16 code units (base 31, signed
//! wrapping overflow). It matches what existing clients compute, so every
//! replica places a URL in the same sub-shard.
//!
//! Placement only. It is trivially collidable and must not be used for
//! identifiers, deduplication or anything security relevant; those use
//! BLAKE3 from `shared-crypto`.

/// Rolling hash of `input`.
pub fn placement_hash(input: &str) -> i32 {
    input
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// `abs(hash) % buckets`. `buckets` of zero maps everything to bucket 0.
pub fn bucket(input: &str, buckets: u32) -> u32 {
    if buckets == 0 {
        return 0;
    }
    // Widen first: abs(i32::MIN) overflows.
    let magnitude = i64::from(placement_hash(input)).abs();
    (magnitude % i64::from(buckets)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        assert_eq!(placement_hash(""), 0);
        assert_eq!(placement_hash("abc"), 96_354);
        assert_eq!(placement_hash("hello"), 99_162_322);
    }

    #[test]
    fn test_overflow_wraps_negative() {
        // Long enough to wrap; must stay deterministic and in range.
        let url = "https://google.com/search?q=rust+ownership+and+borrowing";
        let h = placement_hash(url);
        assert_eq!(h, placement_hash(url));
        assert!(bucket(url, 10) < 10);
    }

    #[test]
    fn test_utf16_units_not_bytes() {
        // U+00E9 is one UTF-16 unit (233) but two UTF-8 bytes.
        assert_eq!(placement_hash("é"), 233);
        // U+1F600 is a surrogate pair.
        assert_eq!(placement_hash("😀"), 0xD83D * 31 + 0xDE00);
    }

    #[test]
    fn test_zero_buckets() {
        assert_eq!(bucket("anything", 0), 0);
    }
}
