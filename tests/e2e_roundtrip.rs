// End-to-end tests: compress → decompress over a spread of sizes, shapes,
// and offset ranges, plus the documented worst-case expansion behaviour.

use lzav::{
    compress, compress_bound, compress_to_vec, decompress, decompress_to_vec, CompressError,
    DecompressError,
};

// ─────────────────────────────────────────────────────────────────────────────
// Data generators (deterministic)
// ─────────────────────────────────────────────────────────────────────────────

/// xorshift64-based incompressible bytes.
fn noise(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed | 1;
    let mut out = Vec::with_capacity(len + 8);
    while out.len() < len {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        out.extend_from_slice(&state.to_le_bytes());
    }
    out.truncate(len);
    out
}

/// Repetitive Latin-like text.
fn text(len: usize) -> Vec<u8> {
    const T: &[u8] = b"It is a truth universally acknowledged, that a single \
        stream in possession of good redundancy must be in want of a codec. ";
    let mut out = Vec::with_capacity(len + T.len());
    while out.len() < len {
        out.extend_from_slice(T);
    }
    out.truncate(len);
    out
}

/// Round-trips `src` and returns the compressed length.
fn roundtrip(src: &[u8]) -> usize {
    let comp = compress_to_vec(src).unwrap();
    assert!(comp.len() <= compress_bound(src.len() as i32) as usize);
    let back = decompress_to_vec(&comp, src.len()).unwrap();
    assert_eq!(back, src, "round-trip mismatch for {} bytes", src.len());
    comp.len()
}

// ─────────────────────────────────────────────────────────────────────────────
// Canonical scenarios
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn empty_input() {
    assert_eq!(compress_to_vec(&[]), Err(CompressError::EmptyInput));
    let mut dst = [0u8; 0];
    assert_eq!(decompress(&[], &mut dst), Ok(0));
}

#[test]
fn one_byte() {
    let comp = compress_to_vec(&[0x41]).unwrap();
    assert_eq!(comp, [0x16, 0x01, 0x41, 0, 0, 0, 0]);
    assert_eq!(decompress_to_vec(&comp, 1).unwrap(), [0x41]);
}

#[test]
fn hello() {
    let comp = compress_to_vec(b"Hello").unwrap();
    assert_eq!(comp.len(), 7);
    assert_eq!(decompress_to_vec(&comp, 5).unwrap(), b"Hello");
}

#[test]
fn hundred_zeros() {
    // Same-byte runs compress by reference-length doubling (a reference may
    // not outrun its own offset), so the floor here is a handful of blocks,
    // not a single one.
    let n = roundtrip(&[0u8; 100]);
    assert!(n < 40, "100 zeros compressed to {n} bytes");
}

#[test]
fn periodic_kilobyte() {
    let src: Vec<u8> = b"ABCDEFGH".repeat(128);
    assert_eq!(src.len(), 1024);
    let n = roundtrip(&src);
    assert!(n <= 64, "periodic 1 KiB compressed to {n} bytes");
}

#[test]
fn random_64k_expansion_bound() {
    let src = noise(65_536, 0xA5A5_5A5A_DEAD_BEEF);
    let n = roundtrip(&src);
    // Incompressible input expands by at most ~0.58% plus a constant.
    let overhead = n.saturating_sub(src.len());
    let max_overhead = (src.len() as f64 * 0.0058).ceil() as usize + 8;
    assert!(
        overhead <= max_overhead,
        "{overhead} bytes of overhead on {} random bytes",
        src.len()
    );
}

#[test]
fn wrong_format_is_rejected() {
    let mut buf = vec![0xFFu8; 256];
    buf[0] = 0x76;
    let mut dst = vec![0u8; 128];
    assert_eq!(decompress(&buf, &mut dst), Err(DecompressError::UnkFmt));
}

#[test]
fn truncated_stream_is_an_error() {
    let src = text(3000);
    let comp = compress_to_vec(&src).unwrap();
    let mut dst = vec![0u8; src.len()];
    let r = decompress(&comp[..comp.len() - 1], &mut dst);
    assert!(r.is_err());
    assert!(r.unwrap_err().code() < 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Size and shape sweeps
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn every_length_up_to_600() {
    // Mixed content: a compressible half followed by noise, at every length.
    // Covers the short path, the tiny-source degenerate loop bounds, and
    // every finishing-block split.
    for len in 1..=600usize {
        let mut src = text(len / 2);
        src.extend_from_slice(&noise(len - len / 2, len as u64));
        let comp = compress_to_vec(&src).unwrap();
        let back = decompress_to_vec(&comp, len).unwrap();
        assert_eq!(back, src, "length {len}");
    }
}

#[test]
fn assorted_patterns() {
    roundtrip(&[0xFFu8; 10_000]);
    roundtrip(&text(100_000));
    roundtrip(&noise(100_000, 7));

    // Sawtooth with a period longer than a slot key.
    let saw: Vec<u8> = (0..50_000).map(|i| (i % 253) as u8).collect();
    roundtrip(&saw);

    // Long literal runs split across LIT_LEN boundaries around references.
    let mut mix = noise(5000, 99);
    mix.extend_from_slice(&mix.clone()[..2000]);
    mix.extend_from_slice(&noise(5000, 100));
    roundtrip(&mix);
}

#[test]
fn deep_offsets_and_carry() {
    // A buffer whose repeats sit at 10-bit, 18-bit, and 24-bit offset
    // distances, driving every reference form and the offset-carry protocol.
    // The long gap is zero-filled: it occupies a single fingerprint slot, so
    // the entries for the leading chunk survive until its distant repeat.
    let a = noise(2000, 1);
    let b = noise(2000, 2);

    let mut src = a.clone();
    src.extend_from_slice(&[0u8; 300_000]);
    src.extend_from_slice(&a); // d near 302_000: 24-bit references.
    src.extend_from_slice(&b);
    src.extend_from_slice(&b[..1500]); // d = 2000: 18-bit references.
    let tail = src[src.len() - 500..].to_vec();
    src.extend_from_slice(&tail); // d = 500: 10-bit references.

    let n = roundtrip(&src);
    assert!(n < src.len() / 20, "long-range repeats not exploited: {n}");
}

#[test]
fn compression_actually_compresses_text() {
    let src = text(200_000);
    let n = roundtrip(&src);
    assert!(
        n < src.len() / 4,
        "highly repetitive text only reached {n} bytes"
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Determinism and scratch modes
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn determinism_across_runs_and_scratch_modes() {
    let src = text(30_000);
    let a = compress_to_vec(&src).unwrap();
    let b = compress_to_vec(&src).unwrap();
    assert_eq!(a, b);

    let mut dst = vec![0u8; compress_bound(src.len() as i32) as usize];
    let mut scratch = vec![0u32; (1 << 20) / 4];
    let n = compress(&src, &mut dst, Some(&mut scratch)).unwrap();
    assert_eq!(&dst[..n], &a[..]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Declared-length handling
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn any_wrong_declared_length_fails() {
    let src = text(10_000);
    let comp = compress_to_vec(&src).unwrap();

    for dstl in [0usize, 1, src.len() - 1, src.len() + 1, src.len() * 2] {
        let mut dst = vec![0u8; dstl];
        let r = decompress(&comp, &mut dst);
        assert!(r.is_err(), "declared length {dstl} succeeded");
    }

    let mut dst = vec![0u8; src.len()];
    assert_eq!(decompress(&comp, &mut dst), Ok(src.len()));
}

// ─────────────────────────────────────────────────────────────────────────────
// Caller-side integrity checking
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn caller_side_checksum_flow() {
    // The stream embeds no checksum by design; the supported pattern is to
    // store a hash of the uncompressed content next to the compressed blob
    // and verify it after decompression.
    use xxhash_rust::xxh32::xxh32;

    let src = text(50_000);
    let stored_hash = xxh32(&src, 0);
    let comp = compress_to_vec(&src).unwrap();

    let back = decompress_to_vec(&comp, src.len()).unwrap();
    assert_eq!(xxh32(&back, 0), stored_hash);
}
