//! Compression: block-emit primitives and the one-shot compressor.
//!
//! The compressor walks the source once, probing a small two-way fingerprint
//! table for earlier occurrences of the 6 bytes at the scan position. Each
//! verified occurrence becomes a back-reference block, preceded by any
//! pending literals; everything else accumulates as literals. An adaptive
//! throttle skips ahead on low-match data so that incompressible input costs
//! little more than a copy.
//!
//! The block-emit primitives [`write_block`] and [`write_fin`] are public:
//! together with [`compress_bound`] they are sufficient to build alternative
//! match-finding strategies on top of the same stream format.

use crate::types::{
    hash6, ht_size, match_len, read_u16ne, read_u32ne, write_u16le, write_u32le, FMT_CUR, LIT_FIN,
    LIT_LEN, REF_LEN, REF_MIN, WIN_LEN,
};

// ─────────────────────────────────────────────────────────────────────────────
// Error type
// ─────────────────────────────────────────────────────────────────────────────

/// Errors returned by the compression functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressError {
    /// The source slice is empty; an empty stream has no representation.
    EmptyInput,
    /// The source exceeds the 2³¹ − 1 byte limit of the 32-bit length
    /// contract.
    InputTooLarge,
    /// The destination is smaller than [`compress_bound`] requires.
    OutputTooSmall,
    /// The fingerprint table could not be heap-allocated.
    OutOfMemory,
}

// ─────────────────────────────────────────────────────────────────────────────
// Worst-case bound
// ─────────────────────────────────────────────────────────────────────────────

/// Returns the required destination capacity for a `srcl`-byte source.
///
/// The worst case is an incompressible source emitted as maximal literal
/// blocks: 3 header bytes per [`LIT_LEN`] literals, plus the stream prefix
/// and the finishing block. Returns 8 when `srcl <= 0`.
#[inline]
pub fn compress_bound(srcl: i32) -> i32 {
    if srcl <= 0 {
        return 8;
    }
    let b = srcl as i64 + srcl as i64 * 3 / LIT_LEN as i64 + 8;
    b.min(i32::MAX as i64) as i32
}

#[inline]
pub(crate) fn compress_bound_usize(srcl: usize) -> usize {
    srcl + srcl * 3 / LIT_LEN + 8
}

// ─────────────────────────────────────────────────────────────────────────────
// Block-emit primitives
// ─────────────────────────────────────────────────────────────────────────────

/// Writes one block group to `dst` at `op`: the pending literal run
/// `src[ipa..ipa + lc]` (split if longer than [`LIT_LEN`]) followed by one
/// reference block of length `rc` at offset `d`. Returns the new output
/// position.
///
/// Stream format 1. A block starts with a header byte; bits 4–5 select the
/// block type:
///
/// ```text
/// CC00LLLL  literal block (1-3 header bytes), LLLL = literal length
/// OO01RRRR  10-bit-offset reference (2-3 bytes), RRRR = reference length
/// OO10RRRR  18-bit-offset reference (3-4 bytes)
/// CC11RRRR  24-bit-offset reference (4-5 bytes)
/// ```
///
/// A zero length nibble stands for a value of at least 16 and an additional
/// length byte (for literal blocks possibly two). `CC` is the offset carry:
/// the two lowest offset bits of the next reference block, packed into a
/// header byte that has no other use for them. `cbp` tracks the output
/// position of the most recent header with an unclaimed `CC` field; a
/// reference that donates its low bits through it consumes it.
///
/// Contract (upheld by the compressor, asserted in debug builds): `rc` is in
/// `[mref, mref + 15 + 255]`, and `rc <= d < WIN_LEN` — decompression copies
/// forward in wide chunks, so a reference must never cover bytes it is
/// itself producing.
///
/// Panics if `dst` is too small; a destination sized by [`compress_bound`]
/// always suffices.
pub fn write_block(
    dst: &mut [u8],
    mut op: usize,
    src: &[u8],
    mut ipa: usize,
    mut lc: usize,
    rc: usize,
    mut d: usize,
    cbp: &mut Option<usize>,
    mref: usize,
) -> usize {
    debug_assert!(rc >= mref && rc - mref <= 15 + 255);
    debug_assert!(d >= rc && d < WIN_LEN);

    while lc > LIT_LEN {
        // Overlong runs split into maximal literal blocks.
        dst[op] = 0;
        dst[op + 1] = 255;
        dst[op + 2] = 255;
        op += 3;

        dst[op..op + LIT_LEN].copy_from_slice(&src[ipa..ipa + LIT_LEN]);
        op += LIT_LEN;
        ipa += LIT_LEN;
        lc -= LIT_LEN;
    }

    if lc != 0 {
        // The literal header's spare high bits take the reference's two low
        // offset bits, superseding any previously reserved header.
        let cv = (d & 3) << 6;
        d >>= 2;
        *cbp = None;

        if lc < 16 {
            dst[op] = (cv | lc) as u8;
            op += 1;
        } else if lc < 16 + 255 {
            dst[op] = cv as u8;
            dst[op + 1] = (lc - 16) as u8;
            op += 2;
        } else {
            dst[op] = cv as u8;
            dst[op + 1] = 255;
            dst[op + 2] = (lc - 16 - 255) as u8;
            op += 3;
        }

        dst[op..op + lc].copy_from_slice(&src[ipa..ipa + lc]);
        op += lc;
    } else if let Some(p) = cbp.take() {
        // No literals: donate the two low offset bits to the reserved header.
        dst[p] |= ((d & 3) << 6) as u8;
        d >>= 2;
    }

    // Reference block. The stored nibble is biased by `1 - mref` so that a
    // zero nibble marks the extended-length form.
    let rc = rc + 1 - mref;

    if d < (1 << 10) {
        if rc < 16 {
            write_u16le(dst, op, ((d << 6) | (1 << 4) | rc) as u16);
            return op + 2;
        }
        dst[op] = ((d << 6) | (1 << 4)) as u8;
        write_u16le(dst, op + 1, (((rc - 16) << 8) | (d >> 2)) as u16);
        return op + 3;
    }

    if d < (1 << 18) {
        if rc < 16 {
            dst[op] = ((d << 6) | (2 << 4) | rc) as u8;
            write_u16le(dst, op + 1, (d >> 2) as u16);
            return op + 3;
        }
        write_u32le(dst, op, (((rc - 16) << 24) | (d << 6) | (2 << 4)) as u32);
        return op + 4;
    }

    // 24-bit offset: all offset bits travel in the trailing bytes, so the
    // header's high bits are spare — reserve them for the next reference.
    *cbp = Some(op);

    if rc < 16 {
        write_u32le(dst, op, ((d << 8) | (3 << 4) | rc) as u32);
        return op + 4;
    }

    dst[op] = 3 << 4;
    write_u32le(dst, op + 1, (((rc - 16) << 24) | d) as u32);
    op + 5
}

/// Writes the finishing literal block(s) covering `src[ipa..ipa + lc]` and
/// returns the final output position.
///
/// Guarantees that the last block holds between [`LIT_FIN`] and 15 literals
/// behind a single header byte; the decoder's parsing loop relies on that
/// tail never containing another block header. `lc` must be at least
/// [`LIT_FIN`].
///
/// Panics if `dst` is too small; a destination sized by [`compress_bound`]
/// always suffices.
pub fn write_fin(
    dst: &mut [u8],
    mut op: usize,
    src: &[u8],
    mut ipa: usize,
    mut lc: usize,
) -> usize {
    debug_assert!(lc >= LIT_FIN);

    while lc > 15 {
        // Leave literals for the final single-header block.
        let mut wc = lc - LIT_FIN;

        if wc < 16 {
            dst[op] = wc as u8;
            op += 1;
        } else {
            if wc > LIT_LEN {
                wc = LIT_LEN;
            }

            if wc < 16 + 255 {
                dst[op] = 0;
                dst[op + 1] = (wc - 16) as u8;
                op += 2;
            } else {
                dst[op] = 0;
                dst[op + 1] = 255;
                dst[op + 2] = (wc - 16 - 255) as u8;
                op += 3;
            }
        }

        dst[op..op + wc].copy_from_slice(&src[ipa..ipa + wc]);
        op += wc;
        ipa += wc;
        lc -= wc;
    }

    dst[op] = lc as u8;
    op += 1;

    dst[op..op + lc].copy_from_slice(&src[ipa..ipa + lc]);
    op + lc
}

// ─────────────────────────────────────────────────────────────────────────────
// One-shot compressor
// ─────────────────────────────────────────────────────────────────────────────

/// On-stack fingerprint-table capacity, in `u32` words (16 KiB). Sources up
/// to 4 KiB fit their whole table here and never touch the allocator.
const HT_STACK_WORDS: usize = 4096;

/// Compresses `src` into `dst`, producing a raw stream with no embedded
/// length or checksum. Returns the compressed length.
///
/// `dst` must be at least [`compress_bound`]`(src.len())` bytes. `ext_buf`
/// optionally supplies scratch memory for the fingerprint table, useful when
/// compressing many buffers in a row: it is used when it holds at least
/// [`ht_size`]`(src.len()) / 4` words, and the same buffer serves any
/// smaller source. Without it (or when it is too small) the table lives on
/// the stack for small sources and on the heap otherwise.
///
/// The compressed stream for the same source may differ between crate
/// versions and between little- and big-endian hosts; decompression of any
/// such stream remains possible everywhere.
pub fn compress(
    src: &[u8],
    dst: &mut [u8],
    ext_buf: Option<&mut [u32]>,
) -> Result<usize, CompressError> {
    let srcl = src.len();

    if srcl == 0 {
        return Err(CompressError::EmptyInput);
    }
    if srcl > i32::MAX as usize {
        return Err(CompressError::InputTooLarge);
    }
    if dst.len() < compress_bound_usize(srcl) {
        return Err(CompressError::OutputTooSmall);
    }

    dst[0] = ((FMT_CUR << 4) | REF_MIN) as u8;

    if srcl <= LIT_FIN {
        // Very short source: a single literal block padded to the LIT_FIN
        // tail the decoder expects.
        dst[1] = srcl as u8;
        dst[2..2 + LIT_FIN].fill(0);
        dst[2..2 + srcl].copy_from_slice(src);
        return Ok(2 + LIT_FIN);
    }

    let htsize = ht_size(srcl);
    let htwords = htsize >> 2;
    let hmask = ((htsize - 1) ^ 15) as u32;

    let mut stack_buf = [0u32; HT_STACK_WORDS];
    let mut alloc_buf: Vec<u32> = Vec::new();
    let ht: &mut [u32] = if htwords <= HT_STACK_WORDS {
        &mut stack_buf[..htwords]
    } else if let Some(buf) = ext_buf.filter(|b| b.len() >= htwords) {
        &mut buf[..htwords]
    } else {
        if alloc_buf.try_reserve_exact(htwords).is_err() {
            return Err(CompressError::OutOfMemory);
        }
        alloc_buf.resize(htwords, 0);
        &mut alloc_buf[..]
    };

    let ipe = srcl - LIT_FIN;
    let ipet = ipe.saturating_sub(REF_MIN - 1); // Scan threshold.

    // Seed every tuple with the first 4 bytes at the initial scan position
    // and that position itself. The non-zero position doubles as a sentinel:
    // the backward-extension probe below reads up to REF_MIN bytes before a
    // stored position, which the scan start of REF_MIN exactly covers.
    let initk = if REF_MIN < ipet { read_u32ne(src, REF_MIN) } else { 0 };
    for slot in ht.chunks_exact_mut(4) {
        slot[0] = initk;
        slot[1] = REF_MIN as u32;
        slot[2] = initk;
        slot[3] = REF_MIN as u32;
    }

    let mut ip = REF_MIN; // Scan cursor.
    let mut ipa = 0usize; // Literals anchor.
    let mut op = 1usize; // Output cursor, past the prefix byte.
    let mut cbp: Option<usize> = None; // Latest header with a spare CC field.
    let mut mavg: i32 = 100 << 22; // Running average of match quality.
    let mut rndb = 0usize; // PRNG bit, refreshed from non-matching positions.

    'main: while ip < ipet {
        let iw1 = read_u32ne(src, ip);
        let iw2 = read_u16ne(src, ip + 4);
        let hval = hash6(iw1, iw2);

        let hp = ((hval & hmask) >> 2) as usize;
        let ipo = ip as u32;

        // Probe the slot's two tuples. On a verified 6-byte hit, `wpo` is
        // the earlier position and `wt` the tuple that produced it; every
        // failure path updates the slot as a 2-entry victim cache.
        let wpo: usize;
        let wt: usize;
        'probe: {
            if iw1 == ht[hp] {
                let p0 = ht[hp + 1] as usize;
                if iw2 == read_u16ne(src, p0 + 4) {
                    wpo = p0;
                    wt = 0;
                    break 'probe;
                }
                if iw1 == ht[hp + 2] {
                    let p1 = ht[hp + 3] as usize;
                    if iw2 == read_u16ne(src, p1 + 4) {
                        wpo = p1;
                        wt = 1;
                        break 'probe;
                    }
                    // Both keys equal, neither position verifies: refresh
                    // tuple 0 in place.
                    ht[hp + 1] = ipo;
                } else {
                    ht[hp + 2] = iw1;
                    ht[hp + 3] = ipo;
                }
            } else if iw1 == ht[hp + 2] {
                let p1 = ht[hp + 3] as usize;
                if iw2 == read_u16ne(src, p1 + 4) {
                    wpo = p1;
                    wt = 1;
                    break 'probe;
                }
                // Stale entry: take over tuple 0.
                ht[hp] = iw1;
                ht[hp + 1] = ipo;
            } else {
                // Outright miss: tuple 1 is the victim.
                ht[hp + 2] = iw1;
                ht[hp + 3] = ipo;
            }

            // No usable match at this position.
            mavg -= mavg >> 11;

            if mavg < (200 << 15) && ip != ipa {
                // Skip ahead on low-match data; keeps hash evaluations near
                // 45% of the compressed length. The PRNG bit dithers match
                // positions, refreshed from the previous miss's parity so it
                // is decorrelated from the current one.
                ip += 2 | rndb;
                rndb = ipo as usize & 1;

                if mavg < (130 << 15) {
                    ip += 1;

                    if mavg < (100 << 15) {
                        ip += (100 - (mavg >> 15)) as usize; // Gradually faster.
                    }
                }

                continue 'main;
            }

            ip += 1;
            continue 'main;
        }

        let d = ip - wpo; // Reference offset.

        if d <= 7 || d >= WIN_LEN {
            // Tiny offsets encode poorly; offsets past the window cannot be
            // encoded at all — refresh those so the entry stays useful.
            if d >= WIN_LEN {
                ht[hp + 1 + wt * 2] = ipo;
            }
            ip += 1;
            continue;
        }

        if d > REF_LEN {
            // Promote matches beyond the reference-length range to tuple 0
            // and refresh their position; without this, runs of identical
            // data stop compressing once their first occurrence ages out.
            if iw1 != ht[hp] {
                ht[hp + 2] = ht[hp];
                ht[hp + 3] = ht[hp + 1];
                ht[hp] = iw1;
            }
            ht[hp + 1] = ipo;
        }

        // Bound the match: not past `ipe` (the finishing literals must stay
        // literal) and not longer than the offset (the decoder copies
        // forward, so a reference must not cover bytes it is producing).
        let mut ml = d.min(REF_LEN);
        if ip + ml > ipe {
            ml = ipe - ip;
        }

        let mut lc = ip - ipa;
        let mut rc = 0usize;

        if lc != 0 && lc < REF_MIN {
            // A short pending literal run can vanish entirely when the match
            // also holds a few bytes earlier.
            let rc2 = match_len(&src[ip - lc..], &src[wpo - lc..], ml);
            if rc2 >= REF_MIN {
                rc = rc2;
                ip -= lc;
                lc = 0;
            }
        }

        if rc == 0 {
            rc = REF_MIN + match_len(&src[ip + REF_MIN..], &src[wpo + REF_MIN..], ml - REF_MIN);
        }

        op = write_block(dst, op, src, ipa, lc, rc, d, &mut cbp, REF_MIN);
        ip += rc;
        ipa = ip;
        mavg += (((rc as i32) << 22) - mavg) >> 10;
    }

    Ok(write_fin(dst, op, src, ipa, ipe - ipa + LIT_FIN))
}

/// Compresses `src` into `dst` with self-managed scratch memory.
///
/// This is the recommended entry point for one-shot compression; see
/// [`compress`] for the full contract.
pub fn compress_default(src: &[u8], dst: &mut [u8]) -> Result<usize, CompressError> {
    compress(src, dst, None)
}

/// Compresses `src` into a freshly allocated, exactly-sized `Vec`.
pub fn compress_to_vec(src: &[u8]) -> Result<Vec<u8>, CompressError> {
    if src.len() > i32::MAX as usize {
        return Err(CompressError::InputTooLarge);
    }
    let mut dst = vec![0u8; compress_bound(src.len() as i32) as usize];
    let n = compress(src, &mut dst, None)?;
    dst.truncate(n);
    Ok(dst)
}
