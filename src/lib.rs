//! `lzav` — in-memory, non-streaming, lossless data compression and
//! decompression in the LZ77 family (LZAV stream format 1).
//!
//! A compressed buffer is "raw": a one-byte stream-format tag followed by
//! blocks, with no length prefix and no checksum. The caller keeps the
//! uncompressed length alongside the compressed bytes and supplies it to the
//! decompressor; integrity checking, when needed, is the caller's
//! responsibility (hash the uncompressed content). Incompressible input
//! expands by at most ~0.58%.
//!
//! # Crate layout
//!
//! | Module       | Contents |
//! |--------------|----------|
//! | `types`      | Format constants, load/store helpers, match scanner, fingerprint hash. |
//! | `compress`   | Block-emit primitives and the one-shot compressor. |
//! | `decompress` | The bounds-checked decompressor. |
//! | `abi`        | Optional C-ABI shims (`c-abi` feature). |
//!
//! # Example
//!
//! ```
//! let src = b"Sample sample sample sample data.";
//!
//! let mut comp = vec![0u8; lzav::compress_bound(src.len() as i32) as usize];
//! let comp_len = lzav::compress_default(src, &mut comp).unwrap();
//!
//! let mut back = vec![0u8; src.len()];
//! let n = lzav::decompress(&comp[..comp_len], &mut back).unwrap();
//! assert_eq!(n, src.len());
//! assert_eq!(&back, src);
//! ```

pub mod compress;
pub mod decompress;
pub mod types;

#[cfg(feature = "c-abi")]
pub mod abi;

/// API version, unrelated to the crate version.
pub const API_VERSION: u32 = 0x101;

// ── Top-level re-exports ──────────────────────────────────────────────────────
pub use compress::{
    compress, compress_bound, compress_default, compress_to_vec, write_block, write_fin,
    CompressError,
};
pub use decompress::{decompress, decompress_to_vec, DecompressError};
pub use types::{FMT_CUR, LIT_FIN, LIT_LEN, REF_LEN, REF_MIN, WIN_LEN};
