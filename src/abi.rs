//! C-ABI shims — the four classic entry points with C calling conventions,
//! for linking into C harnesses (e.g. lzbench).
//!
//! Enabled with:
//!   cargo build --release --features c-abi
//!
//! Error reporting follows the C conventions: the compressor returns `0` on
//! any rejected input or allocation failure, the decompressor returns a
//! negative code (see [`DecompressError::code`]).

use std::os::raw::{c_int, c_void};
use std::slice;

use crate::compress::{compress, compress_bound};
use crate::decompress::decompress;
use crate::DecompressError;

// ─────────────────────────────────────────────────────────────────────────────
// int lzav_compress_bound(int srcl);
// ─────────────────────────────────────────────────────────────────────────────
#[no_mangle]
pub extern "C" fn lzav_compress_bound(srcl: c_int) -> c_int {
    compress_bound(srcl)
}

// ─────────────────────────────────────────────────────────────────────────────
// int lzav_compress(const void *src, void *dst, int srcl, int dstl,
//                   void *ext_buf, int ext_bufl);
//
// Returns the compressed length, or 0 on failure.
// ─────────────────────────────────────────────────────────────────────────────

/// # Safety
/// `src` must be readable for `srcl` bytes and `dst` writable for `dstl`
/// bytes; when non-null, `ext_buf` must be writable for `ext_bufl` bytes.
/// The ranges must not overlap.
#[no_mangle]
pub unsafe extern "C" fn lzav_compress(
    src: *const c_void,
    dst: *mut c_void,
    srcl: c_int,
    dstl: c_int,
    ext_buf: *mut c_void,
    ext_bufl: c_int,
) -> c_int {
    if srcl <= 0 || dstl < 0 || src.is_null() || dst.is_null() {
        return 0;
    }

    let src_slice = slice::from_raw_parts(src as *const u8, srcl as usize);
    let dst_slice = slice::from_raw_parts_mut(dst as *mut u8, dstl as usize);

    // The scratch buffer is used as whole 32-bit words; an unaligned or
    // empty buffer is ignored, same as a missing one.
    let ext = if !ext_buf.is_null() && ext_bufl > 0 && (ext_buf as usize) & 3 == 0 {
        Some(slice::from_raw_parts_mut(
            ext_buf as *mut u32,
            ext_bufl as usize / 4,
        ))
    } else {
        None
    };

    match compress(src_slice, dst_slice, ext) {
        Ok(n) => n as c_int,
        Err(_) => 0,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// int lzav_compress_default(const void *src, void *dst, int srcl, int dstl);
// ─────────────────────────────────────────────────────────────────────────────

/// # Safety
/// See [`lzav_compress`].
#[no_mangle]
pub unsafe extern "C" fn lzav_compress_default(
    src: *const c_void,
    dst: *mut c_void,
    srcl: c_int,
    dstl: c_int,
) -> c_int {
    lzav_compress(src, dst, srcl, dstl, std::ptr::null_mut(), 0)
}

// ─────────────────────────────────────────────────────────────────────────────
// int lzav_decompress(const void *src, void *dst, int srcl, int dstl);
//
// Returns the decompressed length (== dstl), or a negative error code.
// ─────────────────────────────────────────────────────────────────────────────

/// # Safety
/// `src` must be readable for `srcl` bytes and `dst` writable for `dstl`
/// bytes; the ranges must not overlap.
#[no_mangle]
pub unsafe extern "C" fn lzav_decompress(
    src: *const c_void,
    dst: *mut c_void,
    srcl: c_int,
    dstl: c_int,
) -> c_int {
    if srcl < 0 || dstl < 0 {
        return DecompressError::Params.code();
    }
    if srcl == 0 {
        return if dstl == 0 {
            0
        } else {
            DecompressError::Params.code()
        };
    }
    if src.is_null() || dst.is_null() {
        return DecompressError::Params.code();
    }

    let src_slice = slice::from_raw_parts(src as *const u8, srcl as usize);
    let dst_slice = slice::from_raw_parts_mut(dst as *mut u8, dstl as usize);

    match decompress(src_slice, dst_slice) {
        Ok(n) => n as c_int,
        Err(e) => e.code(),
    }
}
