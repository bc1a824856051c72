#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Feed arbitrary bytes through the decompressor with a ladder of
    // destination sizes. Err results are expected; what this target verifies
    // is the hard safety property: no panics, no OOB access, for any input
    // and any declared output length.

    // Zero-length destination.
    {
        let mut dst = vec![0u8; 0];
        let _ = lzav::decompress(data, &mut dst);
    }

    // 4 KiB destination — covers most realistic block shapes.
    {
        let mut dst = vec![0u8; 4096];
        let _ = lzav::decompress(data, &mut dst);
    }

    // Destination as long as the input itself.
    if !data.is_empty() {
        let mut dst = vec![0u8; data.len()];
        let _ = lzav::decompress(data, &mut dst);
    }

    // Large destination to stress the length-mismatch and fast-copy paths.
    // Capped at 1 MiB so tiny inputs claiming huge output don't OOM.
    {
        let large = (data.len().saturating_mul(255)).min(1 << 20);
        let mut dst = vec![0u8; large];
        let _ = lzav::decompress(data, &mut dst);
    }
});
