#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Empty input is rejected by design; nothing to round-trip.
    if data.is_empty() {
        return;
    }

    let compressed = lzav::compress_to_vec(data).expect("compression of valid input failed");

    assert!(
        compressed.len() <= lzav::compress_bound(data.len() as i32) as usize,
        "compressed {} bytes above the bound for {} input bytes",
        compressed.len(),
        data.len()
    );

    let recovered =
        lzav::decompress_to_vec(&compressed, data.len()).expect("self-compressed data unreadable");

    assert_eq!(
        recovered, data,
        "round-trip mismatch: {} bytes in, {} compressed",
        data.len(),
        compressed.len()
    );
});
