#![no_main]

use fontwalk::{Anchor, Walker};
use libfuzzer_sys::fuzz_target;

// The first byte splits the input into a format string and the data it walks.
fuzz_target!(|data: &[u8]| {
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let split = usize::from(split).min(rest.len());
    let (format, bytes) = rest.split_at(split);
    let Ok(format) = std::str::from_utf8(format) else {
        return;
    };

    let mut walker = Walker::from_bytes(bytes.to_vec());
    let _ = walker.read(format, true, false);
    let _ = walker.read_rest(format, false, false);

    walker.reset();
    let _ = walker.pascal_string();
    if let Ok(mut child) = walker.branch(1, Anchor::Current, Some(split)) {
        let width = (split % 64) as u32 + 1;
        let _ = child.read_bits_group(width, 3, split % 2 == 0);
        let _ = child.read_bcd(2, split % 5, false);
        let _ = child.rest();
    }
});
