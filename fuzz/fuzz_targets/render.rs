#![no_main]

use coroutine_stacks::tree;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    tree::from_reader(data, std::io::sink()).ok();
});
