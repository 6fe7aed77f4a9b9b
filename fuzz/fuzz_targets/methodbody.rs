#![no_main]

use cilbody::MethodBody;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(body) = MethodBody::parse(data, 0) {
        let mut il = body.instructions();
        while let Ok(true) = il.move_next() {}
    }
});
