#![no_main]

use libfuzzer_sys::fuzz_target;
use sassfuse::{Lexer, Resolver};

fuzz_target!(|data: &[u8]| {
    let Ok(src) = std::str::from_utf8(data) else {
        return;
    };

    let mut lex = Lexer::new(src);
    while !lex.next_token().is_eof() {}

    // Imports resolve against an empty directory, so any import fails cleanly
    let Ok(dir) = tempfile::tempdir() else {
        return;
    };
    if let Ok(resolved) = Resolver::new(dir.path().join("main.scss")).resolve(src, dir.path()) {
        for line in 1..=resolved.buffer().lines().count() + 1 {
            let _ = resolved.lookup_file(line);
        }
    }
});
