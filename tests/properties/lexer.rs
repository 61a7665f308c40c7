//! Property tests for the tokenizer.

use proptest::prelude::*;

use sassfuse::{Lexer, TokenKind};

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Lexing arbitrary input terminates, never panics, and yields
    /// strictly increasing offsets inside the buffer.
    #[test]
    fn property_lexer_terminates_with_ordered_offsets(src in "(?s).{0,256}") {
        let mut lex = Lexer::new(&src);
        let mut last_end = 0;
        for _ in 0..=src.len() + 1 {
            let tok = lex.next_token();
            prop_assert!(tok.offset >= last_end || tok.is_eof());
            prop_assert!(tok.end() <= src.len());
            if matches!(tok.kind, TokenKind::Eof | TokenKind::Error(_)) {
                prop_assert!(lex.next_token().is_eof());
                return Ok(());
            }
            prop_assert!(src.is_char_boundary(tok.offset));
            last_end = tok.end();
        }
        prop_assert!(false, "lexer did not reach Eof");
    }
}
