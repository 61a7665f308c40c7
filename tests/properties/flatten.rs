//! Property tests for import flattening and provenance.

use std::fs;

use proptest::prelude::*;

use sassfuse::resolver::preamble_lines;
use sassfuse::{Location, Resolver};

/// Import-free, lexically valid stylesheet text
fn plain_source() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z0-9 .#:;,{}()$\\-\n]{0,200}").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Input without imports comes back unchanged.
    #[test]
    fn property_flatten_round_trips_import_free_input(src in plain_source()) {
        let dir = tempfile::tempdir().unwrap();
        let main = dir.path().join("main.scss");

        let resolved = Resolver::new(&main).resolve(&src, dir.path()).unwrap();

        prop_assert_eq!(&resolved.output, &src);
        let newlines = src.matches('\n').count();
        for line in 0..=newlines {
            prop_assert_eq!(
                resolved.index.locate(line + preamble_lines() + 1),
                Location::Source { file: main.clone(), line: line + 1 }
            );
        }
    }

    /// PROPERTY: A single import splices the partial between the text around
    /// it, and every partial line maps back to the partial.
    #[test]
    fn property_import_splices_partial(
        before in plain_source(),
        partial_lines in proptest::collection::vec("[a-z .{}:;]{0,30}", 1..8),
        after in plain_source(),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let partial = partial_lines.join("\n") + "\n";
        fs::write(root.join("_p.scss"), &partial).unwrap();
        let main = root.join("main.scss");
        let before = format!("{before}\n");
        let src = format!("{before}@import \"p\";{after}");

        let resolved = Resolver::new(&main).resolve(&src, &root).unwrap();

        prop_assert_eq!(&resolved.output, &format!("{before}{partial}{after}"));
        let start = before.matches('\n').count();
        for i in 0..partial_lines.len() {
            prop_assert_eq!(
                resolved.index.locate(start + i + preamble_lines() + 1),
                Location::Source { file: root.join("_p.scss"), line: i + 1 }
            );
        }
    }
}
