//! Property tests for the partial dependency graph.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use proptest::prelude::*;

use sassfuse::PartialGraph;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 32,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Dependents are duplicate-free and keep first-insertion order.
    #[test]
    fn property_add_relation_dedups_in_order(
        pairs in proptest::collection::vec((0u8..6, 0u8..4), 0..40)
    ) {
        let graph = PartialGraph::new();
        for (main, sub) in &pairs {
            graph.add_relation(
                &PathBuf::from(format!("/s/top{main}.scss")),
                &PathBuf::from(format!("/s/_p{sub}.scss")),
            );
        }

        for sub in 0u8..4 {
            let mut expected: Vec<PathBuf> = Vec::new();
            for (main, s) in &pairs {
                let main = PathBuf::from(format!("/s/top{main}.scss"));
                if *s == sub && !expected.contains(&main) {
                    expected.push(main);
                }
            }
            prop_assert_eq!(graph.lookup(&PathBuf::from(format!("/s/_p{sub}.scss"))), expected);
        }
    }

    /// PROPERTY: Concurrent insertions from many threads are all present.
    #[test]
    fn property_concurrent_insertions_are_never_lost(threads in 2usize..12, per_thread in 1usize..30) {
        let graph = Arc::new(PartialGraph::new());
        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let graph = graph.clone();
                thread::spawn(move || {
                    for i in 0..per_thread {
                        graph.add_relation(
                            &PathBuf::from(format!("/s/top{t}.scss")),
                            &PathBuf::from(format!("/s/_shared{}.scss", i % 3)),
                        );
                        graph.add_relation(
                            &PathBuf::from(format!("/s/top{t}.scss")),
                            &PathBuf::from(format!("/s/_own{t}_{i}.scss")),
                        );
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        for t in 0..threads {
            for i in 0..per_thread {
                let own = graph.lookup(&PathBuf::from(format!("/s/_own{t}_{i}.scss")));
                prop_assert_eq!(own, vec![PathBuf::from(format!("/s/top{t}.scss"))]);
            }
        }
        let shared = graph.lookup(&PathBuf::from("/s/_shared0.scss"));
        prop_assert_eq!(shared.len(), threads);
    }
}
