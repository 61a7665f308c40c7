//! Library-level tests: flattening nested partials, provenance across levels,
//! and the dependency graph seeded by an initial build.

mod common;

use std::sync::Arc;

use common::TestEnv;
use sassfuse::{
    build_paths, BuildConfig, BuildContext, CheckBackend, FuseError, Location, PartialGraph,
    Resolver, PREAMBLE_MARKER,
};

fn context(env: &TestEnv) -> BuildContext {
    let config = BuildConfig {
        dir: Some(env.path("sass")),
        build_dir: Some(env.path("css")),
        ..BuildConfig::default()
    };
    BuildContext::new(config, Arc::new(PartialGraph::new()), Arc::new(CheckBackend))
}

#[test]
fn nested_partials_flatten_in_order() {
    let env = TestEnv::new();
    env.write("sass/base/_reset.scss", "* { margin: 0; }\n");
    env.write("sass/base/_index.scss", "@import \"reset\";\nbody { padding: 0; }\n");
    let main = env.write(
        "sass/site.scss",
        "@import \"base/index\";\n.site { display: block; }\n",
    );

    let src = env.read("sass/site.scss");
    let resolved = Resolver::new(&main).resolve(&src, &env.path("sass")).unwrap();

    assert_eq!(
        resolved.output,
        "* { margin: 0; }\n\nbody { padding: 0; }\n\n.site { display: block; }\n"
    );

    let at = |line: usize| resolved.index.locate(line + sassfuse::resolver::preamble_lines() + 1);
    assert_eq!(
        at(0),
        Location::Source { file: env.path("sass/base/_reset.scss"), line: 1 }
    );
    assert_eq!(
        at(2),
        Location::Source { file: env.path("sass/base/_index.scss"), line: 2 }
    );
    assert_eq!(
        at(4),
        Location::Source { file: main.clone(), line: 2 }
    );
    assert_eq!(resolved.lookup_file(1), PREAMBLE_MARKER);
}

#[test]
fn initial_build_seeds_graph_with_transitive_partials() {
    let env = TestEnv::new();
    env.write("sass/_vars.scss", "$gap: 4px;\n");
    env.write("sass/_mixins.scss", "@import \"vars\";\n");
    env.write("sass/a.scss", "@import \"mixins\";\n");
    env.write("sass/b.scss", "@import \"vars\";\n");
    let ctx = context(&env);

    let reports = build_paths(&[env.path("sass")], &ctx);

    assert!(reports.iter().all(|r| r.is_success()));
    assert_eq!(
        ctx.graph.lookup(&env.path("sass/_vars.scss")),
        vec![env.path("sass/a.scss"), env.path("sass/b.scss")]
    );
    assert_eq!(
        ctx.graph.lookup(&env.path("sass/_mixins.scss")),
        vec![env.path("sass/a.scss")]
    );
    assert_eq!(ctx.graph.len(), 2);
}

#[test]
fn ignored_directories_are_not_built() {
    let env = TestEnv::new();
    env.write("sass/.ignore", "vendor/\n");
    env.write("sass/vendor/lib.scss", ".lib { }\n");
    env.write("sass/site.scss", ".site { }\n");
    let ctx = context(&env);

    let reports = build_paths(&[env.path("sass")], &ctx);

    let files: Vec<_> = reports.iter().map(|r| r.file.clone()).collect();
    assert_eq!(files, vec![env.path("sass/site.scss")]);
}

#[test]
fn cycle_between_partials_is_reported_not_overflowed() {
    let env = TestEnv::new();
    env.write("sass/_a.scss", "@import \"b\";\n");
    env.write("sass/_b.scss", "@import \"a\";\n");
    let main = env.write("sass/main.scss", "@import \"a\";\n");

    let err = sassfuse::build_file(&main, &context(&env)).unwrap_err();

    match err {
        FuseError::ImportCycle { chain } => assert_eq!(
            chain,
            vec![
                main,
                env.path("sass/_a.scss"),
                env.path("sass/_b.scss"),
                env.path("sass/_a.scss"),
            ]
        ),
        other => panic!("expected ImportCycle, got {other:?}"),
    }
    assert!(!env.path("css/main.css").exists());
}
