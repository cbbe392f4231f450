use lalrgen::{
    grammar::{Grammar, GrammarDef, GrammarDefError},
    Config, Generator,
};
use lalrgen_tests::grammars;

fn smoketest_grammar(
    name: &'static str,
    f: impl FnOnce(&mut GrammarDef) -> Result<(), GrammarDefError>,
) {
    let _ = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_test_writer()
        .try_init();

    let grammar = Grammar::define(f).unwrap();
    eprintln!("grammar:\n{}", grammar);
    eprintln!();

    let mut dump = String::new();
    let config = Config::new().label(name);
    let automaton = Generator::new(&grammar, &config)
        .debug_sink(&mut dump)
        .generate()
        .unwrap();
    eprintln!("automaton:\n---\n{}", dump);

    assert_eq!(automaton.statistics().states, automaton.states().len());
    assert!(dump.contains(&format!("Statistics for {}:", name)));
}

#[test]
fn smoketest_g_balanced() {
    smoketest_grammar("g_balanced", grammars::g_balanced);
}

#[test]
fn smoketest_g_arith_prec() {
    smoketest_grammar("g_arith_prec", grammars::g_arith_prec);
}

#[test]
fn smoketest_g_dangling_else() {
    smoketest_grammar("g_dangling_else", grammars::g_dangling_else);
}

#[test]
fn smoketest_g_simple1() {
    smoketest_grammar("g_simple1", grammars::g_simple1);
}

#[test]
fn smoketest_g_simple2() {
    smoketest_grammar("g_simple2", grammars::g_simple2);
}

#[test]
fn smoketest_g_nullable_chain() {
    smoketest_grammar("g_nullable_chain", grammars::g_nullable_chain);
}

#[test]
fn smoketest_g_error_recovery() {
    smoketest_grammar("g_error_recovery", grammars::g_error_recovery);
}

#[test]
fn smoketest_g4() {
    smoketest_grammar("g4", grammars::g4);
}

#[test]
fn smoketest_min_caml() {
    smoketest_grammar("min_caml", grammars::min_caml);
}
