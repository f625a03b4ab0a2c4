//! Golden snapshot tests for the C dispatcher
//!
//! Run with: `cargo test --test dispatcher_snapshot_tests`
//! Review changes: `cargo insta review`

use symtest::dispatcher::{self, DispatcherLanguage};
use symtest::{NamingRules, Platform, TestSet};

fn c_dispatcher(locations: &[&str], platform: Platform) -> dispatcher::DispatcherSource {
    let tests = TestSet::build(locations, &NamingRules::default(), platform).expect("test set");
    dispatcher::generate(&tests, DispatcherLanguage::C).expect("emit")
}

#[test]
fn test_c_dispatcher_lowercase() {
    let source = c_dispatcher(
        &["tests/test_succeeds_1.f90", "tests/test_fails_1.f90"],
        Platform::LowercaseTrailingUnderscore,
    );
    insta::assert_snapshot!("c_dispatcher_lowercase", source.text);
}

#[test]
fn test_c_dispatcher_empty() {
    let source = c_dispatcher(&[], Platform::UppercaseNoSuffix);
    insta::assert_snapshot!("c_dispatcher_empty", source.text);
}

#[test]
fn test_rust_dispatcher_is_valid_rust() {
    let tests = TestSet::build(
        ["tests/test_succeeds_1.f90", "tests/test_fails_1.f90"],
        &NamingRules::default(),
        Platform::UppercaseNoSuffix,
    )
    .unwrap();
    let source = dispatcher::generate(&tests, DispatcherLanguage::Rust).unwrap();
    let file = syn::parse_file(&source.text).expect("generated dispatcher should parse");

    assert!(file.items.iter().any(|item| matches!(item, syn::Item::Fn(f) if f.sig.ident == "main")));
    assert!(source.text.contains("#[link_name = \"TESTS_TEST_SUCCEEDS_1\"]"));
    assert!(source.text.contains("fn routine_1() -> ::std::os::raw::c_int;"));
}

#[test]
fn test_output_is_deterministic() {
    let locations = ["tests/b.f90", "tests/a.f90", "tests/c.f90"];
    for &language in DispatcherLanguage::ALL {
        let tests = TestSet::build(locations, &NamingRules::default(), Platform::UppercaseNoSuffix).unwrap();
        let first = dispatcher::generate(&tests, language).unwrap();
        let second = dispatcher::generate(&tests, language).unwrap();
        assert_eq!(first, second);

        let b = first.text.find("\"TESTS_B\"").unwrap();
        let a = first.text.find("\"TESTS_A\"").unwrap();
        assert!(b < a, "dispatch follows registration order");
    }
}
