use std::collections::HashMap;

use symtest_core::toolchain::{self, TOOLCHAINS};
use symtest_core::{NamingRules, Platform};

#[test]
fn toolchain_rows_unique_and_resolvable() {
    let mut seen: HashMap<(String, Option<String>), Platform> = HashMap::new();

    for info in TOOLCHAINS {
        let key = (
            info.compiler.to_ascii_lowercase(),
            info.os.map(|os| os.to_ascii_lowercase()),
        );
        if let Some(prev) = seen.insert(key, info.platform) {
            panic!(
                "duplicate toolchain row {:?}/{:?}: {:?} and {:?}",
                info.compiler, info.os, prev, info.platform
            );
        }

        let os = info.os.unwrap_or("linux");
        let resolved = toolchain::resolve(info.compiler, os);
        assert!(
            resolved.is_some(),
            "toolchain row not resolvable: {} on {}",
            info.compiler,
            os
        );
        if info.os.is_some() {
            assert_eq!(resolved, Some(info.platform), "OS-specific row shadowed for {}", info.compiler);
        }
    }
}

#[test]
fn every_platform_spelling_parses_back() {
    for &platform in Platform::ALL {
        assert_eq!(platform.to_string().parse::<Platform>(), Ok(platform));
    }
}

#[test]
fn every_platform_yields_a_distinct_symbol_for_the_same_name() {
    let name = NamingRules::default().normalize("tests/test_io.f90").unwrap();
    let mut symbols: Vec<String> = Platform::ALL.iter().map(|p| p.mangle(&name).into_string()).collect();
    symbols.sort();
    symbols.dedup();
    assert_eq!(symbols.len(), Platform::ALL.len());
}
