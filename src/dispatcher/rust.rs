//! Rust dispatcher emitter.
//!
//! Routines are declared in an `unsafe extern "C"` block under local names (`routine_0`, `routine_1`, ...) and bound to
//! their mangled symbols with `#[link_name]`, which keeps uppercase symbols from tripping Rust's naming lints. The
//! program is built as tokens with `quote!`, parsed with `syn` and formatted with `prettyplease`.

use proc_macro2::{Literal, TokenStream};
use quote::{format_ident, quote};

use super::{DispatcherEmitter, DispatcherLanguage, UNKNOWN_SYMBOL_EXIT_CODE};
use crate::errors::GenerateError;
use crate::testset::TestSet;

const HEADER: &str = "// Test dispatcher generated by symtest. Do not edit.\n\
                      //\n\
                      // Usage: <dispatcher> <test-symbol>\n\n";

pub struct RustEmitter;

impl DispatcherEmitter for RustEmitter {
    fn language(&self) -> DispatcherLanguage {
        DispatcherLanguage::Rust
    }

    fn emit(&self, tests: &TestSet) -> Result<String, GenerateError> {
        let tokens = dispatcher_tokens(tests);
        let file = syn::parse2::<syn::File>(tokens).map_err(|e| GenerateError::Emission(e.to_string()))?;
        Ok(format!("{HEADER}{}", prettyplease::unparse(&file)))
    }
}

fn dispatcher_tokens(tests: &TestSet) -> TokenStream {
    let exit_code = Literal::i32_unsuffixed(UNKNOWN_SYMBOL_EXIT_CODE);

    let declarations = tests.iter().enumerate().map(|(index, pair)| {
        let ident = format_ident!("routine_{}", index);
        let symbol = pair.symbol.as_str();
        let doc = format!(" {}", pair.location);
        quote! {
            #[doc = #doc]
            #[link_name = #symbol]
            fn #ident() -> ::std::os::raw::c_int;
        }
    });

    let arms = tests.iter().enumerate().map(|(index, pair)| {
        let ident = format_ident!("routine_{}", index);
        let symbol = pair.symbol.as_str();
        quote! {
            #symbol => unsafe { #ident() },
        }
    });

    let unknown = quote! {
        eprintln!("{}: unknown test symbol '{}'", args[0], other);
        process::exit(UNKNOWN_SYMBOL_EXIT_CODE);
    };

    // Without routines every argument is unknown; a lone diverging match arm would leave dead code behind.
    let dispatch = if tests.is_empty() {
        quote! {
            let other = &args[1];
            #unknown
        }
    } else {
        quote! {
            let status: i32 = match args[1].as_str() {
                #(#arms)*
                other => {
                    #unknown
                }
            };
            process::exit(status);
        }
    };

    quote! {
        use std::process;

        /// Exit status for a symbol this dispatcher was not generated with.
        const UNKNOWN_SYMBOL_EXIT_CODE: i32 = #exit_code;

        unsafe extern "C" {
            #(#declarations)*
        }

        fn main() {
            let args: Vec<String> = std::env::args().collect();
            if args.len() != 2 {
                eprintln!(
                    "usage: {} <test-symbol>",
                    args.first().map(String::as_str).unwrap_or("dispatcher")
                );
                process::exit(UNKNOWN_SYMBOL_EXIT_CODE);
            }

            #dispatch
        }
    }
}
