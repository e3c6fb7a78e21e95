// crates/form-schema-cli/src/tests/i18n.rs
// ============================================================================
// Module: CLI i18n Tests
// Description: Unit tests for catalog parity and locale parsing.
// Purpose: Ensure CLI localization remains consistent across supported locales.
// Dependencies: form-schema-cli i18n module
// ============================================================================

//! ## Overview
//! Verifies the CLI message catalogs stay in sync, locale parsing is tolerant,
//! and locale templates preserve placeholder parity with English.

use std::collections::BTreeSet;

use crate::i18n::Locale;
use crate::i18n::MessageArg;
use crate::i18n::SUPPORTED_LOCALES;
use crate::i18n::catalog_entries_for;
use crate::i18n::catalog_for;
use crate::i18n::translate_for;

fn placeholder_names(template: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1 ..];
        let Some(end) = after.find('}') else {
            panic!("unclosed placeholder in {template}");
        };
        names.insert(after[.. end].to_string());
        rest = &after[end + 1 ..];
    }
    names
}

#[test]
fn catalogs_have_identical_keys() {
    let english: BTreeSet<&str> =
        catalog_entries_for(Locale::En).iter().map(|(key, _)| *key).collect();
    for locale in SUPPORTED_LOCALES {
        let keys: BTreeSet<&str> =
            catalog_entries_for(*locale).iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, english, "catalog keys differ for {}", locale.as_str());
        assert_eq!(
            catalog_for(*locale).len(),
            catalog_entries_for(*locale).len(),
            "duplicate keys in {}",
            locale.as_str()
        );
    }
}

#[test]
fn catalogs_preserve_placeholders() {
    let english = catalog_for(Locale::En);
    for locale in SUPPORTED_LOCALES {
        for (key, template) in catalog_entries_for(*locale) {
            let reference = english.get(key).copied().unwrap_or_default();
            assert_eq!(
                placeholder_names(template),
                placeholder_names(reference),
                "placeholder mismatch for {key} in {}",
                locale.as_str()
            );
        }
    }
}

#[test]
fn locale_parse_is_tolerant() {
    assert_eq!(Locale::parse("EN"), Some(Locale::En));
    assert_eq!(Locale::parse(" ca-ES "), Some(Locale::Ca));
    assert_eq!(Locale::parse("ca_AD"), Some(Locale::Ca));
    assert_eq!(Locale::parse(""), None);
    assert_eq!(Locale::parse("de"), None);
}

#[test]
fn translate_substitutes_and_falls_back() {
    let message = translate_for(Locale::En, "compile.failed", vec![MessageArg::new("count", "3")]);
    assert_eq!(message, "Form definition rejected with 3 error(s):");

    let catalan = translate_for(Locale::Ca, "config.validate.ok", Vec::new());
    assert_eq!(catalan, "Configuració vàlida.");

    assert_eq!(translate_for(Locale::Ca, "no.such.key", Vec::new()), "no.such.key");
}
