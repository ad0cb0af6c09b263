//! Static widget strings, keyed by locale tag.
//! Embedded at compile time; an unknown tag falls back to the default
//! locale rather than failing.

use serde::Deserialize;
use std::collections::HashMap;
use tracing::warn;

const STRINGS_TOML: &str = include_str!("strings.toml");

pub const DEFAULT_LOCALE: &str = "en-US";

#[derive(Deserialize, Debug, Clone)]
pub struct LocaleStrings {
    pub contact_address: String,
    /// Shown as a synthetic assistant message when the transport fails.
    /// `{contact}` is replaced with the contact address.
    pub transport_apology: String,
    pub rate_limit_notice: String,
}

#[derive(Deserialize)]
struct StringsFile {
    #[serde(flatten)]
    locales: HashMap<String, LocaleStrings>,
}

impl LocaleStrings {
    /// Resolve the string table for `locale`, falling back to the default
    /// when the tag is unknown.
    pub fn for_locale(locale: &str) -> Self {
        let mut file: StringsFile =
            toml::from_str(STRINGS_TOML).expect("embedded locale table is valid TOML");

        if let Some(strings) = file.locales.remove(locale) {
            return strings;
        }
        warn!(locale = locale, "unknown locale, falling back to default");
        file.locales
            .remove(DEFAULT_LOCALE)
            .expect("embedded locale table carries the default locale")
    }

    /// The transport-failure message with the contact address interpolated.
    pub fn apology(&self) -> String {
        self.transport_apology.replace("{contact}", &self.contact_address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apology_interpolates_the_contact_address() {
        let strings = LocaleStrings::for_locale(DEFAULT_LOCALE);
        assert!(strings.apology().contains(&strings.contact_address));
        assert!(!strings.apology().contains("{contact}"));
    }

    #[test]
    fn unknown_locale_falls_back_to_default() {
        let fallback = LocaleStrings::for_locale("xx-XX");
        let default = LocaleStrings::for_locale(DEFAULT_LOCALE);
        assert_eq!(fallback.transport_apology, default.transport_apology);
    }

    #[test]
    fn every_locale_carries_all_strings() {
        for tag in ["en-US", "pt-BR", "fr-FR"] {
            let strings = LocaleStrings::for_locale(tag);
            assert!(!strings.contact_address.is_empty());
            assert!(strings.transport_apology.contains("{contact}"));
            assert!(!strings.rate_limit_notice.is_empty());
        }
    }
}
