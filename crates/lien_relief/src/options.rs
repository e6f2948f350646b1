//! Binder options.
//!
//! These options feed the number and currency filters. Missing keys fall back
//! to their defaults, so a partial object can be applied on top of nothing.

use serde::{Deserialize, Serialize};

/// Formatting options shared by every binding of a binder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinderOptions {
    /// Thousands separator (default: `,`)
    #[serde(default = "default_number_separator")]
    pub number_separator: String,

    /// Decimal point (default: `.`)
    #[serde(default = "default_decimal_symbol")]
    pub decimal_symbol: String,

    /// Currency prefix (default: `$`)
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

impl Default for BinderOptions {
    fn default() -> Self {
        Self {
            number_separator: default_number_separator(),
            decimal_symbol: default_decimal_symbol(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

fn default_number_separator() -> String {
    ",".to_string()
}

fn default_decimal_symbol() -> String {
    ".".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}
