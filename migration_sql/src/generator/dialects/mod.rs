//! Per-dialect profiles and the statements that don't fit a template

pub mod hana;
pub mod mysql;
pub mod oracle;
pub mod postgres;
pub mod snowflake;
pub mod sqlite;
pub mod sqlserver;

use crate::generator::dialect::DialectOptions;
use crate::generator::quoter::QuotePolicy;

/// Quote policy after applying the `QuoteIdentifiers` switch
pub(crate) fn quote_policy(options: &DialectOptions, default: QuotePolicy) -> QuotePolicy {
    match options.quote_identifiers {
        Some(true) => QuotePolicy::Always,
        Some(false) => QuotePolicy::Never,
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifiers_switch_overrides_default() {
        let mut options = DialectOptions::default();
        assert_eq!(quote_policy(&options, QuotePolicy::Never), QuotePolicy::Never);

        options.quote_identifiers = Some(true);
        assert_eq!(quote_policy(&options, QuotePolicy::Never), QuotePolicy::Always);

        options.quote_identifiers = Some(false);
        assert_eq!(quote_policy(&options, QuotePolicy::Always), QuotePolicy::Never);
    }
}
