//! Trading pair identifier.

use crate::error::ConfigError;
use std::fmt;

/// A spot trading pair in BASE/QUOTE form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    base: String,
    quote: String,
}

impl Symbol {
    /// Parse a `BASE/QUOTE` pair, uppercasing both legs.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let mut parts = raw.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(base), Some(quote), None)
                if !base.trim().is_empty() && !quote.trim().is_empty() =>
            {
                Ok(Self {
                    base: base.trim().to_uppercase(),
                    quote: quote.trim().to_uppercase(),
                })
            }
            _ => Err(ConfigError::InvalidSymbol(raw.to_string())),
        }
    }

    /// Base asset, e.g. `BTC` for `BTC/USDT`. The market price feed lists
    /// bare base symbols, so matching happens against this leg.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// Full pair in the form the indicator provider expects.
    pub fn pair(&self) -> String {
        format!("{}/{}", self.base, self.quote)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}
