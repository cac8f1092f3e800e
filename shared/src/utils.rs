// Formatting helpers shared by the engine and its tools.

/// Parsing of spreadsheet-formatted amounts such as "1,234", "€2,500",
/// "(1,200)" or "12.5%".
pub mod amount_format {
    use thiserror::Error;

    const CURRENCY_MARKERS: [&str; 4] = ["EUR", "€", "$", "£"];

    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct ParsedAmount {
        /// Number as written, before any percent scaling.
        pub value: f64,
        /// The text carried a trailing `%`.
        pub percent: bool,
    }

    impl ParsedAmount {
        /// Percent amounts as a 0–1 fraction, plain amounts unchanged.
        pub fn scaled(&self) -> f64 {
            if self.percent {
                self.value / 100.0
            } else {
                self.value
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum AmountError {
        #[error("empty value")]
        Empty,
        #[error("'{0}' is not a number")]
        NotANumber(String),
    }

    pub fn strip_thousands(s: &str) -> String {
        s.chars().filter(|c| *c != ',').collect()
    }

    fn strip_currency(s: &str) -> &str {
        let mut out = s.trim();
        for marker in CURRENCY_MARKERS {
            if let Some(rest) = out.strip_prefix(marker) {
                out = rest.trim_start();
                break;
            }
        }
        for marker in CURRENCY_MARKERS {
            if let Some(rest) = out.strip_suffix(marker) {
                out = rest.trim_end();
                break;
            }
        }
        out
    }

    /// Strips one leading minus, reporting whether it was there.
    fn strip_sign(s: &str) -> (&str, bool) {
        match s.trim().strip_prefix('-') {
            Some(rest) => (rest.trim(), true),
            None => (s.trim(), false),
        }
    }

    pub fn parse_amount(s: &str) -> Result<ParsedAmount, AmountError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        let (body, percent) = match trimmed.strip_suffix('%') {
            Some(rest) => (rest.trim_end(), true),
            None => (trimmed, false),
        };

        let (body, in_parens) = match body.strip_prefix('(').and_then(|b| b.strip_suffix(')')) {
            Some(inner) => (inner, true),
            None => (body, false),
        };

        let (body, leading_minus) = strip_sign(body);
        let (body, currency_minus) = strip_sign(strip_currency(body));
        // A single negation marker only; "--5" or "(-5)" is malformed, not positive.
        let negations = [in_parens, leading_minus, currency_minus].iter().filter(|m| **m).count();
        let negative = negations == 1;
        let digits = strip_thousands(body);

        if negations > 1
            || digits.starts_with('-')
            || (negative && digits.starts_with('+'))
            || !digits.chars().any(|c| c.is_ascii_digit())
        {
            return Err(AmountError::NotANumber(s.to_string()));
        }
        let value: f64 = digits
            .parse()
            .map_err(|_| AmountError::NotANumber(s.to_string()))?;
        if !value.is_finite() {
            return Err(AmountError::NotANumber(s.to_string()));
        }

        Ok(ParsedAmount {
            value: if negative { -value } else { value },
            percent,
        })
    }

}
