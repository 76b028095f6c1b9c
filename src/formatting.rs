//! Currency formatting contract used by the bound calculator and the message composer.

use crate::data::Currency;

/// Largest number of fraction digits [`StandardCurrencyFormatter`] renders.
pub const MAX_FRACTION_DIGITS: u32 = 20;

/// Renders an amount as a currency string.
///
/// Implementations must be deterministic: the engine relies on equal inputs
/// producing equal strings for its idempotence guarantee.
pub trait CurrencyFormatter {
    /// Formats `amount` with the currency symbol and exactly `fraction_digits` decimals.
    fn format(&self, amount: f64, currency: Currency, fraction_digits: u32) -> String;
}

/// Symbol-prefixed, comma-grouped, fixed-decimal formatter (`"$1,234.5000"`).
///
/// Precision is capped at [`MAX_FRACTION_DIGITS`].
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardCurrencyFormatter;

impl CurrencyFormatter for StandardCurrencyFormatter {
    fn format(&self, amount: f64, currency: Currency, fraction_digits: u32) -> String {
        let digits = fraction_digits.min(MAX_FRACTION_DIGITS) as usize;
        let fixed = format!("{:.*}", digits, amount.abs());
        let (integer, fraction) = match fixed.split_once('.') {
            Some((integer, fraction)) => (integer, Some(fraction)),
            None => (fixed.as_str(), None),
        };

        let negative = amount < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9'));
        let mut out = String::with_capacity(fixed.len() + 8);
        if negative {
            out.push('-');
        }
        out.push_str(currency.symbol());
        out.push_str(&group_thousands(integer));
        if let Some(fraction) = fraction {
            out.push('.');
            out.push_str(fraction);
        }
        out
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
