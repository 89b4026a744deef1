//! Form text input.
//!
//! Quantity and price arrive as free text from numeric text fields. Parsing is
//! lenient: the longest numeric prefix is used and anything unparseable
//! becomes zero, so typing never produces an error state.

/// Editable form field.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FormField {
    Name,
    Sku,
    Quantity,
    Price,
}

impl FormField {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "name" => Some(FormField::Name),
            "sku" => Some(FormField::Sku),
            "qty" | "quantity" => Some(FormField::Quantity),
            "price" => Some(FormField::Price),
            _ => None,
        }
    }
}

/// Integer prefix of `text` (after leading whitespace, optional sign).
///
/// `"12abc"` → 12, `"abc"` → 0, `""` → 0. Out-of-range values saturate.
pub fn parse_quantity(text: &str) -> i64 {
    let s = text.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        let d = i64::from(b - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(d)
        } else {
            value.saturating_mul(10).saturating_add(d)
        };
    }
    value
}

/// Decimal prefix of `text`: sign, digits, optional fraction and exponent.
///
/// `"2.5kg"` → 2.5, `".5"` → 0.5, `"1e3"` → 1000, `"abc"` → 0. Non-finite
/// results and negative zero become 0.
pub fn parse_price(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }

    if mantissa_digits == 0 {
        return 0.0;
    }

    // Exponent only counts when it has at least one digit.
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    match s[..end].parse::<f64>() {
        Ok(v) if v.is_finite() && v != 0.0 => v,
        _ => 0.0,
    }
}
