use crate::property::PropertyType;
use crate::statics;

/// Why a committed numeric cell is marked invalid. The `Display` text is the tooltip reason.
/// These never block a commit, a save or an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Value must be a number")]
    NotANumber,
    #[error("Value must be between {} and {}", thousands(.min), thousands(.max))]
    OutOfRange { min: i64, max: i64 },
}

/// Parse committed cell text as a number.
///
/// Accepts decimal and exponent notation with surrounding whitespace, `0x`/`0o`/`0b`
/// literals and `Infinity`. Blank text reads as zero.
pub fn parse_number(text: &str) -> Option<f64> {
    let t = text.trim();
    if t.is_empty() {
        return Some(0.0);
    }
    if let Some(v) = parse_radix_literal(t) {
        return Some(v);
    }

    let unsigned = t.strip_prefix(['+', '-']).unwrap_or(t);
    if unsigned == statics::LIT_INFINITY {
        return Some(if t.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }
    // Rust's float parser also takes `inf`/`nan`; those are not numbers here.
    if !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    t.parse::<f64>().ok()
}

fn parse_radix_literal(t: &str) -> Option<f64> {
    let (radix, digits) = match t.get(..2)? {
        "0x" | "0X" => (16, &t[2..]),
        "0o" | "0O" => (8, &t[2..]),
        "0b" | "0B" => (2, &t[2..]),
        _ => return None,
    };
    u64::from_str_radix(digits, radix).ok().map(|v| v as f64)
}

/// Validate committed text against a property type: it must parse, and ranged kinds
/// must fall inside their inclusive bounds.
pub fn validate_numeric(ty: PropertyType, text: &str) -> Result<f64, ValidationError> {
    let v = parse_number(text).ok_or(ValidationError::NotANumber)?;
    if let Some((min, max)) = ty.valid_range()
        && (v < min as f64 || v > max as f64)
    {
        return Err(ValidationError::OutOfRange { min, max });
    }
    Ok(v)
}

fn thousands(n: &i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if *n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
