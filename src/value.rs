use crate::statics;
use serde::{Deserialize, Deserializer, de};
use std::fmt;

/// A single decoded field value (or array element).
/// Numbers keep the integer/float distinction the loader handed us so an unedited
/// cell renders exactly as it was decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Convert a parsed number back to a scalar. Float-typed properties always stay
    /// floats; everything else becomes an integer when the value is exactly integral.
    pub fn from_number(v: f64, float_kind: bool) -> Self {
        const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;
        if !float_kind && v.is_finite() && v.fract() == 0.0 && v.abs() <= MAX_SAFE_INTEGER {
            Scalar::Int(v as i64)
        } else {
            Scalar::Float(v)
        }
    }

    pub(crate) fn write_json5(&self, out: &mut String) {
        match self {
            Scalar::Int(v) => out.push_str(&v.to_string()),
            Scalar::Float(v) => out.push_str(&format_float(*v)),
            Scalar::Text(s) => write_escaped_string(out, s),
        }
    }
}

impl fmt::Display for Scalar {
    /// The textual form shown in the table. Dirty checks compare against this.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Float(v) => f.write_str(&format_float(*v)),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

/// Render a float the way the upstream tooling prints numbers:
/// integral values without a fraction, shortest round-trip digits otherwise,
/// plain decimals down to `0.000001`, and an explicit sign on positive exponents (`1e+21`).
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        return statics::LIT_NAN.to_string();
    }
    if v.is_infinite() {
        return if v.is_sign_negative() {
            format!("-{}", statics::LIT_INFINITY)
        } else {
            statics::LIT_INFINITY.to_string()
        };
    }
    if v == 0.0 {
        // Covers -0.0 as well.
        return "0".to_string();
    }
    if v.fract() == 0.0 && v.abs() < 1e21 {
        return format!("{v:.0}");
    }

    let mut buf = ryu::Buffer::new();
    let s = buf.format_finite(v);
    let Some((mantissa, exp)) = s.split_once('e') else {
        return s.to_string();
    };
    match exp.parse::<i32>() {
        Ok(e) if e >= 0 => format!("{mantissa}e+{exp}"),
        Ok(e) if e >= -6 => expand_small(mantissa, e),
        _ => s.to_string(),
    }
}

/// `1.5e-6` -> `0.0000015`. ryu switches to exponents one decade earlier than the loader.
fn expand_small(mantissa: &str, exp: i32) -> String {
    let (sign, unsigned) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = unsigned.chars().filter(|c| *c != '.').collect();
    let zeros = "0".repeat(exp.unsigned_abs() as usize - 1);
    format!("{sign}0.{zeros}{digits}")
}

/// A field as loaded: either a scalar or an ordered sequence of scalars.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(Scalar),
    Array(Vec<Scalar>),
}

impl Value {
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            Value::Array(_) => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Scalar]> {
        match self {
            Value::Array(values) => Some(values),
            Value::Scalar(_) => None,
        }
    }
}

/// A field in a sparse patch. Arrays keep the original length; positions that were
/// not edited stay `None` and are written as `null`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PatchValue {
    Scalar(Scalar),
    Array(Vec<Option<Scalar>>),
}

impl PatchValue {
    pub(crate) fn write_json5(&self, out: &mut String) {
        match self {
            PatchValue::Scalar(s) => s.write_json5(out),
            PatchValue::Array(values) => {
                out.push('[');
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    match v {
                        Some(s) => s.write_json5(out),
                        None => out.push_str(statics::LIT_NULL),
                    }
                }
                out.push(']');
            }
        }
    }
}

pub(crate) fn write_escaped_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write as _;
                write!(out, "\\u{:04X}", c as u32).ok();
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScalarVisitor;

        impl<'de> de::Visitor<'de> for ScalarVisitor {
            type Value = Scalar;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a number or a string")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(Scalar::Int(i64::from(v)))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(Scalar::Int(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(i64::try_from(v)
                    .map(Scalar::Int)
                    .unwrap_or(Scalar::Float(v as f64)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(Scalar::Float(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(Scalar::Text(v.to_owned()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(Scalar::Text(v))
            }
        }

        deserializer.deserialize_any(ScalarVisitor)
    }
}
