use crate::statics;
use serde::Deserialize;

/// Closed set of scalar kinds a property column can carry.
/// Names match the upstream exporter; anything unrecognized is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    Boolean,
    Byte,
    BooleanByte,
    Uint16,
    Int32,
    Float,
    String,
    Name,
    #[serde(other)]
    Other,
}

impl PropertyType {
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            PropertyType::Boolean
                | PropertyType::Byte
                | PropertyType::BooleanByte
                | PropertyType::Uint16
                | PropertyType::Int32
                | PropertyType::Float
        )
    }

    /// Inclusive valid range for numerically validated kinds.
    /// `Uint16` keeps the signed 16-bit bounds the upstream editor enforced.
    pub fn valid_range(self) -> Option<(i64, i64)> {
        match self {
            PropertyType::Boolean | PropertyType::Byte | PropertyType::BooleanByte => {
                Some((0, 0xFF))
            }
            PropertyType::Uint16 => Some((i16::MIN as i64, i16::MAX as i64)),
            PropertyType::Int32 => Some((i32::MIN as i64, i32::MAX as i64)),
            _ => None,
        }
    }
}

/// One column of the record table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawDescriptor")]
pub struct PropertyDescriptor {
    pub name: String,
    pub ty: PropertyType,
    pub is_array: bool,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, ty: PropertyType, is_array: bool) -> Self {
        Self {
            name: name.into(),
            ty,
            is_array,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDescriptor {
    name: String,
    #[serde(rename = "type")]
    ty: PropertyType,
    #[serde(default)]
    is_array: Option<bool>,
}

impl From<RawDescriptor> for PropertyDescriptor {
    fn from(raw: RawDescriptor) -> Self {
        // Older dumps only mark arrays through the property name.
        let is_array = raw
            .is_array
            .unwrap_or_else(|| raw.name.ends_with(statics::ARRAY_SUFFIX));
        Self {
            name: raw.name,
            ty: raw.ty,
            is_array,
        }
    }
}
