//! Value coercion (spec §4.1) and the tagged [`Value`] used by the alias
//! store (Design Note §9): rather than a runtime-generic `map[Type]→map`,
//! every alias bucket is keyed by a [`TypeTag`] and holds this one enum, and
//! coercion between a literal token / stored `Value` and a concrete Rust
//! type happens through the [`ScriptType`] trait below.

use crate::error::{ScriptError, ScriptResult};

/// 32-bit identifier of a game entity (spec glossary: "Serial").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Serial(pub u32);

impl Serial {
    /// `Source::Ground`: the sentinel meaning "search the ground", `MAX_UINT`.
    pub const GROUND: Serial = Serial(u32::MAX);
    /// `Source::Any`: the sentinel meaning "no particular container", `0`.
    pub const ANY: Serial = Serial(0);
}

/// Tag identifying which bucket of the alias store a name belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Serial,
    Uint,
    Ushort,
    Int,
    Double,
    Bool,
    String,
}

/// A dynamically tagged value, as stored by the alias store and lists.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Serial(Serial),
    Uint(u32),
    Ushort(u16),
    Int(i32),
    Double(f64),
    Bool(bool),
    String(String),
}

impl Value {
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Serial(_) => TypeTag::Serial,
            Value::Uint(_) => TypeTag::Uint,
            Value::Ushort(_) => TypeTag::Ushort,
            Value::Int(_) => TypeTag::Int,
            Value::Double(_) => TypeTag::Double,
            Value::Bool(_) => TypeTag::Bool,
            Value::String(_) => TypeTag::String,
        }
    }

    /// Renders the value as the string form a script would see, used when a
    /// non-string value is compared against a string operand (§4.4).
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Serial(s) => s.0.to_string(),
            Value::Uint(v) => v.to_string(),
            Value::Ushort(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Double(v) => v.to_string(),
            Value::Bool(v) => v.to_string(),
            Value::String(v) => v.clone(),
        }
    }
}

/// A Rust type a script argument can be coerced to. Implemented for the
/// handful of primitive types the interpreter's commands and expressions
/// request (spec §4.1, §4.3).
pub trait ScriptType: Sized + Clone {
    /// Which alias-store bucket this type reads from.
    const TAG: TypeTag;

    /// `true` for the string type; controls whether `ArgumentList::next_as`
    /// applies the local-value map before or after resolution (§4.3).
    const IS_STRING: bool = false;

    /// Parses a raw token per the coercion rules of §4.1: `0x…` is hex,
    /// plain digits are decimal, `"true"`/`"false"` are boolean; anything
    /// else is a [`ScriptError::TypeConversion`]. No silent truncation: a
    /// value that does not fit the target type is an error, not a wraparound.
    fn from_literal(token: &str) -> ScriptResult<Self>;

    /// Extracts `Self` from a tagged [`Value`] pulled out of the alias
    /// store or a list. Returns `None` on a tag mismatch so callers can
    /// fall through to the next resolution step instead of hard-failing.
    fn from_value(value: &Value) -> Option<Self>;

    /// Wraps `self` back into a tagged [`Value`] (used by lists/aliases that
    /// store values of this type).
    fn into_value(self) -> Value;

    /// The type's neutral default (used when an optional argument is
    /// missing and no per-name default literal is registered).
    fn zero_default() -> Self;
}

/// Parses into the widest integer that can hold any token the grammar
/// allows (hex literals are always unsigned; decimal literals may be
/// negative), per §4.1.
fn parse_int_token(token: &str) -> ScriptResult<i128> {
    let token = token.trim();
    if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        u128::from_str_radix(hex, 16)
            .map(|v| v as i128)
            .map_err(|_| ScriptError::type_conversion(format!("'{token}' is not valid hex")))
    } else {
        token
            .parse::<i128>()
            .map_err(|_| ScriptError::type_conversion(format!("'{token}' is not a number")))
    }
}

macro_rules! impl_int_script_type {
    ($t:ty, $tag:expr) => {
        impl ScriptType for $t {
            const TAG: TypeTag = $tag;

            fn from_literal(token: &str) -> ScriptResult<Self> {
                let wide = parse_int_token(token)?;
                <$t>::try_from(wide)
                    .map_err(|_| ScriptError::type_conversion(format!(
                        "'{token}' does not fit in {}", stringify!($t)
                    )))
            }

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::Serial(s) => <$t>::try_from(s.0).ok(),
                    Value::Uint(v) => <$t>::try_from(*v).ok(),
                    Value::Ushort(v) => <$t>::try_from(*v).ok(),
                    Value::Int(v) => <$t>::try_from(*v).ok(),
                    _ => None,
                }
            }

            fn into_value(self) -> Value {
                Value::Uint(self as u32)
            }

            fn zero_default() -> Self {
                0
            }
        }
    };
}

impl_int_script_type!(u32, TypeTag::Uint);
impl_int_script_type!(u16, TypeTag::Ushort);

impl ScriptType for i32 {
    const TAG: TypeTag = TypeTag::Int;

    fn from_literal(token: &str) -> ScriptResult<Self> {
        let wide = parse_int_token(token)?;
        i32::try_from(wide)
            .map_err(|_| ScriptError::type_conversion(format!("'{token}' does not fit in i32")))
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Serial(s) => i32::try_from(s.0).ok(),
            Value::Uint(v) => i32::try_from(*v).ok(),
            Value::Ushort(v) => Some(*v as i32),
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn zero_default() -> Self {
        0
    }
}

impl ScriptType for Serial {
    const TAG: TypeTag = TypeTag::Serial;

    fn from_literal(token: &str) -> ScriptResult<Self> {
        let wide = parse_int_token(token)?;
        u32::try_from(wide)
            .map(Serial)
            .map_err(|_| ScriptError::type_conversion(format!("'{token}' is not a valid serial")))
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Serial(s) => Some(*s),
            Value::Uint(v) => Some(Serial(*v)),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Serial(self)
    }

    fn zero_default() -> Self {
        Serial(0)
    }
}

impl ScriptType for bool {
    const TAG: TypeTag = TypeTag::Bool;

    fn from_literal(token: &str) -> ScriptResult<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(ScriptError::type_conversion(format!(
                "'{token}' is not a boolean"
            ))),
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn zero_default() -> Self {
        false
    }
}

impl ScriptType for f64 {
    const TAG: TypeTag = TypeTag::Double;

    fn from_literal(token: &str) -> ScriptResult<Self> {
        token
            .trim()
            .parse::<f64>()
            .map_err(|_| ScriptError::type_conversion(format!("'{token}' is not a double")))
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Double(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            Value::Uint(v) => Some(*v as f64),
            Value::Ushort(v) => Some(*v as f64),
            Value::Serial(s) => Some(s.0 as f64),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Double(self)
    }

    fn zero_default() -> Self {
        0.0
    }
}

impl ScriptType for String {
    const TAG: TypeTag = TypeTag::String;
    const IS_STRING: bool = true;

    fn from_literal(token: &str) -> ScriptResult<Self> {
        // UO Steam is case-insensitive; any string a script observes is
        // lowercased (spec §4.2).
        Ok(token.to_ascii_lowercase())
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.to_display_string().to_ascii_lowercase())
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn zero_default() -> Self {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parses_into_widest_fit() {
        assert_eq!(u32::from_literal("0x40000001").unwrap(), 0x4000_0001);
        assert_eq!(Serial::from_literal("0x1").unwrap(), Serial(1));
    }

    #[test]
    fn decimal_parses() {
        assert_eq!(i32::from_literal("-12").unwrap(), -12);
        assert_eq!(u32::from_literal("12").unwrap(), 12);
    }

    #[test]
    fn bool_parses_only_true_false() {
        assert!(bool::from_literal("true").unwrap());
        assert!(!bool::from_literal("false").unwrap());
        assert!(bool::from_literal("yes").is_err());
    }

    #[test]
    fn out_of_range_is_error_not_truncation() {
        assert!(u16::from_literal("0x10000").is_err());
    }

    #[test]
    fn string_never_fails_and_is_lowercased() {
        assert_eq!(String::from_literal("Anything").unwrap(), "anything");
    }
}
