//! Post-processing applied to a primitive's raw result.
//!
//! Built-in modifiers have stable names so JSON pool specs can refer to
//! them (`"modifier": "ipv4_class_b"`). Closures can only be attached
//! through the Rust API.

use crate::value::Value;
use std::fmt;
use std::sync::Arc;

type ModifierFn = dyn Fn(Value) -> Value + Send + Sync;

#[derive(Clone)]
pub enum Modifier {
    /// `v -> 1e9 - |v * 1e6|`, the QQ number lower bound.
    QqLowerBound,
    /// Leading `10.` becomes `11.`.
    Ipv4ClassA,
    /// `172.16.x.x` through `172.31.x.x` move to `173.`.
    Ipv4ClassB,
    /// Leading `192.168.` becomes `192.169.`.
    Ipv4ClassC,
    Abs,
    Upper,
    Lower,
    /// Caller-supplied function. `Value::Null` stands for "no value" in
    /// both directions.
    Custom(Arc<ModifierFn>),
}

impl Modifier {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let modifier = match name {
            "qq_lower_bound" => Self::QqLowerBound,
            "ipv4_class_a" => Self::Ipv4ClassA,
            "ipv4_class_b" => Self::Ipv4ClassB,
            "ipv4_class_c" => Self::Ipv4ClassC,
            "abs" => Self::Abs,
            "upper" => Self::Upper,
            "lower" => Self::Lower,
            _ => return None,
        };
        Some(modifier)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::QqLowerBound => "qq_lower_bound",
            Self::Ipv4ClassA => "ipv4_class_a",
            Self::Ipv4ClassB => "ipv4_class_b",
            Self::Ipv4ClassC => "ipv4_class_c",
            Self::Abs => "abs",
            Self::Upper => "upper",
            Self::Lower => "lower",
            Self::Custom(_) => "custom",
        }
    }

    pub fn apply(&self, raw: Option<Value>) -> Option<Value> {
        match self {
            Self::Custom(f) => match f(raw.unwrap_or(Value::Null)) {
                Value::Null => None,
                v => Some(v),
            },
            Self::QqLowerBound => {
                let v = raw?.as_f64()?;
                Some(Value::Number(1e9 - (v * 1e6).abs()))
            }
            Self::Abs => Some(Value::Number(raw?.as_f64()?.abs())),
            Self::Upper => Some(Value::Text(raw?.as_str()?.to_uppercase())),
            Self::Lower => Some(Value::Text(raw?.as_str()?.to_lowercase())),
            Self::Ipv4ClassA => map_text(raw, |s| {
                s.strip_prefix("10.").map(|rest| format!("11.{rest}"))
            }),
            Self::Ipv4ClassB => map_text(raw, |s| {
                let rest = s.strip_prefix("172.")?;
                let second: u32 = rest.split('.').next()?.parse().ok()?;
                (16..=31).contains(&second).then(|| format!("173.{rest}"))
            }),
            Self::Ipv4ClassC => map_text(raw, |s| {
                s.strip_prefix("192.168.").map(|rest| format!("192.169.{rest}"))
            }),
        }
    }
}

/// Rewrite a text value when `f` matches; other text passes through.
fn map_text(raw: Option<Value>, f: impl Fn(&str) -> Option<String>) -> Option<Value> {
    match raw? {
        Value::Text(s) => Some(Value::Text(f(&s).unwrap_or(s))),
        other => Some(other),
    }
}

impl fmt::Debug for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Modifier({})", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Option<Value> {
        Some(Value::from(s))
    }

    #[test]
    fn qq_lower_bound_formula() {
        let m = Modifier::QqLowerBound;
        assert_eq!(m.apply(Some(Value::from(0))), Some(Value::Number(1e9)));
        assert_eq!(m.apply(Some(Value::from(-3))), Some(Value::Number(997_000_000.0)));
        assert_eq!(m.apply(Some(Value::from(250))), Some(Value::Number(750_000_000.0)));
        assert_eq!(m.apply(None), None);
    }

    #[test]
    fn class_a_skips_private_ten() {
        let m = Modifier::Ipv4ClassA;
        assert_eq!(m.apply(text("10.1.2.3")), text("11.1.2.3"));
        assert_eq!(m.apply(text("100.1.2.3")), text("100.1.2.3"));
    }

    #[test]
    fn class_b_only_moves_private_block() {
        let m = Modifier::Ipv4ClassB;
        assert_eq!(m.apply(text("172.16.0.1")), text("173.16.0.1"));
        assert_eq!(m.apply(text("172.31.9.9")), text("173.31.9.9"));
        assert_eq!(m.apply(text("172.32.0.1")), text("172.32.0.1"));
        assert_eq!(m.apply(text("172.15.0.1")), text("172.15.0.1"));
    }

    #[test]
    fn class_c_skips_private_192_168() {
        let m = Modifier::Ipv4ClassC;
        assert_eq!(m.apply(text("192.168.4.4")), text("192.169.4.4"));
        assert_eq!(m.apply(text("192.16.8.4")), text("192.16.8.4"));
    }

    #[test]
    fn custom_null_means_no_value() {
        let m = Modifier::custom(|_| Value::Null);
        assert_eq!(m.apply(text("x")), None);
        let m = Modifier::custom(|v| match v {
            Value::Number(n) => Value::Number(n * 2.0),
            other => other,
        });
        assert_eq!(m.apply(Some(Value::from(4))), Some(Value::Number(8.0)));
    }

    #[test]
    fn names_round_trip() {
        let names = [
            "qq_lower_bound",
            "ipv4_class_a",
            "ipv4_class_b",
            "ipv4_class_c",
            "abs",
            "upper",
            "lower",
        ];
        for name in names {
            assert_eq!(Modifier::from_name(name).map(|m| m.name()), Some(name));
        }
        assert!(Modifier::from_name("rot13").is_none());
    }
}
