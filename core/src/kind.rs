//! The method registry: pool type tags and the parameters each one binds.
//!
//! RULE: The set of kinds is closed. A tag that does not parse to a
//! registered kind becomes `Unregistered` and evaluates to nothing.
//! Parameter order is positional: append new kinds, never reorder the
//! parameter lists of existing ones.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolKind {
    /// Literal passthrough of `data.value`.
    None,
    Int,
    NormalInt,
    NumberId,
    Character,
    Choose,
    WeightedChoose,
    Uuid,
    QqNumber,
    Ipv4,
    /// Ordered concatenation of the sequence in `data.value`.
    Concat,
    /// A named pool obtained through the fragment loader hook.
    Fragment,
    Unregistered(String),
}

/// Every registered tag, in registration order.
pub const REGISTERED_TAGS: [&str; 12] = [
    "none",
    "int",
    "normal_int",
    "number_id",
    "character",
    "choose",
    "weighted_choose",
    "uuid",
    "qq_number",
    "ipv4",
    "concat",
    "fragment",
];

impl PoolKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "none" => Self::None,
            "int" => Self::Int,
            "normal_int" => Self::NormalInt,
            "number_id" => Self::NumberId,
            "character" => Self::Character,
            "choose" => Self::Choose,
            "weighted_choose" => Self::WeightedChoose,
            "uuid" => Self::Uuid,
            "qq_number" => Self::QqNumber,
            "ipv4" => Self::Ipv4,
            "concat" => Self::Concat,
            "fragment" => Self::Fragment,
            other => Self::Unregistered(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Self::None => "none",
            Self::Int => "int",
            Self::NormalInt => "normal_int",
            Self::NumberId => "number_id",
            Self::Character => "character",
            Self::Choose => "choose",
            Self::WeightedChoose => "weighted_choose",
            Self::Uuid => "uuid",
            Self::QqNumber => "qq_number",
            Self::Ipv4 => "ipv4",
            Self::Concat => "concat",
            Self::Fragment => "fragment",
            Self::Unregistered(tag) => tag,
        }
    }

    /// Data fields bound positionally to the primitive.
    /// `None` reads `data.value` directly and binds nothing.
    pub fn parameters(&self) -> &'static [&'static str] {
        match self {
            Self::None | Self::Unregistered(_) => &[],
            Self::Int => &["max", "min"],
            Self::NormalInt => &["mean", "range"],
            Self::NumberId => &["length"],
            Self::Character => &["length", "max", "min"],
            Self::Choose | Self::WeightedChoose | Self::Concat => &["value"],
            Self::Uuid => &["version"],
            Self::QqNumber => &["max"],
            Self::Ipv4 => &["has_class_a", "has_class_b", "has_class_c"],
            Self::Fragment => &["name"],
        }
    }

    pub fn is_registered(&self) -> bool {
        !matches!(self, Self::Unregistered(_))
    }
}

impl From<&str> for PoolKind {
    fn from(tag: &str) -> Self {
        Self::from_tag(tag)
    }
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_registered_tag_round_trips() {
        for tag in REGISTERED_TAGS {
            let kind = PoolKind::from_tag(tag);
            assert!(kind.is_registered(), "{tag} should be registered");
            assert_eq!(kind.tag(), tag);
        }
    }

    #[test]
    fn unknown_tag_is_unregistered() {
        let kind = PoolKind::from_tag("lottery");
        assert_eq!(kind, PoolKind::Unregistered("lottery".into()));
        assert!(kind.parameters().is_empty());
    }

    #[test]
    fn int_binds_max_before_min() {
        assert_eq!(PoolKind::Int.parameters(), &["max", "min"]);
        assert_eq!(PoolKind::Character.parameters(), &["length", "max", "min"]);
    }
}
