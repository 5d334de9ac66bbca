//! Typed attribute predicates for variant removal.
//!
//! Attribute keys are not free-form: an [`AttributeSchema`] lists the keys the
//! catalog uses, and only those can be turned into an [`AttributeField`]. A
//! prune request therefore cannot address `quantity`, `productId` or a typo.

use crate::model::{AttributeValue, Variant};
use crate::product_store::ProductError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Variant fields that are structure, not attributes.
pub const RESERVED_FIELDS: [&str; 3] = ["_id", "productId", "quantity"];

/// An attribute key that passed schema validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeField(String);

impl AttributeField {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The set of attribute keys variants may carry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributeSchema {
    fields: BTreeSet<String>,
}

impl AttributeSchema {
    /// Builds a schema, rejecting empty and reserved keys.
    pub fn new<I, S>(fields: I) -> Result<Self, ProductError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = BTreeSet::new();
        for field in fields {
            let field = field.into();
            let trimmed = field.trim();
            if trimmed.is_empty() {
                return Err(ProductError::UnknownAttribute(field));
            }
            if RESERVED_FIELDS.contains(&trimmed) {
                return Err(ProductError::ReservedAttribute(trimmed.to_string()));
            }
            set.insert(trimmed.to_string());
        }
        Ok(Self { fields: set })
    }

    /// Resolves `key` to a field of this schema.
    pub fn field(&self, key: &str) -> Result<AttributeField, ProductError> {
        if RESERVED_FIELDS.contains(&key) {
            return Err(ProductError::ReservedAttribute(key.to_string()));
        }
        if self.fields.contains(key) {
            Ok(AttributeField(key.to_string()))
        } else {
            Err(ProductError::UnknownAttribute(key.to_string()))
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }
}

/// Value half of a prune request: one scalar or a list of them.
///
/// A JSON list always reads as `Many`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PruneValue {
    Many(Vec<AttributeValue>),
    One(AttributeValue),
}

impl From<AttributeValue> for PruneValue {
    fn from(value: AttributeValue) -> Self {
        Self::One(value)
    }
}

impl From<&str> for PruneValue {
    fn from(value: &str) -> Self {
        Self::One(value.into())
    }
}

impl From<i64> for PruneValue {
    fn from(value: i64) -> Self {
        Self::One(value.into())
    }
}

impl From<f64> for PruneValue {
    fn from(value: f64) -> Self {
        Self::One(value.into())
    }
}

impl From<bool> for PruneValue {
    fn from(value: bool) -> Self {
        Self::One(value.into())
    }
}

impl<T: Into<AttributeValue>> From<Vec<T>> for PruneValue {
    fn from(values: Vec<T>) -> Self {
        Self::Many(values.into_iter().map(Into::into).collect())
    }
}

/// How an attribute value is compared.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeMatch {
    /// Equality with one value, see [`AttributeValue::same_value`].
    Equals(AttributeValue),
    /// Membership in a set of values. An empty set matches nothing.
    AnyOf(Vec<AttributeValue>),
}

impl AttributeMatch {
    /// Maps a `(value, multi)` request onto a match mode.
    ///
    /// `multi` requires a list, a single match requires a scalar.
    pub fn from_request(value: PruneValue, multi: bool) -> Result<Self, ProductError> {
        match (value, multi) {
            (PruneValue::Many(values), true) => Ok(Self::AnyOf(values)),
            (PruneValue::One(value), false) => Ok(Self::Equals(value)),
            (PruneValue::One(value), true) => Err(ProductError::InvalidPruneValue(format!(
                "multi match needs a list of values, got {value}"
            ))),
            (PruneValue::Many(values), false) => Err(ProductError::InvalidPruneValue(format!(
                "single match needs one value, got a list of {}",
                values.len()
            ))),
        }
    }

    pub fn is_match(&self, value: &AttributeValue) -> bool {
        match self {
            Self::Equals(expected) => expected.same_value(value),
            Self::AnyOf(candidates) => candidates.iter().any(|c| c.same_value(value)),
        }
    }
}

/// Selects variants by one attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantPredicate {
    pub field: AttributeField,
    pub criterion: AttributeMatch,
}

impl VariantPredicate {
    /// Variants without the attribute never match.
    pub fn matches(&self, variant: &Variant) -> bool {
        variant
            .attributes
            .get(self.field.as_str())
            .is_some_and(|value| self.criterion.is_match(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> AttributeSchema {
        AttributeSchema::new(["color", "size"]).unwrap()
    }

    #[test]
    fn test_schema_rejects_reserved_and_unknown_keys() {
        assert_eq!(
            AttributeSchema::new(["color", "quantity"]),
            Err(ProductError::ReservedAttribute("quantity".into()))
        );
        assert_eq!(
            schema().field("productId"),
            Err(ProductError::ReservedAttribute("productId".into()))
        );
        assert_eq!(
            schema().field("colour"),
            Err(ProductError::UnknownAttribute("colour".into()))
        );
        assert_eq!(schema().field("size").unwrap().as_str(), "size");
    }

    #[test]
    fn test_match_mode_must_fit_value_shape() {
        assert_eq!(
            AttributeMatch::from_request("red".into(), false),
            Ok(AttributeMatch::Equals("red".into()))
        );
        assert_eq!(
            AttributeMatch::from_request(vec!["S", "M"].into(), true),
            Ok(AttributeMatch::AnyOf(vec!["S".into(), "M".into()]))
        );
        assert!(matches!(
            AttributeMatch::from_request("red".into(), true),
            Err(ProductError::InvalidPruneValue(_))
        ));
        assert!(matches!(
            AttributeMatch::from_request(vec!["S"].into(), false),
            Err(ProductError::InvalidPruneValue(_))
        ));
    }

    #[test]
    fn test_predicate_ignores_variants_without_attribute() {
        let predicate = VariantPredicate {
            field: schema().field("size").unwrap(),
            criterion: AttributeMatch::AnyOf(vec!["S".into(), "M".into()]),
        };

        assert!(predicate.matches(&Variant::new("v1", 1).attribute("size", "M")));
        assert!(!predicate.matches(&Variant::new("v2", 1).attribute("size", "L")));
        assert!(!predicate.matches(&Variant::new("v3", 1).attribute("color", "S")));
    }

    #[test]
    fn test_numeric_values_match_across_representations() {
        let predicate = VariantPredicate {
            field: schema().field("size").unwrap(),
            criterion: AttributeMatch::Equals(AttributeValue::Integer(40)),
        };

        assert!(predicate.matches(&Variant::new("v1", 1).attribute("size", 40.0f64)));
        assert!(predicate.matches(&Variant::new("v2", 1).attribute("size", 40i64)));
        assert!(!predicate.matches(&Variant::new("v3", 1).attribute("size", 41i64)));
        assert!(!predicate.matches(&Variant::new("v4", 1).attribute("size", "40")));

        let any = AttributeMatch::AnyOf(vec![AttributeValue::Float(38.0), "XL".into()]);
        assert!(any.is_match(&AttributeValue::Integer(38)));
        assert!(!any.is_match(&AttributeValue::Null));
    }

    #[test]
    fn test_prune_value_wire_format() {
        let one: PruneValue = serde_json::from_str(r#""red""#).unwrap();
        let many: PruneValue = serde_json::from_str(r#"["S", 40]"#).unwrap();
        assert_eq!(one, PruneValue::One("red".into()));
        assert_eq!(
            many,
            PruneValue::Many(vec!["S".into(), AttributeValue::Integer(40)])
        );
        let null: PruneValue = serde_json::from_str("null").unwrap();
        assert_eq!(null, PruneValue::One(AttributeValue::Null));
        let empty: PruneValue = serde_json::from_str("[]").unwrap();
        assert_eq!(empty, PruneValue::Many(vec![]));
    }
}
