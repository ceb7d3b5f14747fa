// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element Records - attribute maps as handed out by a model store
//!
//! A record maps attribute names to literals, `{value}`-wrapped literals,
//! entity references or lists of those. Resolution never edits a record in
//! place: merged fields are written into a clone.

use indexmap::IndexMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// STEP instance id (`#123`)
pub type ExpressId = u32;

/// Identifier of a loaded model inside a store
pub type ModelId = u32;

/// Attribute holding the element's own express id
pub const EXPRESS_ID: &str = "expressID";

/// Attribute names the resolver and table builders look at
pub mod attr {
    pub const NAME: &str = "Name";
    pub const NOMINAL_VALUE: &str = "NominalValue";
    pub const HAS_PROPERTIES: &str = "HasProperties";
    pub const QUANTITIES: &str = "Quantities";
    pub const HAS_QUANTITIES: &str = "HasQuantities";
    pub const MATERIALS: &str = "Materials";

    /// Leaf quantity fields, in the order a value is picked
    pub const QUANTITY_VALUES: [&str; 4] = ["LengthValue", "AreaValue", "VolumeValue", "WeightValue"];

    /// Bookkeeping fields a full property fetch attaches to an element
    pub const PSETS: &str = "psets";
    pub const MATS: &str = "mats";
    pub const TYPE: &str = "type";
}

/// Literal attribute value
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Scalar {
    Text(String),
    Integer(i64),
    Real(f64),
    Bool(bool),
}

impl Scalar {
    /// Get as string
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get as integer (reals are truncated)
    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Scalar::Integer(i) => Some(*i),
            Scalar::Real(f) => Some(*f as i64),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Integer(i) => write!(f, "{}", i),
            Scalar::Real(r) => write!(f, "{}", r),
            Scalar::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Integer(i)
    }
}

impl From<f64> for Scalar {
    fn from(f: f64) -> Self {
        Scalar::Real(f)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

/// Attribute value of an element record
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AttributeValue {
    /// Bare literal: `expressID: 12`
    Scalar(Scalar),
    /// Wrapped literal: `Name: {value: 'Wall'}`
    Wrapped(Scalar),
    /// Entity reference: `#34`
    Ref(ExpressId),
    /// List of values, usually references
    List(Vec<AttributeValue>),
    /// References already resolved into records
    Records(Vec<ElementRecord>),
    /// Null/undefined
    Null,
}

impl AttributeValue {
    /// Wrapped literal shorthand
    pub fn wrapped(value: impl Into<Scalar>) -> Self {
        AttributeValue::Wrapped(value.into())
    }

    /// List of references shorthand
    pub fn refs(ids: impl IntoIterator<Item = ExpressId>) -> Self {
        AttributeValue::List(ids.into_iter().map(AttributeValue::Ref).collect())
    }

    /// Get as entity reference
    #[inline]
    pub fn as_ref_id(&self) -> Option<ExpressId> {
        match self {
            AttributeValue::Ref(id) => Some(*id),
            _ => None,
        }
    }

    /// Get the `{value}` payload
    #[inline]
    pub fn as_wrapped(&self) -> Option<&Scalar> {
        match self {
            AttributeValue::Wrapped(s) => Some(s),
            _ => None,
        }
    }

    /// Get as list
    #[inline]
    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get resolved records
    #[inline]
    pub fn as_records(&self) -> Option<&[ElementRecord]> {
        match self {
            AttributeValue::Records(records) => Some(records),
            _ => None,
        }
    }

    /// Check if null
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

impl From<Scalar> for AttributeValue {
    fn from(s: Scalar) -> Self {
        AttributeValue::Scalar(s)
    }
}

/// Attribute record of one model element
///
/// Attribute order is the order the store produced them in, which is also
/// the order rows are emitted in.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElementRecord {
    attributes: IndexMap<String, AttributeValue>,
}

impl ElementRecord {
    /// Create a record carrying only its express id
    pub fn new(express_id: ExpressId) -> Self {
        let mut attributes = IndexMap::new();
        attributes.insert(
            EXPRESS_ID.to_string(),
            AttributeValue::Scalar(Scalar::Integer(express_id as i64)),
        );
        Self { attributes }
    }

    /// Builder-style attribute insertion
    pub fn with(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Express id, if the record carries a usable one
    pub fn express_id(&self) -> Option<ExpressId> {
        match self.attributes.get(EXPRESS_ID)? {
            AttributeValue::Scalar(s) | AttributeValue::Wrapped(s) => {
                s.as_int().and_then(|i| ExpressId::try_from(i).ok())
            }
            _ => None,
        }
    }

    /// Get attribute by name
    #[inline]
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Get the `{value}` payload of an attribute
    #[inline]
    pub fn get_wrapped(&self, name: &str) -> Option<&Scalar> {
        self.get(name).and_then(|v| v.as_wrapped())
    }

    /// Get resolved records of an attribute
    #[inline]
    pub fn get_records(&self, name: &str) -> Option<&[ElementRecord]> {
        self.get(name).and_then(|v| v.as_records())
    }

    /// `Name.value`
    #[inline]
    pub fn name(&self) -> Option<&Scalar> {
        self.get_wrapped(attr::NAME)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Insert or replace an attribute, keeping the original position on replace
    pub fn insert(&mut self, name: &str, value: impl Into<AttributeValue>) -> Option<AttributeValue> {
        self.attributes.insert(name.to_string(), value.into())
    }

    /// Remove an attribute, keeping the order of the rest
    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        self.attributes.shift_remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl FromIterator<(String, AttributeValue)> for ElementRecord {
    fn from_iter<I: IntoIterator<Item = (String, AttributeValue)>>(iter: I) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
        }
    }
}
