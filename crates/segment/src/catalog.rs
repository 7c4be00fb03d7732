//! Static catalog of the schema fields a segment can be built from.
//!
//! Every [`SchemaField`] has exactly one [`FieldDescriptor`] in [`CATALOG`].
//! The table is ordered like the enum, so `CATALOG[field as usize]` is the
//! descriptor of `field`.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

use crate::error::{Error, Result};

/// A selectable schema attribute. The snake_case name is the wire key.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumCount,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SchemaField {
    FirstName,
    LastName,
    Gender,
    Age,
    AccountName,
    City,
    State,
}

/// Whether a field describes the user or the group the user belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TraitType {
    User,
    Group,
}

impl TraitType {
    /// Legend text used by the panel.
    pub fn label(self) -> &'static str {
        match self {
            TraitType::User => "User Traits",
            TraitType::Group => "Group Traits",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub id: SchemaField,
    pub label: &'static str,
    pub trait_type: TraitType,
    /// Single-cell stand-in for an icon when rendered in a terminal.
    pub glyph: char,
}

const fn entry(
    id: SchemaField,
    label: &'static str,
    trait_type: TraitType,
    glyph: char,
) -> FieldDescriptor {
    FieldDescriptor {
        id,
        label,
        trait_type,
        glyph,
    }
}

pub static CATALOG: [FieldDescriptor; SchemaField::COUNT] = [
    entry(SchemaField::FirstName, "First Name", TraitType::User, '☺'),
    entry(SchemaField::LastName, "Last Name", TraitType::User, '✓'),
    entry(SchemaField::Gender, "Gender", TraitType::User, '⚇'),
    entry(SchemaField::Age, "Age", TraitType::User, '▦'),
    entry(SchemaField::AccountName, "Account Name", TraitType::Group, '✓'),
    entry(SchemaField::City, "City", TraitType::Group, '⌖'),
    entry(SchemaField::State, "State", TraitType::Group, '⚑'),
];

/// All descriptors, in catalog order.
pub fn all_fields() -> &'static [FieldDescriptor] {
    &CATALOG
}

pub fn describe(field: SchemaField) -> &'static FieldDescriptor {
    &CATALOG[field as usize]
}

/// Resolve an untyped key such as `"first_name"`.
pub fn lookup(key: &str) -> Result<&'static FieldDescriptor> {
    key.trim()
        .parse::<SchemaField>()
        .map(describe)
        .map_err(|_| Error::UnknownField(key.to_string()))
}

pub fn trait_type_of(field: SchemaField) -> TraitType {
    describe(field).trait_type
}

impl SchemaField {
    /// Wire key, e.g. `"account_name"`.
    pub fn key(self) -> &'static str {
        self.into()
    }

    pub fn label(self) -> &'static str {
        describe(self).label
    }

    pub fn glyph(self) -> char {
        describe(self).glyph
    }

    pub fn trait_type(self) -> TraitType {
        describe(self).trait_type
    }
}
