//! Linking child rows to their parents
//!
//! Child rows name their parent by code in an origin field. Linking removes
//! that field, finds the one parent whose `Code` equals it, and appends the
//! child to a list on that parent. A missing, unknown or ambiguous origin
//! aborts the conversion.

use serde_json::map::Entry;
use serde_json::{Map, Value};

use crate::error::{ConvertError, ConvertResult};
use crate::mapper::MappedRow;
use crate::template::{
    EntityKind, ORIGIN_CLASSIFICATION, ORIGIN_PROPERTY, ORIGIN_PROPERTY_OR_CLASSIFICATION_PROPERTY,
};

const CLASSIFICATIONS: &str = "Classifications";
const PROPERTIES: &str = "Properties";
const CLASSIFICATION_PROPERTIES: &str = "ClassificationProperties";

/// Parent objects a child may attach to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentScope {
    /// Top-level `Classifications`
    Classifications,
    /// Top-level `Properties`
    Properties,
    /// Top-level `Properties` together with the `ClassificationProperties`
    /// of every classification. The code must be unique across both.
    PropertiesAndClassificationProperties,
}

impl ParentScope {
    fn describe(self) -> &'static str {
        match self {
            ParentScope::Classifications => "Classification",
            ParentScope::Properties => "Property",
            ParentScope::PropertiesAndClassificationProperties => {
                "Property or ClassificationProperty"
            }
        }
    }
}

/// How one child kind is linked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkSpec {
    pub child: EntityKind,
    /// Field holding the parent's code; removed from the child once linked
    pub origin_field: &'static str,
    pub parents: ParentScope,
    /// List field on the parent the child is appended to
    pub target_field: &'static str,
}

/// Child kinds in linking order. Allowed values come after classification
/// properties, since they may attach to them.
pub const LINK_ORDER: [LinkSpec; 4] = [
    LinkSpec {
        child: EntityKind::ClassificationProperty,
        origin_field: ORIGIN_CLASSIFICATION,
        parents: ParentScope::Classifications,
        target_field: CLASSIFICATION_PROPERTIES,
    },
    LinkSpec {
        child: EntityKind::ClassificationRelation,
        origin_field: ORIGIN_CLASSIFICATION,
        parents: ParentScope::Classifications,
        target_field: "ClassificationRelations",
    },
    LinkSpec {
        child: EntityKind::AllowedValue,
        origin_field: ORIGIN_PROPERTY_OR_CLASSIFICATION_PROPERTY,
        parents: ParentScope::PropertiesAndClassificationProperties,
        target_field: "AllowedValues",
    },
    LinkSpec {
        child: EntityKind::PropertyRelation,
        origin_field: ORIGIN_PROPERTY,
        parents: ParentScope::Properties,
        target_field: "PropertyRelations",
    },
];

/// Where a matching parent sits in the domain tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParentLocation {
    TopLevel(&'static str, usize),
    /// (classification index, classification property index)
    Nested(usize, usize),
}

/// Attach every child to its parent inside `domain`, in row order
pub fn link_children(
    domain: &mut Map<String, Value>,
    spec: &LinkSpec,
    sheet: &str,
    children: Vec<MappedRow>,
) -> ConvertResult<()> {
    let _span = tracing::debug_span!("link", child = %spec.child).entered();
    let count = children.len();

    for MappedRow { number, mut object } in children {
        let code = match object.shift_remove(spec.origin_field).as_ref().and_then(code_of) {
            Some(code) => code,
            None => {
                return Err(ConvertError::MissingOrigin {
                    sheet: sheet.to_string(),
                    row: number,
                    field: spec.origin_field.to_string(),
                })
            }
        };

        let matches = find_parents(domain, spec.parents, &code);
        let location = match matches.as_slice() {
            [only] => *only,
            [] => {
                return Err(ConvertError::UnresolvedParent {
                    sheet: sheet.to_string(),
                    row: number,
                    code,
                    parents: spec.parents.describe().to_string(),
                })
            }
            many => {
                return Err(ConvertError::AmbiguousParent {
                    sheet: sheet.to_string(),
                    row: number,
                    code,
                    parents: spec.parents.describe().to_string(),
                    matches: many.len(),
                })
            }
        };

        let parent = parent_mut(domain, location).ok_or_else(|| ConvertError::UnresolvedParent {
            sheet: sheet.to_string(),
            row: number,
            code: code.clone(),
            parents: spec.parents.describe().to_string(),
        })?;
        append_child(parent, spec.target_field, Value::Object(object));
    }

    tracing::debug!(rows = count, "children linked");
    Ok(())
}

/// Text a code is compared by. Integral numbers render without a fraction,
/// so a numeric origin `12` matches a numeric or text `Code` of `12`.
fn code_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn has_code(object: &Value, code: &str) -> bool {
    object
        .get("Code")
        .and_then(code_of)
        .map_or(false, |c| c == code)
}

fn list<'a>(object: &'a Map<String, Value>, field: &str) -> &'a [Value] {
    object
        .get(field)
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice)
}

fn find_parents(domain: &Map<String, Value>, scope: ParentScope, code: &str) -> Vec<ParentLocation> {
    let top_level = |field: &'static str| {
        list(domain, field)
            .iter()
            .enumerate()
            .filter(|(_, parent)| has_code(parent, code))
            .map(move |(idx, _)| ParentLocation::TopLevel(field, idx))
            .collect::<Vec<_>>()
    };

    match scope {
        ParentScope::Classifications => top_level(CLASSIFICATIONS),
        ParentScope::Properties => top_level(PROPERTIES),
        ParentScope::PropertiesAndClassificationProperties => {
            let mut found = top_level(PROPERTIES);
            for (c_idx, classification) in list(domain, CLASSIFICATIONS).iter().enumerate() {
                let nested = classification
                    .as_object()
                    .map_or(&[][..], |c| list(c, CLASSIFICATION_PROPERTIES));
                found.extend(
                    nested
                        .iter()
                        .enumerate()
                        .filter(|(_, cp)| has_code(cp, code))
                        .map(|(cp_idx, _)| ParentLocation::Nested(c_idx, cp_idx)),
                );
            }
            found
        }
    }
}

fn parent_mut(
    domain: &mut Map<String, Value>,
    location: ParentLocation,
) -> Option<&mut Map<String, Value>> {
    match location {
        ParentLocation::TopLevel(field, idx) => domain
            .get_mut(field)?
            .as_array_mut()?
            .get_mut(idx)?
            .as_object_mut(),
        ParentLocation::Nested(c_idx, cp_idx) => domain
            .get_mut(CLASSIFICATIONS)?
            .as_array_mut()?
            .get_mut(c_idx)?
            .get_mut(CLASSIFICATION_PROPERTIES)?
            .as_array_mut()?
            .get_mut(cp_idx)?
            .as_object_mut(),
    }
}

fn append_child(parent: &mut Map<String, Value>, field: &str, child: Value) {
    match parent.entry(field) {
        Entry::Occupied(mut entry) => match entry.get_mut() {
            Value::Array(items) => items.push(child),
            other => {
                tracing::warn!(field, value = %other, "list field held a value; replaced by children");
                *other = Value::Array(vec![child]);
            }
        },
        Entry::Vacant(entry) => {
            entry.insert(Value::Array(vec![child]));
        }
    }
}
