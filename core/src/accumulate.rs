//! Folding occurrences into final values.
//!
//! Cumulative array options concatenate every occurrence's elements (and
//! provenance) in encounter order; everything else keeps only the last
//! occurrence. Options that never occur get their default, or the zero value
//! of their node.

use crate::convert::{Occurred, Provenance};
use crate::{Origin, TypeNode, Value};

/// Final value of one option (or of the positional entry).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Folded {
    pub value: Value,
    pub origin: Origin,
    pub provenance: Provenance,
    /// Number of occurrences that contributed to the fold input
    pub occurrences: usize,
}

/// Zero value of a node: `[]` for arrays, `null` for scalars.
pub(crate) fn zero_value(node: &TypeNode) -> Value {
    if node.is_array() {
        Value::Array(Vec::new())
    } else {
        Value::Null
    }
}

/// Shapes a declared default for `node`; scalar defaults of array nodes
/// become one-element arrays.
pub(crate) fn default_for(node: &TypeNode, default: &Value) -> Value {
    if node.is_array() && !default.is_array() {
        Value::Array(vec![default.clone()])
    } else {
        default.clone()
    }
}

/// Folds the occurrences of one option.
pub(crate) fn fold(
    node: &TypeNode,
    default: Option<&Value>,
    mut occurred: Vec<Occurred>,
    origin: Origin,
) -> Folded {
    let occurrences = occurred.len();

    if node.is_array() && node.cumulative && occurrences > 1 {
        let mut elements = Vec::new();
        let mut provenance = Provenance::default();
        for occurrence in occurred {
            match occurrence.value {
                Value::Array(items) => elements.extend(items),
                other => elements.push(other),
            }
            provenance.append(occurrence.provenance);
        }
        return Folded {
            value: Value::Array(elements),
            origin,
            provenance,
            occurrences,
        };
    }

    match occurred.pop() {
        Some(last) => Folded {
            value: last.value,
            origin,
            provenance: last.provenance,
            occurrences,
        },
        None => Folded {
            value: default.map_or_else(|| zero_value(node), |d| default_for(node, d)),
            origin: Origin::Default,
            provenance: Provenance::default(),
            occurrences,
        },
    }
}
