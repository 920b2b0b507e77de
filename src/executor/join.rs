//! Machinery shared by the join operators.
//!
//! Both operators join on the ordered intersection of attribute names,
//! extract keys from the tab-separated tuple form, and project the result
//! schema the same way; only their execution strategies differ.

use crate::catalog::TableSchema;

/// Projects the result schema of a natural join.
///
/// All left attributes in order, then every right attribute whose name does
/// not appear on the left. The result table is named `TEMP_TABLE` and
/// marked temporary.
pub fn result_schema(left: &TableSchema, right: &TableSchema) -> TableSchema {
    let mut attrs = left.attrs().to_vec();
    for attr in right.attrs() {
        if !left.has_attr(&attr.name) {
            attrs.push(attr.clone());
        }
    }
    TableSchema::new("TEMP_TABLE", attrs, true)
}

/// Positions of the join attributes in the participating schemas.
pub(crate) struct JoinColumns {
    /// Join attribute names, in left-schema order.
    pub(crate) names: Vec<String>,
    /// Positions in the left schema.
    pub(crate) left: Vec<usize>,
    /// Positions in the right schema.
    pub(crate) right: Vec<usize>,
    /// Positions in the result schema.
    pub(crate) result: Vec<usize>,
}

impl JoinColumns {
    /// Resolves the ordered name intersection of the two input schemas.
    pub(crate) fn resolve(
        left: &TableSchema,
        right: &TableSchema,
        result: &TableSchema,
    ) -> Self {
        let mut names = Vec::new();
        let mut left_positions = Vec::new();
        let mut right_positions = Vec::new();
        for (i, left_attr) in left.attrs().iter().enumerate() {
            for (j, right_attr) in right.attrs().iter().enumerate() {
                if left_attr.name == right_attr.name {
                    names.push(left_attr.name.clone());
                    left_positions.push(i);
                    right_positions.push(j);
                }
            }
        }

        let mut result_positions = Vec::new();
        for (i, attr) in result.attrs().iter().enumerate() {
            if names.iter().any(|name| *name == attr.name) {
                result_positions.push(i);
            }
        }

        Self {
            names,
            left: left_positions,
            right: right_positions,
            result: result_positions,
        }
    }
}

/// Splits a tuple on tabs, dropping empty tokens (records carry a trailing
/// tab). Token 0 is the table name; the value of the attribute at schema
/// position `p` is token `p + 1`.
pub(crate) fn split_tuple(record: &str) -> Vec<&str> {
    record.split('\t').filter(|token| !token.is_empty()).collect()
}

/// Concatenates the values at the given schema positions into a join key.
pub(crate) fn join_key(tokens: &[&str], positions: &[usize]) -> String {
    positions.iter().map(|&p| tokens[p + 1]).collect()
}

/// Builds the joined tuple body: every left value tab-terminated, then the
/// right values with the join attributes skipped, tab-terminated. The
/// result keeps its trailing tab.
pub(crate) fn join_records(
    left_record: &str,
    right_tokens: &[&str],
    right_positions: &[usize],
) -> String {
    let mut joined = String::new();
    for token in &split_tuple(left_record)[1..] {
        joined.push_str(token);
        joined.push('\t');
    }
    for (j, token) in right_tokens.iter().enumerate().skip(1) {
        if right_positions.contains(&(j - 1)) {
            continue;
        }
        joined.push_str(token);
        joined.push('\t');
    }
    joined
}
