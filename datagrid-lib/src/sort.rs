//! Client-side row sorting.
//!
//! Sorting always works on a copy of the rows; the caller's slice is never
//! reordered. The sort is stable, so rows that compare equal keep their
//! relative order.

use std::cmp::Ordering;

use serde::Deserialize;
use serde::Serialize;

use crate::model::Row;
use crate::model::Value;

/// Sort direction for a column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order (A-Z, 0-9).
    #[default]
    #[serde(alias = "ascending")]
    Asc,
    /// Descending order (Z-A, 9-0).
    #[serde(alias = "descending")]
    Desc,
}

impl SortDirection {
    /// Returns the opposite direction.
    pub fn reverse(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// The active sort of the grid: one field and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortState {
    /// Field the rows are sorted by.
    pub field_name: String,
    /// Sort direction.
    pub direction: SortDirection,
}

impl SortState {
    /// Creates an ascending sort on a field.
    pub fn asc(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Creates a descending sort on a field.
    pub fn desc(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Returns a sorted copy of `rows`.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::Row;
/// use datagrid_lib::sort::{sort_rows, SortDirection};
///
/// let rows = vec![
///     Row::new().set("n", 3i64),
///     Row::new().set("n", 1i64),
/// ];
/// let sorted = sort_rows(&rows, "n", SortDirection::Asc);
/// assert_eq!(sorted[0].get_int("n").unwrap(), Some(1));
/// ```
pub fn sort_rows(rows: &[Row], field: &str, direction: SortDirection) -> Vec<Row> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = compare_values(a.get(field), b.get(field));
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    sorted
}

/// Orders two cell values for sorting.
///
/// Missing and falsy values are the empty value, which sorts before anything
/// else. Across kinds the order is bool < number < string.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (sort_key(a), sort_key(b)) {
        (SortKey::Empty, SortKey::Empty) => Ordering::Equal,
        (SortKey::Empty, _) => Ordering::Less,
        (_, SortKey::Empty) => Ordering::Greater,
        (SortKey::Bool, SortKey::Bool) => Ordering::Equal,
        (SortKey::Number(x), SortKey::Number(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
        (x, y) => x.rank().cmp(&y.rank()),
    }
}

enum SortKey<'a> {
    Empty,
    // Only `true` survives the falsy check.
    Bool,
    Number(f64),
    Text(&'a str),
}

impl SortKey<'_> {
    fn rank(&self) -> u8 {
        match self {
            SortKey::Empty => 0,
            SortKey::Bool => 1,
            SortKey::Number(_) => 2,
            SortKey::Text(_) => 3,
        }
    }
}

fn sort_key(value: Option<&Value>) -> SortKey<'_> {
    match value {
        None => SortKey::Empty,
        Some(v) if v.is_falsy() => SortKey::Empty,
        Some(Value::Bool(_)) => SortKey::Bool,
        Some(Value::Int(n)) => SortKey::Number(*n as f64),
        Some(Value::Float(f)) => SortKey::Number(*f),
        Some(Value::String(s)) => SortKey::Text(s.as_str()),
        Some(Value::Null) => SortKey::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(rows: &[Row], field: &str) -> Vec<Option<i64>> {
        rows.iter()
            .map(|r| r.get_int(field).ok().flatten())
            .collect()
    }

    #[test]
    fn test_sort_numbers_both_directions() {
        let rows = vec![
            Row::new().set("n", 3i64),
            Row::new().set("n", 1i64),
            Row::new().set("n", 2i64),
        ];

        let asc = sort_rows(&rows, "n", SortDirection::Asc);
        assert_eq!(numbers(&asc, "n"), vec![Some(1), Some(2), Some(3)]);

        let desc = sort_rows(&rows, "n", SortDirection::Desc);
        assert_eq!(numbers(&desc, "n"), vec![Some(3), Some(2), Some(1)]);

        // Input untouched.
        assert_eq!(numbers(&rows, "n"), vec![Some(3), Some(1), Some(2)]);
    }

    #[test]
    fn test_missing_fields_sort_first() {
        let rows = vec![
            Row::new().set("id", 1i64).set("f", "b"),
            Row::new().set("id", 2i64),
            Row::new().set("id", 3i64).set("f", "a"),
            Row::new().set("id", 4i64).set("f", Value::Null),
        ];

        let asc = sort_rows(&rows, "f", SortDirection::Asc);
        assert_eq!(numbers(&asc, "id"), vec![Some(2), Some(4), Some(3), Some(1)]);

        let desc = sort_rows(&rows, "f", SortDirection::Desc);
        assert_eq!(numbers(&desc, "id"), vec![Some(1), Some(3), Some(2), Some(4)]);
    }

    #[test]
    fn test_empty_sorts_before_negative_numbers() {
        let rows = vec![
            Row::new().set("n", -5),
            Row::new().set("n", ""),
            Row::new().set("n", 2),
        ];

        let asc = sort_rows(&rows, "n", SortDirection::Asc);
        assert_eq!(asc[0].get("n"), Some(&Value::from("")));
        assert_eq!(asc[1].get_int("n").unwrap(), Some(-5));

        let desc = sort_rows(&rows, "n", SortDirection::Desc);
        assert_eq!(desc[2].get("n"), Some(&Value::from("")));
    }

    #[test]
    fn test_sort_is_stable() {
        let rows = vec![
            Row::new().set("id", 1i64).set("g", "x"),
            Row::new().set("id", 2i64).set("g", "y"),
            Row::new().set("id", 3i64).set("g", "x"),
        ];
        let sorted = sort_rows(&rows, "g", SortDirection::Asc);
        assert_eq!(numbers(&sorted, "id"), vec![Some(1), Some(3), Some(2)]);
    }

    #[test]
    fn test_mixed_numbers_and_strings() {
        let a = Value::from(2.5);
        let b = Value::from(3i64);
        let s = Value::from("abc");
        assert_eq!(compare_values(Some(&a), Some(&b)), Ordering::Less);
        assert_eq!(compare_values(Some(&b), Some(&s)), Ordering::Less);
        assert_eq!(compare_values(None, Some(&Value::from(0i64))), Ordering::Equal);
    }

    #[test]
    fn test_direction_serde() {
        let d: SortDirection = serde_json::from_str("\"desc\"").unwrap();
        assert_eq!(d, SortDirection::Desc);
        let d: SortDirection = serde_json::from_str("\"ascending\"").unwrap();
        assert_eq!(d, SortDirection::Asc);
        assert_eq!(SortDirection::Asc.reverse(), SortDirection::Desc);
    }
}
