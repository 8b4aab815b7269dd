//! Row schemas: an ordered list of typed, optionally named columns.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::tuple::field::Type;

/// One column of a schema.
#[derive(Debug, Clone)]
pub struct Column {
    pub ty: Type,
    pub name: Option<String>,
}

impl Column {
    /// A named column.
    pub fn named(ty: Type, name: impl Into<String>) -> Self {
        Column {
            ty,
            name: Some(name.into()),
        }
    }

    /// An anonymous column.
    pub fn unnamed(ty: Type) -> Self {
        Column { ty, name: None }
    }
}

/// The shape of a row: column types, optional names, and total byte size.
///
/// Two schemas are equal iff they have the same column count and the same
/// type at every position — names are ignored, so a scan alias does not
/// change which tables a row can be written to.
///
/// A schema is immutable after construction except for [`Schema::rename`],
/// used when schemas are composed (scan aliasing, merges).
#[derive(Debug, Clone)]
pub struct Schema {
    columns: Vec<Column>,
    byte_size: usize,
}

impl Schema {
    /// Create a schema from its columns.
    ///
    /// # Panics
    /// Panics if `columns` is empty; a row has at least one field.
    pub fn new(columns: Vec<Column>) -> Self {
        assert!(!columns.is_empty(), "schema must have at least one column");
        let byte_size = columns.iter().map(|c| c.ty.width()).sum();
        Schema { columns, byte_size }
    }

    /// Create a schema of anonymous columns from types alone.
    pub fn from_types(types: &[Type]) -> Self {
        Self::new(types.iter().map(|&ty| Column::unnamed(ty)).collect())
    }

    /// Number of columns.
    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always false; retained for clippy's sake.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Sum of the encoded widths of all columns, in bytes.
    #[inline]
    pub fn byte_size(&self) -> usize {
        self.byte_size
    }

    /// The columns in order.
    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Type of column `i`.
    ///
    /// # Panics
    /// Panics if `i` is out of bounds.
    #[inline]
    pub fn field_type(&self, i: usize) -> &Type {
        &self.columns[i].ty
    }

    /// Name of column `i`, if it has one.
    #[inline]
    pub fn field_name(&self, i: usize) -> Option<&str> {
        self.columns[i].name.as_deref()
    }

    /// Index of the first column with the given name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.as_deref() == Some(name))
    }

    /// Rename column `i` in place. The one permitted mutation, used when
    /// schemas are composed.
    pub fn rename(&mut self, i: usize, name: impl Into<String>) {
        self.columns[i].name = Some(name.into());
    }

    /// A copy of this schema with every column name prefixed `alias.name`.
    /// Anonymous columns become `alias.`, preserving the alias for joins.
    pub fn prefixed(&self, alias: &str) -> Schema {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                ty: c.ty,
                name: Some(format!("{}.{}", alias, c.name.as_deref().unwrap_or(""))),
            })
            .collect();
        Schema {
            columns,
            byte_size: self.byte_size,
        }
    }

    /// Concatenate two schemas, `self`'s columns first.
    pub fn merge(&self, other: &Schema) -> Schema {
        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().cloned());
        Schema::new(columns)
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.columns.len() == other.columns.len()
            && self
                .columns
                .iter()
                .zip(&other.columns)
                .all(|(a, b)| a.ty == b.ty)
    }
}

impl Eq for Schema {}

impl Hash for Schema {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Consistent with PartialEq: names are excluded.
        for c in &self.columns {
            c.ty.hash(state);
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", c.name.as_deref().unwrap_or("_"), c.ty)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_size() {
        let schema = Schema::new(vec![
            Column::named(Type::Int, "id"),
            Column::named(Type::Text(16), "name"),
        ]);
        assert_eq!(schema.byte_size(), 20);
        assert_eq!(schema.len(), 2);
    }

    #[test]
    #[should_panic(expected = "at least one column")]
    fn test_empty_schema_panics() {
        Schema::new(vec![]);
    }

    #[test]
    fn test_equality_ignores_names() {
        let a = Schema::new(vec![Column::named(Type::Int, "x")]);
        let b = Schema::from_types(&[Type::Int]);
        assert_eq!(a, b);

        let c = Schema::from_types(&[Type::Text(8)]);
        assert_ne!(a, c);
        // Same base type, different declared length.
        let d = Schema::from_types(&[Type::Text(9)]);
        assert_ne!(c, d);
    }

    #[test]
    fn test_field_index() {
        let schema = Schema::new(vec![
            Column::named(Type::Int, "id"),
            Column::named(Type::Int, "age"),
        ]);
        assert_eq!(schema.field_index("age"), Some(1));
        assert_eq!(schema.field_index("missing"), None);
    }

    #[test]
    fn test_prefixed() {
        let schema = Schema::new(vec![Column::named(Type::Int, "id")]);
        let aliased = schema.prefixed("t");
        assert_eq!(aliased.field_name(0), Some("t.id"));
        // Aliasing never changes schema identity.
        assert_eq!(schema, aliased);
    }

    #[test]
    fn test_merge() {
        let a = Schema::from_types(&[Type::Int]);
        let b = Schema::from_types(&[Type::Text(4), Type::Int]);
        let merged = a.merge(&b);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.byte_size(), 12);
        assert_eq!(*merged.field_type(1), Type::Text(4));
    }
}
