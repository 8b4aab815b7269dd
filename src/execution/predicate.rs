//! Row predicates: one comparison against a constant or another field.

use std::fmt;

use crate::common::{Error, Result};
use crate::tuple::{Field, Op, Tuple};

/// A comparison applied to one row at a time.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// `row[field] op operand`
    Compare {
        field: usize,
        op: Op,
        operand: Field,
    },
    /// `row[left] op row[right]`
    CompareFields { left: usize, op: Op, right: usize },
}

impl Predicate {
    /// Compare a field against a constant.
    pub fn compare(field: usize, op: Op, operand: Field) -> Self {
        Predicate::Compare { field, op, operand }
    }

    /// Compare two fields of the same row.
    pub fn compare_fields(left: usize, op: Op, right: usize) -> Self {
        Predicate::CompareFields { left, op, right }
    }

    /// Whether the row satisfies this predicate. Referencing an unset
    /// field is an error.
    pub fn eval(&self, tuple: &Tuple) -> Result<bool> {
        match self {
            Predicate::Compare { field, op, operand } => {
                let value = tuple
                    .field(*field)
                    .ok_or(Error::IllegalState("predicate references an unset field"))?;
                Ok(value.compare(*op, operand))
            }
            Predicate::CompareFields { left, op, right } => {
                let lhs = tuple
                    .field(*left)
                    .ok_or(Error::IllegalState("predicate references an unset field"))?;
                let rhs = tuple
                    .field(*right)
                    .ok_or(Error::IllegalState("predicate references an unset field"))?;
                Ok(lhs.compare(*op, rhs))
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Compare { field, op, operand } => {
                write!(f, "f{} {} {}", field, op, operand)
            }
            Predicate::CompareFields { left, op, right } => {
                write!(f, "f{} {} f{}", left, op, right)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuple::{Schema, Type};
    use std::sync::Arc;

    fn row(a: i32, b: i32) -> Tuple {
        let schema = Arc::new(Schema::from_types(&[Type::Int, Type::Int]));
        Tuple::from_fields(schema, vec![Field::Int(a), Field::Int(b)]).unwrap()
    }

    #[test]
    fn test_compare_constant() {
        let p = Predicate::compare(0, Op::GreaterThan, Field::Int(10));
        assert!(p.eval(&row(15, 0)).unwrap());
        assert!(!p.eval(&row(10, 0)).unwrap());
        assert!(!p.eval(&row(5, 0)).unwrap());
    }

    #[test]
    fn test_compare_fields() {
        let p = Predicate::compare_fields(0, Op::LessThan, 1);
        assert!(p.eval(&row(1, 2)).unwrap());
        assert!(!p.eval(&row(2, 1)).unwrap());
        assert!(!p.eval(&row(2, 2)).unwrap());
    }

    #[test]
    fn test_unset_field_errors() {
        let schema = Arc::new(Schema::from_types(&[Type::Int]));
        let empty = Tuple::new(schema);
        let p = Predicate::compare(0, Op::Equals, Field::Int(1));
        assert!(matches!(p.eval(&empty), Err(Error::IllegalState(_))));
    }
}
