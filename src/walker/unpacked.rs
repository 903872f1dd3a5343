use crate::codec::Value;

/// Shape of the values returned by the format-driven reads.
///
/// A single read yields either a bare [`Value`] (when coercion applies) or a tuple. Group and
/// remainder reads yield one entry per repetition.
#[derive(Debug, Clone, PartialEq)]
pub enum Unpacked {
    /// A bare value
    Value(Value),
    /// The values of one repetition, in format order
    Tuple(Vec<Value>),
    /// One entry per repetition
    Groups(Vec<Unpacked>),
}

impl Unpacked {
    /// Wraps the values of one repetition, collapsing to a bare value when `coerce` is set and
    /// there is exactly one value.
    pub(crate) fn from_values(mut values: Vec<Value>, coerce: bool) -> Unpacked {
        if coerce && values.len() == 1 {
            if let Some(value) = values.pop() {
                return Unpacked::Value(value);
            }
        }
        Unpacked::Tuple(values)
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        match self {
            Unpacked::Value(_) => 1,
            Unpacked::Tuple(values) => values.len(),
            Unpacked::Groups(groups) => groups.len(),
        }
    }

    /// True if there are no top-level entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The bare value, or the only value of a one-element tuple.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Unpacked::Value(value) => Some(value),
            Unpacked::Tuple(mut values) if values.len() == 1 => values.pop(),
            _ => None,
        }
    }

    /// All values in order, with groups flattened.
    pub fn into_values(self) -> Vec<Value> {
        match self {
            Unpacked::Value(value) => vec![value],
            Unpacked::Tuple(values) => values,
            Unpacked::Groups(groups) => groups.into_iter().flat_map(Unpacked::into_values).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coercion() {
        assert_eq!(
            Unpacked::from_values(vec![Value::UInt(1)], true),
            Unpacked::Value(Value::UInt(1))
        );
        assert_eq!(
            Unpacked::from_values(vec![Value::UInt(1)], false),
            Unpacked::Tuple(vec![Value::UInt(1)])
        );
        assert_eq!(
            Unpacked::from_values(vec![Value::UInt(1), Value::UInt(2)], true).len(),
            2
        );
        assert!(Unpacked::from_values(Vec::new(), true).is_empty());
    }

    #[test]
    fn flatten() {
        let groups = Unpacked::Groups(vec![
            Unpacked::Tuple(vec![Value::UInt(1), Value::UInt(2)]),
            Unpacked::Value(Value::UInt(3)),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(
            groups.into_values(),
            vec![Value::UInt(1), Value::UInt(2), Value::UInt(3)]
        );
        assert_eq!(
            Unpacked::Tuple(vec![Value::Int(-1)]).into_value(),
            Some(Value::Int(-1))
        );
        assert_eq!(Unpacked::Groups(Vec::new()).into_value(), None);
    }
}
