//! The operator registry: a fixed ordered table whose position defines
//! precedence (earlier entries bind tighter). The table is never mutated at
//! runtime.

/// Identifier of a registered operator.
///
/// The set is closed: raw strings are resolved at the input and wire
/// boundaries, so the evaluator never sees an id it does not know. Variant
/// order matches [`REGISTRY`] order and is therefore the precedence order;
/// a test pins the two together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpId {
    Multiply,
    Divide,
    Add,
    Subtract,
    Negate,
}

impl OpId {
    /// Wire and display id of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            OpId::Multiply => "multiply",
            OpId::Divide => "divide",
            OpId::Add => "add",
            OpId::Subtract => "subtract",
            OpId::Negate => "negate",
        }
    }

    /// Resolves an id string against the registry.
    pub fn from_id(id: &str) -> Option<OpId> {
        REGISTRY.iter().map(|op| op.id).find(|op| op.as_str() == id)
    }

    pub fn operator(self) -> &'static Operator {
        &REGISTRY[self as usize]
    }

    pub fn symbol(self) -> &'static str {
        self.operator().symbol
    }

    /// Registry index; lower binds tighter.
    pub fn precedence(self) -> usize {
        self as usize
    }

    /// True iff `self` is applied before `other` when both are pending.
    /// `<=` makes equal-precedence operators resolve left-to-right as they
    /// are popped off the stack.
    pub fn has_precedence(self, other: OpId) -> bool {
        self.precedence() <= other.precedence()
    }
}

/// How an operator consumes the value stack. The variant fixes the arity.
#[derive(Clone, Copy)]
pub enum OpEval {
    Unary(fn(f64) -> f64),
    Binary(fn(f64, f64) -> f64),
}

pub struct Operator {
    pub id: OpId,
    pub symbol: &'static str,
    pub eval: OpEval,
}

impl Operator {
    pub fn operand_count(&self) -> usize {
        match self.eval {
            OpEval::Unary(_) => 1,
            OpEval::Binary(_) => 2,
        }
    }
}

/// Registry order is precedence order: multiply/divide, then add/subtract,
/// then unary negate loosest.
pub static REGISTRY: [Operator; 5] = [
    Operator {
        id: OpId::Multiply,
        symbol: " x ",
        eval: OpEval::Binary(|a, b| a * b),
    },
    Operator {
        id: OpId::Divide,
        symbol: " ÷ ",
        eval: OpEval::Binary(|a, b| a / b),
    },
    Operator {
        id: OpId::Add,
        symbol: " + ",
        eval: OpEval::Binary(|a, b| a + b),
    },
    Operator {
        id: OpId::Subtract,
        symbol: " - ",
        eval: OpEval::Binary(|a, b| a - b),
    },
    Operator {
        id: OpId::Negate,
        symbol: " -",
        eval: OpEval::Unary(|a| -a),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_order_matches_id_discriminants() {
        for (index, op) in REGISTRY.iter().enumerate() {
            assert_eq!(op.id as usize, index, "registry row {index} out of order");
        }
    }

    #[test]
    fn ids_round_trip_through_strings() {
        for op in &REGISTRY {
            assert_eq!(OpId::from_id(op.id.as_str()), Some(op.id));
        }
        assert_eq!(OpId::from_id("modulo"), None);
        assert_eq!(OpId::from_id(""), None);
    }

    #[test]
    fn precedence_respects_registry_order() {
        assert!(OpId::Multiply.has_precedence(OpId::Add));
        assert!(!OpId::Add.has_precedence(OpId::Multiply));
        assert!(OpId::Subtract.has_precedence(OpId::Negate));
        assert!(!OpId::Negate.has_precedence(OpId::Subtract));
        // Ties resolve in favor of the operator already on the stack.
        assert!(OpId::Add.has_precedence(OpId::Add));
        assert!(OpId::Multiply.has_precedence(OpId::Divide));
        assert!(OpId::Divide.has_precedence(OpId::Multiply));
    }

    #[test]
    fn arity_follows_the_eval_variant() {
        assert_eq!(OpId::Multiply.operator().operand_count(), 2);
        assert_eq!(OpId::Negate.operator().operand_count(), 1);
    }

    #[test]
    fn operator_semantics() {
        let apply = |id: OpId, a: f64, b: f64| match id.operator().eval {
            OpEval::Binary(f) => f(a, b),
            OpEval::Unary(f) => f(a),
        };
        assert_eq!(apply(OpId::Multiply, 3.0, 4.0), 12.0);
        assert_eq!(apply(OpId::Divide, 1.0, 4.0), 0.25);
        assert_eq!(apply(OpId::Add, 3.0, 4.0), 7.0);
        assert_eq!(apply(OpId::Subtract, 3.0, 4.0), -1.0);
        assert_eq!(apply(OpId::Negate, 5.0, 0.0), -5.0);
    }
}
