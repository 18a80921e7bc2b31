/*
MIT License

Copyright (c) 2026 Raja Lehtihet and Wael El Oraiby

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Constraint expression trees over model paths.
//!
//! Expressions are plain data: the same tree is type-checked and lowered
//! once, then consumed both by direct evaluation against a decoded instance
//! and by clause generation inside the solver.

use std::fmt;

/// Primitive attribute value (integer or string).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Primitive {
    /// Integer value.
    Int(i64),
    /// String value (stored without surrounding quotes).
    Str(String),
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Int(value) => write!(f, "{value}"),
            Primitive::Str(value) => write!(f, "{value:?}"),
        }
    }
}

/// Literal constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// Integer constant.
    Int(i64),
    /// String constant.
    Str(String),
    /// Boolean constant.
    Bool(bool),
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    /// Applies the operator to two ordered operands.
    pub fn holds<T: Ord>(self, left: &T, right: &T) -> bool {
        match self {
            CompareOp::Eq => left == right,
            CompareOp::Ne => left != right,
            CompareOp::Lt => left < right,
            CompareOp::Le => left <= right,
            CompareOp::Gt => left > right,
            CompareOp::Ge => left >= right,
        }
    }

    /// Returns whether the operator is an ordering (only valid on integers).
    pub fn is_ordering(self) -> bool {
        !matches!(self, CompareOp::Eq | CompareOp::Ne)
    }

    fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// Integer arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    /// `+`
    Add,
    /// `-`
    Sub,
}

impl ArithOp {
    /// Applies the operator, returning `None` on overflow.
    pub fn apply(self, left: i64, right: i64) -> Option<i64> {
        match self {
            ArithOp::Add => left.checked_add(right),
            ArithOp::Sub => left.checked_sub(right),
        }
    }
}

/// Quantifiers over occurrence sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    /// At least one member satisfies the body.
    Some,
    /// Every member satisfies the body.
    All,
    /// No member satisfies the body.
    No,
}

impl Quantifier {
    fn keyword(self) -> &'static str {
        match self {
            Quantifier::Some => "some",
            Quantifier::All => "all",
            Quantifier::No => "no",
        }
    }
}

/// Where a path starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathBase {
    /// The occurrence the constraint is attached to.
    This,
    /// A quantifier-bound local, or else a feature name (all of its occurrences).
    Name(String),
}

/// One typed edge traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Into the named child relation.
    Child(String),
    /// Through the reference attribute of the current occurrences.
    Deref,
    /// Up to the containing occurrence.
    Parent,
}

/// Base plus an ordered list of edge traversals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    /// Starting point.
    pub base: PathBase,
    /// Traversals applied left to right.
    pub steps: Vec<Step>,
}

impl Path {
    /// Path starting at the constrained occurrence.
    pub fn this() -> Self {
        Self {
            base: PathBase::This,
            steps: Vec::new(),
        }
    }

    /// Path starting at a local binding or a feature name.
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            base: PathBase::Name(name.into()),
            steps: Vec::new(),
        }
    }

    /// Appends a child-relation step.
    pub fn child(mut self, name: impl Into<String>) -> Self {
        self.steps.push(Step::Child(name.into()));
        self
    }

    /// Appends a reference dereference step.
    pub fn deref(mut self) -> Self {
        self.steps.push(Step::Deref);
        self
    }

    /// Appends a container step.
    pub fn parent(mut self) -> Self {
        self.steps.push(Step::Parent);
        self
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.base {
            PathBase::This => write!(f, "this")?,
            PathBase::Name(name) => write!(f, "{name}")?,
        }
        for step in &self.steps {
            match step {
                Step::Child(name) => write!(f, ".{name}")?,
                Step::Deref => write!(f, ".ref")?,
                Step::Parent => write!(f, ".parent")?,
            }
        }
        Ok(())
    }
}

/// Constraint expression node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Constant.
    Literal(Literal),
    /// Path navigation yielding a set of occurrences or values.
    Path(Path),
    /// Boolean negation.
    Not(Box<Expr>),
    /// Conjunction (empty is `true`).
    And(Vec<Expr>),
    /// Disjunction (empty is `false`).
    Or(Vec<Expr>),
    /// Implication.
    Implies(Box<Expr>, Box<Expr>),
    /// Comparison between two value or occurrence sets.
    Compare {
        /// Operator.
        op: CompareOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Quantification over an occurrence set.
    Quantified {
        /// Quantifier kind.
        quantifier: Quantifier,
        /// Optional local name bound to each member.
        binding: Option<String>,
        /// Occurrence set being quantified.
        over: Box<Expr>,
        /// Body; `None` means `true` (so `some s` tests non-emptiness).
        body: Option<Box<Expr>>,
    },
    /// Set size.
    Count(Box<Expr>),
    /// Least integer of a non-empty integer set.
    Min(Box<Expr>),
    /// Integer arithmetic.
    Arith {
        /// Operator.
        op: ArithOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Union of two occurrence sets.
    Union(Box<Expr>, Box<Expr>),
}

impl From<Path> for Expr {
    fn from(path: Path) -> Self {
        Expr::Path(path)
    }
}

impl Expr {
    /// Integer constant.
    pub fn int(value: i64) -> Self {
        Expr::Literal(Literal::Int(value))
    }

    /// String constant.
    pub fn string(value: impl Into<String>) -> Self {
        Expr::Literal(Literal::Str(value.into()))
    }

    /// Boolean constant.
    pub fn bool(value: bool) -> Self {
        Expr::Literal(Literal::Bool(value))
    }

    /// Generic comparison.
    pub fn compare(op: CompareOp, left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Expr::Compare {
            op,
            left: Box::new(left.into()),
            right: Box::new(right.into()),
        }
    }

    /// `left = right`
    pub fn eq(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Self::compare(CompareOp::Eq, left, right)
    }

    /// `left != right`
    pub fn ne(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Self::compare(CompareOp::Ne, left, right)
    }

    /// `left < right`
    pub fn lt(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Self::compare(CompareOp::Lt, left, right)
    }

    /// `left <= right`
    pub fn le(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Self::compare(CompareOp::Le, left, right)
    }

    /// `left > right`
    pub fn gt(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Self::compare(CompareOp::Gt, left, right)
    }

    /// `left >= right`
    pub fn ge(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Self::compare(CompareOp::Ge, left, right)
    }

    /// Conjunction of all operands.
    pub fn and(operands: impl IntoIterator<Item = Expr>) -> Self {
        Expr::And(operands.into_iter().collect())
    }

    /// Disjunction of all operands.
    pub fn or(operands: impl IntoIterator<Item = Expr>) -> Self {
        Expr::Or(operands.into_iter().collect())
    }

    /// Negation.
    pub fn not(operand: impl Into<Expr>) -> Self {
        Expr::Not(Box::new(operand.into()))
    }

    /// `premise => conclusion`
    pub fn implies(premise: impl Into<Expr>, conclusion: impl Into<Expr>) -> Self {
        Expr::Implies(Box::new(premise.into()), Box::new(conclusion.into()))
    }

    /// `some set` (non-empty).
    pub fn some(set: impl Into<Expr>) -> Self {
        Self::quantified(Quantifier::Some, None, set, None)
    }

    /// `no set` (empty).
    pub fn none(set: impl Into<Expr>) -> Self {
        Self::quantified(Quantifier::No, None, set, None)
    }

    /// `some binding: set | body`
    pub fn some_in(binding: impl Into<String>, set: impl Into<Expr>, body: Expr) -> Self {
        Self::quantified(Quantifier::Some, Some(binding.into()), set, Some(body))
    }

    /// `all binding: set | body`
    pub fn all_in(binding: impl Into<String>, set: impl Into<Expr>, body: Expr) -> Self {
        Self::quantified(Quantifier::All, Some(binding.into()), set, Some(body))
    }

    /// `no binding: set | body`
    pub fn no_in(binding: impl Into<String>, set: impl Into<Expr>, body: Expr) -> Self {
        Self::quantified(Quantifier::No, Some(binding.into()), set, Some(body))
    }

    /// General quantifier constructor.
    pub fn quantified(
        quantifier: Quantifier,
        binding: Option<String>,
        set: impl Into<Expr>,
        body: Option<Expr>,
    ) -> Self {
        Expr::Quantified {
            quantifier,
            binding,
            over: Box::new(set.into()),
            body: body.map(Box::new),
        }
    }

    /// `#set`
    pub fn count(set: impl Into<Expr>) -> Self {
        Expr::Count(Box::new(set.into()))
    }

    /// `min(set)`
    pub fn min(set: impl Into<Expr>) -> Self {
        Expr::Min(Box::new(set.into()))
    }

    /// `left + right`
    pub fn add(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Expr::Arith {
            op: ArithOp::Add,
            left: Box::new(left.into()),
            right: Box::new(right.into()),
        }
    }

    /// `left - right`
    pub fn sub(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Expr::Arith {
            op: ArithOp::Sub,
            left: Box::new(left.into()),
            right: Box::new(right.into()),
        }
    }

    /// `left ++ right`
    pub fn union(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Expr::Union(Box::new(left.into()), Box::new(right.into()))
    }

    /// Visits every literal in the tree.
    pub(crate) fn for_each_literal(&self, visit: &mut impl FnMut(&Literal)) {
        match self {
            Expr::Literal(literal) => visit(literal),
            Expr::Path(_) => {}
            Expr::Not(inner) | Expr::Count(inner) | Expr::Min(inner) => {
                inner.for_each_literal(visit)
            }
            Expr::And(items) | Expr::Or(items) => {
                for item in items {
                    item.for_each_literal(visit);
                }
            }
            Expr::Implies(left, right)
            | Expr::Compare { left, right, .. }
            | Expr::Arith { left, right, .. }
            | Expr::Union(left, right) => {
                left.for_each_literal(visit);
                right.for_each_literal(visit);
            }
            Expr::Quantified { over, body, .. } => {
                over.for_each_literal(visit);
                if let Some(body) = body {
                    body.for_each_literal(visit);
                }
            }
        }
    }

    fn is_atomic(&self) -> bool {
        matches!(
            self,
            Expr::Literal(_) | Expr::Path(_) | Expr::Count(_) | Expr::Min(_)
        )
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_atomic() {
            write!(f, "{self}")
        } else {
            write!(f, "({self})")
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(Literal::Int(value)) => write!(f, "{value}"),
            Expr::Literal(Literal::Str(value)) => write!(f, "{value:?}"),
            Expr::Literal(Literal::Bool(value)) => write!(f, "{value}"),
            Expr::Path(path) => write!(f, "{path}"),
            Expr::Not(inner) => {
                write!(f, "!")?;
                inner.fmt_operand(f)
            }
            Expr::And(items) | Expr::Or(items) => {
                if items.is_empty() {
                    return write!(f, "{}", matches!(self, Expr::And(_)));
                }
                let separator = if matches!(self, Expr::And(_)) {
                    " && "
                } else {
                    " || "
                };
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, "{separator}")?;
                    }
                    item.fmt_operand(f)?;
                }
                Ok(())
            }
            Expr::Implies(left, right) => {
                left.fmt_operand(f)?;
                write!(f, " => ")?;
                right.fmt_operand(f)
            }
            Expr::Compare { op, left, right } => {
                left.fmt_operand(f)?;
                write!(f, " {} ", op.symbol())?;
                right.fmt_operand(f)
            }
            Expr::Quantified {
                quantifier,
                binding,
                over,
                body,
            } => {
                write!(f, "{} ", quantifier.keyword())?;
                if let Some(binding) = binding {
                    write!(f, "{binding}: ")?;
                }
                over.fmt_operand(f)?;
                if let Some(body) = body {
                    write!(f, " | {body}")?;
                }
                Ok(())
            }
            Expr::Count(inner) => {
                write!(f, "#")?;
                inner.fmt_operand(f)
            }
            Expr::Min(inner) => write!(f, "min({inner})"),
            Expr::Arith { op, left, right } => {
                left.fmt_operand(f)?;
                match op {
                    ArithOp::Add => write!(f, " + ")?,
                    ArithOp::Sub => write!(f, " - ")?,
                }
                right.fmt_operand(f)
            }
            Expr::Union(left, right) => {
                left.fmt_operand(f)?;
                write!(f, " ++ ")?;
                right.fmt_operand(f)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_paths_and_comparisons() {
        let expr = Expr::gt(Path::this().child("cipher").deref().child("keySize").deref(), Expr::int(100));
        assert_eq!(expr.to_string(), "this.cipher.ref.keySize.ref > 100");
    }

    #[test]
    fn renders_quantifiers_with_bindings() {
        let expr = Expr::all_in(
            "c",
            Path::name("Cipher"),
            Expr::ne(Path::name("c").child("name").deref(), Expr::string("DES")),
        );
        assert_eq!(expr.to_string(), "all c: Cipher | c.name.ref != \"DES\"");
    }

    #[test]
    fn parenthesizes_nested_connectives() {
        let expr = Expr::and([
            Expr::some(Path::this().child("status").child("secure")),
            Expr::or([Expr::bool(true), Expr::bool(false)]),
        ]);
        assert_eq!(
            expr.to_string(),
            "(some this.status.secure) && (true || false)"
        );
    }

    #[test]
    fn collects_literals() {
        let expr = Expr::and([
            Expr::eq(Path::this().child("a").deref(), Expr::int(3)),
            Expr::eq(Path::this().child("b").deref(), Expr::string("x")),
        ]);
        let mut seen = Vec::new();
        expr.for_each_literal(&mut |literal| seen.push(literal.clone()));
        assert_eq!(seen, vec![Literal::Int(3), Literal::Str("x".into())]);
    }
}
