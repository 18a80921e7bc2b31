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

//! Expression lowering and type checking.

use super::*;

impl LowerContext<'_> {
    /// Lowers an expression used as a condition. Set-valued paths are read as
    /// "is non-empty".
    pub(super) fn lower_condition(&mut self, expr: &Expr) -> Result<Term, ModelError> {
        let (term, ty) = self.lower(expr)?;
        match (ty, &term) {
            (ValueType::Bool, _) => Ok(term),
            (_, Term::Path(_) | Term::Union(..)) => Ok(Term::Quantified {
                quantifier: Quantifier::Some,
                binds: false,
                over: Box::new(term),
                body: None,
            }),
            _ => Err(self.mismatch(format!(
                "expected a condition, found {} expression '{expr}'",
                self.describe(ty)
            ))),
        }
    }

    /// Recursively lowers an expression into a typed term.
    pub(super) fn lower(&mut self, expr: &Expr) -> Result<(Term, ValueType), ModelError> {
        match expr {
            Expr::Literal(Literal::Int(value)) => {
                Ok((Term::Value(Primitive::Int(*value)), ValueType::Int))
            }
            Expr::Literal(Literal::Str(value)) => {
                Ok((Term::Value(Primitive::Str(value.clone())), ValueType::Str))
            }
            Expr::Literal(Literal::Bool(value)) => Ok((Term::Const(*value), ValueType::Bool)),
            Expr::Path(path) => {
                let (path, ty) = self.lower_path(path)?;
                Ok((Term::Path(path), ty))
            }
            Expr::Not(inner) => {
                let inner = self.lower_condition(inner)?;
                Ok((Term::Not(Box::new(inner)), ValueType::Bool))
            }
            Expr::And(items) => {
                let items = items
                    .iter()
                    .map(|item| self.lower_condition(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((Term::And(items), ValueType::Bool))
            }
            Expr::Or(items) => {
                let items = items
                    .iter()
                    .map(|item| self.lower_condition(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((Term::Or(items), ValueType::Bool))
            }
            Expr::Implies(premise, conclusion) => {
                let premise = self.lower_condition(premise)?;
                let conclusion = self.lower_condition(conclusion)?;
                Ok((
                    Term::Implies(Box::new(premise), Box::new(conclusion)),
                    ValueType::Bool,
                ))
            }
            Expr::Compare { op, left, right } => self.lower_compare(*op, left, right),
            Expr::Quantified {
                quantifier,
                binding,
                over,
                body,
            } => self.lower_quantified(*quantifier, binding.as_deref(), over, body.as_deref()),
            Expr::Count(inner) => {
                let (inner, ty) = self.lower(inner)?;
                if !ty.is_set() {
                    return Err(self.mismatch("cannot count a boolean condition"));
                }
                Ok((Term::Count(Box::new(inner)), ValueType::Int))
            }
            Expr::Min(inner) => {
                let (inner, ty) = self.lower(inner)?;
                if ty != ValueType::Int {
                    return Err(self.mismatch(format!(
                        "min needs integers, found {}",
                        self.describe(ty)
                    )));
                }
                Ok((Term::Min(Box::new(inner)), ValueType::Int))
            }
            Expr::Arith { op, left, right } => {
                let (left_term, left_ty) = self.lower(left)?;
                let (right_term, right_ty) = self.lower(right)?;
                if left_ty != ValueType::Int || right_ty != ValueType::Int {
                    return Err(self.mismatch(format!(
                        "arithmetic needs integers, found {} and {}",
                        self.describe(left_ty),
                        self.describe(right_ty)
                    )));
                }
                Ok((
                    Term::Arith {
                        op: *op,
                        left: Box::new(left_term),
                        right: Box::new(right_term),
                    },
                    ValueType::Int,
                ))
            }
            Expr::Union(left, right) => {
                let (left_term, left_ty) = self.lower(left)?;
                let (right_term, right_ty) = self.lower(right)?;
                let ty = match (left_ty, right_ty) {
                    (ValueType::Nodes(a), ValueType::Nodes(b)) => {
                        let Some(common) = self.common_supertype(a, b) else {
                            return Err(self.mismatch(format!(
                                "union of unrelated features '{}' and '{}'",
                                self.qualified(a),
                                self.qualified(b)
                            )));
                        };
                        ValueType::Nodes(common)
                    }
                    (ValueType::Int, ValueType::Int) => ValueType::Int,
                    (ValueType::Str, ValueType::Str) => ValueType::Str,
                    _ => {
                        return Err(self.mismatch(format!(
                            "cannot unite {} with {}",
                            self.describe(left_ty),
                            self.describe(right_ty)
                        )));
                    }
                };
                Ok((Term::Union(Box::new(left_term), Box::new(right_term)), ty))
            }
        }
    }

    fn lower_compare(
        &mut self,
        op: CompareOp,
        left: &Expr,
        right: &Expr,
    ) -> Result<(Term, ValueType), ModelError> {
        let (left_term, left_ty) = self.lower(left)?;
        let (right_term, right_ty) = self.lower(right)?;
        let term = match (left_ty, right_ty) {
            (ValueType::Nodes(_), ValueType::Nodes(_)) => {
                if op.is_ordering() {
                    return Err(self.mismatch("ordering is not defined on occurrences"));
                }
                Term::CompareSets {
                    equal: op == CompareOp::Eq,
                    left: Box::new(left_term),
                    right: Box::new(right_term),
                }
            }
            (ValueType::Int, ValueType::Int) | (ValueType::Str, ValueType::Str) => {
                if op.is_ordering() && left_ty == ValueType::Str {
                    return Err(self.mismatch("ordering is only defined on integers"));
                }
                Term::CompareValues {
                    op,
                    left: Box::new(left_term),
                    right: Box::new(right_term),
                }
            }
            _ => {
                return Err(self.mismatch(format!(
                    "cannot compare {} with {}",
                    self.describe(left_ty),
                    self.describe(right_ty)
                )));
            }
        };
        Ok((term, ValueType::Bool))
    }

    fn lower_quantified(
        &mut self,
        quantifier: Quantifier,
        binding: Option<&str>,
        over: &Expr,
        body: Option<&Expr>,
    ) -> Result<(Term, ValueType), ModelError> {
        let (over_term, over_ty) = self.lower(over)?;
        if !over_ty.is_set() {
            return Err(self.mismatch("quantifiers range over sets, not conditions"));
        }
        let Some(body) = body else {
            return Ok((
                Term::Quantified {
                    quantifier,
                    binds: false,
                    over: Box::new(over_term),
                    body: None,
                },
                ValueType::Bool,
            ));
        };
        let ValueType::Nodes(member) = over_ty else {
            return Err(self.mismatch("a quantifier body needs a set of occurrences"));
        };
        self.locals.push((binding.map(str::to_string), member));
        let body = self.lower_condition(body);
        self.locals.pop();
        Ok((
            Term::Quantified {
                quantifier,
                binds: true,
                over: Box::new(over_term),
                body: Some(Box::new(body?)),
            },
            ValueType::Bool,
        ))
    }
}
