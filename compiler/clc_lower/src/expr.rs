//! Expression lowerer (§4.3): statements, expressions → SSA values.

use crate::ctx::{guarded, Ctx};
use crate::ir_type::ir_type;
use clc_diagnostic::Diagnostic;
use clc_ir::ast::{AssignOp, BinOp, Expr, ExprKind};
use clc_ir::ir::{IrBinOp, IrExpr, IrStmt, IrValue};
use clc_ir::{ClassId, Pos, RType, StackReference};

/// The result of lowering an expression.
pub enum Outcome {
    /// An ordinary value: statements to splice into the current block
    /// ahead of the value's use, the value itself, and its static type.
    Calc(Vec<IrStmt>, IrValue, RType),
    /// The expression denotes a class, not a value. Legal only as the
    /// callee of a call expression (construction).
    ClassOutcome(ClassId),
}

/// Unwrap an `Outcome` known to need a value at `pos`, turning a stray
/// `ClassOutcome` into `MisuseOfClass` rather than letting it silently
/// propagate into IR-construction code that has nowhere to put a class.
fn require_value(outcome: Outcome, pos: Pos) -> Result<(Vec<IrStmt>, IrValue, RType), Diagnostic> {
    match outcome {
        Outcome::Calc(stmts, value, ty) => Ok((stmts, value, ty)),
        Outcome::ClassOutcome(_) => Err(Diagnostic::MisuseOfClass {
            name: "<class expression>".to_string(),
            pos,
        }),
    }
}

impl Ctx<'_> {
    /// Lower `expr`, optionally checking the result against `expect`.
    ///
    /// A `Function(Void, params)` expectation accepts any `Function(_,
    /// params)` of matching arity/parameter types — this lets a lambda
    /// whose return type isn't known yet be assigned to a function-typed
    /// slot (§4.3).
    pub fn lower_expr(&mut self, expr: &Expr, expect: Option<&RType>) -> Result<Outcome, Diagnostic> {
        let outcome = guarded(|| self.lower_expr_kind(expr, expect))?;
        if let (Outcome::Calc(_, _, ty), Some(expected)) = (&outcome, expect) {
            if !ty.matches_expectation(expected) {
                return Err(Diagnostic::TypeMismatch {
                    expected: expected.to_string(),
                    found: ty.to_string(),
                    pos: expr.pos,
                });
            }
        }
        Ok(outcome)
    }

    fn lower_expr_kind(&mut self, expr: &Expr, expect: Option<&RType>) -> Result<Outcome, Diagnostic> {
        match &expr.kind {
            ExprKind::Int(v) => Ok(lower_int_literal(*v, expect)),
            ExprKind::Id(const_id) => self.lower_id(const_id.head(), expr.pos),
            ExprKind::Assign { op, lvalue, rhs } => self.lower_assign(*op, lvalue, rhs, expr.pos),
            ExprKind::Bin { op, lhs, rhs } => self.lower_bin(*op, lhs, rhs),
            ExprKind::Call { callee, args } => self.lower_call(callee, args, expr.pos),
            ExprKind::Lambda { args, body } => crate::lambda::lower_lambda(self, args, body, expect, expr.pos),
            ExprKind::Index { .. } => Err(Diagnostic::Unsupported {
                construct: "index expression".to_string(),
                pos: expr.pos,
            }),
        }
    }

    fn lower_id(&mut self, name: &str, pos: Pos) -> Result<Outcome, Diagnostic> {
        let (internal, reference) = self.stack.lookup_or_fail(name, pos)?.clone();
        match reference {
            StackReference::Variable(tp, value) => Ok(Outcome::Calc(vec![], value, tp)),
            StackReference::Pointer(tp) => {
                let lhs = self.uniq.fresh_ssa();
                let ty = ir_type(&tp, self.classes);
                let stmt = IrStmt::Assignment {
                    lhs,
                    rhs: IrExpr::Load {
                        addr: IrValue::Global(internal),
                        ty,
                    },
                };
                Ok(Outcome::Calc(vec![stmt], IrValue::Var(lhs), tp))
            }
            StackReference::Function { ret, params } => {
                Ok(Outcome::Calc(vec![], IrValue::Global(internal), RType::function(*ret, params)))
            }
            StackReference::Class(id) => Ok(Outcome::ClassOutcome(id)),
        }
    }

    fn lower_assign(&mut self, op: AssignOp, lvalue: &Expr, rhs: &Expr, pos: Pos) -> Result<Outcome, Diagnostic> {
        let AssignOp::Eq = op;
        let ExprKind::Id(const_id) = &lvalue.kind else {
            return Err(Diagnostic::Unsupported {
                construct: "assignment to a non-identifier lvalue".to_string(),
                pos: lvalue.pos,
            });
        };
        let name = const_id.head().to_string();
        let (internal, reference) = self.stack.lookup_or_fail(&name, pos)?.clone();

        match reference {
            StackReference::Variable(tp, _) => {
                let rhs_outcome = self.lower_expr(rhs, Some(&tp))?;
                let (prelude, rhs_value, rhs_ty) = require_value(rhs_outcome, rhs.pos)?;
                self.stack
                    .put(name, StackReference::Variable(rhs_ty.clone(), rhs_value.clone()), &mut self.uniq);
                Ok(Outcome::Calc(prelude, rhs_value, rhs_ty))
            }
            StackReference::Pointer(tp) => {
                let rhs_outcome = self.lower_expr(rhs, Some(&tp))?;
                let (mut prelude, rhs_value, rhs_ty) = require_value(rhs_outcome, rhs.pos)?;
                prelude.push(IrStmt::Store {
                    value: rhs_value.clone(),
                    addr: IrValue::Global(internal),
                });
                Ok(Outcome::Calc(prelude, rhs_value, rhs_ty))
            }
            StackReference::Function { .. } | StackReference::Class(_) => {
                Err(Diagnostic::MisuseOfClass { name, pos })
            }
        }
    }

    fn lower_bin(&mut self, op: BinOp, lhs: &Expr, rhs: &Expr) -> Result<Outcome, Diagnostic> {
        let lhs_outcome = self.lower_expr(lhs, None)?;
        let (mut prelude, lhs_value, lhs_ty) = require_value(lhs_outcome, lhs.pos)?;
        let rhs_outcome = self.lower_expr(rhs, Some(&lhs_ty))?;
        let (rhs_prelude, rhs_value, _) = require_value(rhs_outcome, rhs.pos)?;
        prelude.extend(rhs_prelude);

        let (ir_op, result_ty) = match (op, &lhs_ty) {
            (BinOp::Less, RType::Float) => (IrBinOp::FcmpOltFloat, RType::Bool),
            (BinOp::Less, _) => (IrBinOp::IcmpSltInt, RType::Bool),
            (BinOp::Plus, RType::Float) => (IrBinOp::AddFloat, RType::Float),
            (BinOp::Plus, _) => (IrBinOp::AddInt, lhs_ty.clone()),
        };

        let lhs_ssa = self.uniq.fresh_ssa();
        prelude.push(IrStmt::Assignment {
            lhs: lhs_ssa,
            rhs: IrExpr::Bin {
                op: ir_op,
                lhs: lhs_value,
                rhs: rhs_value,
            },
        });
        Ok(Outcome::Calc(prelude, IrValue::Var(lhs_ssa), result_ty))
    }

    fn lower_call(&mut self, callee: &Expr, args: &[Expr], pos: Pos) -> Result<Outcome, Diagnostic> {
        match self.lower_expr(callee, None)? {
            Outcome::Calc(mut prelude, callee_value, RType::Function { ret, params }) => {
                if args.len() != params.len() {
                    return Err(Diagnostic::WrongNumberOfArguments {
                        expected: params.len(),
                        found: args.len(),
                        pos,
                    });
                }
                let mut arg_values = Vec::with_capacity(args.len());
                for (arg, param_ty) in args.iter().zip(params.iter()) {
                    let arg_outcome = self.lower_expr(arg, Some(param_ty))?;
                    let (arg_prelude, arg_value, _) = require_value(arg_outcome, arg.pos)?;
                    prelude.extend(arg_prelude);
                    arg_values.push(arg_value);
                }
                let ret_ty = ir_type(&ret, self.classes);
                let lhs = self.uniq.fresh_ssa();
                prelude.push(IrStmt::Assignment {
                    lhs,
                    rhs: IrExpr::Call {
                        callee: callee_value,
                        args: arg_values,
                        ret: ret_ty,
                    },
                });
                Ok(Outcome::Calc(prelude, IrValue::Var(lhs), *ret))
            }
            Outcome::Calc(_, _, other) => Err(Diagnostic::NotAFunction {
                name: other.to_string(),
                pos,
            }),
            Outcome::ClassOutcome(class_id) => {
                let entry = self
                    .classes
                    .get(class_id)
                    .expect("resolved class id must be present in the class table");
                let alias = entry.internal_name.clone();
                let lhs = self.uniq.fresh_ssa();
                let stmt = IrStmt::Assignment {
                    lhs,
                    rhs: IrExpr::Malloc {
                        class_alias: alias,
                        count: 1,
                    },
                };
                Ok(Outcome::Calc(vec![stmt], IrValue::Var(lhs), RType::ClassRef(class_id)))
            }
        }
    }
}

fn lower_int_literal(v: i64, expect: Option<&RType>) -> Outcome {
    match expect {
        Some(RType::Float) => Outcome::Calc(vec![], IrValue::const_float(v as f64), RType::Float),
        _ => Outcome::Calc(vec![], IrValue::ConstInt(v as i32), RType::Int),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clc_ir::ClassTable;

    #[test]
    fn int_literal_defaults_to_int() {
        let classes = ClassTable::new();
        let mut c = Ctx::new(&classes, "test");
        let expr = Expr::new(ExprKind::Int(7), Pos::SYNTHETIC);
        let Outcome::Calc(stmts, value, ty) = c.lower_expr(&expr, None).unwrap() else {
            panic!("expected Calc");
        };
        assert!(stmts.is_empty());
        assert_eq!(value, IrValue::ConstInt(7));
        assert_eq!(ty, RType::Int);
    }

    #[test]
    fn int_literal_coerces_to_float_under_expectation() {
        let classes = ClassTable::new();
        let mut c = Ctx::new(&classes, "test");
        let expr = Expr::new(ExprKind::Int(7), Pos::SYNTHETIC);
        let Outcome::Calc(_, value, ty) = c.lower_expr(&expr, Some(&RType::Float)).unwrap() else {
            panic!("expected Calc");
        };
        assert_eq!(value, IrValue::const_float(7.0));
        assert_eq!(ty, RType::Float);
    }

    #[test]
    fn int_literal_rejects_bool_expectation() {
        let classes = ClassTable::new();
        let mut c = Ctx::new(&classes, "test");
        let expr = Expr::new(ExprKind::Int(1), Pos::SYNTHETIC);
        let err = c.lower_expr(&expr, Some(&RType::Bool)).unwrap_err();
        assert!(matches!(err, Diagnostic::TypeMismatch { .. }));
    }
}
