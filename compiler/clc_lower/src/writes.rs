//! Syntactic writes-set discovery for the loop/phi engine (§4.4).
//!
//! Finds every name assigned anywhere in a statement sequence, descending
//! through sub-expressions and nested statements — except lambda bodies,
//! which are lifted and so cannot write to the enclosing function's locals.

use clc_ir::ast::{Expr, ExprKind, Stmt, StmtKind};
use clc_stacksafe::ensure_sufficient_stack;
use std::collections::HashSet;

#[must_use]
pub fn writes_in_stmts(stmts: &[Stmt]) -> HashSet<String> {
    ensure_sufficient_stack(|| {
        let mut names = HashSet::new();
        for stmt in stmts {
            collect_stmt(stmt, &mut names);
        }
        names
    })
}

/// The writes-set of a single expression, e.g. a `while`'s condition —
/// combined with [`writes_in_stmts`] over the body to get the full φ-set
/// for a loop (§4.4).
#[must_use]
pub fn writes_in_expr_standalone(expr: &Expr) -> HashSet<String> {
    ensure_sufficient_stack(|| {
        let mut names = HashSet::new();
        collect_expr(expr, &mut names);
        names
    })
}

fn collect_expr(expr: &Expr, names: &mut HashSet<String>) {
    match &expr.kind {
        ExprKind::Int(_) | ExprKind::Id(_) => {}
        ExprKind::Assign { lvalue, rhs, .. } => {
            if let ExprKind::Id(const_id) = &lvalue.kind {
                names.insert(const_id.head().to_string());
            }
            collect_expr(rhs, names);
        }
        ExprKind::Bin { lhs, rhs, .. } => {
            collect_expr(lhs, names);
            collect_expr(rhs, names);
        }
        ExprKind::Call { callee, args } => {
            collect_expr(callee, names);
            for arg in args {
                collect_expr(arg, names);
            }
        }
        ExprKind::Index { lhs, rhs } => {
            collect_expr(lhs, names);
            collect_expr(rhs, names);
        }
        // Lifted: the lambda body cannot write to the enclosing function's
        // locals, so it contributes nothing to this writes set.
        ExprKind::Lambda { .. } => {}
    }
}

fn collect_stmt(stmt: &Stmt, names: &mut HashSet<String>) {
    match &stmt.kind {
        StmtKind::Block(stmts) => {
            for s in stmts {
                collect_stmt(s, names);
            }
        }
        StmtKind::Decl { init, .. } => {
            if let Some(e) = init {
                collect_expr(e, names);
            }
        }
        StmtKind::Return(e) => {
            if let Some(e) = e {
                collect_expr(e, names);
            }
        }
        StmtKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            collect_expr(cond, names);
            for s in then_branch {
                collect_stmt(s, names);
            }
            if let Some(else_branch) = else_branch {
                for s in else_branch {
                    collect_stmt(s, names);
                }
            }
        }
        StmtKind::While { cond, body } => {
            collect_expr(cond, names);
            for s in body {
                collect_stmt(s, names);
            }
        }
        StmtKind::For {
            init,
            cond,
            iter,
            body,
        } => {
            if let Some(init) = init {
                collect_stmt(init, names);
            }
            if let Some(cond) = cond {
                collect_expr(cond, names);
            }
            if let Some(iter) = iter {
                collect_stmt(iter, names);
            }
            collect_stmt(body, names);
        }
        StmtKind::Break => {}
        StmtKind::Expr(e) => collect_expr(e, names),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clc_ir::ast::{AssignOp, ConstId};
    use clc_ir::Pos;

    fn id(name: &str) -> Expr {
        Expr::new(ExprKind::Id(ConstId::simple(name)), Pos::SYNTHETIC)
    }

    #[test]
    fn finds_assignment_through_nested_if() {
        let assign = Stmt::new(
            StmtKind::Expr(Expr::new(
                ExprKind::Assign {
                    op: AssignOp::Eq,
                    lvalue: Box::new(id("s")),
                    rhs: Box::new(Expr::new(ExprKind::Int(1), Pos::SYNTHETIC)),
                },
                Pos::SYNTHETIC,
            )),
            Pos::SYNTHETIC,
        );
        let if_stmt = Stmt::new(
            StmtKind::If {
                cond: id("c"),
                then_branch: vec![assign],
                else_branch: None,
            },
            Pos::SYNTHETIC,
        );
        let writes = writes_in_stmts(std::slice::from_ref(&if_stmt));
        assert!(writes.contains("s"));
        assert!(!writes.contains("c"));
    }

    #[test]
    fn lambda_bodies_are_excluded() {
        let assign_in_lambda = Stmt::new(
            StmtKind::Expr(Expr::new(
                ExprKind::Lambda {
                    args: vec![],
                    body: vec![Stmt::new(
                        StmtKind::Expr(Expr::new(
                            ExprKind::Assign {
                                op: AssignOp::Eq,
                                lvalue: Box::new(id("captured")),
                                rhs: Box::new(Expr::new(ExprKind::Int(0), Pos::SYNTHETIC)),
                            },
                            Pos::SYNTHETIC,
                        )),
                        Pos::SYNTHETIC,
                    )],
                },
                Pos::SYNTHETIC,
            )),
            Pos::SYNTHETIC,
        );
        let writes = writes_in_stmts(std::slice::from_ref(&assign_in_lambda));
        assert!(!writes.contains("captured"));
    }
}
