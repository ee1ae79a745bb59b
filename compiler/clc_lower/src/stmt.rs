//! Statement lowerer and loop/phi engine (§4.4).

use crate::ctx::{guarded, Ctx};
use crate::expr::Outcome;
use crate::ir_type::ir_type;
use crate::writes::writes_in_stmts;
use clc_diagnostic::Diagnostic;
use clc_ir::ast::{Expr, ExprKind, Stmt, StmtKind};
use clc_ir::ir::{BasicBlock, IrExpr, IrStmt, IrValue, Label};
use clc_ir::{RType, StackReference};

/// Unwrap an `Outcome` known to need a value, turning a stray
/// `ClassOutcome` into `MisuseOfClass`.
fn require_value(outcome: Outcome, pos: clc_ir::Pos) -> Result<(Vec<IrStmt>, IrValue, RType), Diagnostic> {
    match outcome {
        Outcome::Calc(stmts, value, ty) => Ok((stmts, value, ty)),
        Outcome::ClassOutcome(_) => Err(Diagnostic::MisuseOfClass {
            name: "<class expression>".to_string(),
            pos,
        }),
    }
}

impl Ctx<'_> {
    /// Lower a flat statement sequence (a function or lambda body) into a
    /// complete list of basic blocks, with every empty trailing block
    /// patched to `Unreachable` (§3 invariant: every block ends in exactly
    /// one terminator). `initial_return_hint` seeds the return-type
    /// agreement check across the body's `return` statements — `None` for
    /// a top-level function (whose declared return type is checked
    /// separately by the caller), `Some(r)` for a lambda whose ambient
    /// expectation names a return type up front.
    pub fn lower_body(
        &mut self,
        stmts: &[Stmt],
        initial_return_hint: Option<RType>,
    ) -> Result<(Vec<BasicBlock>, RType), Diagnostic> {
        let mut blocks = Vec::new();
        let mut return_hint = initial_return_hint;
        self.lower_stmt_sequence(stmts, &mut blocks, &mut return_hint)?;
        for block in &mut blocks {
            if block.stmts.is_empty() {
                block.stmts.push(IrStmt::Unreachable);
            }
        }
        Ok((blocks, return_hint.unwrap_or(RType::Void)))
    }

    pub fn lower_stmt_sequence(
        &mut self,
        stmts: &[Stmt],
        blocks: &mut Vec<BasicBlock>,
        return_hint: &mut Option<RType>,
    ) -> Result<(), Diagnostic> {
        for stmt in stmts {
            self.lower_stmt(stmt, blocks, return_hint)?;
        }
        Ok(())
    }

    fn lower_stmt(
        &mut self,
        stmt: &Stmt,
        blocks: &mut Vec<BasicBlock>,
        return_hint: &mut Option<RType>,
    ) -> Result<(), Diagnostic> {
        guarded(|| self.lower_stmt_kind(stmt, blocks, return_hint))
    }

    fn lower_stmt_kind(
        &mut self,
        stmt: &Stmt,
        blocks: &mut Vec<BasicBlock>,
        return_hint: &mut Option<RType>,
    ) -> Result<(), Diagnostic> {
        match &stmt.kind {
            StmtKind::Block(inner) => self.with_scope(|ctx| ctx.lower_stmt_sequence(inner, blocks, return_hint)),
            StmtKind::Decl { name, ty, init } => self.lower_decl(name, ty, init.as_ref(), stmt.pos, blocks),
            StmtKind::Return(expr) => self.lower_return(expr.as_ref(), stmt.pos, blocks, return_hint),
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => self.lower_if(cond, then_branch, else_branch.as_deref(), blocks, return_hint),
            StmtKind::While { cond, body } => self.lower_loop(Some(cond), body, blocks, return_hint),
            StmtKind::For {
                init,
                cond,
                iter,
                body,
            } => self.lower_for(init.as_deref(), cond.as_ref(), iter.as_deref(), body, blocks, return_hint),
            StmtKind::Break => {
                let end = self
                    .current_loop_end()
                    .expect("break outside any loop is an internal invariant violation (§5, §7)");
                self.terminate(IrStmt::Branch(end), blocks);
                Ok(())
            }
            StmtKind::Expr(expr) => {
                let outcome = self.lower_expr(expr, None)?;
                let (prelude, _, _) = require_value(outcome, expr.pos)?;
                self.append_statements(prelude, blocks);
                Ok(())
            }
        }
    }

    fn lower_decl(
        &mut self,
        name: &str,
        ty: &clc_ir::ast::TypeRef,
        init: Option<&Expr>,
        pos: clc_ir::Pos,
        blocks: &mut Vec<BasicBlock>,
    ) -> Result<(), Diagnostic> {
        let rtype = clc_resolve::resolve_type(ty, &self.stack)?;
        let value = match init {
            Some(init_expr) => {
                let outcome = self.lower_expr(init_expr, Some(&rtype))?;
                let (prelude, value, _) = require_value(outcome, init_expr.pos)?;
                self.append_statements(prelude, blocks);
                value
            }
            None => match rtype {
                RType::Int => IrValue::ConstInt(0),
                RType::Bool => IrValue::ConstBool(false),
                RType::Float => IrValue::const_float(0.0),
                _ => {
                    return Err(Diagnostic::Unsupported {
                        construct: format!("default initializer for type `{rtype}`"),
                        pos,
                    })
                }
            },
        };
        self.stack
            .put(name.to_string(), StackReference::Variable(rtype, value), &mut self.uniq);
        Ok(())
    }

    fn lower_return(
        &mut self,
        expr: Option<&Expr>,
        pos: clc_ir::Pos,
        blocks: &mut Vec<BasicBlock>,
        return_hint: &mut Option<RType>,
    ) -> Result<(), Diagnostic> {
        match expr {
            None => {
                match return_hint {
                    None | Some(RType::Void) => {}
                    Some(expected) => {
                        return Err(Diagnostic::WrongReturnType {
                            expected: expected.to_string(),
                            found: RType::Void.to_string(),
                            pos,
                        })
                    }
                }
                *return_hint = Some(RType::Void);
                self.terminate(IrStmt::Return(None), blocks);
            }
            Some(expr) => {
                let outcome = self.lower_expr(expr, return_hint.as_ref())?;
                let (prelude, value, ty) = require_value(outcome, expr.pos)?;
                self.append_statements(prelude, blocks);
                *return_hint = Some(ty);
                self.terminate(IrStmt::Return(Some(value)), blocks);
            }
        }
        Ok(())
    }

    fn lower_if(
        &mut self,
        cond: &Expr,
        then_branch: &[Stmt],
        else_branch: Option<&[Stmt]>,
        blocks: &mut Vec<BasicBlock>,
        return_hint: &mut Option<RType>,
    ) -> Result<(), Diagnostic> {
        let cond_outcome = self.lower_expr(cond, Some(&RType::Bool))?;
        let (cond_prelude, cond_value, _) = require_value(cond_outcome, cond.pos)?;
        self.append_statements(cond_prelude, blocks);

        let end_label = self.uniq.fresh_label();

        let mut then_blocks = Vec::new();
        self.with_scope(|ctx| ctx.lower_stmt_sequence(then_branch, &mut then_blocks, return_hint))?;
        let then_entry = if then_blocks.is_empty() {
            end_label
        } else {
            self.terminate(IrStmt::Branch(end_label), &mut then_blocks);
            then_blocks[0].label
        };

        let mut else_blocks = Vec::new();
        let else_entry = if let Some(else_branch) = else_branch {
            self.with_scope(|ctx| ctx.lower_stmt_sequence(else_branch, &mut else_blocks, return_hint))?;
            if else_blocks.is_empty() {
                end_label
            } else {
                self.terminate(IrStmt::Branch(end_label), &mut else_blocks);
                else_blocks[0].label
            }
        } else {
            end_label
        };

        self.terminate(
            IrStmt::BranchIf {
                cond: cond_value,
                then_label: then_entry,
                else_label: else_entry,
            },
            blocks,
        );
        blocks.extend(then_blocks);
        blocks.extend(else_blocks);
        self.open_block(end_label, blocks);
        Ok(())
    }

    fn lower_for(
        &mut self,
        init: Option<&Stmt>,
        cond: Option<&Expr>,
        iter: Option<&Stmt>,
        body: &Stmt,
        blocks: &mut Vec<BasicBlock>,
        return_hint: &mut Option<RType>,
    ) -> Result<(), Diagnostic> {
        self.with_scope(|ctx| {
            if let Some(init) = init {
                ctx.lower_stmt(init, blocks, return_hint)?;
            }
            // Desugar `for (...; ...; iter) body` to `while` with `iter`
            // appended to the body (§4.4).
            let desugared_body: Vec<Stmt> = match iter {
                Some(iter) => vec![body.clone(), iter.clone()],
                None => vec![body.clone()],
            };
            ctx.lower_loop(cond, &desugared_body, blocks, return_hint)
        })
    }

    /// The loop/phi engine. `cond: None` is the `for(;;)` boundary case:
    /// the compiler synthesizes a literal `true` condition rather than
    /// lowering a user expression (§4.4).
    fn lower_loop(
        &mut self,
        cond: Option<&Expr>,
        body: &[Stmt],
        blocks: &mut Vec<BasicBlock>,
        return_hint: &mut Option<RType>,
    ) -> Result<(), Diagnostic> {
        // Step 1: the pre-header is whichever block is current; its label
        // is start_label, the phi nodes' first incoming edge.
        self.ensure_current_block(blocks);
        let start_label = blocks.last().expect("just ensured non-empty").label;
        let test_label = self.uniq.fresh_label();
        let end_label = self.uniq.fresh_label();

        // Step 2: the writes-set, computed syntactically over body ∪ cond,
        // decides which locals need a phi node.
        let mut writes = writes_in_stmts(body);
        if let Some(cond) = cond {
            writes.extend(crate::writes::writes_in_expr_standalone(cond));
        }
        tracing::trace!(writes_set_size = writes.len(), "loop/phi construction");

        // Step 3: rebind each written, currently-bound name to a fresh phi
        // SSA id before lowering the body, so a read inside the body sees
        // the phi value rather than the pre-loop one.
        let mut phi_entries: Vec<(String, RType, IrValue, clc_ir::ir::SsaId)> = Vec::new();
        for name in &writes {
            if let Some((_, StackReference::Variable(tp, pre_value))) = self.stack.lookup(name) {
                let tp = tp.clone();
                let pre_value = pre_value.clone();
                let phi_ssa = self.uniq.fresh_ssa();
                self.stack.put(
                    name.clone(),
                    StackReference::Variable(tp.clone(), IrValue::Var(phi_ssa)),
                    &mut self.uniq,
                );
                phi_entries.push((name.clone(), tp, pre_value, phi_ssa));
            }
        }

        // Step 4: lower the body under the loop's break target. No scope is
        // pushed here — only `{...}` blocks, function bodies, and `if`
        // branches push one (§3); a loop body that rebinds a written name
        // must land that rebinding in the same scope frame step 3 wrote the
        // phi pre-binding into, or step 5 below would read the pre-binding
        // straight back out of a not-yet-popped frame.
        let mut body_blocks = Vec::new();
        self.with_loop(end_label, |ctx| ctx.lower_stmt_sequence(body, &mut body_blocks, return_hint))?;

        // The entry label (first block) is where the test jumps to run the
        // body; the tail label (last block, after appending its branch back
        // to the test) is the phi's back-edge predecessor. These coincide
        // only for straight-line bodies.
        let body_entry_label = body_blocks.first().map_or(test_label, |b| b.label);
        if !body_blocks.is_empty() {
            self.terminate(IrStmt::Branch(test_label), &mut body_blocks);
        }
        let body_tail_label = body_blocks.last().map_or(test_label, |b| b.label);

        // Step 5/6: read each phi variable's post-body value now that the
        // body has lowered into the still-open scope frame from step 3.
        let mut phi_stmts = Vec::new();
        for (name, tp, pre_value, phi_ssa) in &phi_entries {
            let post_value = match self.stack.lookup(name) {
                Some((_, StackReference::Variable(_, v))) => v.clone(),
                _ => pre_value.clone(),
            };
            phi_stmts.push(IrStmt::Assignment {
                lhs: *phi_ssa,
                rhs: IrExpr::Phi {
                    ty: ir_type(tp, self.classes),
                    incoming: vec![(pre_value.clone(), start_label), (post_value, body_tail_label)],
                },
            });
        }

        // Step 7: rebind each written name to its phi value for the test
        // condition and for code following the loop.
        for (name, tp, _, phi_ssa) in &phi_entries {
            self.stack.put(
                name.clone(),
                StackReference::Variable(tp.clone(), IrValue::Var(*phi_ssa)),
                &mut self.uniq,
            );
        }

        // Step 8 (test block): the phi assignments, then the condition.
        let mut test_stmts = phi_stmts;
        let cond_value = match cond {
            Some(cond) => {
                let outcome = self.lower_expr(cond, Some(&RType::Bool))?;
                let (prelude, value, _) = require_value(outcome, cond.pos)?;
                test_stmts.extend(prelude);
                value
            }
            None => IrValue::ConstBool(true),
        };
        test_stmts.push(IrStmt::BranchIf {
            cond: cond_value,
            then_label: body_entry_label,
            else_label: end_label,
        });

        self.terminate(IrStmt::Branch(test_label), blocks);
        blocks.push(BasicBlock {
            label: test_label,
            stmts: test_stmts,
        });
        blocks.extend(body_blocks);
        // Step 9: the end_label block is opened empty for subsequent
        // statements.
        self.open_block(end_label, blocks);
        Ok(())
    }

    fn ensure_current_block(&mut self, blocks: &mut Vec<BasicBlock>) {
        if blocks.is_empty() {
            let label = self.uniq.fresh_label();
            blocks.push(BasicBlock { label, stmts: Vec::new() });
        }
    }

    fn open_fresh_if_terminated(&mut self, blocks: &mut Vec<BasicBlock>) {
        let needs_fresh = blocks
            .last()
            .map_or(true, |b| b.stmts.last().is_some_and(IrStmt::is_terminator));
        if needs_fresh {
            let label = self.uniq.fresh_label();
            blocks.push(BasicBlock { label, stmts: Vec::new() });
        }
    }

    fn append_statements(&mut self, stmts: Vec<IrStmt>, blocks: &mut Vec<BasicBlock>) {
        if stmts.is_empty() {
            return;
        }
        self.open_fresh_if_terminated(blocks);
        blocks.last_mut().expect("just ensured non-empty").stmts.extend(stmts);
    }

    fn terminate(&mut self, stmt: IrStmt, blocks: &mut Vec<BasicBlock>) {
        self.open_fresh_if_terminated(blocks);
        blocks.last_mut().expect("just ensured non-empty").stmts.push(stmt);
    }

    fn open_block(&mut self, label: Label, blocks: &mut Vec<BasicBlock>) {
        blocks.push(BasicBlock { label, stmts: Vec::new() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clc_ir::ast::{AssignOp, BinOp, ConstId};
    use clc_ir::ir::IrBinOp;
    use clc_ir::{ClassTable, Pos};

    fn id(name: &str) -> Expr {
        Expr::new(ExprKind::Id(ConstId::simple(name)), Pos::SYNTHETIC)
    }

    fn int(v: i64) -> Expr {
        Expr::new(ExprKind::Int(v), Pos::SYNTHETIC)
    }

    #[test]
    fn decl_without_init_defaults_int_to_zero() {
        let classes = ClassTable::new();
        let mut ctx = Ctx::new(&classes, "test");
        let stmt = Stmt::new(
            StmtKind::Decl {
                name: "x".into(),
                ty: clc_ir::ast::TypeRef::new("int", Pos::SYNTHETIC),
                init: None,
            },
            Pos::SYNTHETIC,
        );
        let mut blocks = Vec::new();
        let mut return_hint = None;
        ctx.with_scope(|ctx| ctx.lower_stmt(&stmt, &mut blocks, &mut return_hint))
            .unwrap();
        let (_, reference) = ctx.stack.lookup("x").unwrap();
        assert_eq!(reference.value_type(), Some(RType::Int));
    }

    #[test]
    fn return_without_expr_sets_void_hint() {
        let classes = ClassTable::new();
        let mut ctx = Ctx::new(&classes, "test");
        let stmt = Stmt::new(StmtKind::Return(None), Pos::SYNTHETIC);
        let (blocks, ret) = ctx.lower_body(std::slice::from_ref(&stmt), None).unwrap();
        assert_eq!(ret, RType::Void);
        assert!(matches!(blocks[0].stmts.last(), Some(IrStmt::Return(None))));
    }

    #[test]
    fn second_return_with_mismatched_type_fails() {
        let classes = ClassTable::new();
        let mut ctx = Ctx::new(&classes, "test");
        let stmts = vec![
            Stmt::new(StmtKind::Return(Some(int(1))), Pos::SYNTHETIC),
            Stmt::new(
                StmtKind::Return(Some(Expr::new(
                    ExprKind::Bin {
                        op: BinOp::Less,
                        lhs: Box::new(int(1)),
                        rhs: Box::new(int(2)),
                    },
                    Pos::SYNTHETIC,
                ))),
                Pos::SYNTHETIC,
            ),
        ];
        let err = ctx.lower_body(&stmts, None).unwrap_err();
        assert!(matches!(err, Diagnostic::TypeMismatch { .. }));
    }

    #[test]
    fn break_outside_loop_panics() {
        let classes = ClassTable::new();
        let mut ctx = Ctx::new(&classes, "test");
        let stmt = Stmt::new(StmtKind::Break, Pos::SYNTHETIC);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            ctx.lower_body(std::slice::from_ref(&stmt), None)
        }));
        assert!(result.is_err());
    }

    #[test]
    fn while_loop_accumulator_produces_a_phi_with_two_incoming_edges() {
        let classes = ClassTable::new();
        let mut ctx = Ctx::new(&classes, "test");

        // int s = 0;
        let decl = Stmt::new(
            StmtKind::Decl {
                name: "s".into(),
                ty: clc_ir::ast::TypeRef::new("int", Pos::SYNTHETIC),
                init: Some(int(0)),
            },
            Pos::SYNTHETIC,
        );
        // while (s < 10) { s = s + 1; }
        let assign = Stmt::new(
            StmtKind::Expr(Expr::new(
                ExprKind::Assign {
                    op: AssignOp::Eq,
                    lvalue: Box::new(id("s")),
                    rhs: Box::new(Expr::new(
                        ExprKind::Bin {
                            op: BinOp::Plus,
                            lhs: Box::new(id("s")),
                            rhs: Box::new(int(1)),
                        },
                        Pos::SYNTHETIC,
                    )),
                },
                Pos::SYNTHETIC,
            )),
            Pos::SYNTHETIC,
        );
        let while_stmt = Stmt::new(
            StmtKind::While {
                cond: Expr::new(
                    ExprKind::Bin {
                        op: BinOp::Less,
                        lhs: Box::new(id("s")),
                        rhs: Box::new(int(10)),
                    },
                    Pos::SYNTHETIC,
                ),
                body: vec![assign],
            },
            Pos::SYNTHETIC,
        );
        let ret = Stmt::new(StmtKind::Return(Some(id("s"))), Pos::SYNTHETIC);

        let (blocks, ret_ty) = ctx.with_scope(|ctx| ctx.lower_body(&[decl, while_stmt, ret], None)).unwrap();
        assert_eq!(ret_ty, RType::Int);

        let phi_count = blocks
            .iter()
            .flat_map(|b| &b.stmts)
            .filter(|s| matches!(s, IrStmt::Assignment { rhs: IrExpr::Phi { .. }, .. }))
            .count();
        assert_eq!(phi_count, 1);

        let Some(IrStmt::Assignment {
            lhs: phi_lhs,
            rhs: IrExpr::Phi { incoming, .. },
        }) = blocks.iter().flat_map(|b| &b.stmts).find(|s| {
            matches!(s, IrStmt::Assignment { rhs: IrExpr::Phi { .. }, .. })
        }) else {
            panic!("expected a phi assignment");
        };
        assert_eq!(incoming.len(), 2);
        // The back edge must carry the body's post-increment value, not the
        // phi's own SSA id looping back on itself (the accumulator would
        // otherwise never advance).
        let (back_edge_value, _) = &incoming[1];
        assert_ne!(*back_edge_value, IrValue::Var(*phi_lhs));

        // The increment's `Assignment { rhs: Bin { .. } }` result must be
        // exactly the phi's back-edge value — i.e. the increment is live,
        // not dead.
        let increment_result = blocks
            .iter()
            .flat_map(|b| &b.stmts)
            .find_map(|s| match s {
                IrStmt::Assignment {
                    lhs,
                    rhs: IrExpr::Bin { op: IrBinOp::AddInt, .. },
                } => Some(IrValue::Var(*lhs)),
                _ => None,
            })
            .expect("expected the increment's addition to lower somewhere");
        assert_eq!(*back_edge_value, increment_result);
    }

    #[test]
    fn for_loop_with_all_clauses_present_lowers() {
        let classes = ClassTable::new();
        let mut ctx = Ctx::new(&classes, "test");
        let init = Stmt::new(
            StmtKind::Decl {
                name: "i".into(),
                ty: clc_ir::ast::TypeRef::new("int", Pos::SYNTHETIC),
                init: Some(int(0)),
            },
            Pos::SYNTHETIC,
        );
        let iter = Stmt::new(
            StmtKind::Expr(Expr::new(
                ExprKind::Assign {
                    op: AssignOp::Eq,
                    lvalue: Box::new(id("i")),
                    rhs: Box::new(Expr::new(
                        ExprKind::Bin {
                            op: BinOp::Plus,
                            lhs: Box::new(id("i")),
                            rhs: Box::new(int(1)),
                        },
                        Pos::SYNTHETIC,
                    )),
                },
                Pos::SYNTHETIC,
            )),
            Pos::SYNTHETIC,
        );
        let body = Stmt::new(StmtKind::Block(vec![]), Pos::SYNTHETIC);
        let for_stmt = Stmt::new(
            StmtKind::For {
                init: Some(Box::new(init)),
                cond: Some(Expr::new(
                    ExprKind::Bin {
                        op: BinOp::Less,
                        lhs: Box::new(id("i")),
                        rhs: Box::new(int(10)),
                    },
                    Pos::SYNTHETIC,
                )),
                iter: Some(Box::new(iter)),
                body: Box::new(body),
            },
            Pos::SYNTHETIC,
        );
        let (blocks, ret_ty) = ctx.lower_body(std::slice::from_ref(&for_stmt), None).unwrap();
        assert_eq!(ret_ty, RType::Void);
        assert!(!blocks.is_empty());
    }
}
