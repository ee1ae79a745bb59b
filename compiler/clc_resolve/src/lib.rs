//! Name/type resolution (§4.1): walks top-level definitions and produces a
//! top-level [`Scope`] plus a [`ClassTable`], or accumulates every error it
//! finds along the way.

use clc_diagnostic::Diagnostic;
use clc_ir::ast::{ClassArg, Definition, DefinitionKind, TypeRef};
use clc_ir::{ClassEntry, ClassId, ClassTable, InternalName, RType, Scope, StackReference};
use clc_scope::Stack;
use tracing::{debug, instrument};

/// Resolve a source type annotation against an already-populated stack.
///
/// Primitive names map directly; any other name must resolve to a
/// `Class` binding, or this raises [`Diagnostic::NotAClass`] /
/// [`Diagnostic::LookupFailure`].
///
/// Exposed for `clc_lower`, which resolves lambda argument/return type
/// annotations inline during expression lowering rather than in a
/// separate upfront pass.
pub fn resolve_type(ty: &TypeRef, stack: &Stack) -> Result<RType, Diagnostic> {
    match ty.name.as_str() {
        "int" => Ok(RType::Int),
        "bool" => Ok(RType::Bool),
        "float" => Ok(RType::Float),
        "void" => Ok(RType::Void),
        other => {
            let (_, reference) = stack.lookup_or_fail(other, ty.pos)?;
            match reference {
                StackReference::Class(id) => Ok(RType::ClassRef(*id)),
                _ => Err(Diagnostic::NotAClass {
                    name: other.to_string(),
                    pos: ty.pos,
                }),
            }
        }
    }
}

/// Resolve a class body into its member scope. Every `Variable` member
/// becomes a `Pointer`-bound field, in declaration order, so it
/// contributes to the class layout (§4.5). Other definition kinds inside a
/// class body are not part of this core's member model and are skipped.
fn resolve_class_members(
    body: &[Definition],
    env: &Stack,
    errors: &mut Vec<Diagnostic>,
) -> Scope {
    let mut members = Scope::new();
    for def in body {
        if let DefinitionKind::Variable { ty, names } = &def.kind {
            match resolve_type(ty, env) {
                Ok(rtype) => {
                    for name in names {
                        let internal = InternalName::new(name.clone());
                        members.insert(name.clone(), internal, StackReference::Pointer(rtype.clone()));
                    }
                }
                Err(e) => errors.push(e),
            }
        }
    }
    members
}

fn resolve_args(args: &[ClassArg], env: &Stack, errors: &mut Vec<Diagnostic>) -> Vec<RType> {
    args.iter()
        .filter_map(|arg| match resolve_type(&arg.ty, env) {
            Ok(t) => Some(t),
            Err(e) => {
                errors.push(e);
                None
            }
        })
        .collect()
}

/// Walk `defs` and produce `(top_scope, class_table)`, or every diagnostic
/// encountered. Errors never short-circuit (§4.1, §7): a caller sees every
/// unresolvable name in one pass.
#[instrument(skip(defs), level = "debug")]
pub fn resolve_definitions(defs: &[Definition]) -> Result<(Scope, ClassTable), Vec<Diagnostic>> {
    let mut top = Scope::new();
    let mut classes = ClassTable::new();
    let mut errors = Vec::new();

    // Phase (a): allocate class IDs and bind every class's name before
    // descending into any body, so mutually- and self-referential class
    // definitions resolve regardless of declaration order.
    let mut next_class_id = 0u64;
    for def in defs {
        if let DefinitionKind::Class { name, .. } = &def.kind {
            let id = ClassId::new(next_class_id);
            next_class_id += 1;
            let internal = InternalName::new(name.clone());
            top.insert(name.clone(), internal.clone(), StackReference::Class(id));
            classes.insert(
                id,
                ClassEntry {
                    source_name: name.clone(),
                    internal_name: internal,
                    members: Scope::new(),
                },
            );
            debug!(class = %name, id = id.raw(), "pre-bound class");
        }
    }

    // Phase (b): resolve variables, function signatures, and class bodies
    // against the fully-populated class bindings from phase (a).
    let mut env = Stack::new();
    env.add(top.clone());

    for def in defs {
        match &def.kind {
            DefinitionKind::Variable { ty, names } => match resolve_type(ty, &env) {
                Ok(rtype) => {
                    for name in names {
                        let internal = InternalName::new(name.clone());
                        top.insert(name.clone(), internal, StackReference::Pointer(rtype.clone()));
                    }
                }
                Err(e) => errors.push(e),
            },
            DefinitionKind::Function { name, ret, args, .. } => {
                let ret_result = resolve_type(ret, &env);
                let param_types: Vec<RType> = args
                    .iter()
                    .filter_map(|arg| match resolve_type(&arg.ty, &env) {
                        Ok(t) => Some(t),
                        Err(e) => {
                            errors.push(e);
                            None
                        }
                    })
                    .collect();
                match ret_result {
                    Ok(ret_type) if param_types.len() == args.len() => {
                        top.insert(
                            name.clone(),
                            InternalName::new(name.clone()),
                            StackReference::Function {
                                ret: ret_type,
                                params: param_types,
                            },
                        );
                    }
                    Ok(_) => {}
                    Err(e) => errors.push(e),
                }
            }
            DefinitionKind::Class { name, args, body } => {
                let Some((_, StackReference::Class(id))) = top.get(name) else {
                    unreachable!("class names are pre-bound in phase (a)")
                };
                let id = *id;
                // Constructor argument types are resolved for diagnostic
                // completeness; this core's constructor calls (§4.3) don't
                // check arity against them.
                let _ctor_arg_types = resolve_args(args, &env, &mut errors);
                let members = resolve_class_members(body, &env, &mut errors);
                classes.insert(
                    id,
                    ClassEntry {
                        source_name: name.clone(),
                        internal_name: InternalName::new(name.clone()),
                        members,
                    },
                );
            }
            DefinitionKind::Import(_) => {
                // No cross-unit linking in this core; contributes nothing.
            }
        }
    }

    if errors.is_empty() {
        Ok((top, classes))
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clc_ir::ast::{DefinitionKind, FunctionArg};
    use clc_ir::Pos;
    use pretty_assertions::assert_eq;

    fn def(kind: DefinitionKind) -> Definition {
        Definition::new(kind, Pos::SYNTHETIC)
    }

    fn ty(name: &str) -> TypeRef {
        TypeRef::new(name, Pos::SYNTHETIC)
    }

    #[test]
    fn resolves_a_simple_function_signature() {
        let defs = vec![def(DefinitionKind::Function {
            name: "id".into(),
            ret: ty("int"),
            args: vec![FunctionArg {
                name: "x".into(),
                ty: ty("int"),
            }],
            body: vec![],
        })];

        let (top, classes) = resolve_definitions(&defs).expect("resolves");
        assert!(classes.is_empty());
        let (_, reference) = top.get("id").expect("id bound");
        assert_eq!(
            reference.value_type(),
            Some(RType::function(RType::Int, vec![RType::Int]))
        );
    }

    #[test]
    fn mutually_recursive_classes_resolve() {
        let defs = vec![
            def(DefinitionKind::Class {
                name: "A".into(),
                args: vec![],
                body: vec![def(DefinitionKind::Variable {
                    ty: ty("B"),
                    names: vec!["next".into()],
                })],
            }),
            def(DefinitionKind::Class {
                name: "B".into(),
                args: vec![],
                body: vec![def(DefinitionKind::Variable {
                    ty: ty("A"),
                    names: vec!["prev".into()],
                })],
            }),
        ];

        let (_, classes) = resolve_definitions(&defs).expect("resolves");
        assert_eq!(classes.len(), 2);
    }

    #[test]
    fn unknown_type_reports_lookup_failure() {
        let defs = vec![def(DefinitionKind::Variable {
            ty: ty("Nope"),
            names: vec!["x".into()],
        })];
        let errors = resolve_definitions(&defs).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], Diagnostic::LookupFailure { .. }));
    }

    #[test]
    fn errors_accumulate_rather_than_short_circuit() {
        let defs = vec![
            def(DefinitionKind::Variable {
                ty: ty("NopeOne"),
                names: vec!["a".into()],
            }),
            def(DefinitionKind::Variable {
                ty: ty("NopeTwo"),
                names: vec!["b".into()],
            }),
        ];
        let errors = resolve_definitions(&defs).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
