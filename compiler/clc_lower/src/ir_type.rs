//! IR type mapper: resolved source types → IR types.

use clc_ir::ir::IrType;
use clc_ir::{ClassTable, RType};

/// Map a resolved [`RType`] to its [`IrType`] representation.
///
/// # Panics
/// Panics if `tp` names a class ID absent from `classes` — this can only
/// happen if the class table passed to lowering wasn't the one the type
/// was resolved against, a lowering-driver bug rather than a user error.
#[must_use]
pub fn ir_type(tp: &RType, classes: &ClassTable) -> IrType {
    match tp {
        RType::Int => IrType::I32,
        RType::Bool => IrType::I1,
        RType::Float => IrType::F64,
        RType::Void => IrType::Void,
        RType::ClassRef(id) => {
            let entry = classes
                .get(*id)
                .expect("resolved ClassRef must name an entry in the class table");
            IrType::Ptr(entry.internal_name.clone())
        }
        RType::Function { ret, params } => IrType::FunctionPtr {
            ret: Box::new(ir_type(ret, classes)),
            params: params.iter().map(|p| ir_type(p, classes)).collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_map_directly() {
        let classes = ClassTable::new();
        assert_eq!(ir_type(&RType::Int, &classes), IrType::I32);
        assert_eq!(ir_type(&RType::Bool, &classes), IrType::I1);
        assert_eq!(ir_type(&RType::Float, &classes), IrType::F64);
        assert_eq!(ir_type(&RType::Void, &classes), IrType::Void);
    }
}
