//! Instructions and terminators, each `Display`-rendered as the exact
//! textual IR line it represents (without leading indentation or the
//! trailing newline — [`crate::module::Block`] supplies both).

use std::fmt;

use crate::ty::IrType;
use crate::value::Value;

#[derive(Debug, Clone)]
pub enum Instruction {
    Alloca { result: String, ty: IrType },
    Load { result: String, ty: IrType, ptr: Value },
    Store { ty: IrType, value: Value, ptr: Value },
    /// `base_ty` is the pointee type the GEP walks (the array type for a
    /// decayed array address, or the element type for a pointer param);
    /// `indices` already includes the decay-zero prefix when one applies.
    Gep {
        result: String,
        base_ty: IrType,
        ptr: Value,
        indices: Vec<Value>,
    },
    Binary {
        result: String,
        op: &'static str,
        ty: IrType,
        lhs: Value,
        rhs: Value,
    },
    Icmp {
        result: String,
        pred: &'static str,
        ty: IrType,
        lhs: Value,
        rhs: Value,
    },
    Fcmp {
        result: String,
        pred: &'static str,
        ty: IrType,
        lhs: Value,
        rhs: Value,
    },
    Zext {
        result: String,
        from_ty: IrType,
        value: Value,
        to_ty: IrType,
    },
    Sitofp {
        result: String,
        from_ty: IrType,
        value: Value,
        to_ty: IrType,
    },
    Fptosi {
        result: String,
        from_ty: IrType,
        value: Value,
        to_ty: IrType,
    },
    Call {
        result: Option<String>,
        ret_ty: IrType,
        callee: String,
        args: Vec<(IrType, Value)>,
    },
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Alloca { result, ty } => write!(f, "{} = alloca {}", result, ty),
            Instruction::Load { result, ty, ptr } => write!(f, "{} = load {}, ptr {}", result, ty, ptr),
            Instruction::Store { ty, value, ptr } => write!(f, "store {} {}, ptr {}", ty, value, ptr),
            Instruction::Gep { result, base_ty, ptr, indices } => {
                write!(f, "{} = getelementptr {}, ptr {}", result, base_ty, ptr)?;
                for idx in indices {
                    write!(f, ", i32 {}", idx)?;
                }
                Ok(())
            }
            Instruction::Binary { result, op, ty, lhs, rhs } => {
                write!(f, "{} = {} {} {}, {}", result, op, ty, lhs, rhs)
            }
            Instruction::Icmp { result, pred, ty, lhs, rhs } => {
                write!(f, "{} = icmp {} {} {}, {}", result, pred, ty, lhs, rhs)
            }
            Instruction::Fcmp { result, pred, ty, lhs, rhs } => {
                write!(f, "{} = fcmp {} {} {}, {}", result, pred, ty, lhs, rhs)
            }
            Instruction::Zext { result, from_ty, value, to_ty } => {
                write!(f, "{} = zext {} {} to {}", result, from_ty, value, to_ty)
            }
            Instruction::Sitofp { result, from_ty, value, to_ty } => {
                write!(f, "{} = sitofp {} {} to {}", result, from_ty, value, to_ty)
            }
            Instruction::Fptosi { result, from_ty, value, to_ty } => {
                write!(f, "{} = fptosi {} {} to {}", result, from_ty, value, to_ty)
            }
            Instruction::Call { result, ret_ty, callee, args } => {
                if let Some(result) = result {
                    write!(f, "{} = call {} @{}(", result, ret_ty, callee)?;
                } else {
                    write!(f, "call {} @{}(", ret_ty, callee)?;
                }
                for (i, (ty, value)) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", ty, value)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum Terminator {
    Br { target: String },
    CondBr { cond: Value, then_label: String, else_label: String },
    Ret { ty: IrType, value: Value },
    RetVoid,
}

impl fmt::Display for Terminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminator::Br { target } => write!(f, "br label %{}", target),
            Terminator::CondBr { cond, then_label, else_label } => {
                write!(f, "br i1 {}, label %{}, label %{}", cond, then_label, else_label)
            }
            Terminator::Ret { ty, value } => write!(f, "ret {} {}", ty, value),
            Terminator::RetVoid => write!(f, "ret void"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gep_renders_decay_zero_prefix_then_subscripts() {
        let inst = Instruction::Gep {
            result: "%idx".to_string(),
            base_ty: IrType::array_of(IrType::I32, &[10, 10]),
            ptr: Value::Global("@b".to_string()),
            indices: vec![Value::ConstInt(0), Value::ConstInt(2), Value::ConstInt(3)],
        };
        assert_eq!(
            inst.to_string(),
            "%idx = getelementptr [10 x [10 x i32]], ptr @b, i32 0, i32 2, i32 3"
        );
    }

    #[test]
    fn cond_br_renders_both_targets() {
        let term = Terminator::CondBr {
            cond: Value::Temp("%c".to_string()),
            then_label: "then".to_string(),
            else_label: "else".to_string(),
        };
        assert_eq!(term.to_string(), "br i1 %c, label %then, label %else");
    }
}
