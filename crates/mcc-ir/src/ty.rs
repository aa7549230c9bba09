//! The IR's own type lattice. Distinct from `mcc_par::ast::Type` — this is
//! the textual LLVM-side vocabulary (`i1`/`i32`/`float`/`ptr`/array), not
//! the source language's type system. The walker in `mcc-sem` is the only
//! place that maps one onto the other.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrType {
    I1,
    I32,
    Float,
    Void,
    Ptr,
    Array(Box<IrType>, u32),
}

impl IrType {
    /// Folds `dims` right-to-left around `elem`, so `dims = [10, 10]`
    /// (declared `elem b[10][10]`) produces `[10 x [10 x elem]]` — the
    /// outermost declared dimension ends up the outermost array type.
    pub fn array_of(elem: IrType, dims: &[u32]) -> IrType {
        dims.iter().rev().fold(elem, |inner, &dim| IrType::Array(Box::new(inner), dim))
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::I1 => write!(f, "i1"),
            IrType::I32 => write!(f, "i32"),
            IrType::Float => write!(f, "float"),
            IrType::Void => write!(f, "void"),
            IrType::Ptr => write!(f, "ptr"),
            IrType::Array(elem, n) => write!(f, "[{} x {}]", n, elem),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_of_folds_outermost_dimension_outward() {
        let ty = IrType::array_of(IrType::I32, &[10, 10]);
        assert_eq!(ty.to_string(), "[10 x [10 x i32]]");
    }

    #[test]
    fn array_of_preserves_asymmetric_dims_in_declared_order() {
        let ty = IrType::array_of(IrType::I32, &[3, 5]);
        assert_eq!(ty.to_string(), "[3 x [5 x i32]]");
    }

    #[test]
    fn scalar_types_render_as_llvm_keywords() {
        assert_eq!(IrType::I1.to_string(), "i1");
        assert_eq!(IrType::Float.to_string(), "float");
        assert_eq!(IrType::Ptr.to_string(), "ptr");
    }
}
