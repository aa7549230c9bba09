//! Operands that appear on the right-hand side of an instruction.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// An SSA temporary or a parameter/local shadow slot, already carrying
    /// its leading `%`.
    Temp(String),
    ConstInt(i64),
    ConstFloat(f64),
    ConstBool(bool),
    /// A module-level global, already carrying its leading `@`.
    Global(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Temp(name) => write!(f, "{}", name),
            Value::ConstInt(v) => write!(f, "{}", v),
            Value::ConstFloat(v) => {
                if v.fract() == 0.0 && v.is_finite() {
                    write!(f, "{:.1}", v)
                } else {
                    write!(f, "{}", v)
                }
            }
            Value::ConstBool(v) => write!(f, "{}", v),
            Value::Global(name) => write!(f, "{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_float_constants_keep_a_decimal_point() {
        assert_eq!(Value::ConstFloat(3.0).to_string(), "3.0");
        assert_eq!(Value::ConstFloat(3.14).to_string(), "3.14");
    }

    #[test]
    fn temps_and_globals_render_their_sigil_verbatim() {
        assert_eq!(Value::Temp("%x".to_string()).to_string(), "%x");
        assert_eq!(Value::Global("@b".to_string()).to_string(), "@b");
    }
}
