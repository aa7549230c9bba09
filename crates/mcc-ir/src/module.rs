//! The assembled IR module and its `Display`-based textual renderer.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use mcc_util::{define_idx, Idx, IndexVec};

use crate::inst::{Instruction, Terminator};
use crate::ty::IrType;

define_idx!(pub struct BlockId(u32));

#[derive(Debug, Clone)]
pub struct Global {
    pub name: String,
    pub ty: IrType,
}

impl fmt::Display for Global {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{} = common global {} zeroinitializer", self.name, self.ty)
    }
}

#[derive(Debug, Clone)]
pub struct ExternFn {
    pub name: String,
    pub ret: IrType,
    pub params: Vec<IrType>,
}

impl fmt::Display for ExternFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "declare {} @{}(", self.ret, self.name)?;
        for (i, ty) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", ty)?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, Clone)]
pub struct Block {
    pub label: String,
    pub instructions: Vec<Instruction>,
    pub terminator: Terminator,
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.label)?;
        for inst in &self.instructions {
            writeln!(f, "  {}", inst)?;
        }
        write!(f, "  {}", self.terminator)
    }
}

#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub ret: IrType,
    pub params: Vec<(IrType, String)>,
    pub blocks: IndexVec<BlockId, Block>,
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "define {} @{}(", self.ret, self.name)?;
        for (i, (ty, name)) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", ty, name)?;
        }
        writeln!(f, ") {{")?;
        for block in self.blocks.iter() {
            writeln!(f, "{}", block)?;
        }
        write!(f, "}}")
    }
}

#[derive(Debug, Clone)]
pub struct Module {
    pub source_filename: String,
    pub globals: Vec<Global>,
    pub externs: Vec<ExternFn>,
    pub functions: Vec<Function>,
}

impl Module {
    pub fn new(source_filename: impl Into<String>) -> Self {
        Self {
            source_filename: source_filename.into(),
            globals: Vec::new(),
            externs: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn render(&self) -> String {
        self.to_string()
    }

    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.render())
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.source_filename)?;
        writeln!(f, "source_filename = \"{}\"", self.source_filename)?;
        writeln!(f)?;
        for global in &self.globals {
            writeln!(f, "{}", global)?;
        }
        if !self.globals.is_empty() {
            writeln!(f)?;
        }
        for extern_fn in &self.externs {
            writeln!(f, "{}", extern_fn)?;
        }
        if !self.externs.is_empty() {
            writeln!(f)?;
        }
        for (i, function) in self.functions.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}", function)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn renders_a_minimal_module_with_one_function() {
        let mut module = Module::new("t.mc");
        module.globals.push(Global {
            name: "counter".to_string(),
            ty: IrType::I32,
        });
        module.externs.push(ExternFn {
            name: "print_int".to_string(),
            ret: IrType::Void,
            params: vec![IrType::I32],
        });
        let mut blocks = IndexVec::new();
        blocks.push(Block {
            label: "entry".to_string(),
            instructions: vec![],
            terminator: Terminator::Ret {
                ty: IrType::I32,
                value: Value::ConstInt(0),
            },
        });
        module.functions.push(Function {
            name: "main".to_string(),
            ret: IrType::I32,
            params: vec![],
            blocks,
        });

        let text = module.render();
        assert!(text.contains("@counter = common global i32 zeroinitializer"));
        assert!(text.contains("declare void @print_int(i32)"));
        assert!(text.contains("define i32 @main() {"));
        assert!(text.contains("entry:"));
        assert!(text.contains("ret i32 0"));
    }
}
