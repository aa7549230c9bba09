//! Explicit, non-global emission state.
//!
//! Nothing here is a singleton: a `ModuleBuilder` is owned by whichever
//! caller is driving a compile (the walker in `mcc-sem`), and a
//! `FunctionBuilder` is owned for the lifetime of lowering one function
//! body. Two independent compiles in the same process just construct two
//! independent builders.

use mcc_util::{define_idx, FxHashMap, Idx, IndexVec};

use crate::inst::{Instruction, Terminator};
use crate::module::{Block, BlockId, ExternFn, Function, Global, Module};
use crate::ty::IrType;
use crate::value::Value;

struct BlockBuilder {
    label: String,
    instructions: Vec<Instruction>,
    terminator: Option<Terminator>,
}

/// Builds one function's basic blocks. Dropped (via [`FunctionBuilder::finish`])
/// once the walker has finished lowering that function's body.
pub struct FunctionBuilder {
    name: String,
    ret: IrType,
    params: Vec<(IrType, String)>,
    blocks: IndexVec<BlockId, BlockBuilder>,
    current: BlockId,
    temp_names: FxHashMap<String, u32>,
    block_names: FxHashMap<String, u32>,
}

impl FunctionBuilder {
    pub fn new(name: impl Into<String>, ret: IrType, params: Vec<(IrType, String)>) -> Self {
        let mut blocks = IndexVec::new();
        let mut block_names = FxHashMap::default();
        block_names.insert("entry".to_string(), 1);
        let entry = blocks.push(BlockBuilder {
            label: "entry".to_string(),
            instructions: Vec::new(),
            terminator: None,
        });

        // Parameters already occupy their `%name` register before a single
        // instruction is emitted; reserve those hints so a later temp with
        // the same hint (e.g. loading `a`'s shadow slot) gets `%a.1`
        // instead of colliding with the incoming parameter `%a`.
        let mut temp_names = FxHashMap::default();
        for (_, param_name) in &params {
            let hint = param_name.trim_start_matches('%');
            temp_names.insert(hint.to_string(), 1);
        }

        Self {
            name: name.into(),
            ret,
            params,
            blocks,
            current: entry,
            temp_names,
            block_names,
        }
    }

    pub fn entry_block(&self) -> BlockId {
        BlockId::new(0)
    }

    pub fn current_block(&self) -> BlockId {
        self.current
    }

    pub fn is_terminated(&self, block: BlockId) -> bool {
        self.blocks[block].terminator.is_some()
    }

    /// Creates a new, not-yet-reachable block; does not switch to it.
    pub fn new_block(&mut self, hint: &str) -> BlockId {
        let label = dedup_name(&mut self.block_names, hint);
        self.blocks.push(BlockBuilder {
            label,
            instructions: Vec::new(),
            terminator: None,
        })
    }

    pub fn switch_to(&mut self, block: BlockId) {
        self.current = block;
    }

    pub fn block_label(&self, block: BlockId) -> &str {
        &self.blocks[block].label
    }

    fn fresh_temp(&mut self, hint: &str) -> String {
        format!("%{}", dedup_name(&mut self.temp_names, hint))
    }

    fn emit(&mut self, inst: Instruction) {
        let block = &mut self.blocks[self.current];
        assert!(
            block.terminator.is_none(),
            "internal invariant violation: emitted into already-terminated block `{}`",
            block.label
        );
        block.instructions.push(inst);
    }

    pub fn terminate(&mut self, term: Terminator) {
        let block = &mut self.blocks[self.current];
        assert!(
            block.terminator.is_none(),
            "internal invariant violation: double-terminated block `{}`",
            block.label
        );
        block.terminator = Some(term);
    }

    pub fn alloca(&mut self, ty: IrType, hint: &str) -> Value {
        let result = self.fresh_temp(hint);
        self.emit(Instruction::Alloca { result: result.clone(), ty });
        Value::Temp(result)
    }

    pub fn load(&mut self, ty: IrType, ptr: Value, hint: &str) -> Value {
        let result = self.fresh_temp(hint);
        self.emit(Instruction::Load { result: result.clone(), ty, ptr });
        Value::Temp(result)
    }

    pub fn store(&mut self, ty: IrType, value: Value, ptr: Value) {
        self.emit(Instruction::Store { ty, value, ptr });
    }

    pub fn gep(&mut self, base_ty: IrType, ptr: Value, indices: Vec<Value>, hint: &str) -> Value {
        let result = self.fresh_temp(hint);
        self.emit(Instruction::Gep {
            result: result.clone(),
            base_ty,
            ptr,
            indices,
        });
        Value::Temp(result)
    }

    pub fn binary(&mut self, op: &'static str, ty: IrType, lhs: Value, rhs: Value, hint: &str) -> Value {
        let result = self.fresh_temp(hint);
        self.emit(Instruction::Binary { result: result.clone(), op, ty, lhs, rhs });
        Value::Temp(result)
    }

    pub fn icmp(&mut self, pred: &'static str, ty: IrType, lhs: Value, rhs: Value, hint: &str) -> Value {
        let result = self.fresh_temp(hint);
        self.emit(Instruction::Icmp { result: result.clone(), pred, ty, lhs, rhs });
        Value::Temp(result)
    }

    pub fn fcmp(&mut self, pred: &'static str, ty: IrType, lhs: Value, rhs: Value, hint: &str) -> Value {
        let result = self.fresh_temp(hint);
        self.emit(Instruction::Fcmp { result: result.clone(), pred, ty, lhs, rhs });
        Value::Temp(result)
    }

    pub fn zext(&mut self, from_ty: IrType, value: Value, to_ty: IrType, hint: &str) -> Value {
        let result = self.fresh_temp(hint);
        self.emit(Instruction::Zext { result: result.clone(), from_ty, value, to_ty });
        Value::Temp(result)
    }

    pub fn sitofp(&mut self, from_ty: IrType, value: Value, to_ty: IrType, hint: &str) -> Value {
        let result = self.fresh_temp(hint);
        self.emit(Instruction::Sitofp { result: result.clone(), from_ty, value, to_ty });
        Value::Temp(result)
    }

    pub fn fptosi(&mut self, from_ty: IrType, value: Value, to_ty: IrType, hint: &str) -> Value {
        let result = self.fresh_temp(hint);
        self.emit(Instruction::Fptosi { result: result.clone(), from_ty, value, to_ty });
        Value::Temp(result)
    }

    pub fn call(&mut self, ret_ty: IrType, callee: impl Into<String>, args: Vec<(IrType, Value)>, hint: &str) -> Option<Value> {
        let is_void = ret_ty == IrType::Void;
        let result = if is_void { None } else { Some(self.fresh_temp(hint)) };
        self.emit(Instruction::Call {
            result: result.clone(),
            ret_ty,
            callee: callee.into(),
            args,
        });
        result.map(Value::Temp)
    }

    /// Finalizes the function. Panics if any block was left without a
    /// terminator — the walker is responsible for closing every path
    /// (dangling branches to a merge block, zero-default returns) before
    /// calling this; a gap here is an internal invariant violation, not a
    /// user-facing error.
    pub fn finish(self) -> Function {
        let mut blocks = IndexVec::new();
        for block in self.blocks.iter() {
            let terminator = block.terminator.clone().unwrap_or_else(|| {
                panic!("internal invariant violation: unterminated basic block `{}`", block.label)
            });
            blocks.push(Block {
                label: block.label.clone(),
                instructions: block.instructions.clone(),
                terminator,
            });
        }
        Function {
            name: self.name,
            ret: self.ret,
            params: self.params,
            blocks,
        }
    }
}

fn dedup_name(counts: &mut FxHashMap<String, u32>, hint: &str) -> String {
    let count = counts.entry(hint.to_string()).or_insert(0);
    let name = if *count == 0 { hint.to_string() } else { format!("{}.{}", hint, count) };
    *count += 1;
    name
}

/// Accumulates globals, extern declarations, and finished functions into a
/// complete [`Module`].
pub struct ModuleBuilder {
    module: Module,
}

impl ModuleBuilder {
    pub fn new(source_filename: impl Into<String>) -> Self {
        Self {
            module: Module::new(source_filename),
        }
    }

    pub fn add_global(&mut self, name: impl Into<String>, ty: IrType) {
        self.module.globals.push(Global { name: name.into(), ty });
    }

    pub fn add_extern(&mut self, name: impl Into<String>, ret: IrType, params: Vec<IrType>) {
        self.module.externs.push(ExternFn { name: name.into(), ret, params });
    }

    pub fn add_function(&mut self, function: Function) {
        self.module.functions.push(function);
    }

    pub fn finish(self) -> Module {
        self.module
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_temp_suffixes_duplicates_starting_at_one() {
        let mut fb = FunctionBuilder::new("f", IrType::I32, vec![]);
        let a = fb.alloca(IrType::I32, "t");
        let b = fb.alloca(IrType::I32, "t");
        assert_eq!(a, Value::Temp("%t".to_string()));
        assert_eq!(b, Value::Temp("%t.1".to_string()));
    }

    #[test]
    fn new_block_gets_a_unique_label() {
        let mut fb = FunctionBuilder::new("f", IrType::Void, vec![]);
        let b1 = fb.new_block("merge");
        let b2 = fb.new_block("merge");
        assert_eq!(fb.block_label(b1), "merge");
        assert_eq!(fb.block_label(b2), "merge.1");
    }

    #[test]
    #[should_panic(expected = "unterminated basic block")]
    fn finish_panics_on_unterminated_block() {
        let fb = FunctionBuilder::new("f", IrType::Void, vec![]);
        fb.finish();
    }

    #[test]
    fn finish_renders_terminated_entry_block() {
        let mut fb = FunctionBuilder::new("f", IrType::I32, vec![]);
        fb.terminate(Terminator::Ret { ty: IrType::I32, value: Value::ConstInt(0) });
        let function = fb.finish();
        assert_eq!(function.blocks.len(), 1);
    }
}
