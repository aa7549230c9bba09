//! The combined type-checking and IR-emitting tree walker (§1, §4.4–§4.6):
//! one pass over the AST that both enforces the widening lattice and
//! drives an explicit [`ModuleBuilder`]/[`FunctionBuilder`] pair — no
//! separate optimizer or register-allocator stage sits between the two.

use mcc_ir::{FunctionBuilder, IrType, ModuleBuilder, Module, Terminator, Value};
use mcc_par::{
    ArrayRef, Assign, Binary, BinaryOp, Block, Call, Decl, Expr, Function, If, Item, Param,
    Program, Return, Stmt, Type, Unary, UnaryOp, Var, While,
};
use mcc_util::{suggest_closest, DiagnosticBuilder, DiagnosticCode, Handler, Span, Symbol};

use crate::error::{ScopeError, SemaError, SemaResult, TypeError, TypeErrorKind};
use crate::scope::{ScopeStack, Storage, SymbolEntry, SymbolKind};

/// Runs the whole walker over `program`, mutating every expression node's
/// deduced-type slot in place, and returns the finished module.
pub fn analyze_and_emit(program: &mut Program, source_filename: &str, handler: &Handler) -> SemaResult<Module> {
    let mut checker = Checker::new(source_filename, handler);

    // First pass: register every top-level signature so calls and globals
    // can be forward-referenced regardless of declaration order.
    for item in &program.items {
        checker.register_item_signature(item)?;
    }

    // Second pass: lower each function body.
    for item in &mut program.items {
        if let Item::Function(function) = item {
            checker.check_function(function)?;
        }
    }

    Ok(checker.module.finish())
}

struct Checker<'a> {
    handler: &'a Handler,
    scopes: ScopeStack,
    module: ModuleBuilder,
    current_fn: Option<FunctionBuilder>,
    current_ret_ty: Type,
}

impl<'a> Checker<'a> {
    fn new(source_filename: &str, handler: &'a Handler) -> Self {
        Self {
            handler,
            scopes: ScopeStack::new(),
            module: ModuleBuilder::new(source_filename),
            current_fn: None,
            current_ret_ty: Type::Void,
        }
    }

    fn fb(&mut self) -> &mut FunctionBuilder {
        self.current_fn.as_mut().expect("no function is being lowered")
    }

    // ---- diagnostics -----------------------------------------------------

    /// Declares a symbol, routing any resulting [`ScopeError`] through the
    /// handler before it is wrapped into a [`SemaError`] and returned.
    fn declare(&mut self, entry: SymbolEntry) -> SemaResult<()> {
        self.scopes.declare(entry).map_err(|err| self.report_scope_error(err))
    }

    fn report_scope_error(&self, err: ScopeError) -> SemaError {
        DiagnosticBuilder::error(err.to_string())
            .code(DiagnosticCode::Scope)
            .span(err.span())
            .emit(self.handler);
        err.into()
    }

    /// Builds a [`TypeError`], emitting it to the handler as it is raised
    /// so the driver can later render the category tag, caret-line, and
    /// (where relevant) suggestion for it.
    fn report_type_error(&self, kind: TypeErrorKind, expected: impl Into<String>, got: impl Into<String>, span: Span) -> TypeError {
        let err = TypeError::new(kind, expected, got, span);
        DiagnosticBuilder::error(err.to_string())
            .code(DiagnosticCode::Type)
            .span(span)
            .emit(self.handler);
        err
    }

    // ---- top level ------------------------------------------------------

    fn register_item_signature(&mut self, item: &Item) -> SemaResult<()> {
        match item {
            Item::ExternDecl(e) => {
                let params: Vec<Type> = e.params.iter().map(|p| p.ty.clone()).collect();
                self.module
                    .add_extern(e.name.as_string(), ir_type(&e.ret_ty), params.iter().map(param_ir_type).collect());
                self.declare(SymbolEntry {
                    name: e.name,
                    kind: SymbolKind::Function,
                    ty: e.ret_ty.clone(),
                    storage: Storage::Global,
                    address: None,
                    defined_at: e.span,
                    params: Some(params),
                })?;
            }
            Item::Function(f) => {
                let params: Vec<Type> = f.params.iter().map(|p| p.ty.clone()).collect();
                self.declare(SymbolEntry {
                    name: f.name,
                    kind: SymbolKind::Function,
                    ty: f.ret_ty.clone(),
                    storage: Storage::Global,
                    address: None,
                    defined_at: f.span,
                    params: Some(params),
                })?;
            }
            Item::GlobalVar(v) => {
                if v.ty == Type::Void {
                    return Err(self.report_type_error(TypeErrorKind::VoidValue, "a non-void type", "void", v.span).into());
                }
                self.module.add_global(v.name.as_string(), ir_type(&v.ty));
                self.declare(SymbolEntry {
                    name: v.name,
                    kind: SymbolKind::Var,
                    ty: v.ty.clone(),
                    storage: Storage::Global,
                    address: Some(Value::Global(format!("@{}", v.name.as_string()))),
                    defined_at: v.span,
                    params: None,
                })?;
            }
            Item::GlobalArray(a) => {
                let ty = Type::Array(Box::new(a.elem_ty.clone()), a.dims.clone());
                self.module.add_global(a.name.as_string(), ir_type(&ty));
                self.declare(SymbolEntry {
                    name: a.name,
                    kind: SymbolKind::Array,
                    ty,
                    storage: Storage::Global,
                    address: Some(Value::Global(format!("@{}", a.name.as_string()))),
                    defined_at: a.span,
                    params: None,
                })?;
            }
        }
        Ok(())
    }

    fn check_function(&mut self, function: &mut Function) -> SemaResult<()> {
        let ir_params: Vec<(IrType, String)> = function
            .params
            .iter()
            .map(|p| (param_ir_type(&p.ty), format!("%{}", p.name.as_string())))
            .collect();

        self.current_fn = Some(FunctionBuilder::new(function.name.as_string(), ir_type(&function.ret_ty), ir_params));
        self.current_ret_ty = function.ret_ty.clone();
        self.scopes.push_scope();

        for param in &function.params {
            self.declare_param(param)?;
        }

        self.check_block_in_current_scope(&mut function.body)?;
        self.close_fallthrough_path();

        self.scopes.pop_scope();
        let built = self.current_fn.take().expect("function builder set above").finish();
        self.module.add_function(built);
        Ok(())
    }

    fn declare_param(&mut self, param: &Param) -> SemaResult<()> {
        // An array parameter arrives as a decayed pointer (§4.6), not the
        // nested array type its declared dims would otherwise produce.
        let ir_ty = param_ir_type(&param.ty);
        let slot_hint = format!("{}.addr", param.name.as_string());
        let slot = self.fb().alloca(ir_ty.clone(), &slot_hint);
        let incoming = Value::Temp(format!("%{}", param.name.as_string()));
        self.fb().store(ir_ty, incoming, slot.clone());
        let kind = if matches!(param.ty, Type::Array(..)) { SymbolKind::Array } else { SymbolKind::Var };
        self.declare(SymbolEntry {
            name: param.name,
            kind,
            ty: param.ty.clone(),
            storage: Storage::Param,
            address: Some(slot),
            defined_at: param.span,
            params: None,
        })
    }

    /// Closes whatever path is still open at the end of a function body: a
    /// `void` function gets `ret void`; anything else gets a zero-default
    /// return, matching the documented fallthrough behavior (§4.6).
    fn close_fallthrough_path(&mut self) {
        let current = self.fb().current_block();
        if self.fb().is_terminated(current) {
            return;
        }
        match self.current_ret_ty.clone() {
            Type::Void => self.fb().terminate(Terminator::RetVoid),
            ty => {
                let value = zero_value(&ty);
                self.fb().terminate(Terminator::Ret { ty: ir_type(&ty), value });
            }
        }
    }

    // ---- blocks and statements -------------------------------------------

    /// Processes a block's locals and statements directly into the
    /// currently-pushed scope, without pushing a new one — used for a
    /// function's root block, which shares the parameter scope (§4.4).
    fn check_block_in_current_scope(&mut self, block: &mut Block) -> SemaResult<()> {
        for decl in &mut block.locals {
            self.check_local_decl(decl)?;
        }
        for stmt in &mut block.stmts {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    /// Pushes a fresh scope for a nested block (`if`/`while` bodies).
    fn check_nested_block(&mut self, block: &mut Block) -> SemaResult<()> {
        self.scopes.push_scope();
        let result = self.check_block_in_current_scope(block);
        self.scopes.pop_scope();
        result
    }

    fn check_local_decl(&mut self, decl: &mut Decl) -> SemaResult<()> {
        match decl {
            Decl::Var(v) => {
                if v.ty == Type::Void {
                    return Err(self.report_type_error(TypeErrorKind::VoidValue, "a non-void type", "void", v.span).into());
                }
                let ir_ty = ir_type(&v.ty);
                let slot = self.fb().alloca(ir_ty, &v.name.as_string());
                self.declare(SymbolEntry {
                    name: v.name,
                    kind: SymbolKind::Var,
                    ty: v.ty.clone(),
                    storage: Storage::Local,
                    address: Some(slot),
                    defined_at: v.span,
                    params: None,
                })
            }
            Decl::Array(a) => {
                let ty = Type::Array(Box::new(a.elem_ty.clone()), a.dims.clone());
                let ir_ty = ir_type(&ty);
                let slot = self.fb().alloca(ir_ty, &a.name.as_string());
                self.declare(SymbolEntry {
                    name: a.name,
                    kind: SymbolKind::Array,
                    ty,
                    storage: Storage::Local,
                    address: Some(slot),
                    defined_at: a.span,
                    params: None,
                })
            }
        }
    }

    fn check_stmt(&mut self, stmt: &mut Stmt) -> SemaResult<()> {
        match stmt {
            Stmt::Empty(_) => Ok(()),
            Stmt::ExprStmt(e) => {
                self.check_expr(&mut e.expr)?;
                Ok(())
            }
            Stmt::If(if_stmt) => self.check_if(if_stmt),
            Stmt::While(while_stmt) => self.check_while(while_stmt),
            Stmt::Return(ret) => self.check_return(ret),
        }
    }

    fn check_if(&mut self, node: &mut If) -> SemaResult<()> {
        let cond_val = self.check_expr(&mut node.cond)?;
        let cond_ty = node.cond.ty().cloned().expect("checked");
        if !cond_ty.is_numeric() {
            return Err(self.report_type_error(TypeErrorKind::NonNumeric, "numeric", cond_ty.to_string(), node.cond.span()).into());
        }
        let bool_val = self.narrow_to_bool(cond_val, &cond_ty);

        let then_block = self.fb().new_block("if.then");
        let else_block = node.else_branch.as_ref().map(|_| self.fb().new_block("if.else"));
        let merge_block = self.fb().new_block("if.end");

        let then_label = self.fb().block_label(then_block).to_string();
        let merge_label = self.fb().block_label(merge_block).to_string();
        let else_label = else_block
            .map(|b| self.fb().block_label(b).to_string())
            .unwrap_or_else(|| merge_label.clone());

        self.fb().terminate(Terminator::CondBr {
            cond: bool_val,
            then_label,
            else_label,
        });

        self.fb().switch_to(then_block);
        self.check_nested_block(&mut node.then_branch)?;
        let current = self.fb().current_block();
        if !self.fb().is_terminated(current) {
            self.fb().terminate(Terminator::Br { target: merge_label.clone() });
        }

        if let (Some(else_block), Some(else_branch)) = (else_block, node.else_branch.as_mut()) {
            self.fb().switch_to(else_block);
            self.check_nested_block(else_branch)?;
            let current = self.fb().current_block();
            if !self.fb().is_terminated(current) {
                self.fb().terminate(Terminator::Br { target: merge_label.clone() });
            }
        }

        self.fb().switch_to(merge_block);
        Ok(())
    }

    fn check_while(&mut self, node: &mut While) -> SemaResult<()> {
        let header = self.fb().new_block("while.cond");
        let body = self.fb().new_block("while.body");
        let after = self.fb().new_block("while.end");

        let header_label = self.fb().block_label(header).to_string();
        let body_label = self.fb().block_label(body).to_string();
        let after_label = self.fb().block_label(after).to_string();

        self.fb().terminate(Terminator::Br { target: header_label.clone() });

        self.fb().switch_to(header);
        let cond_val = self.check_expr(&mut node.cond)?;
        let cond_ty = node.cond.ty().cloned().expect("checked");
        if !cond_ty.is_numeric() {
            return Err(self.report_type_error(TypeErrorKind::NonNumeric, "numeric", cond_ty.to_string(), node.cond.span()).into());
        }
        let bool_val = self.narrow_to_bool(cond_val, &cond_ty);
        self.fb().terminate(Terminator::CondBr {
            cond: bool_val,
            then_label: body_label,
            else_label: after_label,
        });

        self.fb().switch_to(body);
        self.check_nested_block(&mut node.body)?;
        let current = self.fb().current_block();
        if !self.fb().is_terminated(current) {
            self.fb().terminate(Terminator::Br { target: header_label });
        }

        self.fb().switch_to(after);
        Ok(())
    }

    fn check_return(&mut self, node: &mut Return) -> SemaResult<()> {
        let ret_ty = self.current_ret_ty.clone();
        match &mut node.value {
            Some(expr) => {
                if ret_ty == Type::Void {
                    return Err(self.report_type_error(TypeErrorKind::VoidValue, "no value", "a value", node.span).into());
                }
                let val = self.check_expr(expr)?;
                let value_ty = expr.ty().cloned().expect("checked");
                if !value_ty.widens_to(&ret_ty) {
                    return Err(self.report_type_error(TypeErrorKind::ReturnType, ret_ty.to_string(), value_ty.to_string(), expr.span()).into());
                }
                let coerced = self.widen_value(val, &value_ty, &ret_ty, "ret");
                self.fb().terminate(Terminator::Ret { ty: ir_type(&ret_ty), value: coerced });
            }
            None => {
                if ret_ty != Type::Void {
                    return Err(self.report_type_error(TypeErrorKind::ReturnType, ret_ty.to_string(), "void", node.span).into());
                }
                self.fb().terminate(Terminator::RetVoid);
            }
        }
        Ok(())
    }

    // ---- expressions --------------------------------------------------

    fn check_expr(&mut self, expr: &mut Expr) -> SemaResult<Value> {
        match expr {
            Expr::IntLit(lit) => {
                lit.ty = Some(Type::Int);
                Ok(Value::ConstInt(lit.value))
            }
            Expr::FloatLit(lit) => {
                lit.ty = Some(Type::Float);
                Ok(Value::ConstFloat(lit.value))
            }
            Expr::BoolLit(lit) => {
                lit.ty = Some(Type::Bool);
                Ok(Value::ConstBool(lit.value))
            }
            Expr::Var(v) => self.check_var(v),
            Expr::ArrayRef(a) => self.check_array_ref(a),
            Expr::Call(c) => self.check_call(c),
            Expr::Assign(a) => self.check_assign(a),
            Expr::Unary(u) => self.check_unary(u),
            Expr::Binary(b) => self.check_binary(b),
        }
    }

    fn check_var(&mut self, node: &mut Var) -> SemaResult<Value> {
        let entry = self.scopes.lookup(node.name).cloned().ok_or_else(|| self.undeclared_error(node.name, node.span))?;
        if entry.kind == SymbolKind::Function {
            return Err(self.undeclared_error(node.name, node.span));
        }
        let ir_ty = ir_type(&entry.ty);
        let addr = entry.address.clone().expect("a declared variable's address is always known");
        let loaded = self.fb().load(ir_ty, addr, &node.name.as_string());
        node.ty = Some(entry.ty);
        Ok(loaded)
    }

    fn check_array_ref(&mut self, node: &mut ArrayRef) -> SemaResult<Value> {
        let (addr, elem_ty) = self.resolve_array_place(node)?;
        let ir_ty = ir_type(&elem_ty);
        let loaded = self.fb().load(ir_ty, addr, &format!("{}.val", node.name.as_string()));
        Ok(loaded)
    }

    fn resolve_place(&mut self, expr: &mut Expr) -> SemaResult<(Value, Type)> {
        match expr {
            Expr::Var(v) => {
                let entry = self.scopes.lookup(v.name).cloned().ok_or_else(|| self.undeclared_error(v.name, v.span))?;
                if entry.kind == SymbolKind::Function {
                    return Err(self.undeclared_error(v.name, v.span));
                }
                let addr = entry.address.clone().expect("a declared variable's address is always known");
                v.ty = Some(entry.ty.clone());
                Ok((addr, entry.ty))
            }
            Expr::ArrayRef(a) => self.resolve_array_place(a),
            _ => unreachable!("the parser only ever builds Assign targets from Var or ArrayRef"),
        }
    }

    fn resolve_array_place(&mut self, node: &mut ArrayRef) -> SemaResult<(Value, Type)> {
        let entry = self.scopes.lookup(node.name).cloned().ok_or_else(|| self.undeclared_error(node.name, node.span))?;
        if entry.kind == SymbolKind::Function {
            return Err(self.undeclared_error(node.name, node.span));
        }

        let declared_rank = entry.ty.dims().len();
        if node.indices.len() != declared_rank {
            return Err(self.report_type_error(
                TypeErrorKind::ArgCount,
                declared_rank.to_string(),
                node.indices.len().to_string(),
                node.span,
            )
            .into());
        }

        let mut idx_values = Vec::with_capacity(node.indices.len());
        for idx_expr in node.indices.iter_mut() {
            let val = self.check_expr(idx_expr)?;
            let idx_ty = idx_expr.ty().cloned().expect("checked");
            if idx_ty == Type::Float {
                return Err(self.report_type_error(TypeErrorKind::Narrowing, "int", "float", idx_expr.span()).into());
            }
            if !idx_ty.is_numeric() {
                return Err(self.report_type_error(TypeErrorKind::NonNumeric, "numeric", idx_ty.to_string(), idx_expr.span()).into());
            }
            idx_values.push(self.widen_value(val, &idx_ty, &Type::Int, "idx"));
        }

        let elem_ty = entry.ty.elem().clone();
        let (base_ty, ptr, gep_indices) = if entry.storage == Storage::Param {
            let loaded_ptr = self.fb().load(IrType::Ptr, entry.address.clone().expect("param address known"), &node.name.as_string());
            (ir_type(&elem_ty), loaded_ptr, idx_values)
        } else {
            let mut full_indices = vec![Value::ConstInt(0)];
            full_indices.extend(idx_values);
            (ir_type(&entry.ty), entry.address.clone().expect("array address known"), full_indices)
        };

        let addr = self.fb().gep(base_ty, ptr, gep_indices, &format!("{}.idx", node.name.as_string()));
        node.ty = Some(elem_ty.clone());
        Ok((addr, elem_ty))
    }

    fn check_call(&mut self, node: &mut Call) -> SemaResult<Value> {
        let entry = self.scopes.lookup(node.callee).cloned().ok_or_else(|| self.undeclared_error(node.callee, node.span))?;
        if entry.kind != SymbolKind::Function {
            return Err(self.undeclared_error(node.callee, node.span));
        }
        let params = entry.params.clone().unwrap_or_default();
        if node.args.len() != params.len() {
            return Err(self.report_type_error(TypeErrorKind::ArgCount, params.len().to_string(), node.args.len().to_string(), node.span).into());
        }

        let mut ir_args = Vec::with_capacity(node.args.len());
        for (arg, param_ty) in node.args.iter_mut().zip(params.iter()) {
            let val = self.check_expr(arg)?;
            let arg_ty = arg.ty().cloned().expect("checked");
            if !arg_ty.widens_to(param_ty) {
                return Err(self.report_type_error(TypeErrorKind::ArgType, param_ty.to_string(), arg_ty.to_string(), arg.span()).into());
            }
            let coerced = self.widen_value(val, &arg_ty, param_ty, "arg");
            ir_args.push((ir_type(param_ty), coerced));
        }

        let ret_ty = entry.ty.clone();
        let result = self.fb().call(ir_type(&ret_ty), node.callee.as_string(), ir_args, "call");
        node.ty = Some(ret_ty);
        Ok(result.unwrap_or(Value::ConstInt(0)))
    }

    fn check_assign(&mut self, node: &mut Assign) -> SemaResult<Value> {
        let (addr, target_ty) = self.resolve_place(&mut node.target)?;
        let value_val = self.check_expr(&mut node.value)?;
        let value_ty = node.value.ty().cloned().expect("checked");
        if !value_ty.widens_to(&target_ty) {
            return Err(self.report_type_error(TypeErrorKind::Narrowing, target_ty.to_string(), value_ty.to_string(), node.span).into());
        }
        let coerced = self.widen_value(value_val, &value_ty, &target_ty, "assign");
        self.fb().store(ir_type(&target_ty), coerced.clone(), addr);
        node.ty = Some(target_ty);
        Ok(coerced)
    }

    fn check_unary(&mut self, node: &mut Unary) -> SemaResult<Value> {
        let operand_val = self.check_expr(&mut node.operand)?;
        let operand_ty = node.operand.ty().cloned().expect("checked");
        if !operand_ty.is_numeric() {
            return Err(self.report_type_error(TypeErrorKind::NonNumeric, "numeric", operand_ty.to_string(), node.span).into());
        }
        match node.op {
            UnaryOp::Neg => {
                let compute_ty = if operand_ty == Type::Float { Type::Float } else { Type::Int };
                let val = self.widen_value(operand_val, &operand_ty, &compute_ty, "neg");
                let result = match compute_ty {
                    Type::Float => self.fb().binary("fsub", IrType::Float, Value::ConstFloat(0.0), val, "neg"),
                    _ => self.fb().binary("sub", IrType::I32, Value::ConstInt(0), val, "neg"),
                };
                // §4.5: unary `-` preserves type for an already-numeric
                // operand, but a `Bool` operand is widened to `Int` before
                // the subtraction (there is no `i1` negation), so the
                // result is `Int`, not the original `Bool` — matching the
                // register `compute_ty` actually defines.
                node.ty = Some(compute_ty);
                Ok(result)
            }
            UnaryOp::Not => {
                let bool_val = self.narrow_to_bool(operand_val, &operand_ty);
                let result = self.fb().binary("xor", IrType::I1, bool_val, Value::ConstBool(true), "not");
                node.ty = Some(Type::Bool);
                Ok(result)
            }
        }
    }

    fn check_binary(&mut self, node: &mut Binary) -> SemaResult<Value> {
        match node.op {
            BinaryOp::And | BinaryOp::Or => self.check_logical(node),
            _ => self.check_arith_or_cmp(node),
        }
    }

    /// `&&`/`||` with short-circuit evaluation: the RHS is emitted in its
    /// own basic block reached only when the LHS demands it (§5, §8).
    /// There is no `phi` in this IR, so the result is threaded through a
    /// shadow `i1` slot instead, the same pattern locals already use.
    fn check_logical(&mut self, node: &mut Binary) -> SemaResult<Value> {
        let is_and = node.op == BinaryOp::And;
        let lhs_val = self.check_expr(&mut node.lhs)?;
        let lhs_ty = node.lhs.ty().cloned().expect("checked");
        if !lhs_ty.is_numeric() {
            return Err(self.report_type_error(TypeErrorKind::NonNumeric, "numeric", lhs_ty.to_string(), node.lhs.span()).into());
        }
        let lhs_bool = self.narrow_to_bool(lhs_val, &lhs_ty);

        let hint = if is_and { "andtmp" } else { "ortmp" };
        let slot = self.fb().alloca(IrType::I1, hint);
        self.fb().store(IrType::I1, lhs_bool.clone(), slot.clone());

        let rhs_block = self.fb().new_block(if is_and { "and.rhs" } else { "or.rhs" });
        let merge_block = self.fb().new_block(if is_and { "and.end" } else { "or.end" });
        let rhs_label = self.fb().block_label(rhs_block).to_string();
        let merge_label = self.fb().block_label(merge_block).to_string();

        let (then_label, else_label) = if is_and {
            (rhs_label, merge_label.clone())
        } else {
            (merge_label.clone(), rhs_label)
        };
        self.fb().terminate(Terminator::CondBr { cond: lhs_bool, then_label, else_label });

        self.fb().switch_to(rhs_block);
        let rhs_val = self.check_expr(&mut node.rhs)?;
        let rhs_ty = node.rhs.ty().cloned().expect("checked");
        if !rhs_ty.is_numeric() {
            return Err(self.report_type_error(TypeErrorKind::NonNumeric, "numeric", rhs_ty.to_string(), node.rhs.span()).into());
        }
        let rhs_bool = self.narrow_to_bool(rhs_val, &rhs_ty);
        self.fb().store(IrType::I1, rhs_bool, slot.clone());
        self.fb().terminate(Terminator::Br { target: merge_label });

        self.fb().switch_to(merge_block);
        let result = self.fb().load(IrType::I1, slot, if is_and { "and" } else { "or" });
        node.ty = Some(Type::Bool);
        Ok(result)
    }

    fn check_arith_or_cmp(&mut self, node: &mut Binary) -> SemaResult<Value> {
        let lhs_val = self.check_expr(&mut node.lhs)?;
        let rhs_val = self.check_expr(&mut node.rhs)?;
        let lhs_ty = node.lhs.ty().cloned().expect("checked");
        let rhs_ty = node.rhs.ty().cloned().expect("checked");
        let span = node.span;

        match node.op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                let common = lhs_ty
                    .common_numeric(&rhs_ty)
                    .ok_or_else(|| self.report_type_error(TypeErrorKind::NonNumeric, "numeric", format!("{}/{}", lhs_ty, rhs_ty), span))?;
                let lv = self.widen_value(lhs_val, &lhs_ty, &common, "lhs");
                let rv = self.widen_value(rhs_val, &rhs_ty, &common, "rhs");
                let (op_name, ir_ty) = match common {
                    Type::Float => (float_arith_op(node.op), IrType::Float),
                    _ => (int_arith_op(node.op), IrType::I32),
                };
                let result = self.fb().binary(op_name, ir_ty, lv, rv, "arith");
                node.ty = Some(common);
                Ok(result)
            }
            BinaryOp::Mod => {
                if lhs_ty != Type::Int || rhs_ty != Type::Int {
                    return Err(self.report_type_error(TypeErrorKind::ModFloat, "int", format!("{}/{}", lhs_ty, rhs_ty), span).into());
                }
                let result = self.fb().binary("srem", IrType::I32, lhs_val, rhs_val, "mod");
                node.ty = Some(Type::Int);
                Ok(result)
            }
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                let common = lhs_ty
                    .common_numeric(&rhs_ty)
                    .ok_or_else(|| self.report_type_error(TypeErrorKind::NonNumeric, "numeric", format!("{}/{}", lhs_ty, rhs_ty), span))?;
                let lv = self.widen_value(lhs_val, &lhs_ty, &common, "lhs");
                let rv = self.widen_value(rhs_val, &rhs_ty, &common, "rhs");
                let result = match common {
                    Type::Float => self.fb().fcmp(float_rel_pred(node.op), IrType::Float, lv, rv, "cmp"),
                    _ => self.fb().icmp(int_rel_pred(node.op), IrType::I32, lv, rv, "cmp"),
                };
                node.ty = Some(Type::Bool);
                Ok(result)
            }
            BinaryOp::Eq | BinaryOp::Ne => {
                if lhs_ty == Type::Bool && rhs_ty == Type::Bool {
                    let result = self.fb().icmp(int_rel_pred(node.op), IrType::I1, lhs_val, rhs_val, "cmp");
                    node.ty = Some(Type::Bool);
                    return Ok(result);
                }
                let common = lhs_ty
                    .common_numeric(&rhs_ty)
                    .ok_or_else(|| self.report_type_error(TypeErrorKind::NonNumeric, "numeric", format!("{}/{}", lhs_ty, rhs_ty), span))?;
                let lv = self.widen_value(lhs_val, &lhs_ty, &common, "lhs");
                let rv = self.widen_value(rhs_val, &rhs_ty, &common, "rhs");
                let result = match common {
                    Type::Float => self.fb().fcmp(float_rel_pred(node.op), IrType::Float, lv, rv, "cmp"),
                    _ => self.fb().icmp(int_rel_pred(node.op), IrType::I32, lv, rv, "cmp"),
                };
                node.ty = Some(Type::Bool);
                Ok(result)
            }
            BinaryOp::And | BinaryOp::Or => unreachable!("handled by check_logical"),
        }
    }

    // ---- shared coercion helpers ----------------------------------------

    fn narrow_to_bool(&mut self, val: Value, ty: &Type) -> Value {
        match ty {
            Type::Bool => val,
            Type::Int => self.fb().icmp("ne", IrType::I32, val, Value::ConstInt(0), "tobool"),
            Type::Float => self.fb().fcmp("une", IrType::Float, val, Value::ConstFloat(0.0), "tobool"),
            _ => unreachable!("narrow_to_bool is only called on a checked-numeric operand"),
        }
    }

    fn widen_value(&mut self, val: Value, from: &Type, to: &Type, hint: &str) -> Value {
        if from == to {
            return val;
        }
        match (from, to) {
            (Type::Bool, Type::Int) => self.fb().zext(IrType::I1, val, IrType::I32, hint),
            (Type::Bool, Type::Float) => {
                let widened = self.fb().zext(IrType::I1, val, IrType::I32, hint);
                self.fb().sitofp(IrType::I32, widened, IrType::Float, hint)
            }
            (Type::Int, Type::Float) => self.fb().sitofp(IrType::I32, val, IrType::Float, hint),
            _ => panic!("internal invariant violation: widen_value called on a non-widening pair {} -> {}", from, to),
        }
    }

    fn undeclared_error(&self, name: Symbol, span: Span) -> SemaError {
        let name_str = name.as_string();
        let visible = self.scopes.visible_names();
        let suggestion = suggest_closest(&name_str, visible.iter().map(|s| s.as_str())).map(|s| s.to_string());
        let err = ScopeError::Undeclared { name: name_str.clone(), span, suggestion: suggestion.clone() };

        // The bare "is not declared" message goes in the diagnostic body;
        // the suggestion rides in its own field so the renderer prints it
        // as a separate hint line instead of duplicating `err`'s own
        // suggestion-inclusive Display.
        let mut builder = DiagnosticBuilder::error(format!("`{}` is not declared", name_str))
            .code(DiagnosticCode::Scope)
            .span(span);
        if let Some(s) = suggestion {
            builder = builder.suggestion(s);
        }
        builder.emit(self.handler);

        err.into()
    }
}

fn zero_value(ty: &Type) -> Value {
    match ty {
        Type::Bool => Value::ConstBool(false),
        Type::Int => Value::ConstInt(0),
        Type::Float => Value::ConstFloat(0.0),
        Type::Void | Type::Array(..) => unreachable!("a function never returns Void or Array by value"),
    }
}

fn ir_type(ty: &Type) -> IrType {
    match ty {
        Type::Bool => IrType::I1,
        Type::Int => IrType::I32,
        Type::Float => IrType::Float,
        Type::Void => IrType::Void,
        Type::Array(elem, dims) => IrType::array_of(ir_type(elem), dims),
    }
}

/// Like [`ir_type`], but an array type decays to an opaque pointer — the
/// representation a parameter actually receives (§4.6).
fn param_ir_type(ty: &Type) -> IrType {
    match ty {
        Type::Array(..) => IrType::Ptr,
        other => ir_type(other),
    }
}

fn int_arith_op(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "add",
        BinaryOp::Sub => "sub",
        BinaryOp::Mul => "mul",
        BinaryOp::Div => "sdiv",
        _ => unreachable!(),
    }
}

fn float_arith_op(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "fadd",
        BinaryOp::Sub => "fsub",
        BinaryOp::Mul => "fmul",
        BinaryOp::Div => "fdiv",
        _ => unreachable!(),
    }
}

fn int_rel_pred(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Lt => "slt",
        BinaryOp::Le => "sle",
        BinaryOp::Gt => "sgt",
        BinaryOp::Ge => "sge",
        BinaryOp::Eq => "eq",
        BinaryOp::Ne => "ne",
        _ => unreachable!(),
    }
}

fn float_rel_pred(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Lt => "olt",
        BinaryOp::Le => "ole",
        BinaryOp::Gt => "ogt",
        BinaryOp::Ge => "oge",
        BinaryOp::Eq => "oeq",
        BinaryOp::Ne => "one",
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcc_par::Parser;
    use mcc_util::FileId;

    fn compile(source: &str) -> SemaResult<Module> {
        let handler = Handler::new();
        let mut parser = Parser::new(source, FileId(0), &handler);
        let mut program = parser.parse_program().expect("source must parse");
        analyze_and_emit(&mut program, "t.mc", &handler)
    }

    #[test]
    fn emits_addition_function() {
        let module = compile("int add(int a, int b) { return a + b; }").unwrap();
        let text = module.render();
        assert!(text.contains("define i32 @add(i32 %a, i32 %b)"));
        assert!(text.contains("add i32"));
        assert!(text.contains("ret i32"));
    }

    #[test]
    fn emits_iterative_factorial() {
        let source = "int fact(int n) { int r; r = 1; while (n > 0) { r = r * n; n = n - 1; } return r; }";
        let module = compile(source).unwrap();
        let text = module.render();
        assert!(text.contains("while.cond"));
        assert!(text.contains("while.body"));
        assert!(text.contains("while.end"));
        assert!(text.contains("icmp sgt i32"));
    }

    #[test]
    fn narrowing_assignment_is_rejected() {
        let err = compile("int f() { float x; int y; x = 1.0; y = x; return y; }").unwrap_err();
        assert!(matches!(err, SemaError::Type(TypeError { kind: TypeErrorKind::Narrowing, .. })));
    }

    #[test]
    fn undeclared_name_is_reported_with_a_suggestion() {
        let err = compile("int f() { int count; count = 1; return coutn; }").unwrap_err();
        match err {
            SemaError::Scope(ScopeError::Undeclared { name, suggestion, .. }) => {
                assert_eq!(name, "coutn");
                assert_eq!(suggestion.as_deref(), Some("count"));
            }
            other => panic!("expected an undeclared-name error, got {:?}", other),
        }
    }

    #[test]
    fn short_circuit_and_emits_rhs_into_its_own_block() {
        let module = compile("int f(int a, int b) { if (a > 0 && b > 0) { return 1; } return 0; }").unwrap();
        let text = module.render();
        assert!(text.contains("and.rhs"));
        assert!(text.contains("and.end"));
    }

    #[test]
    fn function_redefinition_is_rejected_distinctly_from_redeclaration() {
        let err = compile("int f() { return 0; } int f() { return 1; }").unwrap_err();
        assert!(matches!(err, SemaError::Scope(ScopeError::Redefinition { .. })));
    }

    #[test]
    fn call_argument_count_mismatch_is_a_type_error() {
        let source = "int add(int a, int b) { return a + b; } int main() { return add(1); }";
        let err = compile(source).unwrap_err();
        assert!(matches!(err, SemaError::Type(TypeError { kind: TypeErrorKind::ArgCount, .. })));
    }

    #[test]
    fn array_subscript_with_a_float_index_is_a_narrowing_error() {
        let source = "int f() { int a[10]; float i; i = 1.0; return a[i]; }";
        let err = compile(source).unwrap_err();
        assert!(matches!(err, SemaError::Type(TypeError { kind: TypeErrorKind::Narrowing, .. })));
    }

    #[test]
    fn negating_an_int_preserves_int_type() {
        let module = compile("int f(int a) { return -a; }").unwrap();
        let text = module.render();
        assert!(text.contains("sub i32 0,"));
        assert!(text.contains("ret i32"));
    }

    #[test]
    fn negating_a_float_preserves_float_type() {
        let module = compile("float f(float a) { return -a; }").unwrap();
        let text = module.render();
        assert!(text.contains("fsub float"));
        assert!(text.contains("ret float"));
    }

    #[test]
    fn negating_a_bool_widens_the_result_to_int() {
        // There is no `i1` subtraction: `-b` for a `bool b` computes in the
        // `Int` domain, so the deduced type must follow the register that
        // instruction actually defines, not the operand's declared type.
        let module = compile("int f() { bool b; int i; b = 1 == 1; i = -b; return i; }").unwrap();
        let text = module.render();
        assert!(text.contains("zext i1"));
        assert!(text.contains("sub i32 0,"));
        // A real narrowing bug here would store an i1-typed register into
        // an i32 slot without a zext, or vice versa - make sure the value
        // assigned to `i` is never stored as i1.
        assert!(!text.contains("store i1 %neg"));
    }

    #[test]
    fn global_array_subscript_emits_decay_zero_gep() {
        let source = "int b[10][10]; int f() { return b[2][3]; }";
        let module = compile(source).unwrap();
        let text = module.render();
        assert!(text.contains("getelementptr [10 x [10 x i32]], ptr @b, i32 0, i32 2, i32 3"));
    }
}
