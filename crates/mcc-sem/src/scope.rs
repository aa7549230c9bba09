//! The lexical scope stack described in §4.4: a stack of mappings from
//! name to symbol entry. `lookup` walks top to bottom; `declare` inserts
//! into the top scope only. The global scope (index 0) additionally
//! enforces single declaration of every name across the whole program,
//! including a dedicated `Redefinition` error for a second function body.

use mcc_par::Type;
use mcc_util::{FxHashMap, Span, Symbol};

use crate::error::ScopeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Var,
    Array,
    Function,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Local,
    Global,
    Param,
}

/// `mcc_ir::Value` identifying where this symbol lives once its
/// declaration has been emitted: the `alloca`/global pointer for a
/// variable or array, or `None` for a function (calls address functions
/// by name, not by a loaded pointer).
#[derive(Debug, Clone)]
pub struct SymbolEntry {
    pub name: Symbol,
    pub kind: SymbolKind,
    pub ty: Type,
    pub storage: Storage,
    pub address: Option<mcc_ir::Value>,
    pub defined_at: Span,
    /// Parameter types, set only for `SymbolKind::Function` entries.
    pub params: Option<Vec<Type>>,
}

struct Scope {
    entries: FxHashMap<Symbol, SymbolEntry>,
}

impl Scope {
    fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }
}

pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    /// Starts with the global scope already pushed; it lives for the
    /// whole compile and is never popped.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    pub fn pop_scope(&mut self) {
        assert!(self.scopes.len() > 1, "the global scope must never be popped");
        self.scopes.pop();
    }

    pub fn is_global_scope(&self) -> bool {
        self.scopes.len() == 1
    }

    pub fn lookup(&self, name: Symbol) -> Option<&SymbolEntry> {
        self.scopes.iter().rev().find_map(|scope| scope.entries.get(&name))
    }

    pub fn lookup_global(&self, name: Symbol) -> Option<&SymbolEntry> {
        self.scopes[0].entries.get(&name)
    }

    /// All names visible anywhere in the current scope stack, innermost
    /// first — used to build "did you mean" suggestions.
    pub fn visible_names(&self) -> Vec<String> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.entries.keys().map(|s| s.as_string()))
            .collect()
    }

    pub fn declare(&mut self, entry: SymbolEntry) -> Result<(), ScopeError> {
        let top = self.scopes.last_mut().expect("scope stack is never empty");
        if let Some(existing) = top.entries.get(&entry.name) {
            let name = entry.name.as_string();
            if existing.kind == SymbolKind::Function && entry.kind == SymbolKind::Function {
                return Err(ScopeError::Redefinition {
                    name,
                    span: entry.defined_at,
                });
            }
            return Err(ScopeError::Redeclaration {
                name,
                span: entry.defined_at,
            });
        }
        top.entries.insert(entry.name, entry);
        Ok(())
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, kind: SymbolKind) -> SymbolEntry {
        SymbolEntry {
            name: Symbol::intern(name),
            kind,
            ty: Type::Int,
            storage: Storage::Local,
            address: None,
            defined_at: Span::DUMMY,
            params: None,
        }
    }

    #[test]
    fn lookup_finds_innermost_shadowing_entry() {
        let mut stack = ScopeStack::new();
        stack.declare(entry("x", SymbolKind::Var)).unwrap();
        stack.push_scope();
        stack.declare(entry("x", SymbolKind::Var)).unwrap();
        let found = stack.lookup(Symbol::intern("x")).unwrap();
        assert_eq!(found.storage, Storage::Local);
        stack.pop_scope();
        assert!(stack.lookup(Symbol::intern("x")).is_some());
    }

    #[test]
    fn redeclaration_in_same_scope_is_rejected() {
        let mut stack = ScopeStack::new();
        stack.declare(entry("x", SymbolKind::Var)).unwrap();
        let err = stack.declare(entry("x", SymbolKind::Var)).unwrap_err();
        assert!(matches!(err, ScopeError::Redeclaration { .. }));
    }

    #[test]
    fn shadowing_an_outer_scope_is_allowed() {
        let mut stack = ScopeStack::new();
        stack.declare(entry("x", SymbolKind::Var)).unwrap();
        stack.push_scope();
        assert!(stack.declare(entry("x", SymbolKind::Var)).is_ok());
    }

    #[test]
    fn second_function_body_is_a_redefinition_not_a_redeclaration() {
        let mut stack = ScopeStack::new();
        stack.declare(entry("f", SymbolKind::Function)).unwrap();
        let err = stack.declare(entry("f", SymbolKind::Function)).unwrap_err();
        assert!(matches!(err, ScopeError::Redefinition { .. }));
    }

    #[test]
    fn undeclared_name_is_simply_absent() {
        let stack = ScopeStack::new();
        assert!(stack.lookup(Symbol::intern("nope")).is_none());
    }
}
