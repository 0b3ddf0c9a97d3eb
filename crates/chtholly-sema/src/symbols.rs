//! Symbol table: lexical scopes, per-binding ownership state and borrow
//! accounting.
//!
//! Each scope frame maps names to [`Symbol`] records and remembers which
//! bindings had borrows taken inside the frame, so that leaving the scope
//! restores the accountants of bindings living further out. The table is
//! single-threaded and owned exclusively by the analyzer.

use std::collections::HashMap;

use crate::lifetime::Lifetime;
use crate::registry::TypeId;

/// What a name is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
    Struct,
    Class,
    Enum,
}

/// Ownership state of a binding. `Moved` is one-way within a scope; the
/// binding disappears entirely when its scope exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipState {
    Valid,
    Moved,
}

/// Per-binding borrow accountant.
///
/// Invariants (enforced at borrow sites, restored on scope exit):
/// `mutable_borrowed` implies `shared_count == 0`, and a positive
/// `shared_count` implies `!mutable_borrowed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BorrowState {
    pub shared_count: u32,
    pub mutable_borrowed: bool,
}

impl BorrowState {
    pub fn is_borrowed(&self) -> bool {
        self.shared_count > 0 || self.mutable_borrowed
    }
}

/// One named binding.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub ty: TypeId,
    pub mutable: bool,
    pub state: OwnershipState,
    pub borrows: BorrowState,
    pub lifetime: Lifetime,
}

impl Symbol {
    /// A variable binding, Valid on creation.
    pub fn variable(name: &str, ty: TypeId, mutable: bool, lifetime: Lifetime) -> Self {
        Self {
            name: name.to_string(),
            kind: SymbolKind::Variable,
            ty,
            mutable,
            state: OwnershipState::Valid,
            borrows: BorrowState::default(),
            lifetime,
        }
    }

    /// A non-variable binding (function, struct, class, enum); these never
    /// move and are never borrowed.
    pub fn item(name: &str, kind: SymbolKind, ty: TypeId, lifetime: Lifetime) -> Self {
        Self {
            name: name.to_string(),
            kind,
            ty,
            mutable: false,
            state: OwnershipState::Valid,
            borrows: BorrowState::default(),
            lifetime,
        }
    }
}

struct Scope {
    symbols: HashMap<String, Symbol>,
    /// Borrows taken while this scope was innermost: (target name, mutable).
    /// Released when the scope exits.
    borrowed: Vec<(String, bool)>,
}

impl Scope {
    fn new() -> Self {
        Self {
            symbols: HashMap::new(),
            borrowed: Vec::new(),
        }
    }
}

/// Stack of lexical scopes.
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Starts with the global scope open.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new()],
        }
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    /// Pop the innermost scope, dropping its bindings and releasing every
    /// borrow it took on bindings that survive it.
    pub fn leave_scope(&mut self) {
        let Some(dying) = self.scopes.pop() else {
            return;
        };
        for (name, mutable) in dying.borrowed {
            // Targets living in the dying scope are gone; nothing to restore.
            if let Some(symbol) = self.lookup_mut(&name) {
                if mutable {
                    symbol.borrows.mutable_borrowed = false;
                } else {
                    symbol.borrows.shared_count = symbol.borrows.shared_count.saturating_sub(1);
                }
            }
        }
    }

    /// Insert into the innermost scope; false if the name is taken there.
    pub fn define(&mut self, symbol: Symbol) -> bool {
        let scope = self.scopes.last_mut().expect("global scope always present");
        if scope.symbols.contains_key(&symbol.name) {
            return false;
        }
        scope.symbols.insert(symbol.name.clone(), symbol);
        true
    }

    /// Innermost-outwards search.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.symbols.get(name))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.symbols.get_mut(name))
    }

    pub fn is_defined_in_current_scope(&self, name: &str) -> bool {
        self.scopes
            .last()
            .map(|scope| scope.symbols.contains_key(name))
            .unwrap_or(false)
    }

    /// Record that the innermost scope took a borrow on `name`, so the
    /// accountant can be restored when the scope exits.
    pub fn record_borrow(&mut self, name: &str, mutable: bool) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.borrowed.push((name.to_string(), mutable));
        }
    }

    /// Number of open scopes (the global scope counts).
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}
