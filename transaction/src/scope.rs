//! Transaction scopes.
//!
//! A scope is either the top-level transaction (nesting index 0) or a
//! savepoint opened inside it. Each nested scope takes its parent's index
//! plus one, and its savepoint is named after that index, so names along one
//! active path never collide.

use crate::config::TransactionBehavior;
use crate::dialect::Dialect;
use crate::error::{TransactionError, TransactionResult};

/// Savepoint name for a nesting index.
pub fn savepoint_name(index: u32) -> String {
    format!("sp{}", index)
}

/// Scope state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeState {
    /// Opened and not yet terminated.
    Active,
    /// Terminated by COMMIT or RELEASE SAVEPOINT.
    Committed,
    /// Terminated by ROLLBACK or ROLLBACK TO SAVEPOINT.
    RolledBack,
}

impl ScopeState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ScopeState::Active)
    }
}

/// What kind of scope this is, and therefore which control SQL it issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The outermost transaction.
    TopLevel {
        behavior: Option<TransactionBehavior>,
    },
    /// A savepoint at the given nesting index (always >= 1).
    Nested { index: u32 },
}

impl ScopeKind {
    /// Nesting index: 0 for the top level.
    pub fn index(&self) -> u32 {
        match self {
            ScopeKind::TopLevel { .. } => 0,
            ScopeKind::Nested { index } => *index,
        }
    }

    /// The kind of a scope opened directly inside this one.
    pub fn child(&self) -> ScopeKind {
        ScopeKind::Nested {
            index: self.index() + 1,
        }
    }

    /// Savepoint name, for nested scopes.
    pub fn savepoint(&self) -> Option<String> {
        match self {
            ScopeKind::TopLevel { .. } => None,
            ScopeKind::Nested { index } => Some(savepoint_name(*index)),
        }
    }

    /// Statement that opens the scope.
    pub fn open_sql(&self, dialect: &dyn Dialect) -> TransactionResult<String> {
        match self {
            ScopeKind::TopLevel { behavior } => dialect.begin(*behavior),
            ScopeKind::Nested { index } => Ok(dialect.savepoint(&savepoint_name(*index))),
        }
    }

    /// Statement that terminates the scope successfully.
    pub fn commit_sql(&self, dialect: &dyn Dialect) -> String {
        match self {
            ScopeKind::TopLevel { .. } => dialect.commit(),
            ScopeKind::Nested { index } => dialect.release_savepoint(&savepoint_name(*index)),
        }
    }

    /// Statement that undoes the scope.
    pub fn rollback_sql(&self, dialect: &dyn Dialect) -> String {
        match self {
            ScopeKind::TopLevel { .. } => dialect.rollback(),
            ScopeKind::Nested { index } => dialect.rollback_to_savepoint(&savepoint_name(*index)),
        }
    }
}

/// One opened scope and its state.
#[derive(Debug, Clone)]
pub struct Scope {
    kind: ScopeKind,
    state: ScopeState,
}

impl Scope {
    /// Record a scope whose opening statement succeeded.
    pub fn opened(kind: ScopeKind) -> Self {
        Self {
            kind,
            state: ScopeState::Active,
        }
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn index(&self) -> u32 {
        self.kind.index()
    }

    pub fn state(&self) -> ScopeState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ScopeState::Active
    }

    /// Active → Committed.
    pub fn commit(&mut self) -> TransactionResult<()> {
        self.transition(ScopeState::Committed)
    }

    /// Active → RolledBack.
    pub fn roll_back(&mut self) -> TransactionResult<()> {
        self.transition(ScopeState::RolledBack)
    }

    fn transition(&mut self, to: ScopeState) -> TransactionResult<()> {
        if self.state != ScopeState::Active {
            return Err(TransactionError::illegal_transition(self.state, to));
        }
        self.state = to;
        Ok(())
    }
}
