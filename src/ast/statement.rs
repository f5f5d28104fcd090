//! Statement and statement-block representation.
//!
//! A [`Statement`] assigns the value of an expression to an lvalue-capable target;
//! a [`StatementBlock`] is the append-only ordered sequence of statements that makes
//! up one generated program. Post-processing passes rewrite blocks wholesale but the
//! public surface only ever appends.

use std::fmt;

use crate::{ast::ExprRef, Error, Result};

/// An assignment of an expression value to a storage location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    target: ExprRef,
    value: ExprRef,
}

impl Statement {
    /// Creates an assignment statement.
    ///
    /// # Arguments
    ///
    /// * `target` - The storage location written; must be a variable or an array
    ///   element access.
    /// * `value` - The expression whose value is stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAssignmentTarget`] if `target` is not lvalue-capable.
    pub fn assign(target: ExprRef, value: ExprRef) -> Result<Self> {
        if !target.is_lvalue() {
            return Err(Error::InvalidAssignmentTarget);
        }
        Ok(Self { target, value })
    }

    /// Returns the assignment target.
    #[must_use]
    pub fn target(&self) -> &ExprRef {
        &self.target
    }

    /// Returns the assigned value expression.
    #[must_use]
    pub fn value(&self) -> &ExprRef {
        &self.value
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {};", self.target, self.value)
    }
}

/// An ordered sequence of statements forming one generated program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementBlock {
    statements: Vec<Statement>,
}

impl StatementBlock {
    /// Creates an empty block.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a statement to the block.
    pub fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    /// Returns the statements in execution order.
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Returns the number of statements in the block.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Checks if the block contains no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Replaces the block contents; reserved for the post-processing passes,
    /// which rewrite a whole program while preserving its semantics.
    pub(crate) fn replace(&mut self, statements: Vec<Statement>) {
        self.statements = statements;
    }
}

impl From<Vec<Statement>> for StatementBlock {
    fn from(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

impl fmt::Display for StatementBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{statement}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a StatementBlock {
    type Item = &'a Statement;
    type IntoIter = std::slice::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}
