// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command execution with undo/redo.

use crate::commands::CurveCommand;
use crate::error::{CommandError, Result};
use crate::history::{CurveChange, CurveSnapshot, History};
use crate::provider::CurveProvider;
use animtools_curve::CurveId;

/// Runs commands against a provider and records their changes
#[derive(Debug, Default)]
pub struct CommandRunner {
    history: History,
}

impl CommandRunner {
    /// Create a runner with the default history depth
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runner with a given history
    pub fn with_history(history: History) -> Self {
        Self { history }
    }

    /// Get the history
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Run a command.
    ///
    /// Curves the command touched are restored when it fails.
    pub fn run<C: CurveCommand + ?Sized>(
        &mut self,
        provider: &mut dyn CurveProvider,
        command: &C,
    ) -> Result<C::Output> {
        let curves = command.curves(&*provider)?;
        let before = snapshot(&*provider, &curves)?;

        let output = match command.execute(provider, &curves) {
            Ok(output) => output,
            Err(error) => {
                tracing::warn!(command = command.description(), %error, "Command failed, rolling back");
                for (_, snapshot) in &before {
                    provider.replace(snapshot.restore()?);
                }
                return Err(error);
            }
        };

        let mut group = self.history.begin_operation(command.description());
        for (id, before) in before {
            let curve = provider.curve(id).ok_or(CommandError::CurveNotFound(id))?;
            let after = CurveSnapshot::capture(curve)?;
            group.add_change(CurveChange {
                curve: id,
                before,
                after,
            });
        }
        let changed = group.count();
        if self.history.commit(group) {
            tracing::debug!(command = command.description(), curves = changed, "Recorded command");
        }

        Ok(output)
    }

    /// Undo the last command, returning its description
    pub fn undo(&mut self, provider: &mut dyn CurveProvider) -> Result<String> {
        let group = self.history.undo()?;
        for change in group.changes.iter().rev() {
            provider.replace(change.before.restore()?);
        }
        tracing::info!(command = %group.description, "Undo");
        Ok(group.description)
    }

    /// Redo the last undone command, returning its description
    pub fn redo(&mut self, provider: &mut dyn CurveProvider) -> Result<String> {
        let group = self.history.redo()?;
        for change in &group.changes {
            provider.replace(change.after.restore()?);
        }
        tracing::info!(command = %group.description, "Redo");
        Ok(group.description)
    }
}

fn snapshot(provider: &dyn CurveProvider, curves: &[CurveId]) -> Result<Vec<(CurveId, CurveSnapshot)>> {
    curves
        .iter()
        .map(|&id| -> Result<(CurveId, CurveSnapshot)> {
            let curve = provider.curve(id).ok_or(CommandError::CurveNotFound(id))?;
            Ok((id, CurveSnapshot::capture(curve)?))
        })
        .collect()
}
