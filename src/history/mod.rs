// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sseq-chart and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Undoable command log.
//!
//! Mutating commands are recorded before they leave for the computing side. Undo does not invert
//! anything: it clears the remote chart and resends the remaining history, so the remote side
//! must produce the same chart for the same command sequence.

pub mod actions;
pub mod transport;

#[cfg(test)]
mod tests;

use std::fmt;

use tracing::{debug, debug_span, warn};

pub use actions::{Action, Command, ProductType, Recipient, SseqChoice};
pub use transport::{Outbound, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogState {
    Idle,
    /// `BlockRefresh(true)` went out and the matching `BlockRefresh(false)` did not.
    Blocked,
}

#[derive(Debug)]
pub struct CommandLog<O> {
    sseq: SseqChoice,
    outbound: O,
    history: Vec<Command>,
    redo: Vec<Command>,
    state: LogState,
}

impl<O: Outbound> CommandLog<O> {
    pub fn new(sseq: SseqChoice, outbound: O) -> Self {
        Self {
            sseq,
            outbound,
            history: Vec::new(),
            redo: Vec::new(),
            state: LogState::Idle,
        }
    }

    pub fn sseq(&self) -> SseqChoice {
        self.sseq
    }

    pub fn history(&self) -> &[Command] {
        &self.history
    }

    pub fn redo_stack(&self) -> &[Command] {
        &self.redo
    }

    pub fn state(&self) -> LogState {
        self.state
    }

    pub fn outbound(&self) -> &O {
        &self.outbound
    }

    pub fn outbound_mut(&mut self) -> &mut O {
        &mut self.outbound
    }

    pub fn into_outbound(self) -> O {
        self.outbound
    }

    /// Stamps `command` with this log's stream and forwards it. Mutating actions are recorded
    /// when `log` is set, which also invalidates the redo stack.
    pub fn send(&mut self, command: Command, log: bool) -> Result<(), CommandError> {
        let recorded = self.forward(command, log)?;
        if recorded {
            self.redo.clear();
        }
        Ok(())
    }

    /// Undoes the most recent logged command. Returns it, or `None` when the history is empty.
    pub fn undo(&mut self) -> Result<Option<Command>, CommandError> {
        let Some(command) = self.history.pop() else {
            return Ok(None);
        };
        debug!(action = command.action.name(), "undo");
        self.redo.push(command.clone());
        self.replay()?;
        Ok(Some(command))
    }

    /// Re-sends the most recently undone command.
    pub fn redo(&mut self) -> Result<Option<Command>, CommandError> {
        let Some(command) = self.redo.pop() else {
            return Ok(None);
        };
        debug!(action = command.action.name(), "redo");
        self.forward(command.clone(), true)?;
        Ok(Some(command))
    }

    /// Drops the most recent history entry equal to `command` and rebuilds the remote chart
    /// without it. Returns whether an entry was found.
    pub fn remove_history_item(&mut self, command: &Command) -> Result<bool, CommandError> {
        let Some(position) = self
            .history
            .iter()
            .rposition(|entry| same_entry(entry, command))
        else {
            return Ok(false);
        };
        self.history.remove(position);
        self.replay()?;
        Ok(true)
    }

    /// Clears the remote chart and resends the whole history with logging disabled.
    ///
    /// Once `BlockRefresh(true)` is out the log stays [`LogState::Blocked`] until
    /// `BlockRefresh(false)` has been sent, so a failed replay leaves it blocked. The next
    /// successful replay returns it to idle.
    pub fn replay(&mut self) -> Result<(), CommandError> {
        let span = debug_span!("replay", sseq = ?self.sseq, commands = self.history.len());
        let _entered = span.enter();

        self.block(true)?;
        self.state = LogState::Blocked;
        if let Err(err) = self.resend_history().and_then(|()| self.block(false)) {
            warn!(error = %err, "replay interrupted, remote refresh left blocked");
            return Err(err);
        }
        self.state = LogState::Idle;
        Ok(())
    }

    fn resend_history(&mut self) -> Result<(), CommandError> {
        self.forward(Command::to_sseq(Action::Clear {}), false)?;
        for command in self.history.clone() {
            self.forward(command, false)?;
        }
        Ok(())
    }

    fn block(&mut self, block: bool) -> Result<(), CommandError> {
        self.forward(Command::to_sseq(Action::BlockRefresh { block }), false)?;
        Ok(())
    }

    fn forward(&mut self, mut command: Command, log: bool) -> Result<bool, CommandError> {
        command.sseq = self.sseq;
        let entry = (log && command.action.is_logged()).then(|| command.clone());
        self.outbound
            .send(command)
            .map_err(|source| CommandError::Transport { source })?;
        let recorded = entry.is_some();
        if let Some(entry) = entry {
            self.history.push(entry);
        }
        Ok(recorded)
    }
}

// The stamp is ignored: every entry carries this log's stream.
fn same_entry(entry: &Command, other: &Command) -> bool {
    entry.action == other.action && entry.recipients == other.recipients
}

#[derive(Debug)]
pub enum CommandError {
    Transport { source: TransportError },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { source } => write!(f, "failed to send command: {source}"),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport { source } => Some(source),
        }
    }
}
