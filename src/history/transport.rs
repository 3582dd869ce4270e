// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sseq-chart and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use tokio::sync::mpsc::UnboundedSender;

use super::actions::Command;

/// The ordered channel commands leave through.
pub trait Outbound {
    fn send(&mut self, command: Command) -> Result<(), TransportError>;
}

/// Records commands in memory.
impl Outbound for Vec<Command> {
    fn send(&mut self, command: Command) -> Result<(), TransportError> {
        self.push(command);
        Ok(())
    }
}

impl Outbound for UnboundedSender<Command> {
    fn send(&mut self, command: Command) -> Result<(), TransportError> {
        UnboundedSender::send(self, command).map_err(|_| TransportError::Closed)
    }
}

impl<O: Outbound + ?Sized> Outbound for &mut O {
    fn send(&mut self, command: Command) -> Result<(), TransportError> {
        (**self).send(command)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    Closed,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => f.write_str("outbound channel closed"),
        }
    }
}

impl std::error::Error for TransportError {}
