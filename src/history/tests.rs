// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sseq-chart and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::{fixture, rstest};
use tokio::sync::mpsc;

use super::{
    Action, Command, CommandError, CommandLog, LogState, Outbound, Recipient, SseqChoice,
    TransportError,
};

fn permanent(x: i32) -> Command {
    Command::new(
        [Recipient::Sseq, Recipient::Server],
        Action::AddPermanentClass {
            x,
            y: 0,
            class: vec![1],
        },
    )
}

fn block(block: bool) -> Command {
    Command::to_sseq(Action::BlockRefresh { block })
}

fn actions(commands: &[Command]) -> Vec<&Action> {
    commands.iter().map(|command| &command.action).collect()
}

#[fixture]
fn log() -> CommandLog<Vec<Command>> {
    CommandLog::new(SseqChoice::Main, Vec::new())
}

#[rstest]
fn send_stamps_and_records_keep_kinds(mut log: CommandLog<Vec<Command>>) {
    let mut unit = CommandLog::new(SseqChoice::Unit, Vec::new());
    unit.send(permanent(1), true).expect("send");
    assert_eq!(unit.outbound()[0].sseq, SseqChoice::Unit);
    assert_eq!(unit.history()[0].sseq, SseqChoice::Unit);

    log.send(
        Command::new([Recipient::Resolver], Action::Resolve { max_degree: 20 }),
        true,
    )
    .expect("send");
    log.send(permanent(2), false).expect("send");
    assert!(log.history().is_empty());
    assert_eq!(log.outbound().len(), 2);
}

#[rstest]
fn undo_clears_and_replays_remaining_history(mut log: CommandLog<Vec<Command>>) {
    log.send(permanent(1), true).expect("c1");
    log.send(permanent(2), true).expect("c2");
    log.outbound_mut().clear();

    let undone = log.undo().expect("undo").expect("something to undo");
    assert_eq!(undone.action, permanent(2).action);

    let clear = Action::Clear {};
    assert_eq!(
        actions(log.outbound()),
        vec![
            &block(true).action,
            &clear,
            &permanent(1).action,
            &block(false).action,
        ]
    );
    assert_eq!(log.outbound()[0].recipients, vec![Recipient::Sseq]);
    assert_eq!(log.outbound()[1].recipients, vec![Recipient::Sseq]);
    assert!(log.outbound().iter().all(|c| c.sseq == SseqChoice::Main));
    assert_eq!(actions(log.history()), vec![&permanent(1).action]);
    assert_eq!(actions(log.redo_stack()), vec![&permanent(2).action]);
    assert_eq!(log.state(), LogState::Idle);
}

#[rstest]
fn undo_on_empty_history_sends_nothing(mut log: CommandLog<Vec<Command>>) {
    assert!(log.undo().expect("undo").is_none());
    assert!(log.outbound().is_empty());
}

#[rstest]
fn redo_resends_with_logging(mut log: CommandLog<Vec<Command>>) {
    log.send(permanent(1), true).expect("c1");
    log.undo().expect("undo");
    log.outbound_mut().clear();

    let redone = log.redo().expect("redo").expect("something to redo");
    assert_eq!(redone.action, permanent(1).action);
    assert_eq!(actions(log.outbound()), vec![&permanent(1).action]);
    assert_eq!(log.history().len(), 1);
    assert!(log.redo_stack().is_empty());
    assert!(log.redo().expect("redo").is_none());
}

#[rstest]
fn fresh_logged_command_drops_redo_stack(mut log: CommandLog<Vec<Command>>) {
    log.send(permanent(1), true).expect("c1");
    log.send(permanent(2), true).expect("c2");
    log.undo().expect("undo");
    log.undo().expect("undo");
    assert_eq!(log.redo_stack().len(), 2);

    log.send(Command::to_sseq(Action::Resolve { max_degree: 5 }), true)
        .expect("unlogged kind");
    assert_eq!(log.redo_stack().len(), 2);

    log.send(permanent(3), true).expect("c3");
    assert!(log.redo_stack().is_empty());
}

#[rstest]
fn remove_history_item_drops_latest_equal_entry(mut log: CommandLog<Vec<Command>>) {
    log.send(permanent(1), true).expect("c1");
    log.send(permanent(2), true).expect("c2");
    log.send(permanent(1), true).expect("c1 again");
    log.outbound_mut().clear();

    assert!(log.remove_history_item(&permanent(1)).expect("remove"));
    assert_eq!(
        actions(log.history()),
        vec![&permanent(1).action, &permanent(2).action]
    );
    assert_eq!(log.outbound().len(), 5);

    log.outbound_mut().clear();
    assert!(!log.remove_history_item(&permanent(9)).expect("remove"));
    assert!(log.outbound().is_empty());
}

struct Broken;

impl Outbound for Broken {
    fn send(&mut self, _: Command) -> Result<(), TransportError> {
        Err(TransportError::Closed)
    }
}

#[test]
fn transport_failure_is_not_recorded() {
    let mut log = CommandLog::new(SseqChoice::Main, Broken);
    let err = log.send(permanent(1), true).unwrap_err();
    assert!(matches!(
        err,
        CommandError::Transport {
            source: TransportError::Closed
        }
    ));
    assert!(log.history().is_empty());
}

/// Accepts `budget` commands, then reports the channel closed.
struct Dropping {
    sent: Vec<Command>,
    budget: usize,
}

impl Outbound for Dropping {
    fn send(&mut self, command: Command) -> Result<(), TransportError> {
        if self.sent.len() == self.budget {
            return Err(TransportError::Closed);
        }
        self.sent.push(command);
        Ok(())
    }
}

// Two commands go out before the undo; the replay then sends block, clear, c1, unblock.
#[rstest]
#[case::before_block(2, LogState::Idle)]
#[case::after_block(3, LogState::Blocked)]
#[case::during_resend(4, LogState::Blocked)]
#[case::before_unblock(5, LogState::Blocked)]
fn interrupted_replay_reports_blocked_state(#[case] budget: usize, #[case] expected: LogState) {
    let outbound = Dropping {
        sent: Vec::new(),
        budget,
    };
    let mut log = CommandLog::new(SseqChoice::Main, outbound);
    log.send(permanent(1), true).expect("c1");
    log.send(permanent(2), true).expect("c2");

    assert!(log.undo().is_err());
    assert_eq!(log.state(), expected);

    log.outbound_mut().budget = usize::MAX;
    log.replay().expect("replay");
    assert_eq!(log.state(), LogState::Idle);
    assert_eq!(
        log.outbound().sent.last().map(|c| &c.action),
        Some(&Action::BlockRefresh { block: false })
    );
}

#[tokio::test]
async fn commands_flow_through_a_channel() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut log = CommandLog::new(SseqChoice::Unit, tx);
    log.send(permanent(1), true).expect("send");
    log.undo().expect("undo");

    let mut received = Vec::new();
    while let Ok(command) = rx.try_recv() {
        received.push(command.action);
    }
    assert_eq!(
        received,
        vec![
            permanent(1).action,
            Action::BlockRefresh { block: true },
            Action::Clear {},
            Action::BlockRefresh { block: false },
        ]
    );

    drop(rx);
    assert!(log.send(permanent(2), true).is_err());
}
