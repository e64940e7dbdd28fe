//! Routes console commands to the controller and renders controller events.

use std::sync::Arc;

use client_core::{ControllerEvent, OrderDetailPresenter, UiController};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use crate::commands::{ConsoleCommand, USAGE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Continue,
    Quit,
}

/// Operations are spawned rather than awaited so the prompt stays responsive
/// and several requests can be outstanding at once.
pub fn dispatch_console_command(controller: &Arc<UiController>, cmd: ConsoleCommand) -> Dispatch {
    debug!(command = cmd.name(), "console: dispatching command");
    match cmd {
        ConsoleCommand::List => {
            let controller = controller.clone();
            tokio::spawn(async move {
                let ids = controller.order_ids().await;
                println!("{}", controller.presenter().render_list(&ids));
            });
        }
        ConsoleCommand::Fetch { id } => {
            let controller = controller.clone();
            tokio::spawn(async move {
                let _ = controller.fetch(&id).await;
            });
        }
        ConsoleCommand::Create => {
            let controller = controller.clone();
            tokio::spawn(async move {
                let _ = controller.create().await;
            });
        }
        ConsoleCommand::Delete { id } => {
            let controller = controller.clone();
            tokio::spawn(async move {
                let _ = controller.delete(&id).await;
            });
        }
        ConsoleCommand::Help => println!("{USAGE}"),
        ConsoleCommand::Quit => return Dispatch::Quit,
        ConsoleCommand::Empty => {}
        ConsoleCommand::Unknown(verb) => println!("unknown command '{verb}'\n{USAGE}"),
    }
    Dispatch::Continue
}

pub fn render_event(presenter: &OrderDetailPresenter, event: &ControllerEvent) -> Option<String> {
    match event {
        ControllerEvent::ListChanged(ids) => Some(presenter.render_list(ids)),
        ControllerEvent::DetailChanged(view) => Some(view.to_string()),
        ControllerEvent::Notice(notice) => Some(format!("! {notice}")),
        ControllerEvent::OperationStateChanged { .. } => None,
    }
}

pub async fn run_renderer(
    mut events: broadcast::Receiver<ControllerEvent>,
    presenter: OrderDetailPresenter,
) {
    loop {
        match events.recv().await {
            Ok(event) => {
                if let ControllerEvent::OperationStateChanged { operation, phase } = &event {
                    debug!(operation = operation.name(), ?phase, "console: operation state");
                }
                if let Some(text) = render_event(&presenter, &event) {
                    println!("{}", text.trim_end());
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "console: renderer fell behind controller events");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
#[path = "tests/orchestration_tests.rs"]
mod tests;
