//! Data bridge — forwards view-engine state into the action queue.
//!
//! Runs as a background task. Validates the connection once, pushes each
//! view's current state so screens paint immediately, then forwards every
//! state publication as an [`Action`] until cancelled.

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use caseflow_core::{GrievanceTicket, Household, Individual, ListState, PaymentPlan, Session};

use crate::action::{Action, Notification};

/// State receivers for every open view.
///
/// Program-scoped registries are `None` when the session has no program;
/// their screens render a hint instead of a table.
pub struct ViewChannels {
    pub grievances: watch::Receiver<ListState<GrievanceTicket>>,
    pub households: Option<watch::Receiver<ListState<Household>>>,
    pub individuals: Option<watch::Receiver<ListState<Individual>>>,
    pub payment_plans: Option<watch::Receiver<ListState<PaymentPlan>>>,
}

pub async fn run_data_bridge(
    session: Session,
    mut channels: ViewChannels,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    // One server-info round trip up front so credential problems show in
    // the status bar instead of as four identical fetch failures.
    match session.connect().await {
        Ok(info) => {
            let _ = action_tx.send(Action::Connected {
                version: info.version,
                environment: info.environment,
            });
        }
        Err(e) => {
            warn!(error = %e, "server-info round trip failed");
            let _ = action_tx.send(Action::ConnectionFailed(e.to_string()));
            let _ = action_tx.send(Action::Notify(Notification::error(format!(
                "Connection failed: {e}"
            ))));
        }
    }

    // Initial snapshots: the engines publish before the first render, and
    // watch receivers only wake on changes after that.
    let _ = action_tx.send(Action::GrievancesState(
        channels.grievances.borrow_and_update().clone(),
    ));
    if let Some(rx) = channels.households.as_mut() {
        let _ = action_tx.send(Action::HouseholdsState(rx.borrow_and_update().clone()));
    }
    if let Some(rx) = channels.individuals.as_mut() {
        let _ = action_tx.send(Action::IndividualsState(rx.borrow_and_update().clone()));
    }
    if let Some(rx) = channels.payment_plans.as_mut() {
        let _ = action_tx.send(Action::PaymentPlansState(rx.borrow_and_update().clone()));
    }

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            res = channels.grievances.changed() => match res {
                Ok(()) => {
                    let state = channels.grievances.borrow_and_update().clone();
                    let _ = action_tx.send(Action::GrievancesState(state));
                }
                // Sender gone means the view was dropped; we're done.
                Err(_) => break,
            },

            res = changed(&mut channels.households) => match res {
                Ok(()) => {
                    if let Some(rx) = channels.households.as_mut() {
                        let _ = action_tx.send(Action::HouseholdsState(rx.borrow_and_update().clone()));
                    }
                }
                Err(_) => channels.households = None,
            },

            res = changed(&mut channels.individuals) => match res {
                Ok(()) => {
                    if let Some(rx) = channels.individuals.as_mut() {
                        let _ = action_tx.send(Action::IndividualsState(rx.borrow_and_update().clone()));
                    }
                }
                Err(_) => channels.individuals = None,
            },

            res = changed(&mut channels.payment_plans) => match res {
                Ok(()) => {
                    if let Some(rx) = channels.payment_plans.as_mut() {
                        let _ = action_tx.send(Action::PaymentPlansState(rx.borrow_and_update().clone()));
                    }
                }
                Err(_) => channels.payment_plans = None,
            },
        }
    }

    debug!("data bridge stopped");
}

/// `changed()` over an optional receiver; absent receivers never wake.
async fn changed<T>(
    rx: &mut Option<watch::Receiver<ListState<T>>>,
) -> Result<(), watch::error::RecvError> {
    match rx.as_mut() {
        Some(rx) => rx.changed().await,
        None => std::future::pending().await,
    }
}
