//! Query dispatch state machine.
//!
//! Pure decision logic: the machine never awaits anything. `handle_query`
//! runs the returned commands and feeds the outcomes back as events.

use tracing::{debug, warn};

use crate::domains::triage::models::Intent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    Analyzing,
    /// Terminal: the user was asked where they are
    LocationPending,
    Classifying,
    RescueHandling,
    ResourceHandling,
    InformationHandling,
    LocalFallback,
    /// Terminal: a response was produced
    Done,
    /// Terminal: even the local protocol failed
    Failed,
}

impl QueryState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            QueryState::LocationPending | QueryState::Done | QueryState::Failed
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryEvent {
    Analyzed { awaiting_location: bool },
    Classified { intent: Intent },
    HandlerSucceeded,
    HandlerFailed { reason: String },
    FallbackSucceeded,
    FallbackFailed { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryCommand {
    RequestLocation,
    Classify,
    RunRescue,
    RunResource,
    RunInformation,
    RunFallback,
    ReportFatal,
}

/// Drives one query from analysis to a terminal state.
#[derive(Debug)]
pub struct QueryMachine {
    state: QueryState,
}

impl QueryMachine {
    pub fn new() -> Self {
        Self {
            state: QueryState::Analyzing,
        }
    }

    pub fn state(&self) -> QueryState {
        self.state
    }

    /// Apply an event. Returns the next command to run, or None once the
    /// machine has reached `Done`.
    pub fn decide(&mut self, event: &QueryEvent) -> Option<QueryCommand> {
        let (next, command) = match (self.state, event) {
            (QueryState::Analyzing, QueryEvent::Analyzed { awaiting_location: true }) => {
                (QueryState::LocationPending, Some(QueryCommand::RequestLocation))
            }
            (QueryState::Analyzing, QueryEvent::Analyzed { awaiting_location: false }) => {
                (QueryState::Classifying, Some(QueryCommand::Classify))
            }

            (QueryState::Classifying, QueryEvent::Classified { intent: Intent::Rescue }) => {
                (QueryState::RescueHandling, Some(QueryCommand::RunRescue))
            }
            (QueryState::Classifying, QueryEvent::Classified { intent: Intent::Resource }) => {
                (QueryState::ResourceHandling, Some(QueryCommand::RunResource))
            }
            (QueryState::Classifying, QueryEvent::Classified { intent: Intent::Information }) => {
                (QueryState::InformationHandling, Some(QueryCommand::RunInformation))
            }

            (
                QueryState::RescueHandling
                | QueryState::ResourceHandling
                | QueryState::InformationHandling,
                QueryEvent::HandlerSucceeded,
            ) => (QueryState::Done, None),
            (
                QueryState::RescueHandling
                | QueryState::ResourceHandling
                | QueryState::InformationHandling,
                QueryEvent::HandlerFailed { reason },
            ) => {
                warn!(reason = %reason, "Handler failed, switching to local protocol");
                (QueryState::LocalFallback, Some(QueryCommand::RunFallback))
            }

            (QueryState::LocalFallback, QueryEvent::FallbackSucceeded) => (QueryState::Done, None),
            (QueryState::LocalFallback, QueryEvent::FallbackFailed { reason }) => {
                warn!(reason = %reason, "Local protocol failed");
                (QueryState::Failed, Some(QueryCommand::ReportFatal))
            }

            (state, event) => {
                warn!(state = ?state, event = ?event, "Unexpected event, switching to local protocol");
                (QueryState::LocalFallback, Some(QueryCommand::RunFallback))
            }
        };

        debug!(from = ?self.state, to = ?next, command = ?command, "Query transition");
        self.state = next;
        command
    }
}

impl Default for QueryMachine {
    fn default() -> Self {
        Self::new()
    }
}
