//! Handle one emergency query end to end.

use futures::FutureExt;
use serde_json::json;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::domains::triage::activities::{analyze, classify, respond};
use crate::domains::triage::data::{FATAL_MESSAGE, LOCATION_PROMPT};
use crate::domains::triage::errors::{panic_message, HandlerError};
use crate::domains::triage::handlers::{handle_information, handle_rescue, handle_resource};
use crate::domains::triage::machines::{QueryCommand, QueryEvent, QueryMachine, QueryState};
use crate::domains::triage::models::{AgentResponse, InfoType, Intent, QueryInfo};
use crate::kernel::TriageDeps;

/// Answer a query. Always returns a response: handler failures go to the
/// local protocol, and if that fails too the static emergency message is
/// returned with `is_error` set.
pub async fn handle_query(text: &str, deps: &TriageDeps) -> AgentResponse {
    let request_id = Uuid::new_v4();
    let span = info_span!("handle_query", request_id = %request_id);

    async move {
        info!(chars = text.chars().count(), "Handling query");

        let response = match AssertUnwindSafe(drive(text.trim(), deps)).catch_unwind().await {
            Ok(response) => response,
            Err(payload) => {
                error!(reason = %panic_message(payload.as_ref()), "Query pipeline panicked");
                fatal_response()
            }
        };

        info!(
            info_type = response.info_type.as_str(),
            intent = response.intent.map(|i| i.as_str()),
            used_local_fallback = response.used_local_fallback,
            is_error = response.is_error,
            "Query handled"
        );
        response
    }
    .instrument(span)
    .await
}

async fn drive(query: &str, deps: &TriageDeps) -> AgentResponse {
    let mut machine = QueryMachine::new();
    let query_info = analyze(query, deps).await;
    let mut used_local = query_info.source.is_local();
    let mut classified: Option<Intent> = None;
    let mut response: Option<AgentResponse> = None;

    let mut next = machine.decide(&QueryEvent::Analyzed {
        awaiting_location: query_info.awaiting_location(),
    });

    while let Some(command) = next {
        next = match command {
            QueryCommand::RequestLocation => {
                deps.progress
                    .notify("orchestrator", "Requesting location from user");
                response = Some(location_request(&query_info));
                None
            }
            QueryCommand::Classify => {
                let decision = classify(query, &query_info, deps).await;
                used_local |= decision.source.is_local();
                classified = Some(decision.intent);
                machine.decide(&QueryEvent::Classified {
                    intent: decision.intent,
                })
            }
            QueryCommand::RunRescue => {
                let outcome = isolated(handle_rescue(query, &query_info, deps)).await;
                settle(outcome, &mut machine, &mut response)
            }
            QueryCommand::RunResource => {
                let outcome = isolated(handle_resource(query, &query_info, deps)).await;
                settle(outcome, &mut machine, &mut response)
            }
            QueryCommand::RunInformation => {
                let outcome = isolated(handle_information(query, &query_info, deps)).await;
                settle(outcome, &mut machine, &mut response)
            }
            QueryCommand::RunFallback => match respond(query, &query_info) {
                Ok(mut answer) => {
                    if let Some(intent) = classified {
                        answer.intent = Some(intent);
                    }
                    response = Some(answer);
                    machine.decide(&QueryEvent::FallbackSucceeded)
                }
                Err(e) => machine.decide(&QueryEvent::FallbackFailed {
                    reason: e.to_string(),
                }),
            },
            QueryCommand::ReportFatal => {
                response = Some(fatal_response());
                None
            }
        };
    }

    match response {
        Some(mut response) if machine.state() != QueryState::Failed => {
            response.used_local_fallback |= used_local;
            response
        }
        _ => fatal_response(),
    }
}

/// Run a handler, turning a panic into a `HandlerError`.
async fn isolated<F>(handler: F) -> Result<AgentResponse, HandlerError>
where
    F: Future<Output = Result<AgentResponse, HandlerError>>,
{
    AssertUnwindSafe(handler)
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(HandlerError::Panicked(panic_message(payload.as_ref()))))
}

fn settle(
    outcome: Result<AgentResponse, HandlerError>,
    machine: &mut QueryMachine,
    response: &mut Option<AgentResponse>,
) -> Option<QueryCommand> {
    match outcome {
        Ok(answer) => {
            *response = Some(answer);
            machine.decide(&QueryEvent::HandlerSucceeded)
        }
        Err(e) => {
            error!(error = %e, "Handler failed");
            machine.decide(&QueryEvent::HandlerFailed {
                reason: e.to_string(),
            })
        }
    }
}

fn location_request(query_info: &QueryInfo) -> AgentResponse {
    AgentResponse::new(InfoType::LocationRequest, LOCATION_PROMPT)
        .with_data(json!({
            "awaiting_location": true,
            "query_info": query_info,
        }))
        .with_intent(Intent::PendingLocation)
}

fn fatal_response() -> AgentResponse {
    let mut response = AgentResponse::new(InfoType::FatalError, FATAL_MESSAGE);
    response.is_error = true;
    response
}
