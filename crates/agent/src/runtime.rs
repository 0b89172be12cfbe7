use std::collections::BTreeSet;

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use skydesk_core::catalog::FlightCatalog;
use skydesk_core::domain::flight::{FlightId, FlightRecord};
use skydesk_core::flows::{FlowAction, SessionEvent, SessionFlow, SessionMode};
use skydesk_core::operations::{book_flight, search_flights};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::conversation::{ConversationTurn, Transcript};
use crate::guardrails::{BookingContext, BookingDecision, BookingGuard};
use crate::interpreter::{BookFlightRequest, FindFlightsRequest, Intent};
use crate::llm::{CompletionMode, LlmClient};
use crate::prompts::{BOOKING_FAILED_DIRECTIVE, CLOSING_DIRECTIVE, NO_FLIGHTS_FOUND, SYSTEM_PROMPT};
use crate::response::AgentResponse;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FlightSummary {
    pub flight_id: FlightId,
    pub airline: String,
    pub flight_number: String,
    pub departure_time: NaiveTime,
    pub arrival_time: NaiveTime,
}

impl From<&FlightRecord> for FlightSummary {
    fn from(flight: &FlightRecord) -> Self {
        Self {
            flight_id: flight.id,
            airline: flight.airline.clone(),
            flight_number: flight.flight_number.clone(),
            departure_time: flight.departure_time,
            arrival_time: flight.arrival_time,
        }
    }
}

/// Structured echo of the most recent search. Empty until the first search.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SearchEcho {
    pub origin: String,
    pub destination: String,
    pub date: Option<NaiveDate>,
    pub flights: Vec<FlightSummary>,
}

impl SearchEcho {
    pub fn flight_ids(&self) -> Vec<FlightId> {
        self.flights.iter().map(|flight| flight.flight_id).collect()
    }
}

#[derive(Serialize)]
struct ListedFlight<'a> {
    id: FlightId,
    airline: &'a str,
    flight_number: &'a str,
}

/// One user's booking conversation against a flight catalog.
///
/// Turns are strictly sequential. The only suspension point is the model
/// call; its failures propagate out of [`AgentRuntime::converse`] untouched.
pub struct AgentRuntime<L> {
    llm: L,
    catalog: FlightCatalog,
    flow: SessionFlow,
    guard: BookingGuard,
    session_id: Uuid,
    transcript: Transcript,
    mode: SessionMode,
    last_search: SearchEcho,
    surfaced_flight_ids: BTreeSet<FlightId>,
}

impl<L> AgentRuntime<L>
where
    L: LlmClient,
{
    pub fn new(llm: L, catalog: FlightCatalog) -> Self {
        let flow = SessionFlow::new();
        let mode = flow.initial_mode();
        Self {
            llm,
            catalog,
            flow,
            guard: BookingGuard,
            session_id: Uuid::new_v4(),
            transcript: Transcript::with_system_prompt(SYSTEM_PROMPT),
            mode,
            last_search: SearchEcho::default(),
            surfaced_flight_ids: BTreeSet::new(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn conversation(&self) -> &[ConversationTurn] {
        self.transcript.turns()
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn is_done(&self) -> bool {
        self.mode.is_done()
    }

    pub fn last_search(&self) -> &SearchEcho {
        &self.last_search
    }

    pub fn surfaced_flight_ids(&self) -> &BTreeSet<FlightId> {
        &self.surfaced_flight_ids
    }

    pub fn catalog(&self) -> &FlightCatalog {
        &self.catalog
    }

    pub fn llm(&self) -> &L {
        &self.llm
    }

    pub fn into_catalog(self) -> FlightCatalog {
        self.catalog
    }

    /// Starts the transcript over from the system prompt. Mode, search
    /// history, and the catalog are kept.
    pub fn reset_conversation(&mut self) {
        self.transcript = Transcript::with_system_prompt(SYSTEM_PROMPT);
    }

    /// Prepares the runtime for the next benchmark step: a fresh transcript
    /// and the initial mode. Catalog seats and search history carry over so
    /// later steps observe earlier bookings.
    pub fn begin_benchmark_step(&mut self) {
        self.reset_conversation();
        self.mode = self.flow.initial_mode();
    }

    pub async fn converse(&mut self, user_message: &str) -> Result<AgentResponse> {
        info!(
            event_name = "agent.turn.started",
            session_id = %self.session_id,
            mode = ?self.mode,
            "conversation turn started"
        );
        self.transcript.push(ConversationTurn::user(user_message));

        if self.mode.is_done() {
            self.transcript.push(ConversationTurn::system(CLOSING_DIRECTIVE));
            self.transcript.push(ConversationTurn::user(user_message));
        }

        if self.mode.uses_natural_language() {
            let reply = self.complete(CompletionMode::Natural).await?;
            if self.mode == SessionMode::Prose {
                self.transition(SessionEvent::ProseReplyDelivered)?;
            }
            return Ok(AgentResponse::Text { text: reply });
        }

        let reply = self.complete(CompletionMode::Structured).await?;
        let response = match Intent::from_reply(&reply) {
            Intent::FindFlights(request) => self.find_flights(request, reply),
            Intent::BookFlight(request) => self.book(request, reply)?,
            Intent::None => AgentResponse::Text { text: reply },
            Intent::Unrecognized { action } => {
                debug!(
                    event_name = "agent.intent.unrecognized",
                    session_id = %self.session_id,
                    action = action.as_deref().unwrap_or("<missing>"),
                    "reply carried no known action"
                );
                AgentResponse::Text { text: reply }
            }
            Intent::Malformed { action, reason } => {
                warn!(
                    event_name = "agent.intent.malformed",
                    session_id = %self.session_id,
                    action,
                    reason = %reason,
                    "action payload rejected, answering with raw reply"
                );
                AgentResponse::Text { text: reply }
            }
        };

        info!(
            event_name = "agent.turn.finished",
            session_id = %self.session_id,
            response_kind = %response.kind(),
            mode = ?self.mode,
            "conversation turn finished"
        );
        Ok(response)
    }

    async fn complete(&mut self, mode: CompletionMode) -> Result<String> {
        let reply = self.llm.complete(self.transcript.turns(), mode).await?;
        self.transcript.push(ConversationTurn::assistant(reply.clone()));
        Ok(reply)
    }

    fn find_flights(&mut self, request: FindFlightsRequest, reply: String) -> AgentResponse {
        let flights = search_flights(
            &self.catalog,
            &request.origin,
            &request.destination,
            request.date,
        );

        let listed = flights
            .iter()
            .map(|flight| ListedFlight {
                id: flight.id,
                airline: &flight.airline,
                flight_number: &flight.flight_number,
            })
            .collect::<Vec<_>>();
        let listing = serde_json::to_string(&listed).unwrap_or_else(|_| "[]".to_string());
        let summaries = flights.iter().map(|flight| FlightSummary::from(*flight)).collect();

        self.transcript.push(ConversationTurn::assistant(format!("Available flights: {listing}")));
        self.last_search = SearchEcho {
            origin: request.origin,
            destination: request.destination,
            date: Some(request.date),
            flights: summaries,
        };

        let flight_ids = self.last_search.flight_ids();
        self.surfaced_flight_ids.extend(flight_ids.iter().copied());

        if flight_ids.is_empty() {
            return AgentResponse::FindFlights {
                text: NO_FLIGHTS_FOUND.to_string(),
                available_flight_ids: flight_ids,
            };
        }
        AgentResponse::FindFlights { text: reply, available_flight_ids: flight_ids }
    }

    fn book(&mut self, request: BookFlightRequest, reply: String) -> Result<AgentResponse> {
        let decision = self.guard.evaluate(
            &request,
            BookingContext {
                last_search_was_empty: self.last_search.flights.is_empty(),
                surfaced_flight_ids: &self.surfaced_flight_ids,
            },
        );

        match decision {
            BookingDecision::Abandon { reason_code, user_message } => {
                info!(
                    event_name = "agent.booking.abandoned",
                    session_id = %self.session_id,
                    reason_code,
                    "booking abandoned"
                );
                self.transition(SessionEvent::BookingAbandoned)?;
                Ok(AgentResponse::BookFlight { text: user_message, booked_flight_id: None })
            }
            BookingDecision::Reject { reason_code, flight_id, user_message } => {
                warn!(
                    event_name = "agent.booking.rejected",
                    session_id = %self.session_id,
                    flight_id = %flight_id,
                    reason_code,
                    "booking rejected"
                );
                self.transition(SessionEvent::BookingConcluded)?;
                Ok(AgentResponse::BookFlight { text: user_message, booked_flight_id: None })
            }
            BookingDecision::Allow { flight_id } => {
                let booked_flight_id = book_flight(&mut self.catalog, flight_id);
                info!(
                    event_name = "agent.booking.completed",
                    session_id = %self.session_id,
                    flight_id = %flight_id,
                    booked = booked_flight_id.is_some(),
                    "booking attempt resolved"
                );
                self.transition(SessionEvent::BookingConcluded)?;
                Ok(AgentResponse::BookFlight { text: reply, booked_flight_id })
            }
        }
    }

    fn transition(&mut self, event: SessionEvent) -> Result<()> {
        let outcome = self.flow.apply(&self.mode, &event)?;
        for action in &outcome.actions {
            match action {
                FlowAction::InjectBookingFailedDirective => {
                    self.transcript.push(ConversationTurn::system(BOOKING_FAILED_DIRECTIVE));
                }
                FlowAction::MarkTransactionDone => {
                    debug!(
                        event_name = "agent.session.closed",
                        session_id = %self.session_id,
                        "transaction closed for this session"
                    );
                }
            }
        }
        self.mode = outcome.to;
        Ok(())
    }
}
