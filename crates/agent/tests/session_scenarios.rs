mod common;

use common::{
    runtime, seats, BOOK_11, BOOK_7, BOOK_9, BOOK_NONE, FIND_FROM_JFK, FIND_LAX_JFK, FIND_NOTHING,
};
use pretty_assertions::assert_eq;
use skydesk_agent::prompts::{
    BOOKING_FAILED_DIRECTIVE, CLOSING_DIRECTIVE, FLIGHT_NOT_AVAILABLE, INVALID_FLIGHT,
    NO_FLIGHTS_FOUND,
};
use skydesk_agent::{AgentResponse, CompletionMode, ConversationTurn, Role};
use skydesk_core::{FlightId, SessionMode};

#[tokio::test]
async fn search_then_book_decrements_the_seat_and_closes_the_session() {
    let mut agent = runtime(&[FIND_LAX_JFK, BOOK_7, "Enjoy your trip!"]);

    let found = agent.converse("Flights from LA to New York on May 1?").await.expect("turn 1");
    assert_eq!(
        found,
        AgentResponse::FindFlights {
            text: FIND_LAX_JFK.to_string(),
            available_flight_ids: vec![FlightId(7)],
        }
    );
    assert_eq!(found.display(), "[7]");

    let booked = agent.converse("Book it").await.expect("turn 2");
    assert_eq!(
        booked,
        AgentResponse::BookFlight { text: BOOK_7.to_string(), booked_flight_id: Some(FlightId(7)) }
    );
    assert_eq!(booked.display(), "7");
    assert_eq!(seats(&agent, 7), Some(0));
    assert!(agent.is_done());

    let closing = agent.converse("Thanks").await.expect("turn 3");
    assert_eq!(closing, AgentResponse::Text { text: "Enjoy your trip!".to_string() });
    assert_eq!(
        agent.llm().modes(),
        vec![CompletionMode::Structured, CompletionMode::Structured, CompletionMode::Natural]
    );
}

#[tokio::test]
async fn booking_a_sold_out_flight_yields_null_and_still_closes() {
    let mut first = runtime(&[FIND_LAX_JFK, BOOK_7]);
    first.converse("find").await.expect("search");
    first.converse("book").await.expect("book");
    let catalog = first.into_catalog();

    let mut second = skydesk_agent::AgentRuntime::new(
        skydesk_agent::ScriptedLlmClient::new([FIND_LAX_JFK, BOOK_7]),
        catalog,
    );
    second.converse("find").await.expect("search");
    let response = second.converse("book").await.expect("book");

    assert_eq!(
        response,
        AgentResponse::BookFlight { text: BOOK_7.to_string(), booked_flight_id: None }
    );
    assert_eq!(second.catalog().find(FlightId(7)).map(|f| f.available_seats), Some(0));
    assert!(second.is_done());
}

#[tokio::test]
async fn wildcard_destination_surfaces_every_departure_from_origin() {
    let mut agent = runtime(&[FIND_FROM_JFK]);

    let response = agent.converse("Anything out of JFK on May 1?").await.expect("turn");
    assert_eq!(
        response,
        AgentResponse::FindFlights {
            text: FIND_FROM_JFK.to_string(),
            available_flight_ids: vec![FlightId(8), FlightId(9)],
        }
    );
    assert_eq!(agent.last_search().flight_ids(), vec![FlightId(8), FlightId(9)]);
    assert_eq!(agent.last_search().destination, "Any");
}

#[tokio::test]
async fn empty_search_uses_fixed_message_instead_of_model_text() {
    let mut agent = runtime(&[FIND_NOTHING]);

    let response = agent.converse("Seattle to Miami May 1").await.expect("turn");
    assert_eq!(
        response,
        AgentResponse::FindFlights {
            text: NO_FLIGHTS_FOUND.to_string(),
            available_flight_ids: Vec::new(),
        }
    );
    assert_eq!(response.display(), "[]");
}

#[tokio::test]
async fn search_appends_listing_for_the_model() {
    let mut agent = runtime(&[FIND_LAX_JFK]);
    agent.converse("find").await.expect("turn");

    let last = agent.conversation().last().expect("listing turn");
    assert_eq!(last.role, Role::Assistant);
    assert_eq!(
        last.content,
        r#"Available flights: [{"id":7,"airline":"United","flight_number":"UA 7"}]"#
    );
}

#[tokio::test]
async fn booking_an_id_never_surfaced_is_rejected_and_closes() {
    let mut agent = runtime(&[FIND_LAX_JFK, BOOK_11, "Sorry about that."]);
    agent.converse("find").await.expect("search");

    let response = agent.converse("book flight 11").await.expect("book");
    assert_eq!(
        response,
        AgentResponse::BookFlight { text: INVALID_FLIGHT.to_string(), booked_flight_id: None }
    );
    assert_eq!(seats(&agent, 11), Some(3));
    assert_eq!(agent.mode(), SessionMode::Closed);

    let after = agent.converse("why?").await.expect("after");
    assert!(matches!(after, AgentResponse::Text { .. }));
}

#[tokio::test]
async fn ids_from_earlier_searches_stay_bookable() {
    let mut agent = runtime(&[FIND_FROM_JFK, FIND_LAX_JFK, BOOK_9]);
    agent.converse("from JFK").await.expect("search 1");
    agent.converse("LAX to JFK").await.expect("search 2");

    let response = agent.converse("book 9").await.expect("book");
    assert_eq!(
        response,
        AgentResponse::BookFlight { text: BOOK_9.to_string(), booked_flight_id: Some(FlightId(9)) }
    );
    assert_eq!(seats(&agent, 9), Some(1));
}

#[tokio::test]
async fn booking_after_empty_search_gets_one_prose_reply_then_resumes() {
    let mut agent = runtime(&[
        FIND_FROM_JFK,
        FIND_NOTHING,
        BOOK_9,
        "Please refresh.",
        FIND_LAX_JFK,
        BOOK_7,
    ]);
    agent.converse("from JFK").await.expect("search 1");
    agent.converse("Seattle to Miami").await.expect("search 2");

    let response = agent.converse("book 9").await.expect("book");
    assert_eq!(
        response,
        AgentResponse::BookFlight {
            text: FLIGHT_NOT_AVAILABLE.to_string(),
            booked_flight_id: None,
        }
    );
    assert_eq!(seats(&agent, 9), Some(2));
    assert_eq!(agent.mode(), SessionMode::Prose);
    assert!(!agent.is_done());
    assert_eq!(
        agent.conversation().last(),
        Some(&ConversationTurn::system(BOOKING_FAILED_DIRECTIVE))
    );

    let next = agent.converse("can I book another?").await.expect("prose turn");
    assert_eq!(next, AgentResponse::Text { text: "Please refresh.".to_string() });
    assert_eq!(agent.llm().modes().last(), Some(&CompletionMode::Natural));
    assert!(!agent.conversation().iter().any(|turn| turn.content == CLOSING_DIRECTIVE));
    assert_eq!(agent.mode(), SessionMode::Normal);

    let searched = agent.converse("LA to New York then").await.expect("search 3");
    assert_eq!(
        searched,
        AgentResponse::FindFlights {
            text: FIND_LAX_JFK.to_string(),
            available_flight_ids: vec![FlightId(7)],
        }
    );
    let booked = agent.converse("book 7").await.expect("book again");
    assert_eq!(
        booked,
        AgentResponse::BookFlight { text: BOOK_7.to_string(), booked_flight_id: Some(FlightId(7)) }
    );
    assert_eq!(seats(&agent, 7), Some(0));
    assert_eq!(agent.mode(), SessionMode::Closed);
    assert_eq!(
        agent.llm().modes(),
        vec![
            CompletionMode::Structured,
            CompletionMode::Structured,
            CompletionMode::Structured,
            CompletionMode::Natural,
            CompletionMode::Structured,
            CompletionMode::Structured,
        ]
    );
}

#[tokio::test]
async fn booking_before_any_search_is_abandoned() {
    let mut agent = runtime(&[BOOK_7]);

    let response = agent.converse("book flight 7").await.expect("book");
    assert_eq!(
        response,
        AgentResponse::BookFlight {
            text: FLIGHT_NOT_AVAILABLE.to_string(),
            booked_flight_id: None,
        }
    );
    assert_eq!(seats(&agent, 7), Some(1));
}

#[tokio::test]
async fn missing_flight_id_is_abandoned() {
    let mut agent = runtime(&[FIND_LAX_JFK, BOOK_NONE]);
    agent.converse("find").await.expect("search");

    let response = agent.converse("book one").await.expect("book");
    assert_eq!(
        response,
        AgentResponse::BookFlight {
            text: FLIGHT_NOT_AVAILABLE.to_string(),
            booked_flight_id: None,
        }
    );
    assert_eq!(agent.mode(), SessionMode::Prose);
}

#[tokio::test]
async fn closed_session_answers_in_prose_forever() {
    let mut agent = runtime(&[FIND_LAX_JFK, BOOK_7, BOOK_7, FIND_LAX_JFK, "bye"]);
    agent.converse("find").await.expect("search");
    agent.converse("book").await.expect("book");

    for message in ["book it again", "search again", "thanks"] {
        let response = agent.converse(message).await.expect("closed turn");
        assert!(matches!(response, AgentResponse::Text { .. }), "{message} should be text");
    }
    assert_eq!(agent.mode(), SessionMode::Closed);
    assert_eq!(seats(&agent, 7), Some(0));
    assert_eq!(&agent.llm().modes()[2..], &[CompletionMode::Natural; 3]);
}

#[tokio::test]
async fn closed_session_injects_directive_and_repeats_user_message() {
    let mut agent = runtime(&[FIND_LAX_JFK, BOOK_7, "You're all set."]);
    agent.converse("find").await.expect("search");
    agent.converse("book").await.expect("book");
    let before = agent.conversation().len();

    agent.converse("is it confirmed?").await.expect("closed turn");

    let tail = &agent.conversation()[before..];
    assert_eq!(
        tail,
        &[
            ConversationTurn::user("is it confirmed?"),
            ConversationTurn::system(CLOSING_DIRECTIVE),
            ConversationTurn::user("is it confirmed?"),
            ConversationTurn::assistant("You're all set."),
        ]
    );
    let last_call = agent.llm().calls().pop().expect("recorded call");
    assert_eq!(last_call.history.last(), Some(&ConversationTurn::user("is it confirmed?")));
}

#[tokio::test]
async fn prose_reply_is_text_and_leaves_state_untouched() {
    let garbled = "I think you want {flights, maybe}";
    let mut agent = runtime(&[garbled, garbled]);

    for _ in 0..2 {
        let response = agent.converse("hello").await.expect("turn");
        assert_eq!(response, AgentResponse::Text { text: garbled.to_string() });
        assert_eq!(agent.mode(), SessionMode::Normal);
        assert!(agent.surfaced_flight_ids().is_empty());
        assert!(agent.last_search().flights.is_empty());
    }
    assert_eq!(agent.conversation().len(), 5);
}

#[tokio::test]
async fn malformed_date_degrades_to_text() {
    let reply = r#"{"action": "find-flights", "origin": "LAX", "destination": "JFK", "date": "next Tuesday"}"#;
    let mut agent = runtime(&[reply]);

    let response = agent.converse("LAX to JFK next Tuesday").await.expect("turn");
    assert_eq!(response, AgentResponse::Text { text: reply.to_string() });
    assert!(agent.last_search().date.is_none());
}

#[tokio::test]
async fn unknown_action_is_text() {
    let reply = r#"{"action": "cancel-flight", "flight_id": 7}"#;
    let mut agent = runtime(&[reply]);

    let response = agent.converse("cancel").await.expect("turn");
    assert_eq!(response, AgentResponse::Text { text: reply.to_string() });
}

#[tokio::test]
async fn collaborator_failure_propagates() {
    let mut agent = runtime(&[]);
    let error = agent.converse("hello").await.expect_err("no reply scripted");
    assert!(error.to_string().contains("ran out of replies"));
}

#[tokio::test]
async fn reset_conversation_keeps_session_state() {
    let mut agent = runtime(&[FIND_LAX_JFK, BOOK_7]);
    agent.converse("find").await.expect("search");

    agent.reset_conversation();
    assert_eq!(agent.conversation().len(), 1);
    assert_eq!(agent.conversation()[0].role, Role::System);

    let response = agent.converse("book 7").await.expect("book");
    assert_eq!(
        response,
        AgentResponse::BookFlight { text: BOOK_7.to_string(), booked_flight_id: Some(FlightId(7)) }
    );
}

#[tokio::test]
async fn benchmark_step_reopens_a_closed_session_but_keeps_seats() {
    let mut agent = runtime(&[FIND_LAX_JFK, BOOK_7, BOOK_7]);
    agent.converse("find").await.expect("search");
    agent.converse("book 7").await.expect("book");
    assert_eq!(agent.mode(), SessionMode::Closed);

    agent.begin_benchmark_step();
    assert_eq!(agent.mode(), SessionMode::Normal);
    assert_eq!(agent.conversation().len(), 1);
    assert_eq!(agent.surfaced_flight_ids().iter().copied().collect::<Vec<_>>(), vec![FlightId(7)]);

    let response = agent.converse("book 7 again").await.expect("second booking");
    assert_eq!(
        response,
        AgentResponse::BookFlight { text: BOOK_7.to_string(), booked_flight_id: None }
    );
    assert_eq!(seats(&agent, 7), Some(0));
}
