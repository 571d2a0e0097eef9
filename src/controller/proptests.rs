//! Property-based tests for the turn controller
//!
//! These tests check that the transcript and dispatch invariants hold for
//! arbitrary histories, prompts, and model replies.

use super::testing::{MockGateway, MockTool, ScriptedGateway};
use super::*;
use crate::tools::ToolRegistry;
use crate::transcript::{Part, Role, Turn};
use proptest::prelude::*;
use serde_json::{json, Map, Value};
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn registry(tools: Vec<crate::tools::CapabilityBinding>) -> Arc<ToolRegistry> {
    Arc::new(ToolRegistry::new(tools).unwrap())
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_args() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map("[a-z]{1,6}", "[a-zA-Z0-9 ]{0,12}", 0..4)
        .prop_map(|m| m.into_iter().map(|(k, v)| (k, json!(v))).collect())
}

fn arb_turn() -> impl Strategy<Value = Turn> {
    prop_oneof![
        "[a-zA-Z0-9 ?]{1,30}".prop_map(Turn::user),
        "[a-zA-Z0-9 .]{1,30}".prop_map(Turn::model_text),
        ("[a-z_]{1,12}", arb_args()).prop_map(|(name, args)| Turn::function_call(name, args)),
        ("[a-z_]{1,12}", "[a-z]{0,10}").prop_map(|(name, v)| Turn::tool_response(name, json!(v))),
    ]
}

fn arb_history() -> impl Strategy<Value = Vec<Turn>> {
    prop::collection::vec(arb_turn(), 0..8)
}

fn arb_prompt() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,40}"
}

fn arb_state() -> impl Strategy<Value = TurnState> {
    prop_oneof![
        Just(TurnState::Start),
        Just(TurnState::Decision),
        arb_args().prop_map(|args| TurnState::ToolDispatch {
            turn: Turn::function_call("search_papers", args.clone()),
            call: crate::transcript::FunctionCall::new("search_papers", args),
        }),
        "[a-z_]{1,12}".prop_map(|tool_name| TurnState::Synthesis { tool_name }),
    ]
}

fn arb_terminal_state() -> impl Strategy<Value = TurnState> {
    prop_oneof![
        "[a-z ]{0,20}".prop_map(|response_text| TurnState::Done { response_text }),
        "[a-z_]{1,12}".prop_map(|name| TurnState::Failed {
            error: TurnError::UnknownTool { name }
        }),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_prompt().prop_map(|prompt| Event::Begin { prompt }),
        arb_turn().prop_map(|turn| Event::ModelReplied { turn }),
        Just(Event::ModelFailed {
            error: crate::gateway::ModelGatewayError::network("reset")
        }),
        "[a-z]{0,10}".prop_map(|v| Event::ToolCompleted { result: json!(v) }),
        Just(Event::ToolNotFound),
        Just(Event::ToolResultRecorded),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn direct_answer_appends_two_turns(history in arb_history(), prompt in arb_prompt(), answer in "[a-z ]{1,20}") {
        let gateway = Arc::new(MockGateway::new());
        gateway.queue_turn(Turn::model_text(answer.clone()));
        let controller = TurnController::new(gateway, registry(vec![]));

        let outcome = block_on(controller.run(&history, &prompt)).unwrap();

        prop_assert_eq!(outcome.updated_history.len(), history.len() + 2);
        prop_assert_eq!(&outcome.updated_history[..history.len()], &history[..]);
        prop_assert_eq!(&outcome.updated_history[history.len()], &Turn::user(prompt));
        prop_assert_eq!(&outcome.updated_history[history.len() + 1], &Turn::model_text(answer.clone()));
        prop_assert_eq!(outcome.response_text, answer);
    }

    #[test]
    fn tool_path_appends_four_turns(history in arb_history(), prompt in arb_prompt(), args in arb_args()) {
        let gateway = Arc::new(MockGateway::new());
        gateway.queue_turn(Turn::function_call("echo", args.clone()));
        gateway.queue_turn(Turn::model_text("done"));
        let tool = Arc::new(MockTool::echoing("echo"));
        let controller = TurnController::new(gateway, registry(vec![tool.clone()]));

        let outcome = block_on(controller.run(&history, &prompt)).unwrap();

        let n = history.len();
        prop_assert_eq!(outcome.updated_history.len(), n + 4);
        prop_assert_eq!(&outcome.updated_history[..n], &history[..]);
        let roles: Vec<Role> = outcome.updated_history[n..].iter().map(Turn::role).collect();
        prop_assert_eq!(roles, vec![Role::User, Role::Model, Role::Tool, Role::Model]);
        prop_assert_eq!(&outcome.updated_history[n + 1], &Turn::function_call("echo", args.clone()));
        prop_assert_eq!(&outcome.updated_history[n + 2], &Turn::tool_response("echo", Value::Object(args)));
        prop_assert_eq!(tool.recorded_executions().len(), 1);
    }

    #[test]
    fn unknown_tool_never_executes(history in arb_history(), name in "[a-z_]{1,12}") {
        prop_assume!(name != "echo");
        let gateway = Arc::new(MockGateway::new());
        gateway.queue_turn(Turn::function_call(name.clone(), Map::new()));
        let tool = Arc::new(MockTool::echoing("echo"));
        let controller = TurnController::new(gateway.clone(), registry(vec![tool.clone()]));

        let err = block_on(controller.run(&history, "do it")).unwrap_err();

        prop_assert_eq!(err, TurnError::UnknownTool { name });
        prop_assert!(tool.recorded_executions().is_empty());
        prop_assert_eq!(gateway.recorded_calls().len(), 1);
    }

    #[test]
    fn runs_are_deterministic(history in arb_history(), prompt in arb_prompt(), use_tool in any::<bool>()) {
        let prompt = if use_tool { format!("tool:echo {prompt}") } else { prompt };
        let controller = TurnController::new(ScriptedGateway, registry(vec![Arc::new(MockTool::echoing("echo"))]));

        let first = block_on(controller.run(&history, &prompt));
        let second = block_on(controller.run(&history, &prompt));

        prop_assert_eq!(first, second);
    }

    #[test]
    fn terminal_states_reject_all_events(state in arb_terminal_state(), event in arb_event()) {
        prop_assert!(matches!(transition(&state, event), Err(TransitionError::AlreadyTerminal(_))));
    }

    #[test]
    fn transitions_are_pure(state in arb_state(), event in arb_event()) {
        let first = transition(&state, event.clone());
        let second = transition(&state, event);
        match (first, second) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.new_state, b.new_state);
                prop_assert_eq!(a.effects, b.effects);
            }
            (Err(_), Err(_)) => {}
            _ => prop_assert!(false, "transition outcome differed between identical calls"),
        }
    }

    #[test]
    fn decision_routes_on_first_part(turn in arb_turn()) {
        // Only model turns reach the controller, but routing must hold for any shape
        let result = transition(&TurnState::Decision, Event::ModelReplied { turn: turn.clone() }).unwrap();
        match turn.first_part() {
            Some(Part::Text(_)) => {
                prop_assert!(matches!(result.new_state, TurnState::Done { .. }), "expected Done");
            }
            Some(Part::FunctionCall(_)) => {
                prop_assert!(matches!(result.new_state, TurnState::ToolDispatch { .. }), "expected ToolDispatch");
            }
            _ => {
                prop_assert!(matches!(
                    result.new_state,
                    TurnState::Failed { error: TurnError::MalformedModelResponse { .. } }
                ), "expected MalformedModelResponse");
            }
        }
    }
}
