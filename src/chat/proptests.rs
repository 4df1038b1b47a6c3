//! Property-based tests for conversation threading
//!
//! - Blank input never reaches the model and never changes the history
//! - The first turn's input is exactly the utterance plus EOS
//! - Every turn's history extends the previous one
//! - The reply is decoded from the generated suffix only
//! - Encoding is a pure function of the text

use super::testing::MockModel;
use super::{generate_response, ChatService, ConversationHistory, EMPTY_INPUT_REPLY};
use crate::llm::LanguageModel;
use proptest::prelude::*;
use std::sync::Arc;

fn arb_blank() -> impl Strategy<Value = String> {
    "[ \t\r\n]{0,12}"
}

fn arb_utterance() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9 ,.!?']{0,40}"
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn prop_blank_input_is_canned(blank in arb_blank(), warmup in proptest::option::of(arb_utterance())) {
        let model = Arc::new(MockModel::new());
        let chat = ChatService::new(model.clone());
        let rt = runtime();

        if let Some(text) = &warmup {
            rt.block_on(chat.respond(Some(text.as_str()))).unwrap();
        }
        let before = chat.history();
        let calls = model.call_count();

        let reply = rt.block_on(chat.respond(Some(blank.as_str()))).unwrap();
        prop_assert_eq!(reply, EMPTY_INPUT_REPLY);
        prop_assert_eq!(chat.history(), before);
        prop_assert_eq!(model.call_count(), calls);
    }

    #[test]
    fn prop_first_turn_prefix(utterance in arb_utterance(), reply in arb_utterance()) {
        let model = MockModel::new().with_reply(reply.clone());
        let result = generate_response(&model, &utterance, None).unwrap();

        let expected = model.encode_turn(&utterance);
        prop_assert!(result.history.tokens().starts_with(&expected));
        prop_assert_eq!(result.input_len, expected.len());
        prop_assert_eq!(result.text, reply);
    }

    #[test]
    fn prop_history_only_grows(turns in proptest::collection::vec(arb_utterance(), 1..6)) {
        let model = Arc::new(MockModel::new());
        let chat = ChatService::new(model.clone());
        let rt = runtime();

        let mut previous: Option<ConversationHistory> = None;
        for turn in &turns {
            rt.block_on(chat.respond(Some(turn.as_str()))).unwrap();
            let current = chat.history().unwrap();
            if let Some(previous) = &previous {
                prop_assert!(current.extends(previous));
            }
            previous = Some(current);
        }
    }

    #[test]
    fn prop_reply_is_suffix_only(
        earlier in arb_utterance(),
        utterance in arb_utterance(),
        reply in arb_utterance(),
    ) {
        let model = MockModel::new().with_reply(reply.clone());
        let prior = ConversationHistory::new(model.encode_turn(&earlier));
        let result = generate_response(&model, &utterance, Some(&prior)).unwrap();

        let suffix = &result.history.tokens()[result.input_len..];
        prop_assert_eq!(model.decode(suffix).unwrap(), result.text.clone());
        prop_assert_eq!(result.text, reply);
    }

    #[test]
    fn prop_encoding_is_stable(text in arb_utterance()) {
        let model = MockModel::new();
        prop_assert_eq!(model.encode(&text).unwrap(), model.encode(&text).unwrap());
    }
}
