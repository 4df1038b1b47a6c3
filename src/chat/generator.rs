//! One conversational turn: thread history through the model and decode the reply

use super::ConversationHistory;
use crate::llm::{LanguageModel, ModelError, SamplingConfig};

/// Result of a single turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// Model input followed by the generated tokens
    pub history: ConversationHistory,
    /// Length of the model input, i.e. where the generated suffix starts
    pub input_len: usize,
}

/// Generate the bot's answer to `utterance` given the conversation so far.
///
/// The model sees `prior ++ encode(utterance) ++ [EOS]` and only the tokens
/// past that input are decoded into the reply. The reply may be empty.
pub fn generate_response(
    model: &dyn LanguageModel,
    utterance: &str,
    prior: Option<&ConversationHistory>,
) -> Result<Reply, ModelError> {
    let mut encoded = model.encode(utterance)?;
    encoded.push(model.eos_token_id());

    let input: Vec<_> = match prior {
        Some(history) => history.tokens().iter().chain(&encoded).copied().collect(),
        None => encoded,
    };

    let config = SamplingConfig::chat(model.eos_token_id());
    let output = model.generate(&input, &config)?;

    let Some(generated) = output.strip_prefix(input.as_slice()) else {
        return Err(ModelError::inference(
            "Model output does not start with its input",
        ));
    };
    let text = model.decode(generated)?;

    Ok(Reply {
        text,
        input_len: input.len(),
        history: ConversationHistory::new(output),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::testing::MockModel;
    use crate::llm::ModelErrorKind;

    #[test]
    fn test_first_turn_input_is_utterance_plus_eos() {
        let model = MockModel::new().with_reply("Hi there");
        let reply = generate_response(&model, "Hello", None).unwrap();

        let mut expected_input = model.encode("Hello").unwrap();
        expected_input.push(model.eos_token_id());
        assert_eq!(model.recorded_inputs(), vec![expected_input.clone()]);

        assert_eq!(reply.text, "Hi there");
        assert_eq!(reply.input_len, expected_input.len());
        assert!(reply.history.tokens().starts_with(&expected_input));
    }

    #[test]
    fn test_history_is_full_model_output() {
        let model = MockModel::new().with_reply("Hey");
        let reply = generate_response(&model, "Hello", None).unwrap();

        let outputs = model.recorded_outputs();
        assert_eq!(reply.history.tokens(), outputs[0].as_slice());
        assert_eq!(
            reply.history.tokens().last(),
            Some(&model.eos_token_id()),
            "reply is terminated so the next turn starts cleanly"
        );
    }

    #[test]
    fn test_second_turn_input_starts_with_first_output() {
        let model = MockModel::new().with_reply("Hey").with_reply("Good, you?");
        let first = generate_response(&model, "Hi", None).unwrap();
        let second = generate_response(&model, "How are you?", Some(&first.history)).unwrap();

        let inputs = model.recorded_inputs();
        assert!(inputs[1].starts_with(first.history.tokens()));
        assert!(second.history.extends(&first.history));
        assert_eq!(second.text, "Good, you?");
    }

    #[test]
    fn test_reply_excludes_input_tokens() {
        let model = MockModel::new().with_reply("fine");
        let prior = ConversationHistory::new(model.encode_turn("earlier words"));
        let reply = generate_response(&model, "how are you", Some(&prior)).unwrap();

        assert_eq!(reply.text, "fine");
        assert!(!reply.text.contains("earlier"));
        assert!(!reply.text.contains("how are you"));
    }

    #[test]
    fn test_uses_chat_sampling_policy() {
        let model = MockModel::new();
        generate_response(&model, "Hello", None).unwrap();

        let configs = model.recorded_configs();
        assert_eq!(configs, vec![SamplingConfig::chat(model.eos_token_id())]);
    }

    #[test]
    fn test_empty_generation_gives_empty_reply() {
        let model = MockModel::new().with_reply("");
        let reply = generate_response(&model, "Hello", None).unwrap();
        assert_eq!(reply.text, "");
        assert_eq!(reply.history.len(), reply.input_len + 1);
    }

    #[test]
    fn test_history_at_cap_is_not_truncated() {
        let model = MockModel::new().with_reply("more");
        let prior = ConversationHistory::new(vec![b'a'.into(); SamplingConfig::MAX_LENGTH]);
        let reply = generate_response(&model, "still there?", Some(&prior)).unwrap();

        assert_eq!(reply.text, "");
        assert!(reply.history.extends(&prior));
        assert_eq!(reply.history.len(), reply.input_len);
        assert!(reply.input_len > SamplingConfig::MAX_LENGTH);
    }

    #[test]
    fn test_model_error_propagates() {
        let model = MockModel::new();
        model.queue_error(ModelError::invalid_input("bad history"));
        let err = generate_response(&model, "Hello", None).unwrap_err();
        assert_eq!(err.kind, ModelErrorKind::InvalidInput);
    }
}
