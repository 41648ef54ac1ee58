// tests/command_tokenizer_props.rs

use proptest::prelude::*;

use buildagent::command::{CommandError, parse_command, split_arguments};

fn word() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9./:_-]{1,10}"
}

fn assignment() -> impl Strategy<Value = (String, String)> {
    ("[A-Z_]{1,6}", "[a-z0-9]{1,6}")
}

proptest! {
    #[test]
    fn plain_words_split_on_whitespace(
        env in proptest::collection::vec(assignment(), 0..4),
        program in word(),
        args in proptest::collection::vec(word(), 0..6),
        gap in "[ \t]{1,3}",
    ) {
        let mut parts: Vec<String> = env.iter().map(|(k, v)| format!("{k}={v}")).collect();
        parts.push(program.clone());
        parts.extend(args.iter().cloned());
        let line = parts.join(&gap);

        let parsed = parse_command(&line).unwrap();

        prop_assert_eq!(parsed.program, program);
        prop_assert_eq!(parsed.arguments, args);
        for (key, _) in &env {
            let last = env.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v.clone());
            prop_assert_eq!(parsed.environment.get(key).cloned(), last);
        }
    }

    #[test]
    fn quoted_spans_survive_verbatim(content in "[a-z \t]{0,12}", use_single in any::<bool>()) {
        let quote = if use_single { '\'' } else { '"' };
        let input = format!("{quote}{content}{quote}");

        let args = split_arguments(&input).unwrap();

        if content.is_empty() {
            prop_assert!(args.is_empty());
        } else {
            prop_assert_eq!(args, vec![content]);
        }
    }

    #[test]
    fn tokenizer_never_panics(input in "\\PC{0,40}") {
        match parse_command(&input) {
            Ok(parsed) => prop_assert!(!parsed.program.is_empty()),
            Err(CommandError::NoCommand) | Err(CommandError::UnterminatedQuote { .. }) => {}
        }
    }
}
