//! Multi-segment inputs and non-default contexts.

use std::sync::Arc;

use crate::{
    Edit, ErrorKind, PerturbConfig, SnapshotContext, TextInput, TextSnapshot, TokenizerKind,
    Tokenizer,
};

/// Splits on whitespace only, so punctuation stays attached to words.
#[derive(Debug)]
struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn words_from_text(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }
}

fn entailment() -> TextInput {
    vec![
        ("premise", "A soccer game with multiple males playing."),
        ("hypothesis", "Some men are playing a sport."),
    ]
    .into()
}

#[test]
fn rewrite_keeps_segment_names_and_order() {
    let snapshot = TextSnapshot::new(entailment()).unwrap();
    assert_eq!(snapshot.num_words(), 13);

    let next = snapshot
        .rewrite(&[Edit::replace(4, "many"), Edit::replace(7, "Several")])
        .unwrap();
    let segments: Vec<(&str, &str)> = next.segments().collect();
    assert_eq!(
        segments,
        vec![
            ("premise", "A soccer game with many males playing."),
            ("hypothesis", "Several men are playing a sport."),
        ]
    );
    assert_eq!(next.modified_indices().iter().collect::<Vec<_>>(), vec![4, 7]);
}

#[test]
fn custom_split_token_and_unicode_tokenizer() {
    let context = PerturbConfig::standard()
        .with_split_token("||")
        .with_tokenizer(TokenizerKind::Unicode)
        .build_context()
        .unwrap();
    let snapshot = TextSnapshot::with_context(entailment(), context).unwrap();
    let next = snapshot.delete_word_at_index(7).unwrap();

    assert_eq!(
        next.tokenizer_input(),
        vec!["A soccer game with multiple males playing.", "men are playing a sport."]
    );
    assert!(Arc::ptr_eq(next.context(), snapshot.context()));
    assert_eq!(next.deletion_indices(), vec![7]);
}

#[test]
fn custom_tokenizer_keeps_punctuation_in_words() {
    let context = Arc::new(SnapshotContext::new(WhitespaceTokenizer, ">>>>").unwrap());
    let snapshot = TextSnapshot::with_context("Stop. Right there!", context).unwrap();
    assert_eq!(snapshot.words(), &["Stop.", "Right", "there!"]);

    let next = snapshot.replace_word_at_index(2, "now!").unwrap();
    assert_eq!(next.text(), "Stop. Right now!");
}

#[test]
fn replacement_cannot_smuggle_separator() {
    let snapshot = TextSnapshot::new(entailment()).unwrap();
    let err = snapshot.replace_word_at_index(0, "A>>>>B").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
}

#[test]
fn split_token_with_word_characters() {
    let context = PerturbConfig::standard()
        .with_split_token("<sep>")
        .build_context()
        .unwrap();
    let snapshot =
        TextSnapshot::with_context(vec![("a", "one"), ("b", "sep two")], context).unwrap();
    assert_eq!(snapshot.words(), &["one", "sep", "two"]);

    let next = snapshot.replace_word_at_index(1, "step").unwrap();
    assert_eq!(next.tokenizer_input(), vec!["one", "step two"]);

    let next = next.replace_word_at_index(2, "three").unwrap();
    assert_eq!(next.tokenizer_input(), vec!["one", "step three"]);
    assert_eq!(next.modified_indices().iter().collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn replacement_cannot_merge_into_next_segment() {
    let context = Arc::new(SnapshotContext::new(WhitespaceTokenizer, ">>>>").unwrap());
    let input = vec![("premise", "A man sleeps"), ("hypothesis", "Nobody sleeps.")];
    let snapshot = TextSnapshot::with_context(input, context).unwrap();

    let err = snapshot.replace_word_at_index(2, "sleeps>").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    assert_eq!(snapshot.tokenizer_input(), vec!["A man sleeps", "Nobody sleeps."]);

    let next = snapshot.replace_word_at_index(2, "naps").unwrap();
    assert_eq!(next.tokenizer_input(), vec!["A man naps", "Nobody sleeps."]);
}
