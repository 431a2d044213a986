// Verify the event grammar decodes identically no matter how the backend
// chunks the byte stream.

use taskstream_protocol::{Block, EventStreamParser, ParsedBlock};

const STREAM: &str = "===EVENT:started===\n---Thought---\nAnalyzing uploaded file\n===END===\n\
===EVENT:progress===\n---Action---\n- read `sales.csv`\n- compute totals ✓\n===END===\n\
===EVENT:finished===\n---Thought---\nAll done\n---Results---\n| a | b |\n|---|---|\n| 1 | 2 |\n===END===\n";

fn expected() -> Vec<ParsedBlock> {
    vec![
        ParsedBlock::new(
            "started",
            vec![Block::new("Thought", "Analyzing uploaded file")],
        ),
        ParsedBlock::new(
            "progress",
            vec![Block::new("Action", "- read `sales.csv`\n- compute totals ✓")],
        ),
        ParsedBlock::new(
            "finished",
            vec![
                Block::new("Thought", "All done"),
                Block::new("Results", "| a | b |\n|---|---|\n| 1 | 2 |"),
            ],
        ),
    ]
}

fn feed(chunks: &[&str]) -> (Vec<ParsedBlock>, String) {
    let mut parser = EventStreamParser::new();
    let mut events = Vec::new();
    let mut raw = String::new();
    for chunk in chunks {
        events.extend(parser.consume(chunk));
        if let Some(text) = parser.take_raw() {
            raw.push_str(&text);
        }
    }
    if let Some(rest) = parser.finish() {
        raw.push_str(&rest);
    }
    (events, raw)
}

#[test]
fn single_chunk() {
    let (events, raw) = feed(&[STREAM]);
    assert_eq!(events, expected());
    assert!(raw.is_empty());
}

#[test]
fn every_two_way_split_decodes_the_same() {
    for (at, _) in STREAM.char_indices().skip(1) {
        let (head, tail) = STREAM.split_at(at);
        let (events, raw) = feed(&[head, tail]);
        assert_eq!(events, expected(), "split at byte {at}");
        assert!(raw.is_empty(), "split at byte {at} leaked raw text: {raw:?}");
    }
}

#[test]
fn char_by_char_decodes_the_same() {
    let chars: Vec<String> = STREAM.chars().map(String::from).collect();
    let chunks: Vec<&str> = chars.iter().map(String::as_str).collect();
    let (events, raw) = feed(&chunks);
    assert_eq!(events, expected());
    assert!(raw.is_empty());
}

#[test]
fn rendered_events_match_wire_text() {
    let wire: String = expected().iter().map(ParsedBlock::to_wire).collect();
    assert_eq!(wire, STREAM);
}

#[test]
fn plain_text_stream_is_all_raw() {
    let (events, raw) = feed(&["The answer ", "is 42.\n", "Thanks for ", "asking."]);
    assert!(events.is_empty());
    assert_eq!(raw, "The answer is 42.\nThanks for asking.");
}

#[test]
fn truncated_stream_flushes_partial_event() {
    let cut = STREAM.find("===EVENT:finished").unwrap() + 40;
    let (events, raw) = feed(&[&STREAM[..cut]]);
    assert_eq!(events.len(), 2);
    assert!(raw.starts_with("===EVENT:finished==="));
}

#[test]
fn raw_text_after_an_event_keeps_its_whitespace() {
    let (events, raw) = feed(&[
        "===EVENT:a===\n---T---\nx\n===END===\n",
        "Final answer:",
        "\n",
        "\n",
        "line two",
        " ",
        "end",
    ]);
    assert_eq!(events.len(), 1);
    assert_eq!(raw, "Final answer:\n\nline two end");
}

#[test]
fn whitespace_only_stream_is_all_raw() {
    let (events, raw) = feed(&["\n", "  ", "\n"]);
    assert!(events.is_empty());
    assert_eq!(raw, "\n  \n");
}
