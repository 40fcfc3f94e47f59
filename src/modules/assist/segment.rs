//! Response segmenter.
//!
//! Splits an AI reply into alternating prose and fenced code blocks
//! so code can be rendered with syntax highlighting. Fences are
//! markdown-style: a line-initial ``` with an optional language tag,
//! closed by a ``` on its own line.

use once_cell::sync::Lazy;
use regex::Regex;

/// A contiguous span of the response: plain prose, or a code block
/// carrying its language tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Prose(String),
    Code { language: String, text: String },
}

// Lazy content matching means an unterminated opening fence never
// matches, leaving the text as prose.
static FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?ms)^```([A-Za-z0-9_+#.-]*)\n(.*?)\n```$").expect("Invalid fence regex")
});

/// Split a response into an ordered segment sequence.
///
/// Scans left to right for non-overlapping fenced blocks. Text before
/// and between fences becomes Prose (empty runs are skipped); each
/// fenced region becomes Code, tagged with its language hint or with
/// `default_language` when the hint is absent. Concatenating all
/// segment texts reproduces the input minus the fence delimiters.
pub fn split_segments(text: &str, default_language: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for caps in FENCE.captures_iter(text) {
        let whole = match caps.get(0) {
            Some(m) => m,
            None => continue,
        };

        if whole.start() > cursor {
            segments.push(Segment::Prose(text[cursor..whole.start()].to_string()));
        }

        let tag = caps.get(1).map_or("", |t| t.as_str());
        let language = if tag.is_empty() {
            default_language.to_string()
        } else {
            tag.to_string()
        };
        let body = caps.get(2).map_or("", |b| b.as_str());

        segments.push(Segment::Code {
            language,
            text: body.to_string(),
        });
        cursor = whole.end();
    }

    if cursor < text.len() {
        segments.push(Segment::Prose(text[cursor..].to_string()));
    }

    // No fences at all: the whole reply is one prose span
    if segments.is_empty() {
        segments.push(Segment::Prose(text.to_string()));
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined_text(segments: &[Segment]) -> String {
        segments
            .iter()
            .map(|s| match s {
                Segment::Prose(text) => text.as_str(),
                Segment::Code { text, .. } => text.as_str(),
            })
            .collect()
    }

    #[test]
    fn test_no_fence_yields_single_prose() {
        let input = "This loop iterates over the list and prints each item.";
        let segments = split_segments(input, "python");
        assert_eq!(segments, vec![Segment::Prose(input.to_string())]);
    }

    #[test]
    fn test_single_fence_splits_into_three() {
        let segments = split_segments("a\n```python\nprint(1)\n```\nb", "python");
        assert_eq!(
            segments,
            vec![
                Segment::Prose("a\n".to_string()),
                Segment::Code {
                    language: "python".to_string(),
                    text: "print(1)".to_string(),
                },
                Segment::Prose("\nb".to_string()),
            ]
        );
    }

    #[test]
    fn test_unterminated_fence_stays_prose() {
        let input = "a\n```python\nprint(1)";
        let segments = split_segments(input, "python");
        assert_eq!(segments, vec![Segment::Prose(input.to_string())]);
    }

    #[test]
    fn test_untagged_fence_takes_default_language() {
        let segments = split_segments("```\nSELECT 1;\n```", "sql");
        assert_eq!(
            segments,
            vec![Segment::Code {
                language: "sql".to_string(),
                text: "SELECT 1;".to_string(),
            }]
        );
    }

    #[test]
    fn test_multiple_blocks_in_order() {
        let input = "First:\n```js\nlet x = 1;\n```\nThen:\n```ruby\nputs x\n```\nDone.";
        let segments = split_segments(input, "python");
        assert_eq!(segments.len(), 5);
        assert_eq!(segments[0], Segment::Prose("First:\n".to_string()));
        assert_eq!(
            segments[1],
            Segment::Code {
                language: "js".to_string(),
                text: "let x = 1;".to_string(),
            }
        );
        assert_eq!(segments[2], Segment::Prose("\nThen:\n".to_string()));
        assert_eq!(
            segments[3],
            Segment::Code {
                language: "ruby".to_string(),
                text: "puts x".to_string(),
            }
        );
        assert_eq!(segments[4], Segment::Prose("\nDone.".to_string()));
    }

    #[test]
    fn test_concatenation_reconstructs_text() {
        let input = "intro\n```python\nprint(1)\n```\nmiddle\n```\nraw text\n```\ntail";
        let segments = split_segments(input, "python");
        // The input minus the four fence delimiter runs
        assert_eq!(joined_text(&segments), "intro\nprint(1)\nmiddle\nraw text\ntail");
    }

    #[test]
    fn test_fence_spanning_whole_input_has_no_empty_prose() {
        let segments = split_segments("```go\nfmt.Println(\"hi\")\n```", "python");
        assert_eq!(
            segments,
            vec![Segment::Code {
                language: "go".to_string(),
                text: "fmt.Println(\"hi\")".to_string(),
            }]
        );
    }

    #[test]
    fn test_mid_line_backticks_are_not_fences() {
        let input = "inline `code` and a stray ``` marker in prose";
        let segments = split_segments(input, "python");
        assert_eq!(segments, vec![Segment::Prose(input.to_string())]);
    }

    #[test]
    fn test_plus_and_hash_language_tags() {
        let segments = split_segments("```c++\nint x = 0;\n```", "python");
        assert_eq!(
            segments,
            vec![Segment::Code {
                language: "c++".to_string(),
                text: "int x = 0;".to_string(),
            }]
        );
    }

    #[test]
    fn test_multi_line_block_keeps_inner_newlines() {
        let segments = split_segments("```python\ndef f():\n    return 1\n```", "python");
        assert_eq!(
            segments,
            vec![Segment::Code {
                language: "python".to_string(),
                text: "def f():\n    return 1".to_string(),
            }]
        );
    }

    #[test]
    fn test_empty_input_is_single_empty_prose() {
        let segments = split_segments("", "python");
        assert_eq!(segments, vec![Segment::Prose(String::new())]);
    }
}
