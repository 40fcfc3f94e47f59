//! Syntax highlighting for code segments.
//!
//! Renders fenced code through syntect's bundled grammars and maps the
//! resulting styles onto ratatui spans. Unknown languages fall back to
//! plain text.

use once_cell::sync::Lazy;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

static THEME: Lazy<Theme> = Lazy::new(|| {
    ThemeSet::load_defaults()
        .themes
        .remove("base16-ocean.dark")
        .expect("Missing bundled syntect theme")
});

/// Highlight one code block into display lines.
///
/// `language` is the fence tag (or the form's language when the fence
/// was untagged); it is matched against syntect's tokens and file
/// extensions. Lines that fail to highlight come back unstyled.
pub fn highlight_code(code: &str, language: &str) -> Vec<Line<'static>> {
    let syntax = find_syntax(language);
    let mut highlighter = HighlightLines::new(syntax, &THEME);
    let mut lines = Vec::new();

    for raw_line in LinesWithEndings::from(code) {
        match highlighter.highlight_line(raw_line, &SYNTAX_SET) {
            Ok(ranges) => {
                let spans: Vec<Span> = ranges
                    .iter()
                    .map(|(style, text)| {
                        Span::styled(text.trim_end_matches('\n').to_string(), convert_style(style))
                    })
                    .filter(|span| !span.content.is_empty())
                    .collect();
                lines.push(Line::from(spans));
            }
            Err(_) => lines.push(Line::from(raw_line.trim_end_matches('\n').to_string())),
        }
    }

    if lines.is_empty() {
        lines.push(Line::from(String::new()));
    }
    lines
}

fn find_syntax(language: &str) -> &'static SyntaxReference {
    let set: &'static SyntaxSet = &SYNTAX_SET;
    // syntect ships C# under the "cs" token
    let token = match language.to_ascii_lowercase().as_str() {
        "csharp" | "c#" => "cs".to_string(),
        other => other.to_string(),
    };
    set.find_syntax_by_token(&token)
        .or_else(|| set.find_syntax_by_extension(&token))
        .unwrap_or_else(|| set.find_syntax_plain_text())
}

fn convert_style(style: &syntect::highlighting::Style) -> Style {
    let fg = style.foreground;
    let mut out = Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b));
    if style.font_style.contains(FontStyle::BOLD) {
        out = out.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        out = out.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        out = out.add_modifier(Modifier::UNDERLINED);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_known_language_keeps_line_count() {
        let lines = highlight_code("def f():\n    return 1", "python");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_spans_reconstruct_source() {
        let lines = highlight_code("let x = 1;\nconsole.log(x);", "javascript");
        assert_eq!(line_text(&lines[0]), "let x = 1;");
        assert_eq!(line_text(&lines[1]), "console.log(x);");
    }

    #[test]
    fn test_unknown_language_falls_back_to_plain() {
        let lines = highlight_code("some opaque text", "nosuchlang");
        assert_eq!(lines.len(), 1);
        assert_eq!(line_text(&lines[0]), "some opaque text");
    }

    #[test]
    fn test_csharp_alias_resolves() {
        assert_eq!(find_syntax("csharp").name, "C#");
        assert_eq!(find_syntax("c#").name, "C#");
    }

    #[test]
    fn test_cpp_token_resolves() {
        assert_eq!(find_syntax("c++").name, "C++");
    }

    #[test]
    fn test_empty_code_yields_one_empty_line() {
        let lines = highlight_code("", "python");
        assert_eq!(lines.len(), 1);
        assert_eq!(line_text(&lines[0]), "");
    }
}
