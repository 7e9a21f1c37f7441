//! Line parsing internals
// (c) 2024 Ross Younger

use anyhow::Result;
use tracing::trace;

/// The comment prefix which marks a tag line
pub(super) const TAGS_PREFIX: &str = "# Tags:";

#[derive(Debug, PartialEq)]
/// A parsed line we read from an ssh config file
pub(super) enum Line {
    Blank,
    /// Any comment other than a tag line
    Comment,
    Tags(Vec<String>),
    Host(Vec<String>),
    Match,
    Include(Vec<String>),
    Generic {
        keyword: String, /*lowercase!*/
        value: String,
    },
}

impl Line {
    pub(super) fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Line::Blank;
        }
        if let Some(tags) = parse_tags(trimmed) {
            return Line::Tags(tags);
        }
        let Some((keyword, rest)) = split_keyword(trimmed) else {
            return Line::Comment;
        };
        match keyword.to_ascii_lowercase().as_str() {
            "host" => Line::Host(arguments(rest)),
            "match" => Line::Match,
            "include" => Line::Include(arguments(rest)),
            kw => Line::Generic {
                keyword: kw.to_owned(),
                value: rest.to_owned(),
            },
        }
    }
}

///////////////////////////////////////////////////////////////////////////////////////

/// Splits a line into its keyword and the remainder.
///
/// Returns None for blank lines and comments.
/// The keyword may be delimited by whitespace (`Key Value`) OR equals (`Key=Value`, `Key = Value`).
pub(super) fn split_keyword(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (keyword, rest) = line
        .split_once(|c: char| c == ' ' || c == '\t' || c == '=')
        .unwrap_or((line, ""));
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('=').map_or(rest, str::trim_start);
    Some((keyword, rest))
}

/// Parses a `# Tags: a, b` comment line
pub(super) fn parse_tags(line: &str) -> Option<Vec<String>> {
    let rest = line.trim().strip_prefix(TAGS_PREFIX)?;
    Some(
        rest.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .collect(),
    )
}

pub(super) fn is_tag_line(line: &str) -> bool {
    line.trim().starts_with(TAGS_PREFIX)
}

/// Argument list of a `Host` or `Include` line.
///
/// Malformed quoting does not fail the read; we fall back to plain whitespace splitting,
/// so that every reader of a file sees the same arguments.
pub(super) fn arguments(rest: &str) -> Vec<String> {
    split_args(rest).unwrap_or_else(|e| {
        trace!("{e} in {rest:?}; splitting on whitespace");
        rest.split_whitespace()
            .take_while(|s| !s.starts_with('#'))
            .map(str::to_owned)
            .collect()
    })
}

/// Splits a string into a list of arguments.
/// Arguments are delimited by whitespace, subject to quoting (single or double quotes), and simple escapes (\\, \", \').
pub(super) fn split_args(input: &str) -> Result<Vec<String>> {
    // We need to index over the characters of the input, but also need to be able to peek at the next token in case of escapes.
    let mut i = 0;
    let input: Vec<char> = input.chars().collect();
    let mut output = Vec::<String>::new();
    while i < input.len() {
        // Strip any leading whitespace
        if input[i] == ' ' || input[i] == '\t' {
            i += 1;
            continue;
        }
        if input[i] == '#' {
            break; // it's a comment, we're done
        }

        // We're at the start of a real token
        let mut current_arg = String::new();
        let mut quote_state: char = '\0';

        while i < input.len() {
            let ch = input[i];
            match (ch, quote_state) {
                ('\\', _) => {
                    // It might be an escape
                    let next = input.get(i + 1);
                    match next {
                        Some(nn @ ('\'' | '\"' | '\\')) => {
                            // It is an escape
                            current_arg.push(*nn);
                            i += 1;
                        }
                        Some(_) | None => current_arg.push(ch), // Ignore unrecognised escape
                    }
                }
                (' ' | '\t', '\0') => break, // end of token
                (q @ ('\'' | '\"'), '\0') => quote_state = q, // start of quote
                (q1, q2) if q1 == q2 => quote_state = '\0', // end of quote
                (c, _) => current_arg.push(c), // nothing special
            }
            i += 1;
        }

        // end of token
        anyhow::ensure!(quote_state == '\0', "unterminated quote");
        output.push(current_arg);
        i += 1;
    }
    Ok(output)
}

/// The comment trailing an argument list (`# ...` at the start of a token), if any
pub(super) fn trailing_comment(rest: &str) -> Option<&str> {
    let mut quote = None;
    let mut escaped = false;
    let mut token_start = true;
    for (i, c) in rest.char_indices() {
        match (c, quote) {
            _ if escaped => escaped = false,
            ('\\', _) => escaped = true,
            ('#', None) if token_start => return Some(&rest[i..]),
            ('\'' | '"', None) => quote = Some(c),
            (q, Some(open)) if q == open => quote = None,
            _ => (),
        }
        token_start = quote.is_none() && (c == ' ' || c == '\t');
    }
    None
}

/// Quotes a single argument for output, if it needs it
pub(super) fn quote_arg(arg: &str) -> String {
    if arg.chars().any(char::is_whitespace) {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        arg.to_owned()
    }
}

///////////////////////////////////////////////////////////////////////////////////////
