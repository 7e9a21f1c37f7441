//! Line-level surgery on a single config file
// (c) 2024 Ross Younger
//!
//! Edits are made to the file's own lines rather than by regenerating it from parsed
//! records, so everything we do not touch (comments, spacing, line endings, unknown
//! directives, `Match` sections) comes back out exactly as it went in.

use std::ops::Range;

use super::{
    lines::{arguments, is_tag_line, quote_arg, split_keyword, trailing_comment},
    matching::declares,
};

/// Keywords which end the block of the preceding `Host`
const BLOCK_TERMINATORS: &[&str] = &["host", "match", "include"];

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

fn keyword_is(line: &str, keywords: &[&str]) -> bool {
    split_keyword(line).is_some_and(|(kw, _)| keywords.iter().any(|k| kw.eq_ignore_ascii_case(k)))
}

/// The lines of one host block
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Block {
    /// First line of the block; the tag comment if there is one, else the `Host` line
    pub(super) start: usize,
    /// The `Host` line
    pub(super) host: usize,
    /// One past the last line of the block
    pub(super) end: usize,
    /// Every argument of the `Host` line, patterns included, in order
    pub(super) names: Vec<String>,
}

/// One line of a file and its own line ending (empty on an unterminated last line)
#[derive(Debug)]
struct Row {
    text: String,
    eol: &'static str,
}

impl Row {
    fn parse(piece: &str) -> Self {
        let (text, eol) = if let Some(t) = piece.strip_suffix("\r\n") {
            (t, "\r\n")
        } else if let Some(t) = piece.strip_suffix('\n') {
            (t, "\n")
        } else {
            (piece, "")
        };
        Self {
            text: text.to_owned(),
            eol,
        }
    }
}

/// A config file held as lines, ready for editing
#[derive(Debug)]
pub(super) struct Document {
    rows: Vec<Row>,
    /// Line ending for lines we add: the file's first, or `\n`
    newline: &'static str,
}

impl Document {
    pub(super) fn parse(text: &str) -> Self {
        let rows: Vec<Row> = text.split_inclusive('\n').map(Row::parse).collect();
        let newline = rows
            .iter()
            .map(|r| r.eol)
            .find(|eol| !eol.is_empty())
            .unwrap_or("\n");
        Self { rows, newline }
    }

    pub(super) fn render(&self) -> String {
        self.rows.iter().flat_map(|r| [r.text.as_str(), r.eol]).collect()
    }

    fn line(&self, i: usize) -> Option<&str> {
        self.rows.get(i).map(|r| r.text.as_str())
    }

    /// `Host` lines and their arguments
    fn host_lines(&self) -> impl Iterator<Item = (usize, Vec<String>)> + '_ {
        self.rows.iter().enumerate().filter_map(|(i, row)| {
            let (kw, rest) = split_keyword(&row.text)?;
            kw.eq_ignore_ascii_case("host").then(|| (i, arguments(rest)))
        })
    }

    /// Locates the first block whose `Host` line declares `name`
    pub(super) fn find(&self, name: &str) -> Option<Block> {
        self.host_lines()
            .find(|(_, args)| declares(args, name))
            .map(|(host, args)| self.block_at(host, args))
    }

    /// Locates the first block whose `Host` line declares any of `names`
    pub(super) fn find_any(&self, names: &[String]) -> Option<Block> {
        self.host_lines()
            .find(|(_, args)| names.iter().any(|n| declares(args, n)))
            .map(|(host, args)| self.block_at(host, args))
    }

    /// Is `name` declared by any `Host` line, other than the one belonging to `except`?
    pub(super) fn declares_elsewhere(&self, name: &str, except: Option<&Block>) -> bool {
        self.host_lines()
            .any(|(i, args)| except.map_or(true, |b| b.host != i) && declares(&args, name))
    }

    /// Does the run of comments starting at `from` lead straight into a line which ends a block?
    fn comments_lead_to_terminator(&self, from: usize) -> bool {
        self.rows[from..]
            .iter()
            .find(|r| !is_comment(&r.text))
            .is_some_and(|r| keyword_is(&r.text, BLOCK_TERMINATORS))
    }

    fn block_at(&self, host: usize, names: Vec<String>) -> Block {
        let start = if host > 0 && self.line(host - 1).is_some_and(is_tag_line) {
            host - 1
        } else {
            host
        };
        let mut end = host + 1;
        while let Some(line) = self.line(end) {
            if is_blank(line) || keyword_is(line, BLOCK_TERMINATORS) {
                break;
            }
            // comments directly above the next section belong to it, not to us
            if is_comment(line) && self.comments_lead_to_terminator(end) {
                break;
            }
            end += 1;
        }
        Block {
            start,
            host,
            end,
            names,
        }
    }

    /// Replaces `range` with new lines, keeping every existing line ending.
    ///
    /// Only the last line of the file may lack a line ending, and only if it did before.
    fn splice(&mut self, range: Range<usize>, with: Vec<String>, terminated: bool) {
        let newline = self.newline;
        let _ = self
            .rows
            .splice(range, with.into_iter().map(|text| Row { text, eol: newline }));
        let last = self.rows.len().saturating_sub(1);
        for row in &mut self.rows[..last] {
            if row.eol.is_empty() {
                row.eol = newline;
            }
        }
        if let Some(row) = self.rows.last_mut() {
            row.eol = match (terminated, row.eol) {
                (false, _) => "",
                (true, "") => newline,
                (true, eol) => eol,
            };
        }
    }

    fn is_terminated(&self) -> bool {
        self.rows.last().map_or(true, |r| !r.eol.is_empty())
    }

    /// Replaces a whole block (tag comment included) with new lines
    pub(super) fn replace(&mut self, block: &Block, with: Vec<String>) {
        self.splice(block.start..block.end, with, self.is_terminated());
    }

    /// Removes a whole block, and a blank line too if one would otherwise be left dangling
    pub(super) fn remove(&mut self, block: &Block) {
        let terminated = self.is_terminated();
        let at = block.start;
        let mut range = block.start..block.end;
        let blank_at = |i: usize| self.line(i).is_some_and(is_blank);
        let blank_here = blank_at(block.end);
        let blank_before = at > 0 && blank_at(at - 1);
        if blank_here && (at == 0 || blank_before) {
            range.end += 1;
        } else if block.end == self.rows.len() && blank_before {
            range.start -= 1;
        }
        self.splice(range, Vec::new(), terminated);
    }

    /// Rewrites the `Host` line of a block to declare `names`, keeping its indentation,
    /// keyword spelling and any trailing comment
    pub(super) fn set_names(&mut self, block: &Block, names: &[String]) {
        let row = &mut self.rows[block.host];
        let line = row.text.as_str();
        let indent = &line[..line.len() - line.trim_start().len()];
        let (keyword, comment) =
            split_keyword(line).map_or(("Host", None), |(kw, rest)| (kw, trailing_comment(rest)));
        let names: Vec<String> = names.iter().map(|n| quote_arg(n)).collect();
        let mut rewritten = format!("{indent}{keyword} {}", names.join(" "));
        if let Some(comment) = comment {
            rewritten.push(' ');
            rewritten.push_str(comment);
        }
        row.text = rewritten;
    }

    /// Inserts a new block directly after an existing one, separated by blank lines
    pub(super) fn insert_after(&mut self, block: &Block, new: Vec<String>) {
        let mut insertion = vec![String::new()];
        insertion.extend(new);
        if self.line(block.end).is_some_and(|l| !is_blank(l)) {
            insertion.push(String::new());
        }
        self.splice(block.end..block.end, insertion, self.is_terminated());
    }

    /// Appends a new block at the end of the file
    pub(super) fn append(&mut self, new: Vec<String>) {
        let mut insertion = Vec::new();
        if self.rows.last().is_some_and(|r| !is_blank(&r.text)) {
            insertion.push(String::new());
        }
        insertion.extend(new);
        let end = self.rows.len();
        self.splice(end..end, insertion, true);
    }
}

///////////////////////////////////////////////////////////////////////////////////////
