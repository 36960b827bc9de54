use crate::error::SeedError;
use crate::seed::Seed;
use once_cell::sync::Lazy;
use regex::Regex;

static OUTLINE_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<indent>[ \t]*)(?P<bullet>[-*+](?:[ \t]+|$))?(?P<label>.*?)\s*$").unwrap());

/// Parses a seed tree. Input starting with `{` is read as JSON5, anything
/// else as an indented outline.
pub fn parse_seed(input: &str) -> Result<Seed, SeedError> {
    let trimmed = input.trim_start();
    if trimmed.is_empty() {
        return Err(SeedError::Empty);
    }
    if trimmed.starts_with('{') {
        return Ok(json5::from_str(trimmed)?);
    }
    parse_outline(input)
}

/// One label per line; deeper indentation nests under the closest shallower
/// line above. Tabs count as two columns.
pub fn parse_outline(input: &str) -> Result<Seed, SeedError> {
    // (indent, subtree under construction)
    let mut stack: Vec<(usize, Seed)> = Vec::new();
    let mut root_indent: Option<usize> = None;

    for (idx, raw_line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with("%%") || trimmed.starts_with('#') {
            continue;
        }
        let Some(caps) = OUTLINE_ITEM_RE.captures(raw_line) else {
            continue;
        };
        let indent = count_indent(&caps["indent"]);
        let label = caps["label"].to_string();
        if label.is_empty() {
            return Err(SeedError::MissingLabel { line: line_no });
        }

        match root_indent {
            None => root_indent = Some(indent),
            Some(base) if indent <= base => {
                return Err(SeedError::MultipleRoots { line: line_no, label });
            }
            Some(_) => {}
        }

        while stack.last().is_some_and(|(top, _)| *top >= indent) {
            fold_top(&mut stack);
        }
        stack.push((indent, Seed::leaf(label)));
    }

    while stack.len() > 1 {
        fold_top(&mut stack);
    }
    stack.pop().map(|(_, seed)| seed).ok_or(SeedError::Empty)
}

fn fold_top(stack: &mut Vec<(usize, Seed)>) {
    if let Some((_, done)) = stack.pop() {
        if let Some((_, parent)) = stack.last_mut() {
            parent.children.push(done);
        }
    }
}

fn count_indent(prefix: &str) -> usize {
    prefix
        .chars()
        .map(|ch| match ch {
            '\t' => 2,
            _ => 1,
        })
        .sum()
}
