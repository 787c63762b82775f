//! Pure recognizers that pull names, literals and line positions out of raw
//! source text.
//!
//! These are heuristics, not a parser. Every function either finds what it
//! looks for or returns `None`; callers pick their own defaults.

use once_cell::sync::Lazy;
use regex::Regex;

static KEYWORD_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^\s*(?:(?:export|pub(?:\([^)]*\))?|async|const|unsafe|static|default)\s+)*(?:def|function\*?|fn)\s+([A-Za-z_]\w*)",
    )
    .expect("keyword function regex")
});

static TYPED_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:[A-Za-z_][\w<>\[\]:]*\s+)+\**([A-Za-z_]\w*)\s*\([^;{}]*\)\s*\{?\s*$")
        .expect("typed function regex")
});

static ARRAY_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z_]\w*\s*(?::[^=\n]*)?=\s*\[([^\]\n]*)\]").expect("array literal regex")
});

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_]\w*$").expect("identifier regex"));

/// Words that look like a function name in C-like signatures but are not.
const NOT_FUNCTION_NAMES: &[&str] = &[
    "if", "else", "for", "while", "switch", "return", "catch", "sizeof", "new", "print",
];

/// Name of the first function defined in `source`.
///
/// Recognizes `def NAME`, `function NAME` and `fn NAME` at the start of a
/// line (after modifiers such as `pub` or `async`) first, then C-like
/// `TYPE NAME(...)` signatures. Keywords inside comments or prose are not
/// definitions.
pub fn function_name(source: &str) -> Option<String> {
    if let Some(caps) = KEYWORD_FUNCTION.captures(source) {
        return Some(caps[1].to_string());
    }
    TYPED_FUNCTION
        .captures_iter(source)
        .map(|caps| caps[1].to_string())
        .find(|name| !NOT_FUNCTION_NAMES.contains(&name.as_str()))
}

/// First parameter of `function`'s first parenthesized occurrence, with type
/// annotations, defaults and pointer/reference sigils stripped.
pub fn parameter_name(source: &str, function: &str) -> Option<String> {
    let pattern = format!(r"\b{}\s*\(([^)]*)\)", regex::escape(function));
    let re = Regex::new(&pattern).ok()?;
    let params = re.captures(source)?.get(1)?.as_str();
    let first = params.split(',').next()?;
    let without_default = first.split('=').next()?;
    let without_annotation = without_default.split(':').next()?;
    let name = without_annotation
        .split_whitespace()
        .last()?
        .trim_start_matches(['&', '*']);
    if IDENTIFIER.is_match(name) && name != "mut" {
        Some(name.to_string())
    } else {
        None
    }
}

/// First `NAME = [i, j, ...]` literal whose elements are all integers.
///
/// Empty literals and literals with non-integer elements are skipped.
pub fn int_array_literal(source: &str) -> Option<Vec<i64>> {
    ARRAY_LITERAL.captures_iter(source).find_map(|caps| {
        let body = caps.get(1)?.as_str().trim();
        if body.is_empty() {
            return None;
        }
        body.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| item.parse::<i64>().ok())
            .collect::<Option<Vec<_>>>()
            .filter(|values| !values.is_empty())
    })
}

/// Zero-based index of the first line containing `needle`.
pub fn find_line(source: &str, needle: &str) -> Option<usize> {
    source.lines().position(|line| line.contains(needle))
}

/// Zero-based index of the first line strictly after `after` containing
/// `needle`.
pub fn find_line_after(source: &str, needle: &str, after: usize) -> Option<usize> {
    source
        .lines()
        .enumerate()
        .skip(after + 1)
        .find(|(_, line)| line.contains(needle))
        .map(|(index, _)| index)
}

/// Text of line `index`, if the source has that many lines.
pub fn line_text(source: &str, index: usize) -> Option<&str> {
    source.lines().nth(index)
}

/// `(index, text)` of every line that is not blank.
pub fn non_blank_lines(source: &str) -> impl Iterator<Item = (usize, &str)> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_name_from_keyword_definitions() {
        assert_eq!(function_name("def calculate_factorial(n):"), Some("calculate_factorial".into()));
        assert_eq!(function_name("function fib(n) { }"), Some("fib".into()));
        assert_eq!(function_name("pub fn fact(n: u64) -> u64 {"), Some("fact".into()));
    }

    #[test]
    fn function_name_ignores_keywords_in_prose() {
        let source = "# A function to compute factorials\ndef fact(n):\n    return 1";
        assert_eq!(function_name(source), Some("fact".into()));
        assert_eq!(function_name("// the fn keyword is neat\nx = 1"), None);
        assert_eq!(function_name("export async function fib(n) {"), Some("fib".into()));
        assert_eq!(function_name("    pub(crate) fn helper() {}"), Some("helper".into()));
    }

    #[test]
    fn function_name_from_typed_signature() {
        let source = "#include <stdio.h>\n\nint fibonacci(int n) {\n    if (n <= 1) return n;\n}\n";
        assert_eq!(function_name(source), Some("fibonacci".into()));
    }

    #[test]
    fn function_name_skips_control_flow() {
        assert_eq!(function_name("    } else if (x) {\n"), None);
        assert_eq!(function_name("x = 1\nprint(x)"), None);
    }

    #[test]
    fn parameter_name_strips_annotations() {
        assert_eq!(parameter_name("def f(n: int) -> int:", "f"), Some("n".into()));
        assert_eq!(parameter_name("int fib(int count) {", "fib"), Some("count".into()));
        assert_eq!(parameter_name("fn fact(k: &u64)", "fact"), Some("k".into()));
        assert_eq!(parameter_name("def f(x=5, y=2):", "f"), Some("x".into()));
        assert_eq!(parameter_name("def f():", "f"), None);
        assert_eq!(parameter_name("no function here", "f"), None);
    }

    #[test]
    fn int_array_literal_finds_first_integer_list() {
        let source = "names = ['a', 'b']\narr = [38, 27, -43, 3]\nother = [1]";
        assert_eq!(int_array_literal(source), Some(vec![38, 27, -43, 3]));
        assert_eq!(int_array_literal("let arr = [5, 1, 4];"), Some(vec![5, 1, 4]));
        assert_eq!(int_array_literal("arr = []"), None);
        assert_eq!(int_array_literal("nothing"), None);
    }

    #[test]
    fn line_lookup_helpers() {
        let source = "a = 1\n\nprint(a)\nprint(a)\n";
        assert_eq!(find_line(source, "print"), Some(2));
        assert_eq!(find_line_after(source, "print", 2), Some(3));
        assert_eq!(find_line_after(source, "print", 3), None);
        assert_eq!(line_text(source, 2), Some("print(a)"));
        assert_eq!(line_text(source, 9), None);
        let lines: Vec<usize> = non_blank_lines(source).map(|(i, _)| i).collect();
        assert_eq!(lines, vec![0, 2, 3]);
    }
}
