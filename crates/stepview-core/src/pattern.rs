//! Source-shape classification.
//!
//! [`classify`] maps raw source text to the [`CodePattern`] that decides which
//! trace generation strategy runs. Classification is a pure function of the
//! text: a fixed, priority-ordered table of case-insensitive substring rules
//! ([`RULES`]) is walked top to bottom and the first matching rule wins. Line
//! position and keyword frequency never matter.
//!
//! The sort family is checked before the recursion family. Quick sort and
//! bubble sort have no dedicated builder, so they resolve to
//! [`CodePattern::Generic`], but matching them still stops the walk.

use serde::{Deserialize, Serialize};

/// Recognizable algorithm shape of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodePattern {
    FactorialLikeRecursion,
    FibonacciLikeRecursion,
    MergeSort,
    Generic,
}

impl CodePattern {
    pub const ALL: [CodePattern; 4] = [
        CodePattern::FactorialLikeRecursion,
        CodePattern::FibonacciLikeRecursion,
        CodePattern::MergeSort,
        CodePattern::Generic,
    ];

    /// Stable wire tag (e.g. `"merge-sort"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            CodePattern::FactorialLikeRecursion => "factorial-like-recursion",
            CodePattern::FibonacciLikeRecursion => "fibonacci-like-recursion",
            CodePattern::MergeSort => "merge-sort",
            CodePattern::Generic => "generic",
        }
    }

    /// True for the recursion-on-integer family.
    pub fn is_recursive(&self) -> bool {
        matches!(
            self,
            CodePattern::FactorialLikeRecursion | CodePattern::FibonacciLikeRecursion
        )
    }
}

impl std::fmt::Display for CodePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a rule tests the lowercased source.
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// At least one keyword occurs.
    AnyOf(&'static [&'static str]),
    /// Every keyword occurs.
    AllOf(&'static [&'static str]),
}

impl Matcher {
    fn matches(&self, haystack: &str) -> bool {
        match self {
            Matcher::AnyOf(keywords) => keywords.iter().any(|k| haystack.contains(k)),
            Matcher::AllOf(keywords) => keywords.iter().all(|k| haystack.contains(k)),
        }
    }
}

/// One entry of the classification table.
#[derive(Debug, Clone, Copy)]
pub struct PatternRule {
    /// Short rule name used in diagnostics.
    pub name: &'static str,
    pub pattern: CodePattern,
    pub matcher: Matcher,
}

/// Classification table in priority order. Do not reorder: builders assume
/// the resulting patterns are mutually exclusive.
pub const RULES: &[PatternRule] = &[
    PatternRule {
        name: "merge-sort",
        pattern: CodePattern::MergeSort,
        matcher: Matcher::AnyOf(&["merge sort", "mergesort", "merge_sort"]),
    },
    PatternRule {
        name: "quick-sort",
        pattern: CodePattern::Generic,
        matcher: Matcher::AnyOf(&["quick sort", "quicksort", "quick_sort"]),
    },
    PatternRule {
        name: "bubble-sort",
        pattern: CodePattern::Generic,
        matcher: Matcher::AnyOf(&["bubble sort", "bubblesort", "bubble_sort"]),
    },
    PatternRule {
        name: "factorial",
        pattern: CodePattern::FactorialLikeRecursion,
        matcher: Matcher::AnyOf(&["factorial"]),
    },
    PatternRule {
        name: "fibonacci",
        pattern: CodePattern::FibonacciLikeRecursion,
        matcher: Matcher::AnyOf(&["fibonacci", "fib("]),
    },
    PatternRule {
        name: "fibonacci-shape",
        pattern: CodePattern::FibonacciLikeRecursion,
        matcher: Matcher::AllOf(&["n-1", "n-2", "return"]),
    },
    PatternRule {
        name: "fib-call",
        pattern: CodePattern::FibonacciLikeRecursion,
        matcher: Matcher::AllOf(&["fib ", "return"]),
    },
];

/// Classifies `source` and reports the rule that fired (`None` when the
/// default `generic` applied).
pub fn classify_with_rule(source: &str) -> (CodePattern, Option<&'static PatternRule>) {
    let haystack = source.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.matcher.matches(&haystack))
        .map(|rule| (rule.pattern, Some(rule)))
        .unwrap_or((CodePattern::Generic, None))
}

/// Classifies `source` into exactly one [`CodePattern`].
pub fn classify(source: &str) -> CodePattern {
    classify_with_rule(source).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn factorial_source_is_factorial_like() {
        let source = "def calculate_factorial(n):\n    if n <= 1:\n        return 1\n    return n * calculate_factorial(n - 1)\n";
        assert_eq!(classify(source), CodePattern::FactorialLikeRecursion);
    }

    #[test]
    fn fibonacci_keywords_and_shape() {
        assert_eq!(classify("def fibonacci(n): ..."), CodePattern::FibonacciLikeRecursion);
        assert_eq!(classify("x = fib(10)"), CodePattern::FibonacciLikeRecursion);
        assert_eq!(
            classify("def f(n):\n    return f(n-1) + f(n-2)"),
            CodePattern::FibonacciLikeRecursion
        );
    }

    #[test]
    fn spaced_fib_call_is_fibonacci_like() {
        let (pattern, rule) =
            classify_with_rule("int fib (int n) { return fib (n - 1) + fib (n - 2); }");
        assert_eq!(pattern, CodePattern::FibonacciLikeRecursion);
        assert_eq!(rule.map(|r| r.name), Some("fib-call"));
        assert_eq!(classify("fib = 3"), CodePattern::Generic);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(classify("// MergeSort implementation"), CodePattern::MergeSort);
        assert_eq!(classify("FACTORIAL"), CodePattern::FactorialLikeRecursion);
    }

    #[test]
    fn sort_family_outranks_recursion_family() {
        let (pattern, rule) = classify_with_rule("# merge_sort, uses factorial and fibonacci");
        assert_eq!(pattern, CodePattern::MergeSort);
        assert_eq!(rule.map(|r| r.name), Some("merge-sort"));

        let (pattern, rule) = classify_with_rule("def bubble_sort(a): # not a factorial");
        assert_eq!(pattern, CodePattern::Generic);
        assert_eq!(rule.map(|r| r.name), Some("bubble-sort"));

        let (pattern, rule) = classify_with_rule("quicksort then mergesort");
        assert_eq!(pattern, CodePattern::MergeSort);
        assert_eq!(rule.map(|r| r.name), Some("merge-sort"));
    }

    #[test]
    fn factorial_outranks_fibonacci_regardless_of_position() {
        assert_eq!(
            classify("fibonacci first, then factorial"),
            CodePattern::FactorialLikeRecursion
        );
    }

    #[test]
    fn unrecognized_source_is_generic_without_rule() {
        let (pattern, rule) = classify_with_rule("x = 1\nprint(x)");
        assert_eq!(pattern, CodePattern::Generic);
        assert!(rule.is_none());
        assert_eq!(classify(""), CodePattern::Generic);
    }

    #[test]
    fn wire_tags_round_trip() {
        for pattern in CodePattern::ALL {
            let json = serde_json::to_value(pattern).unwrap();
            assert_eq!(json, serde_json::Value::String(pattern.as_str().to_string()));
            let back: CodePattern = serde_json::from_value(json).unwrap();
            assert_eq!(back, pattern);
        }
    }

    proptest! {
        #[test]
        fn classification_is_total_and_idempotent(source in ".*") {
            let first = classify(&source);
            prop_assert!(CodePattern::ALL.contains(&first));
            prop_assert_eq!(first, classify(&source));
        }
    }
}
