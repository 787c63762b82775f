//! Offline defaults for analyses, explanations and answers.
//!
//! Used whenever the remote assistant is unavailable or returns nothing
//! usable. All lookups are keyed by [`CodePattern`].

use stepview_core::{CodeAnalysis, CodeExplanation, CodePattern, Complexity, LineExplanation};

/// Number of lines covered by the generic per-line explanation.
pub const GENERIC_EXPLANATION_LINES: usize = 10;

/// Answer given when a credential exists but neither the remote call nor any
/// canned answer produced something better.
pub const DEFAULT_ANSWER: &str = "To answer this question accurately the specific details of the code need to be analyzed. The code appears to define functions and execute operations, but without running it only general guidance is possible. Point at a specific part of the code to get a more focused answer.";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn canned_analysis(pattern: CodePattern) -> CodeAnalysis {
    match pattern {
        CodePattern::MergeSort => CodeAnalysis {
            explanation: "This code implements merge sort, a divide-and-conquer sorting algorithm. It splits the array into halves, sorts each half recursively and merges the sorted halves back together.".into(),
            complexity: Complexity {
                time: "O(n log n)".into(),
                space: "O(n)".into(),
            },
            suggestions: strings(&[
                "Consider an in-place merge to reduce auxiliary space",
                "Switch to insertion sort for small subarrays",
                "Add comments explaining the split and merge steps",
            ]),
        },
        CodePattern::FibonacciLikeRecursion => CodeAnalysis {
            explanation: "This code computes Fibonacci numbers recursively. Each number is the sum of the two preceding ones, starting from 0 and 1.".into(),
            complexity: Complexity {
                time: "O(2^n)".into(),
                space: "O(n)".into(),
            },
            suggestions: strings(&[
                "Use memoization to avoid recomputing subproblems",
                "An iterative version runs in linear time and constant space",
                "Reject negative inputs explicitly",
            ]),
        },
        CodePattern::FactorialLikeRecursion => CodeAnalysis {
            explanation: "This code computes a factorial recursively. Each call multiplies its argument by the factorial of the argument minus one until the base case is reached.".into(),
            complexity: Complexity {
                time: "O(n)".into(),
                space: "O(n)".into(),
            },
            suggestions: strings(&[
                "An iterative loop avoids call stack growth for large inputs",
                "Reject negative inputs explicitly",
                "Use arbitrary-precision integers for large results",
            ]),
        },
        CodePattern::Generic => CodeAnalysis {
            explanation: "This code appears to define functions and execute operations. A more detailed analysis would require examining the specific logic and algorithms used.".into(),
            complexity: Complexity {
                time: "Varies based on input size and operations".into(),
                space: "Varies based on data structures used".into(),
            },
            suggestions: strings(&[
                "Add comments explaining the purpose of each function",
                "Handle edge cases and invalid input",
                "Review variable naming for clarity and consistency",
            ]),
        },
    }
}

fn line(line: usize, code: &str, explanation: &str) -> LineExplanation {
    LineExplanation {
        line,
        code: code.into(),
        explanation: explanation.into(),
    }
}

pub fn canned_explanation(pattern: CodePattern, source: &str) -> CodeExplanation {
    match pattern {
        CodePattern::MergeSort => CodeExplanation {
            summary: "This code implements merge sort: it divides the array, sorts the halves and merges them back together.".into(),
            line_by_line_explanation: vec![
                line(1, "def merge(arr, left, mid, right):", "Defines the function that combines two sorted subarrays into one."),
                line(2, "n1 = mid - left + 1", "Size of the left subarray."),
                line(3, "n2 = right - mid", "Size of the right subarray."),
                line(6, "L = [0] * n1", "Temporary storage for the left subarray."),
                line(7, "R = [0] * n2", "Temporary storage for the right subarray."),
                line(47, "def merge_sort(arr, left, right):", "Defines the recursive sorting function."),
                line(48, "if left < right:", "Only ranges with at least two elements need sorting."),
                line(49, "mid = (left + right) // 2", "Middle index that splits the range in two halves."),
            ],
        },
        CodePattern::FibonacciLikeRecursion => CodeExplanation {
            summary: "This code computes Fibonacci numbers recursively, where each number is the sum of the two preceding ones.".into(),
            line_by_line_explanation: vec![
                line(1, "def fib(n):", "Defines the recursive Fibonacci function."),
                line(2, "if n <= 1:", "Base case: fib(0) is 0 and fib(1) is 1."),
                line(3, "return n", "Returns n directly for the base case."),
                line(4, "return fib(n - 1) + fib(n - 2)", "Sums the two preceding Fibonacci numbers, branching into two recursive calls."),
            ],
        },
        CodePattern::FactorialLikeRecursion => CodeExplanation {
            summary: "This code computes a factorial recursively, multiplying n by the factorial of n - 1.".into(),
            line_by_line_explanation: vec![
                line(1, "def calculate_factorial(n):", "Defines a recursive function that computes n!."),
                line(2, "if n <= 1:", "Base case: the factorial of 0 and 1 is 1."),
                line(3, "return 1", "Returns 1 for the base case."),
                line(4, "return n * calculate_factorial(n - 1)", "Multiplies n by the factorial of n - 1."),
            ],
        },
        CodePattern::Generic => CodeExplanation {
            summary: "This code appears to define functions and execute operations. A more detailed explanation would require examining the specific logic and algorithms used.".into(),
            line_by_line_explanation: source
                .lines()
                .take(GENERIC_EXPLANATION_LINES)
                .enumerate()
                .map(|(index, text)| {
                    let trimmed = text.trim();
                    if trimmed.is_empty() {
                        line(index + 1, "(empty line)", "This line is empty or contains only whitespace.")
                    } else {
                        line(index + 1, trimmed, "This line contains code that contributes to the program's functionality.")
                    }
                })
                .collect(),
        },
    }
}

/// Keyword-matched answer for `question`, or `None` when nothing matches.
pub fn canned_answer(pattern: CodePattern, question: &str) -> Option<&'static str> {
    let q = question.to_lowercase();

    let specific = match pattern {
        CodePattern::MergeSort => {
            if q.contains("time complexity") {
                Some("Merge sort runs in O(n log n) time in the best, average and worst case: the array is halved log n times and each level does linear work to merge.")
            } else if q.contains("space complexity") {
                Some("This merge sort uses O(n) extra space for the temporary left and right arrays. The recursion adds O(log n) stack space, which the temporary arrays dominate.")
            } else if q.contains("how") {
                Some("Merge sort splits the array into two halves, sorts each half recursively and merges the sorted halves by repeatedly taking the smaller front element.")
            } else {
                None
            }
        }
        CodePattern::FactorialLikeRecursion | CodePattern::FibonacciLikeRecursion => {
            if q.contains("recursive") {
                Some("Yes, the function calls itself with a smaller argument until it reaches the base case (n <= 1). Every pending call stays on the call stack, so very large inputs can overflow it.")
            } else if q.contains("time complexity") {
                Some("A recursive factorial makes n calls with constant work each, so it runs in O(n). A naive recursive Fibonacci branches twice per call and runs in O(2^n).")
            } else if q.contains("improve") {
                Some("Use an iterative loop to avoid deep recursion, and memoize previously computed results so repeated subproblems are not recomputed.")
            } else {
                None
            }
        }
        CodePattern::Generic => None,
    };

    specific.or_else(|| {
        if q.contains("what does this code do") {
            Some("This code appears to define functions and execute operations. It seems to implement an algorithm or solve a specific problem; a detailed answer requires looking at its specific logic.")
        } else if q.contains("how can i improve") {
            Some("General improvements: comment the purpose of functions and complex operations, handle edge cases, optimize performance-critical sections, and follow the language's naming and layout conventions.")
        } else if q.contains("bug") || q.contains("error") {
            Some("Without running the code specific bugs are hard to identify. Check for off-by-one errors in loops, wrong boundary conditions, unhandled edge cases and null or undefined references, and test with varied inputs.")
        } else {
            None
        }
    })
}
