//! Representative merge sort trace.
//!
//! Not exhaustive: the trace shows program entry, printing the input, the
//! top-level sort call, the first recursive descent, one merge and the final
//! sorted print. Large inputs produce the same eight steps.

use serde_json::Value;
use stepview_core::{ExecutionStep, ExecutionTrace, ROOT_FRAME};

use super::code_at;
use crate::recognize::{find_line, find_line_after, int_array_literal};

/// Input used when the source carries no integer array literal.
pub const DEFAULT_ARRAY: [i64; 6] = [12, 11, 13, 5, 6, 7];

/// Locates the first line containing any of `needles` (searched strictly
/// after `after` when given), else `default`.
fn locate(source: &str, needles: &[&str], after: Option<usize>, default: usize) -> usize {
    needles
        .iter()
        .find_map(|needle| match after {
            Some(after) => find_line_after(source, needle, after),
            None => find_line(source, needle),
        })
        .unwrap_or(default)
}

/// First line calling `needle`, skipping lines that define it.
fn find_call(source: &str, needle: &str) -> Option<usize> {
    source.lines().position(|line| {
        let trimmed = line.trim_start();
        line.contains(needle)
            && !["def ", "function ", "void ", "static "]
                .iter()
                .any(|keyword| trimmed.starts_with(keyword))
    })
}

fn frames(names: &[&str]) -> Vec<String> {
    std::iter::once(ROOT_FRAME)
        .chain(names.iter().copied())
        .map(str::to_string)
        .collect()
}

fn joined(values: &[i64]) -> String {
    values
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn array(values: &[i64]) -> Value {
    Value::from(values.to_vec())
}

/// Builds the merge sort trace for the first integer array in `source`.
pub fn build(source: &str) -> ExecutionTrace {
    let input = int_array_literal(source).unwrap_or_else(|| DEFAULT_ARRAY.to_vec());
    let sort_fn = if source.contains("mergeSort") { "mergeSort" } else { "merge_sort" };

    let right = input.len() - 1;
    let mid = right / 2;
    let mut merged_left = input.clone();
    merged_left[..=mid].sort_unstable();
    let mut sorted = input.clone();
    sorted.sort_unstable();

    let main_line = locate(source, &["__main__", "main("], None, 60);
    let given_line = locate(source, &["Given array"], None, 62);
    let print_input_line = locate(source, &["print_list(", "printList("], Some(given_line), 63);
    let sort_call_line = locate(source, &["merge_sort(arr, 0", "mergeSort(arr, 0"], None, 65);
    let descent_line = locate(
        source,
        &["merge_sort(arr, left, mid)", "mergeSort(arr, left, mid)"],
        None,
        48,
    );
    let merge_line = find_call(source, "merge(arr, left, mid, right)").unwrap_or(50);
    let sorted_line = locate(source, &["Sorted array"], None, 67);
    let print_sorted_line = locate(source, &["print_list(", "printList("], Some(sorted_line), 68);

    let mut output = String::new();
    let mut steps = Vec::with_capacity(8);

    steps.push(
        ExecutionStep::new(main_line, code_at(source, main_line, || "if __name__ == \"__main__\":".into()))
            .with_variable("arr", array(&input))
            .with_explanation("Program execution starts here"),
    );

    output.push_str("Given array is\n");
    steps.push(
        ExecutionStep::new(given_line, code_at(source, given_line, || "print(\"Given array is\")".into()))
            .with_variable("arr", array(&input))
            .with_output(output.clone())
            .with_explanation("Print a message before showing the original array"),
    );

    output.push_str(&joined(&input));
    output.push('\n');
    steps.push(
        ExecutionStep::new(print_input_line, code_at(source, print_input_line, || "print_list(arr)".into()))
            .with_variable("arr", array(&input))
            .with_call_stack(frames(&["print_list"]))
            .with_output(output.clone())
            .with_explanation("Call print_list to display the original array"),
    );

    steps.push(
        ExecutionStep::new(sort_call_line, code_at(source, sort_call_line, || {
            format!("{sort_fn}(arr, 0, len(arr) - 1)")
        }))
        .with_variable("arr", array(&input))
        .with_variable("left", 0)
        .with_variable("right", right)
        .with_call_stack(frames(&[sort_fn]))
        .with_output(output.clone())
        .with_explanation("Start merge sort on the full array"),
    );

    steps.push(
        ExecutionStep::new(descent_line, code_at(source, descent_line, || {
            format!("{sort_fn}(arr, left, mid)")
        }))
        .with_variable("arr", array(&input))
        .with_variable("left", 0)
        .with_variable("mid", mid)
        .with_variable("right", right)
        .with_call_stack(frames(&[sort_fn, sort_fn]))
        .with_output(output.clone())
        .with_explanation("Recursively sort the left half of the array"),
    );

    steps.push(
        ExecutionStep::new(merge_line, code_at(source, merge_line, || "merge(arr, left, mid, right)".into()))
            .with_variable("arr", array(&merged_left))
            .with_variable("left", 0)
            .with_variable("mid", mid / 2)
            .with_variable("right", mid)
            .with_call_stack(frames(&[sort_fn, sort_fn, "merge"]))
            .with_output(output.clone())
            .with_explanation("Merge two sorted subarrays of the left half"),
    );

    output.push_str("\nSorted array is\n");
    steps.push(
        ExecutionStep::new(sorted_line, code_at(source, sorted_line, || "print(\"\\nSorted array is\")".into()))
            .with_variable("arr", array(&sorted))
            .with_output(output.clone())
            .with_explanation("Print a message before showing the sorted array"),
    );

    output.push_str(&joined(&sorted));
    output.push('\n');
    steps.push(
        ExecutionStep::new(print_sorted_line, code_at(source, print_sorted_line, || "print_list(arr)".into()))
            .with_variable("arr", array(&sorted))
            .with_call_stack(frames(&["print_list"]))
            .with_output(output)
            .with_explanation("Display the final sorted array"),
    );

    ExecutionTrace::new(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SAMPLE: &str = r#"def merge(arr, left, mid, right):
    pass

def merge_sort(arr, left, right):
    if left < right:
        mid = (left + right) // 2
        merge_sort(arr, left, mid)
        merge_sort(arr, mid + 1, right)
        merge(arr, left, mid, right)

def print_list(arr):
    print(" ".join(map(str, arr)))

if __name__ == "__main__":
    arr = [38, 27, 43, 3, 9, 82, 10]
    print("Given array is")
    print_list(arr)
    merge_sort(arr, 0, len(arr) - 1)
    print("\nSorted array is")
    print_list(arr)
"#;

    #[test]
    fn uses_array_literal_and_source_lines() {
        let trace = build(SAMPLE);
        assert_eq!(trace.len(), 8);
        let lines: Vec<usize> = trace.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![13, 15, 16, 17, 6, 8, 18, 19]);
        assert_eq!(
            trace.first().unwrap().variables.get("arr"),
            Some(&json!([38, 27, 43, 3, 9, 82, 10]))
        );
        assert_eq!(
            trace.last().unwrap().variables.get("arr"),
            Some(&json!([3, 9, 10, 27, 38, 43, 82]))
        );
    }

    #[test]
    fn output_accumulates_across_steps() {
        let trace = build(SAMPLE);
        assert!(trace.output_is_monotonic());
        assert_eq!(
            trace.last().unwrap().output,
            "Given array is\n38 27 43 3 9 82 10\n\nSorted array is\n3 9 10 27 38 43 82\n"
        );
    }

    #[test]
    fn merge_step_sorts_left_half_only() {
        let trace = build(SAMPLE);
        let merge = trace.get(5).unwrap();
        assert_eq!(merge.current_frame(), Some("merge"));
        assert_eq!(merge.depth(), 4);
        assert_eq!(merge.variables.get("arr"), Some(&json!([3, 27, 38, 43, 9, 82, 10])));
        assert_eq!(merge.variables.get("right"), Some(&json!(3)));
    }

    #[test]
    fn defaults_without_array_literal() {
        let trace = build("");
        assert_eq!(trace.len(), 8);
        assert_eq!(
            trace.first().unwrap().variables.get("arr"),
            Some(&json!(DEFAULT_ARRAY))
        );
        assert_eq!(trace.first().unwrap().line, 60);
        assert_eq!(
            trace.last().unwrap().variables.get("arr"),
            Some(&json!([5, 6, 7, 11, 12, 13]))
        );
        assert!(trace.is_well_formed());
    }

    #[test]
    fn single_element_array_is_handled() {
        let trace = build("arr = [42]\nmergeSort(arr, 0, 0)");
        assert_eq!(trace.get(3).unwrap().current_frame(), Some("mergeSort"));
        assert_eq!(trace.last().unwrap().variables.get("arr"), Some(&json!([42])));
    }
}
