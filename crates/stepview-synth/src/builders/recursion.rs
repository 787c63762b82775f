//! Traces for recursion on a single integer parameter.
//!
//! Both builders walk the complete call/return tree for a fixed demo argument.
//! Every call contributes an entry step and a base-case check; base calls
//! return directly, inner calls add a recursive-call step and, once their
//! callees return, a combine step carrying `"return value"`. The call stack
//! at each step is `main` followed by one frame per active call.

use stepview_core::{ExecutionStep, ExecutionTrace, ROOT_FRAME};

use super::code_at;
use crate::recognize::{find_line, find_line_after, function_name, line_text, parameter_name};

/// Argument both demo traces are built for.
pub const DEMO_ARGUMENT: u64 = 5;

/// Variable name holding a frame's result on return.
pub const RETURN_VALUE: &str = "return value";

/// Where the interesting lines of a recursive program sit.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Layout {
    function: String,
    param: String,
    def_line: usize,
    base_line: usize,
    base_return_line: usize,
    recursive_line: usize,
    call_line: usize,
    print_line: usize,
}

impl Layout {
    /// Recognizes the layout of `source`. Missing pieces default to the
    /// canonical sample program (a comment on line 0, the definition on
    /// line 1, the main program after a blank line).
    fn recognize(source: &str, default_function: &str) -> Self {
        let function = function_name(source).unwrap_or_else(|| default_function.to_string());
        let param = parameter_name(source, &function).unwrap_or_else(|| "n".to_string());
        let call_needle = format!("{function}(");

        let def_line = find_line(source, &call_needle).unwrap_or(1);
        let base_line = find_line_after(source, "if", def_line).unwrap_or(def_line + 1);
        let base_return_line = if line_text(source, base_line).is_some_and(|l| l.contains("return")) {
            base_line
        } else {
            find_line_after(source, "return", base_line).unwrap_or(base_line + 1)
        };
        let recursive_line =
            find_line_after(source, &call_needle, def_line).unwrap_or(base_return_line + 1);
        let call_line =
            find_line_after(source, &call_needle, recursive_line).unwrap_or(recursive_line + 3);
        let print_line = find_line_after(source, "print", call_line)
            .or_else(|| find_line_after(source, "console.log", call_line))
            .unwrap_or(call_line + 1);

        Layout {
            function,
            param,
            def_line,
            base_line,
            base_return_line,
            recursive_line,
            call_line,
            print_line,
        }
    }

    fn frame(&self, argument: u64) -> String {
        format!("{}({})", self.function, argument)
    }

    fn stack(&self, arguments: &[u64]) -> Vec<String> {
        std::iter::once(ROOT_FRAME.to_string())
            .chain(arguments.iter().map(|a| self.frame(*a)))
            .collect()
    }
}

/// Source snippets for the lines the builders visit.
struct Snippets {
    def: String,
    base: String,
    base_return: String,
    recursive: String,
    call: String,
    print: String,
}

impl Snippets {
    fn read(source: &str, layout: &Layout, base_return: String, recursive: String) -> Self {
        let f = &layout.function;
        let p = &layout.param;
        Snippets {
            def: code_at(source, layout.def_line, || format!("def {f}({p}):")),
            base: code_at(source, layout.base_line, || format!("if {p} <= 1:")),
            base_return: code_at(source, layout.base_return_line, || base_return),
            recursive: code_at(source, layout.recursive_line, || recursive),
            call: code_at(source, layout.call_line, || format!("result = {f}({DEMO_ARGUMENT})")),
            print: code_at(source, layout.print_line, || "print(result)".to_string()),
        }
    }
}

/// Factorial-family trace for `DEMO_ARGUMENT` (result 120).
pub fn factorial(source: &str) -> ExecutionTrace {
    let layout = Layout::recognize(source, "factorial");
    let (f, p) = (&layout.function, &layout.param);
    let code = Snippets::read(
        source,
        &layout,
        "return 1".to_string(),
        format!("return {p} * {f}({p} - 1)"),
    );
    let mut steps = Vec::new();

    steps.push(
        ExecutionStep::new(layout.call_line, &code.call)
            .with_explanation(format!("Program starts and calls {}", layout.frame(DEMO_ARGUMENT))),
    );

    let mut arguments = Vec::new();
    for k in (1..=DEMO_ARGUMENT).rev() {
        arguments.push(k);
        let stack = layout.stack(&arguments);
        steps.push(
            ExecutionStep::new(layout.def_line, &code.def)
                .with_variable(p.as_str(), k)
                .with_call_stack(stack.clone())
                .with_explanation(format!("Enter {} with {p} = {k}", layout.frame(k))),
        );
        steps.push(
            ExecutionStep::new(layout.base_line, &code.base)
                .with_variable(p.as_str(), k)
                .with_call_stack(stack.clone())
                .with_explanation(format!("Check base case: {p} <= 1 is {}", k <= 1)),
        );
        if k > 1 {
            steps.push(
                ExecutionStep::new(layout.recursive_line, &code.recursive)
                    .with_variable(p.as_str(), k)
                    .with_call_stack(stack)
                    .with_explanation(format!("{} calls {}", layout.frame(k), layout.frame(k - 1))),
            );
        } else {
            steps.push(
                ExecutionStep::new(layout.base_return_line, &code.base_return)
                    .with_variable(p.as_str(), k)
                    .with_variable(RETURN_VALUE, 1u64)
                    .with_call_stack(stack)
                    .with_explanation("Base case reached: return 1"),
            );
        }
    }

    let mut product = 1u64;
    for k in 2..=DEMO_ARGUMENT {
        arguments.pop();
        let previous = product;
        product *= k;
        steps.push(
            ExecutionStep::new(layout.recursive_line, &code.recursive)
                .with_variable(p.as_str(), k)
                .with_variable(RETURN_VALUE, product)
                .with_call_stack(layout.stack(&arguments))
                .with_explanation(format!(
                    "{} returned {previous}; {k} * {previous} = {product}",
                    layout.frame(k - 1)
                )),
        );
    }

    let output = format!("Factorial of {DEMO_ARGUMENT} is {product}\n");
    finish(&mut steps, &layout, &code, product, output);
    ExecutionTrace::new(steps)
}

/// Fibonacci-family trace for `DEMO_ARGUMENT` (result 5, 15 calls).
pub fn fibonacci(source: &str) -> ExecutionTrace {
    let layout = Layout::recognize(source, "fib");
    let (f, p) = (&layout.function, &layout.param);
    let code = Snippets::read(
        source,
        &layout,
        format!("return {p}"),
        format!("return {f}({p}-1) + {f}({p}-2)"),
    );
    let mut steps = vec![ExecutionStep::new(layout.call_line, &code.call)
        .with_explanation(format!("Program starts and calls {}", layout.frame(DEMO_ARGUMENT)))];

    let mut arguments = Vec::new();
    let result = visit_fibonacci(DEMO_ARGUMENT, &layout, &code, &mut arguments, &mut steps);

    let output = format!("{}({DEMO_ARGUMENT}) = {result}\n", layout.function);
    finish(&mut steps, &layout, &code, result, output);
    ExecutionTrace::new(steps)
}

fn visit_fibonacci(
    k: u64,
    layout: &Layout,
    code: &Snippets,
    arguments: &mut Vec<u64>,
    steps: &mut Vec<ExecutionStep>,
) -> u64 {
    let p = layout.param.as_str();
    arguments.push(k);
    let stack = layout.stack(arguments);

    steps.push(
        ExecutionStep::new(layout.def_line, &code.def)
            .with_variable(p, k)
            .with_call_stack(stack.clone())
            .with_explanation(format!("Enter {}", layout.frame(k))),
    );
    steps.push(
        ExecutionStep::new(layout.base_line, &code.base)
            .with_variable(p, k)
            .with_call_stack(stack.clone())
            .with_explanation(format!("Check base case: {p} <= 1 is {}", k <= 1)),
    );

    let result = if k <= 1 {
        steps.push(
            ExecutionStep::new(layout.base_return_line, &code.base_return)
                .with_variable(p, k)
                .with_variable(RETURN_VALUE, k)
                .with_call_stack(stack)
                .with_explanation(format!("Base case: {} returns {k}", layout.frame(k))),
        );
        k
    } else {
        steps.push(
            ExecutionStep::new(layout.recursive_line, &code.recursive)
                .with_variable(p, k)
                .with_call_stack(stack.clone())
                .with_explanation(format!(
                    "{} calls {} and {}",
                    layout.frame(k),
                    layout.frame(k - 1),
                    layout.frame(k - 2)
                )),
        );
        let left = visit_fibonacci(k - 1, layout, code, arguments, steps);
        let right = visit_fibonacci(k - 2, layout, code, arguments, steps);
        let sum = left + right;
        steps.push(
            ExecutionStep::new(layout.recursive_line, &code.recursive)
                .with_variable(p, k)
                .with_variable(RETURN_VALUE, sum)
                .with_call_stack(stack)
                .with_explanation(format!(
                    "{} returns {left} + {right} = {sum}",
                    layout.frame(k)
                )),
        );
        sum
    };

    arguments.pop();
    result
}

/// Appends the return-to-main and print steps shared by both builders.
fn finish(
    steps: &mut Vec<ExecutionStep>,
    layout: &Layout,
    code: &Snippets,
    result: u64,
    output: String,
) {
    steps.push(
        ExecutionStep::new(layout.call_line, &code.call)
            .with_variable("result", result)
            .with_variable(RETURN_VALUE, result)
            .with_explanation(format!(
                "{} returned {result}, stored in result",
                layout.frame(DEMO_ARGUMENT)
            )),
    );
    steps.push(
        ExecutionStep::new(layout.print_line, &code.print)
            .with_variable("result", result)
            .with_variable(RETURN_VALUE, result)
            .with_output(output)
            .with_explanation("Print the result"),
    );
}
