//! Chat prompts for each remote request kind.

use crate::transport::{ChatMessage, ChatRequest};

/// Sampling settings and system message for one request kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromptProfile {
    pub system: &'static str,
    pub temperature: f32,
    pub max_tokens: u32,
}

pub const TRACE: PromptProfile = PromptProfile {
    system: "You are a code execution tracer that generates detailed step-by-step execution traces for code. Always respond with valid JSON.",
    temperature: 0.2,
    max_tokens: 4000,
};

pub const ANALYSIS: PromptProfile = PromptProfile {
    system: "You are a code analysis assistant that provides detailed analysis of code. Always respond with valid JSON.",
    temperature: 0.2,
    max_tokens: 2000,
};

pub const EXPLANATION: PromptProfile = PromptProfile {
    system: "You are a code explanation assistant that provides detailed explanations of code. Always respond with valid JSON.",
    temperature: 0.2,
    max_tokens: 2000,
};

pub const ANSWER: PromptProfile = PromptProfile {
    system: "You are a code assistant that answers questions about code with accurate and helpful explanations.",
    temperature: 0.3,
    max_tokens: 2000,
};

impl PromptProfile {
    /// Builds a request with this profile's system message and `user` prompt.
    pub fn request(&self, user: String) -> ChatRequest {
        ChatRequest {
            messages: vec![ChatMessage::system(self.system), ChatMessage::user(user)],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

fn fenced(source: &str, language: &str) -> String {
    format!("```{language}\n{source}\n```")
}

pub fn trace_request(source: &str, language: &str) -> ChatRequest {
    TRACE.request(format!(
        r#"Analyze the following {language} code and generate a detailed execution trace:

{code}

Provide a step-by-step execution trace in the following JSON format:
{{
  "executionTrace": [
    {{
      "line": <zero-based line number>,
      "code": <code at this line>,
      "variables": {{<variable name>: <variable value>}},
      "callStack": [<function names in call stack, outermost first>],
      "output": <all console output produced so far>,
      "explanation": <brief explanation of what happens at this step>
    }}
  ]
}}

Return ONLY the JSON object, nothing else."#,
        code = fenced(source, language),
    ))
}

pub fn analysis_request(source: &str, language: &str) -> ChatRequest {
    ANALYSIS.request(format!(
        r#"Analyze the following {language} code:

{code}

Provide a detailed analysis in the following JSON format:
{{
  "explanation": "Brief explanation of what the code does",
  "complexity": {{
    "time": "Time complexity (e.g., O(n))",
    "space": "Space complexity (e.g., O(1))"
  }},
  "suggestions": [
    "Suggestion 1 for improving the code",
    "Suggestion 2 for improving the code"
  ]
}}

Return ONLY the JSON object, nothing else."#,
        code = fenced(source, language),
    ))
}

pub fn explanation_request(source: &str, language: &str) -> ChatRequest {
    EXPLANATION.request(format!(
        r#"Explain the following {language} code in detail:

{code}

Provide a detailed explanation in the following JSON format:
{{
  "summary": "Brief summary of what the code does",
  "lineByLineExplanation": [
    {{
      "line": 1,
      "code": "def example():",
      "explanation": "Defines a function named example"
    }}
  ]
}}

Return ONLY the JSON object, nothing else."#,
        code = fenced(source, language),
    ))
}

pub fn answer_request(source: &str, language: &str, question: &str) -> ChatRequest {
    ANSWER.request(format!(
        r#"Answer a question about the following {language} code:

{code}

Question: {question}

Provide a clear, detailed, and accurate answer to the question."#,
        code = fenced(source, language),
    ))
}
