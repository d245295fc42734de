//! Prompt templates for the three translation directions.
//!
//! Each template carries one fixed worked example so that the model mirrors
//! its layout. The result is used as the system instruction of a one-shot
//! completion.

use crate::core::types::Language;

const PREAMBLE: &str = "You are an expert programmer in all programming languages.";

const ANCHOR_DESCRIPTION: &str = "Print the numbers 0 to 9.";

const ANCHOR_JAVASCRIPT: &str = "for (let i = 0; i < 10; i++) {
  console.log(i);
}";

const ANCHOR_PYTHON: &str = "for i in range(10):
    print(i)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    NaturalLanguageToCode,
    CodeToNaturalLanguage,
    CodeToCode,
}

impl PromptKind {
    /// A natural-language input wins when both sides are natural language.
    pub fn select(input_language: &Language, output_language: &Language) -> Self {
        if input_language.is_natural_language() {
            Self::NaturalLanguageToCode
        } else if output_language.is_natural_language() {
            Self::CodeToNaturalLanguage
        } else {
            Self::CodeToCode
        }
    }
}

pub fn create_prompt(
    input_language: &Language,
    output_language: &Language,
    input_code: &str,
) -> String {
    match PromptKind::select(input_language, output_language) {
        PromptKind::NaturalLanguageToCode => natural_language_to_code(output_language, input_code),
        PromptKind::CodeToNaturalLanguage => code_to_natural_language(input_language, input_code),
        PromptKind::CodeToCode => code_to_code(input_language, output_language, input_code),
    }
}

fn natural_language_to_code(output_language: &Language, input_code: &str) -> String {
    format!(
        "{PREAMBLE} Translate the natural language to \"{output_language}\" code. Do not include ```.

Example translating from natural language to JavaScript:

Natural language:
{ANCHOR_DESCRIPTION}

JavaScript code:
{ANCHOR_JAVASCRIPT}

Natural language:
{input_code}

{output_language} code (no ```):"
    )
}

fn code_to_natural_language(input_language: &Language, input_code: &str) -> String {
    format!(
        "{PREAMBLE} Translate the \"{input_language}\" code to natural language in plain English that the average adult could understand. Respond as bullet points starting with -.

Example translating from JavaScript to natural language:

JavaScript code:
{ANCHOR_JAVASCRIPT}

Natural language:
{ANCHOR_DESCRIPTION}

{input_language} code:
{input_code}

Natural language:"
    )
}

fn code_to_code(input_language: &Language, output_language: &Language, input_code: &str) -> String {
    format!(
        "{PREAMBLE} Translate the \"{input_language}\" code to \"{output_language}\" code. Do not include ```.

Example translating from JavaScript to Python:

JavaScript code:
{ANCHOR_JAVASCRIPT}

Python code:
{ANCHOR_PYTHON}

{input_language} code:
{input_code}

{output_language} code (no ```):"
    )
}
