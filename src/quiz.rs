//! Plain-text quiz handling for the student view
//!
//! Generated quizzes are free text. Before a quiz is shown to students the
//! teacher-only answer key is cut off, and the remaining text is split
//! heuristically into questions with optional multiple-choice options.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Shown when no numbered question could be recognised.
pub const FALLBACK_QUESTION: &str = "Please answer the questions shown above in the quiz content.";

/// Questions longer than this are treated as long-answer.
const LONG_QUESTION_CHARS: usize = 100;

// Each pattern removes everything from the match to the end of the text.
static ANSWER_KEY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?is)={3,}\s*ANSWER\s*KEY.*$",
        r"(?is)---+\s*ANSWER\s*KEY.*$",
        r"(?is)\n\s*ANSWER\s*KEY\s*\(FOR\s*TEACHER.*$",
        r"(?is)\n\s*ANSWER\s*KEY.*$",
        r"(?is)\n\s*ANSWERS?\s*:\s*\n.*$",
        r"(?is)MCQs?\s*:\s*Q\d+-\[?[A-D]\]?.*$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid answer key regex"))
    .collect()
});

static QUESTION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:Q\s*)?(\d+)[.)]\s*(.+)").expect("invalid question regex"));

static OPTION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Da-d])\)\s*(.+)").expect("invalid option regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Mcq,
    Short,
    Long,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedQuestion {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub question: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// Remove the answer key section, if any, and trim the result.
pub fn strip_answer_key(content: &str) -> String {
    let mut result = content.to_string();
    for pattern in ANSWER_KEY_PATTERNS.iter() {
        result = pattern.replace(&result, "").into_owned();
    }
    result.trim().to_string()
}

fn section_hint(line: &str) -> Option<QuestionKind> {
    let upper = line.to_uppercase();
    if upper.contains("MULTIPLE CHOICE") {
        Some(QuestionKind::Mcq)
    } else if upper.contains("SHORT ANSWER") {
        Some(QuestionKind::Short)
    } else if upper.contains("LONG ANSWER") {
        Some(QuestionKind::Long)
    } else {
        None
    }
}

struct Draft {
    question: String,
    options: Vec<String>,
    hint: Option<QuestionKind>,
}

impl Draft {
    fn kind(&self) -> QuestionKind {
        if !self.options.is_empty() {
            return QuestionKind::Mcq;
        }
        // A choice section whose options were not recognised still needs
        // a text answer.
        match self.hint {
            Some(QuestionKind::Short) => return QuestionKind::Short,
            Some(QuestionKind::Long) => return QuestionKind::Long,
            _ => {}
        }
        let lower = self.question.to_lowercase();
        if lower.contains("explain")
            || lower.contains("describe")
            || self.question.chars().count() > LONG_QUESTION_CHARS
        {
            QuestionKind::Long
        } else {
            QuestionKind::Short
        }
    }

    fn finish(self, number: usize) -> ParsedQuestion {
        ParsedQuestion {
            id: format!("q{}", number),
            kind: self.kind(),
            question: self.question,
            options: self.options,
        }
    }
}

/// Split quiz text into questions.
///
/// Never returns an empty list: when nothing is recognised a single
/// long-answer placeholder is produced.
pub fn parse_questions(content: &str) -> Vec<ParsedQuestion> {
    let mut parsed = Vec::new();
    let mut current: Option<Draft> = None;
    let mut hint = None;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(caps) = OPTION_LINE.captures(trimmed) {
            if let Some(draft) = current.as_mut() {
                draft.options.push(format!("{}) {}", &caps[1], &caps[2]));
            }
            continue;
        }

        if let Some(caps) = QUESTION_LINE.captures(trimmed) {
            if let Some(draft) = current.take() {
                parsed.push(draft.finish(parsed.len() + 1));
            }
            current = Some(Draft {
                question: caps[2].trim().to_string(),
                options: Vec::new(),
                hint,
            });
            continue;
        }

        if let Some(section) = section_hint(trimmed) {
            hint = Some(section);
        }
    }

    if let Some(draft) = current {
        parsed.push(draft.finish(parsed.len() + 1));
    }

    if parsed.is_empty() {
        parsed.push(ParsedQuestion {
            id: "q1".to_string(),
            kind: QuestionKind::Long,
            question: FALLBACK_QUESTION.to_string(),
            options: Vec::new(),
        });
    }

    parsed
}
