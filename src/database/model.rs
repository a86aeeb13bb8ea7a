use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    A,
    B,
    C,
    D,
}

impl Choice {
    pub const ALL: [Choice; 4] = [Choice::A, Choice::B, Choice::C, Choice::D];

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_lowercase() {
            'a' => Some(Choice::A),
            'b' => Some(Choice::B),
            'c' => Some(Choice::C),
            'd' => Some(Choice::D),
            _ => None,
        }
    }

    /// Parses a free-text reply that must consist of exactly one choice
    /// letter after trimming, case-insensitive.
    pub fn from_reply(text: &str) -> Option<Self> {
        let mut chars = text.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => Self::from_letter(letter),
            _ => None,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Choice::A => 'a',
            Choice::B => 'b',
            Choice::C => 'c',
            Choice::D => 'd',
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSet {
    pub a: String,
    pub b: String,
    pub c: String,
    pub d: String,
}

impl OptionSet {
    pub fn get(&self, choice: Choice) -> &str {
        match choice {
            Choice::A => &self.a,
            Choice::B => &self.b,
            Choice::C => &self.c,
            Choice::D => &self.d,
        }
    }
}

/// Not yet stored; the bank stamps the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub text: String,
    pub options: OptionSet,
    pub correct: Choice,
}

/// A stored question. The id is monotonic per bank and never reused, so a
/// stale callback reference can't silently hit a different question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    id: u64,
    text: String,
    options: OptionSet,
    correct: Choice,
}

impl Question {
    pub(crate) fn assign(id: u64, draft: QuestionDraft) -> Self {
        Self {
            id,
            text: draft.text,
            options: draft.options,
            correct: draft.correct,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    pub fn correct(&self) -> Choice {
        self.correct
    }
}

/// Per-user pointer into the bank plus the running score. An absent record
/// means the user has no active session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProgress {
    pub index: usize,
    pub correct: u32,
    pub incorrect: u32,
}

/// Opaque callback reference attached to a presented option: which question
/// (by id) and which choice the button stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerRef {
    pub question_id: u64,
    pub choice: Choice,
}

impl AnswerRef {
    pub fn parse(data: &str) -> Option<Self> {
        let rest = data.strip_prefix("ans|")?;
        let (id, letter) = rest.split_once('|')?;
        Some(Self {
            question_id: id.parse().ok()?,
            choice: Choice::from_reply(letter)?,
        })
    }
}

impl fmt::Display for AnswerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ans|{}|{}", self.question_id, self.choice)
    }
}
