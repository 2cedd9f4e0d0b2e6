//! Quiz content: the ordered, read-only list of questions played in a session.

use std::{collections::HashSet, fs, io, path::Path};

use rand::{Rng, seq::SliceRandom};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

/// A single multiple choice question. Options are kept in their stored order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Text shown to players.
    pub prompt: String,
    /// Every option, correct answer included.
    pub options: Vec<String>,
    /// Position of the correct answer inside `options`.
    pub correct_index: usize,
}

impl Question {
    /// Build a question whose correct answer is stored first, followed by the distractors.
    pub fn new(
        prompt: impl Into<String>,
        correct: impl Into<String>,
        distractors: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let mut options = vec![correct.into()];
        options.extend(distractors.into_iter().map(Into::into));
        Self {
            prompt: prompt.into(),
            options,
            correct_index: 0,
        }
    }

    /// Text of the correct option.
    pub fn correct_answer(&self) -> &str {
        &self.options[self.correct_index]
    }

    /// Whether `answer` matches the correct option exactly.
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer() == answer
    }

    /// Whether `answer` is one of the options.
    pub fn has_option(&self, answer: &str) -> bool {
        self.options.iter().any(|option| option == answer)
    }

    /// Shuffle the options once, keeping track of the correct one.
    fn shuffle_options<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let correct = self.correct_answer().to_string();
        self.options.shuffle(rng);
        self.correct_index = self
            .options
            .iter()
            .position(|option| *option == correct)
            .unwrap_or_default();
    }
}

/// Errors raised while loading a question file.
#[derive(Debug, Error)]
pub enum QuestionBankError {
    /// The file could not be read.
    #[error("failed to read question file: {0}")]
    Io(#[from] io::Error),
    /// The file is not valid question JSON.
    #[error("failed to parse question file: {0}")]
    Parse(#[from] serde_json::Error),
    /// No usable question was found in the file.
    #[error("question file contains no usable question")]
    Empty,
}

/// Ordered, immutable list of questions. A question's identity is its index.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Wrap an already validated list of questions.
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// Parse a question file in the hub's JSON format.
    pub fn from_json_str(contents: &str) -> Result<Self, QuestionBankError> {
        let raw: RawQuestionFile = serde_json::from_str(contents)?;
        let questions = raw
            .questions
            .into_iter()
            .enumerate()
            .filter_map(|(position, raw)| match raw.into_question() {
                Ok(question) => Some(question),
                Err(reason) => {
                    warn!(position, reason, "skipping invalid question");
                    None
                }
            })
            .collect::<Vec<_>>();

        if questions.is_empty() {
            return Err(QuestionBankError::Empty);
        }
        Ok(Self::new(questions))
    }

    /// Read and parse the question file at `path`.
    pub fn load(path: &Path) -> Result<Self, QuestionBankError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Load `path`, falling back to the built-in questions when it is missing or unusable.
    pub fn load_or_builtin(path: &Path) -> Self {
        match Self::load(path) {
            Ok(bank) => {
                info!(path = %path.display(), count = bank.len(), "loaded trivia questions");
                bank
            }
            Err(QuestionBankError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "question file not found; using built-in questions");
                Self::builtin()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to load question file; using built-in questions"
                );
                Self::builtin()
            }
        }
    }

    /// Shuffle every question's options once. The resulting order is the stored order.
    pub fn shuffled<R: Rng + ?Sized>(mut self, rng: &mut R) -> Self {
        for question in &mut self.questions {
            question.shuffle_options(rng);
        }
        self
    }

    /// Question at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Number of questions.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the bank holds no question.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Questions shipped with the binary.
    pub fn builtin() -> Self {
        Self::new(vec![
            Question::new(
                "What is the capital of Australia?",
                "Canberra",
                ["Sydney", "Melbourne", "Perth"],
            ),
            Question::new(
                "Which planet has the most moons?",
                "Saturn",
                ["Jupiter", "Neptune", "Mars"],
            ),
            Question::new(
                "How many strings does a standard violin have?",
                "4",
                ["5", "6", "3"],
            ),
            Question::new(
                "Which element has the chemical symbol Fe?",
                "Iron",
                ["Fluorine", "Lead", "Tin"],
            ),
            Question::new(
                "In which year did the first Raspberry Pi go on sale?",
                "2012",
                ["2008", "2015", "2010"],
            ),
            Question::new(
                "What is the largest ocean on Earth?",
                "Pacific",
                ["Atlantic", "Indian", "Arctic"],
            ),
        ])
    }
}

/// On-disk layout of the question file.
#[derive(Debug, Deserialize)]
struct RawQuestionFile {
    questions: Vec<RawQuestion>,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    question: String,
    correct: RawCorrect,
    #[serde(default)]
    wrong: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawCorrect {
    text: String,
}

impl RawQuestion {
    fn into_question(self) -> Result<Question, &'static str> {
        let prompt = self.question.trim();
        if prompt.is_empty() {
            return Err("empty prompt");
        }

        let correct = self.correct.text.trim();
        if correct.is_empty() {
            return Err("empty correct answer");
        }

        let distractors: Vec<String> = self
            .wrong
            .iter()
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .collect();
        if distractors.is_empty() {
            return Err("no wrong answers");
        }

        let mut seen = HashSet::new();
        if !std::iter::once(correct)
            .chain(distractors.iter().map(String::as_str))
            .all(|option| seen.insert(option))
        {
            return Err("duplicate options");
        }

        Ok(Question::new(prompt, correct, distractors))
    }
}
