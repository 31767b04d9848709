//! Shared data types for answerbench.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One question/expected-answer pair to evaluate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestCase {
    pub id: u64,
    pub question: String,
    pub expected: String,
}

/// The five fixed quality criteria scored by the judge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Correctness,
    Coverage,
    Relevance,
    Faithfulness,
    Clarity,
}

impl Criterion {
    pub const ALL: [Criterion; 5] = [
        Criterion::Correctness,
        Criterion::Coverage,
        Criterion::Relevance,
        Criterion::Faithfulness,
        Criterion::Clarity,
    ];

    /// Stable snake_case key used in judge replies and report headers.
    pub fn key(&self) -> &'static str {
        match self {
            Criterion::Correctness => "correctness",
            Criterion::Coverage => "coverage",
            Criterion::Relevance => "relevance",
            Criterion::Faithfulness => "faithfulness",
            Criterion::Clarity => "clarity",
        }
    }

    /// One-line grading instruction embedded in the judge prompt.
    pub fn description(&self) -> &'static str {
        match self {
            Criterion::Correctness => {
                "does the obtained answer state the same facts as the expected answer?"
            }
            Criterion::Coverage => {
                "does the obtained answer cover every point present in the expected answer?"
            }
            Criterion::Relevance => {
                "does the obtained answer address the question without drifting off topic?"
            }
            Criterion::Faithfulness => {
                "is the obtained answer free of claims that contradict or go beyond the expected answer?"
            }
            Criterion::Clarity => "is the obtained answer clearly worded and easy to follow?",
        }
    }
}

/// A judge score in [0,1] for one criterion, with its comment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CriterionScore {
    pub score: f64,
    #[serde(default)]
    pub comment: String,
}

/// Pass/fail classification, as supplied by the judge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    /// Case-insensitive parse of "PASS"/"FAIL".
    pub fn parse(s: &str) -> Option<Verdict> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PASS" => Some(Verdict::Pass),
            "FAIL" => Some(Verdict::Fail),
            _ => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Fail => write!(f, "FAIL"),
        }
    }
}

/// The judge's parsed reply for one case: five scored criteria plus the
/// final verdict and comment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CriteriaVerdict {
    pub correctness: CriterionScore,
    pub coverage: CriterionScore,
    pub relevance: CriterionScore,
    pub faithfulness: CriterionScore,
    pub clarity: CriterionScore,
    pub final_verdict: Verdict,
    pub final_comment: String,
}

impl CriteriaVerdict {
    /// Criterion scores in the fixed criterion order.
    pub fn scores(&self) -> [&CriterionScore; 5] {
        [
            &self.correctness,
            &self.coverage,
            &self.relevance,
            &self.faithfulness,
            &self.clarity,
        ]
    }

    /// Arithmetic mean of the five criterion scores.
    pub fn mean_score(&self) -> f64 {
        self.scores().iter().map(|s| s.score).sum::<f64>() / 5.0
    }
}

/// The complete evaluation of one test case.
///
/// Either every field is populated or the result does not exist; there is no
/// partially-constructed state. `average_score` is always recomputed locally
/// from the five criterion scores, never taken from the judge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluationResult {
    pub case_id: u64,
    pub question: String,
    pub expected_answer: String,
    pub obtained_answer: String,
    pub verdict: CriteriaVerdict,
    pub average_score: f64,
}

impl EvaluationResult {
    pub fn new(case: &TestCase, obtained_answer: String, verdict: CriteriaVerdict) -> Self {
        let average_score = verdict.mean_score();
        Self {
            case_id: case.id,
            question: case.question.clone(),
            expected_answer: case.expected.clone(),
            obtained_answer,
            verdict,
            average_score,
        }
    }
}

/// An ordered collection of test cases with monotonically assigned ids.
///
/// Ids are never reused within a session, even after a removal.
#[derive(Debug, Default, Clone)]
pub struct CaseSet {
    cases: Vec<TestCase>,
    next_id: u64,
}

#[derive(Debug, Deserialize)]
struct CaseLine {
    question: String,
    expected: String,
}

impl CaseSet {
    pub fn new() -> Self {
        Self {
            cases: Vec::new(),
            next_id: 1,
        }
    }

    /// Add a case and return its assigned id.
    pub fn add(&mut self, question: impl Into<String>, expected: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.cases.push(TestCase {
            id,
            question: question.into(),
            expected: expected.into(),
        });
        id
    }

    /// Remove a case by id. The id is retired, not recycled.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.cases.len();
        self.cases.retain(|c| c.id != id);
        self.cases.len() != before
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Load cases from a JSONL file, one `{"question": .., "expected": ..}`
    /// object per line. Blank lines are skipped.
    pub fn from_jsonl(path: impl AsRef<Path>, limit: Option<usize>) -> std::io::Result<Self> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let mut set = CaseSet::new();
        for line in reader.lines() {
            if let Some(limit) = limit {
                if set.len() >= limit {
                    break;
                }
            }
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let parsed: CaseLine = serde_json::from_str(&line)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
            set.add(parsed.question, parsed.expected);
        }
        Ok(set)
    }
}

/// Truncate to at most `max` characters, appending an ellipsis marker when
/// anything was cut. Safe on multi-byte input.
pub fn truncate_preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{cut}...")
}
