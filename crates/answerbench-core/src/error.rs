//! Unified error types for the evaluation pipeline.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EvalError>;

/// Errors raised while driving a case through the pipeline.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Network failure or non-2xx HTTP status from the SUT or the judge.
    #[error("transport failure: {message}")]
    Transport { message: String },

    /// The SUT answered 2xx with an empty body. Kept distinct from transport
    /// failures: it signals a misconfigured SUT rather than a broken network.
    #[error("empty response body from the system under test")]
    EmptyResponse,

    /// A body was present where JSON was required but did not parse.
    #[error("response body is not valid JSON: {excerpt}")]
    MalformedJson { excerpt: String },

    /// The judge replied, but the reply does not match the expected schema.
    /// Carries the raw reply text for diagnosis.
    #[error("judge reply does not match the expected schema: {raw}")]
    JudgeProtocol { raw: String },

    /// A batch was started without its preconditions.
    #[error("{0}")]
    Precondition(String),

    /// Report template missing or unreadable, or the workbook failed to
    /// serialize.
    #[error("report export failed: {0}")]
    Report(String),

    /// An error attributed to a specific test case.
    #[error("case {case_id}: {source}")]
    Case {
        case_id: u64,
        #[source]
        source: Box<EvalError>,
    },
}

impl EvalError {
    /// Tag an error with the identifier of the case it occurred in.
    pub fn for_case(self, case_id: u64) -> Self {
        match self {
            already @ EvalError::Case { .. } => already,
            other => EvalError::Case {
                case_id,
                source: Box::new(other),
            },
        }
    }

    /// The case identifier this error is attributed to, if any.
    pub fn case_id(&self) -> Option<u64> {
        match self {
            EvalError::Case { case_id, .. } => Some(*case_id),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for EvalError {
    fn from(err: reqwest::Error) -> Self {
        EvalError::Transport {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_case_wraps_once() {
        let err = EvalError::EmptyResponse.for_case(3).for_case(4);
        assert_eq!(err.case_id(), Some(3));
        assert!(err.to_string().starts_with("case 3:"));
    }
}
