// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;

/// Errors raised while generating a topology.
///
/// All of them are fatal: the generator never returns a partially built
/// topology, and since generation is a pure function of its inputs, the
/// caller has to fix the configuration before trying again.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// The compute endpoint count does not factor into the requested mesh.
    ShapeError {
        compute_count: usize,
        reason: String,
    },
    /// A fixed endpoint count required by the topology is not met.
    CardinalityError {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// Internal bookkeeping mismatch. Never expected on valid input.
    OrderingInvariantViolation(String),
}

impl Error {
    pub(crate) fn shape(compute_count: usize, reason: impl Into<String>) -> Self {
        Self::ShapeError {
            compute_count,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ShapeError {
                compute_count,
                reason,
            } => write!(
                f,
                "ERROR: cannot lay out {} compute endpoints: {}",
                compute_count, reason
            ),
            Self::CardinalityError {
                what,
                expected,
                found,
            } => write!(
                f,
                "ERROR: expected exactly {} {}, found {}",
                expected, what, found
            ),
            Self::OrderingInvariantViolation(msg) => {
                write!(f, "ERROR: internal ordering invariant violated: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_failure() {
        let err = Error::shape(6, "rows (4) does not divide 6");
        assert_eq!(
            err.to_string(),
            "ERROR: cannot lay out 6 compute endpoints: rows (4) does not divide 6"
        );
        let err = Error::CardinalityError {
            what: "memory controllers",
            expected: 4,
            found: 2,
        };
        assert_eq!(
            err.to_string(),
            "ERROR: expected exactly 4 memory controllers, found 2"
        );
    }

    #[test]
    fn converts_into_anyhow() {
        let err: anyhow::Error = Error::OrderingInvariantViolation("xbar".into()).into();
        assert!(err.to_string().contains("xbar"));
    }
}
