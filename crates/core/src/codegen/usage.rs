use std::fmt;
use std::ops::{Add, AddAssign};

/// Request accounting for one or more model calls.
///
/// Each stage returns the usage of its own call; the pipeline sums them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub requests: u64,
    pub prompt_bytes: u64,
    pub completion_bytes: u64,
}

impl Usage {
    /// Usage of a single request.
    pub fn single(prompt_bytes: usize, completion_bytes: usize) -> Self {
        Self {
            requests: 1,
            prompt_bytes: prompt_bytes as u64,
            completion_bytes: completion_bytes as u64,
        }
    }
}

impl Add for Usage {
    type Output = Usage;

    fn add(self, other: Usage) -> Usage {
        Usage {
            requests: self.requests + other.requests,
            prompt_bytes: self.prompt_bytes + other.prompt_bytes,
            completion_bytes: self.completion_bytes + other.completion_bytes,
        }
    }
}

impl AddAssign for Usage {
    fn add_assign(&mut self, other: Usage) {
        *self = *self + other;
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Requests: {}\nPrompt bytes: {}\nCompletion bytes: {}",
            self.requests, self.prompt_bytes, self.completion_bytes
        )
    }
}
