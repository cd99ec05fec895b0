use crate::candidate::Candidate;
use crate::error::Error;

/// Candidates of one video frame, in the order the contour finder produced them.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub index: u64,
    pub candidates: Vec<Candidate>,
}

impl Frame {
    #[inline]
    pub fn new(index: u64, candidates: Vec<Candidate>) -> Self {
        Self { index, candidates }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Checks every candidate, including those the area gate would drop.
    pub fn validate(&self) -> Result<(), Error> {
        self.candidates.iter().try_for_each(Candidate::validate)
    }
}
