/// A reader's reaction to a post or comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Like,
    Dislike,
}

impl Vote {
    /// Change applied to the rating.
    pub fn delta(self) -> i64 {
        match self {
            Vote::Like => 1,
            Vote::Dislike => -1,
        }
    }
}
