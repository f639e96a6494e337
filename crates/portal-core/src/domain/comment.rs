use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Vote;

/// Comment entity - a user's reply to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub rating: i64,
}

impl Comment {
    pub fn new(post_id: Uuid, user_id: Uuid, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            text,
            created_at: Utc::now(),
            rating: 0,
        }
    }

    pub fn like(&mut self) {
        self.rating += 1;
    }

    pub fn dislike(&mut self) {
        self.rating -= 1;
    }

    pub fn vote(&mut self, vote: Vote) {
        match vote {
            Vote::Like => self.like(),
            Vote::Dislike => self.dislike(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_votes_move_rating_by_one() {
        let mut comment = Comment::new(Uuid::new_v4(), Uuid::new_v4(), "Nice".into());
        for vote in [Vote::Like, Vote::Like, Vote::Like, Vote::Dislike] {
            comment.vote(vote);
        }
        assert_eq!(comment.rating, 2);
        assert_eq!(comment.rating, Vote::Like.delta() * 2);
    }
}
