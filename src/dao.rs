use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/**
 * A poll prompt with a publish timestamp
 */
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
}

impl Question {
    /**
     * Whether the question was published within the last day
     *
     * Future-dated questions are unpublished, not "recent"
     */
    pub fn was_published_recently(&self) -> bool {
        let now = Utc::now();
        now - Duration::days(1) <= self.pub_date && self.pub_date <= now
    }
}

/**
 * A selectable answer belonging to a question, carrying its tally
 */
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct Choice {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
    pub votes: i64,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct Person {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct Group {
    pub id: i64,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct Membership {
    pub id: i64,
    pub person_id: i64,
    pub group_id: i64,
}

/**
 * A membership joined against both of its endpoints for display
 */
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct MembershipRow {
    pub id: i64,
    pub person_name: String,
    pub group_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question_published_at(pub_date: DateTime<Utc>) -> Question {
        Question {
            id: 1,
            text: "Is the publish window respected?".to_string(),
            pub_date,
        }
    }

    #[test]
    fn future_questions_are_not_recent() {
        let question =
            question_published_at(Utc::now() + Duration::days(1) + Duration::seconds(1));
        assert!(!question.was_published_recently());
    }

    #[test]
    fn questions_older_than_a_day_are_not_recent() {
        let question =
            question_published_at(Utc::now() - Duration::days(1) - Duration::seconds(1));
        assert!(!question.was_published_recently());
    }

    #[test]
    fn questions_inside_the_window_are_recent() {
        let question = question_published_at(
            Utc::now() - Duration::hours(23) - Duration::minutes(59) - Duration::seconds(59),
        );
        assert!(question.was_published_recently());
    }

    #[test]
    fn just_published_questions_are_recent() {
        let question = question_published_at(Utc::now() - Duration::seconds(1));
        assert!(question.was_published_recently());
    }
}
