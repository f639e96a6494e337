//! Post search predicate.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::domain::Post;
use crate::error::ValidationErrors;

/// Accepted layouts for naive date-time input, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Value that leaves the category criterion unset.
const ANY_CATEGORY: &str = "any";

/// Three optional criteria combined with AND. Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    /// Exact category the post must be linked to.
    pub category: Option<Uuid>,
    /// Posts created strictly after this instant.
    pub created_after: Option<DateTime<Utc>>,
}

impl PostFilter {
    /// Build a filter from raw query-string values.
    ///
    /// Blank values are treated as unset; malformed category ids or dates
    /// produce field errors instead of silently widening the search.
    pub fn parse(
        title: Option<&str>,
        category: Option<&str>,
        created_after: Option<&str>,
    ) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = non_blank(title).map(str::to_string);

        let category = match non_blank(category) {
            None => None,
            Some(raw) if raw.eq_ignore_ascii_case(ANY_CATEGORY) => None,
            Some(raw) => match Uuid::parse_str(raw) {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.add_field(
                        "category",
                        "Select a valid choice. That choice is not one of the available choices.",
                    );
                    None
                }
            },
        };

        let created_after = match non_blank(created_after) {
            None => None,
            Some(raw) => match parse_datetime(raw) {
                Some(instant) => Some(instant),
                None => {
                    errors.add_field("date_after", "Enter a valid date/time.");
                    None
                }
            },
        };

        errors.into_result(Self {
            title,
            category,
            created_after,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.category.is_none() && self.created_after.is_none()
    }

    /// Lowercased title needle, if the title criterion is set.
    pub fn title_needle(&self) -> Option<String> {
        self.title.as_deref().map(str::to_lowercase)
    }

    /// Evaluate the predicate against a post and the ids of its categories.
    pub fn matches(&self, post: &Post, category_ids: &[Uuid]) -> bool {
        let title_ok = self
            .title_needle()
            .is_none_or(|needle| post.title.to_lowercase().contains(&needle));
        let category_ok = self
            .category
            .is_none_or(|wanted| category_ids.contains(&wanted));
        let date_ok = self
            .created_after
            .is_none_or(|after| post.created_at > after);

        title_ok && category_ok && date_ok
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parse RFC 3339 or a naive date/time (interpreted as UTC).
fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::domain::PostKind;

    fn post(title: &str) -> Post {
        Post::new(Uuid::new_v4(), PostKind::News, title.into(), "body".into())
    }

    #[test]
    fn test_unset_filter_matches_everything() {
        let filter = PostFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&post("anything"), &[]));
    }

    #[test]
    fn test_title_and_category_are_combined() {
        let sport = Uuid::new_v4();
        let politics = Uuid::new_v4();
        let filter = PostFilter {
            title: Some("Test".into()),
            category: Some(sport),
            created_after: None,
        };

        assert!(filter.matches(&post("A test run"), &[sport]));
        assert!(filter.matches(&post("TESTING"), &[politics, sport]));
        assert!(!filter.matches(&post("A test run"), &[politics]));
        assert!(!filter.matches(&post("Unrelated"), &[sport]));
    }

    #[test]
    fn test_created_after_is_strict() {
        let mut p = post("x");
        p.created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let same = PostFilter {
            created_after: Some(p.created_at),
            ..PostFilter::default()
        };
        let earlier = PostFilter {
            created_after: Some(p.created_at - Duration::seconds(1)),
            ..PostFilter::default()
        };

        assert!(!same.matches(&p, &[]));
        assert!(earlier.matches(&p, &[]));
    }

    #[test]
    fn test_parse_blank_and_any_are_unset() {
        let filter = PostFilter::parse(Some("  "), Some("any"), Some("")).unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_parse_datetime_local_input() {
        let filter = PostFilter::parse(None, None, Some("2024-05-01T12:30")).unwrap();
        assert_eq!(
            filter.created_after,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_rfc3339_is_converted_to_utc() {
        let filter = PostFilter::parse(None, None, Some("2024-05-01T15:00:00+03:00")).unwrap();
        assert_eq!(
            filter.created_after,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_reports_malformed_input() {
        let errors = PostFilter::parse(Some("x"), Some("not-a-uuid"), Some("yesterday")).unwrap_err();
        assert!(errors.has_field("category"));
        assert!(errors.has_field("date_after"));
    }
}
