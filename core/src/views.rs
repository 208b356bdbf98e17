//! Read-side helpers behind the dashboard and calendar screens.

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::error::ApiError;
use crate::types::{Post, PostStatus};

/// Per-status totals for the dashboard header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub scheduled: usize,
    pub published: usize,
    pub failed: usize,
    /// Statuses outside the three known values.
    pub other: usize,
}

impl StatusCounts {
    pub fn tally(posts: &[Post]) -> Self {
        posts.iter().fold(Self::default(), |mut counts, post| {
            match post.known_status() {
                Some(PostStatus::Scheduled) => counts.scheduled += 1,
                Some(PostStatus::Published) => counts.published += 1,
                Some(PostStatus::Failed) => counts.failed += 1,
                None => counts.other += 1,
            }
            counts
        })
    }
}

/// Posts whose content contains `query` (case-insensitive), earliest first.
pub fn search(posts: &[Post], query: &str) -> Vec<Post> {
    let needle = query.to_lowercase();
    let mut found: Vec<Post> = posts
        .iter()
        .filter(|post| post.content.to_lowercase().contains(&needle))
        .cloned()
        .collect();
    found.sort_by_key(|post| post.scheduled_time);
    found
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// False for the leading/trailing days borrowed from adjacent months.
    pub in_month: bool,
    pub posts: Vec<Post>,
}

/// A month grid of Sunday-to-Saturday weeks. Posts land on the UTC date of
/// their scheduled time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMonth {
    pub first: NaiveDate,
    pub weeks: Vec<Vec<CalendarDay>>,
}

impl CalendarMonth {
    pub fn new(year: i32, month: u32, posts: &[Post]) -> Result<Self, ApiError> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| ApiError::InvalidInput(format!("invalid month {year}-{month:02}")))?;
        let out_of_range = || ApiError::InvalidInput(format!("month {year}-{month:02} is out of range"));

        let last = first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.checked_sub_days(Days::new(1)))
            .ok_or_else(out_of_range)?;
        let start = first
            .checked_sub_days(Days::new(u64::from(first.weekday().num_days_from_sunday())))
            .ok_or_else(out_of_range)?;
        let end = last
            .checked_add_days(Days::new(u64::from(6 - last.weekday().num_days_from_sunday())))
            .ok_or_else(out_of_range)?;

        let days: Vec<CalendarDay> = start
            .iter_days()
            .take_while(|date| *date <= end)
            .map(|date| {
                let mut day_posts: Vec<Post> = posts
                    .iter()
                    .filter(|post| post.scheduled_time.date_naive() == date)
                    .cloned()
                    .collect();
                day_posts.sort_by_key(|post| post.scheduled_time);
                CalendarDay {
                    date,
                    in_month: date.month() == first.month(),
                    posts: day_posts,
                }
            })
            .collect();

        let weeks = days.chunks(7).map(<[CalendarDay]>::to_vec).collect();
        Ok(Self { first, weeks })
    }

    /// e.g. "June 2024".
    pub fn title(&self) -> String {
        self.first.format("%B %Y").to_string()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.weeks.iter().flatten().find(|day| day.date == date)
    }

    pub fn next(&self, posts: &[Post]) -> Result<Self, ApiError> {
        self.shifted(self.first.checked_add_months(Months::new(1)), posts)
    }

    pub fn prev(&self, posts: &[Post]) -> Result<Self, ApiError> {
        self.shifted(self.first.checked_sub_months(Months::new(1)), posts)
    }

    fn shifted(&self, first: Option<NaiveDate>, posts: &[Post]) -> Result<Self, ApiError> {
        let first = first.ok_or_else(|| {
            ApiError::InvalidInput(format!("no month beyond {}", self.first.format("%Y-%m")))
        })?;
        Self::new(first.year(), first.month(), posts)
    }
}
