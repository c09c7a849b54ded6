use crate::scheduled_post::{parse_date, ScheduledPost};

pub const EMPTY_PLACEHOLDER: &str = "No posts scheduled. Create your first post!";

/// Posts in chronological order of their scheduled instant.
///
/// Stable, so posts scheduled for the same instant keep insertion order.
/// Posts whose date or time does not parse go last.
pub fn sorted_by_schedule(posts: &[ScheduledPost]) -> Vec<&ScheduledPost> {
    let mut sorted: Vec<&ScheduledPost> = posts.iter().collect();
    sorted.sort_by_key(|p| {
        let at = p.scheduled_at();
        (at.is_none(), at)
    });
    sorted
}

/// `Jan 01, 2025, 09:00`, falling back to the raw strings.
pub fn format_schedule(post: &ScheduledPost) -> String {
    let date = match parse_date(&post.scheduled_date) {
        Some(d) => d.format("%b %d, %Y").to_string(),
        None => post.scheduled_date.clone(),
    };
    format!("{date}, {}", post.scheduled_time)
}
