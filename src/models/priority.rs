//! Priority ordering for remote tasks.
//!
//! Tasks sort by urgency bucket first (today, this week, whenever), then by
//! leverage-to-effort ratio, highest first.

use crate::models::{DEFAULT_EFFORT, DEFAULT_LEVERAGE, RemoteTask};
use std::cmp::Ordering;

/// Leverage divided by effort. Effort below 1 counts as 1.
pub fn priority_score(task: &RemoteTask) -> f64 {
    let leverage = task.leverage.unwrap_or(DEFAULT_LEVERAGE as f64);
    let effort = task.effort.unwrap_or(DEFAULT_EFFORT as f64).max(1.0);
    leverage / effort
}

/// Compare two tasks for priority order (most important first).
pub fn priority_cmp(a: &RemoteTask, b: &RemoteTask) -> Ordering {
    a.urgency_bucket()
        .rank()
        .cmp(&b.urgency_bucket().rank())
        .then_with(|| {
            priority_score(b)
                .partial_cmp(&priority_score(a))
                .unwrap_or(Ordering::Equal)
        })
}

/// Sort tasks in place by priority. Ties keep their fetched order.
pub fn sort_by_priority(tasks: &mut [RemoteTask]) {
    tasks.sort_by(priority_cmp);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(title: &str, urgency: Option<&str>, leverage: i64, effort: i64) -> RemoteTask {
        RemoteTask {
            title: title.to_string(),
            urgency: urgency.map(str::to_string),
            leverage: Some(leverage as f64),
            effort: Some(effort as f64),
            ..RemoteTask::default()
        }
    }

    #[test]
    fn test_score() {
        assert_eq!(priority_score(&task("a", None, 8, 2)), 4.0);
        assert_eq!(priority_score(&RemoteTask::default()), 1.0);
    }

    #[test]
    fn test_zero_effort_does_not_divide_by_zero() {
        assert_eq!(priority_score(&task("a", None, 6, 0)), 6.0);
    }

    #[test]
    fn test_fractional_scores() {
        let task = RemoteTask {
            leverage: Some(7.5),
            effort: Some(0.5),
            ..RemoteTask::default()
        };
        assert_eq!(priority_score(&task), 7.5);
    }

    #[test]
    fn test_urgency_wins_over_score() {
        let mut tasks = vec![
            task("later", Some("whenever"), 9, 1),
            task("week", Some("this_week"), 2, 8),
            task("now", Some("today"), 1, 9),
        ];
        sort_by_priority(&mut tasks);
        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["now", "week", "later"]);
    }

    #[test]
    fn test_score_breaks_ties_within_bucket() {
        let mut tasks = vec![
            task("low", Some("today"), 2, 4),
            task("high", Some("today"), 8, 2),
            task("mid", Some("today"), 5, 5),
        ];
        sort_by_priority(&mut tasks);
        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["high", "mid", "low"]);
    }

    #[test]
    fn test_unknown_urgency_sorts_with_whenever() {
        let mut tasks = vec![
            task("odd", Some("someday"), 9, 1),
            task("week", Some("this_week"), 1, 9),
            task("plain", Some("whenever"), 1, 9),
        ];
        sort_by_priority(&mut tasks);
        let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["week", "odd", "plain"]);
    }
}
