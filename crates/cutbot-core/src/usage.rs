//! Per-user usage counters.
//!
//! Process-lifetime only: nothing is persisted, entries are never evicted.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::UserId;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserStats {
    pub shortened_count: u64,
    pub first_seen_at: Option<DateTime<Utc>>,
    pub last_seen_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rank {
    Beginner,
    Regular,
    Pro,
}

impl Rank {
    pub fn label(self) -> &'static str {
        match self {
            Rank::Beginner => "Beginner",
            Rank::Regular => "Regular",
            Rank::Pro => "Pro",
        }
    }
}

impl UserStats {
    pub fn rank(&self) -> Rank {
        match self.shortened_count {
            0..=4 => Rank::Beginner,
            5..=50 => Rank::Regular,
            _ => Rank::Pro,
        }
    }
}

/// Shared usage table, constructed once and handed to request handlers.
#[derive(Debug, Default)]
pub struct UsageTracker {
    users: Mutex<HashMap<UserId, UserStats>>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_usage(&self, user_id: UserId, count: u64) {
        self.record_usage_at(user_id, count, Utc::now()).await;
    }

    pub async fn record_usage_at(&self, user_id: UserId, count: u64, now: DateTime<Utc>) {
        let mut users = self.users.lock().await;
        let stats = users.entry(user_id).or_default();
        stats.shortened_count = stats.shortened_count.saturating_add(count);
        stats.last_seen_at = Some(now);
        if stats.first_seen_at.is_none() {
            stats.first_seen_at = Some(now);
        }
    }

    pub async fn get_usage(&self, user_id: UserId) -> Option<UserStats> {
        self.users.lock().await.get(&user_id).cloned()
    }

    #[cfg(test)]
    async fn user_count(&self) -> usize {
        self.users.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn unknown_user_has_no_stats() {
        let t = UsageTracker::new();
        assert_eq!(t.get_usage(UserId(7)).await, None);
        assert_eq!(t.user_count().await, 0);
    }

    #[tokio::test]
    async fn three_records_accumulate() {
        let t = UsageTracker::new();
        for _ in 0..3 {
            t.record_usage(UserId(1), 1).await;
        }

        let s = t.get_usage(UserId(1)).await.unwrap();
        assert_eq!(s.shortened_count, 3);
        assert!(s.first_seen_at.unwrap() <= s.last_seen_at.unwrap());
    }

    #[tokio::test]
    async fn first_seen_is_sticky_and_last_seen_moves() {
        let t = UsageTracker::new();
        let t0 = Utc::now();
        let t1 = t0 + Duration::minutes(5);

        t.record_usage_at(UserId(1), 2, t0).await;
        t.record_usage_at(UserId(1), 4, t1).await;

        let s = t.get_usage(UserId(1)).await.unwrap();
        assert_eq!(s.shortened_count, 6);
        assert_eq!(s.first_seen_at, Some(t0));
        assert_eq!(s.last_seen_at, Some(t1));
    }

    #[tokio::test]
    async fn users_are_tracked_independently() {
        let t = UsageTracker::new();
        t.record_usage(UserId(1), 1).await;
        t.record_usage(UserId(2), 5).await;

        assert_eq!(t.get_usage(UserId(1)).await.unwrap().shortened_count, 1);
        assert_eq!(t.get_usage(UserId(2)).await.unwrap().shortened_count, 5);
        assert_eq!(t.user_count().await, 2);
    }

    #[test]
    fn rank_thresholds() {
        let at = |n| UserStats {
            shortened_count: n,
            ..Default::default()
        };
        assert_eq!(at(0).rank(), Rank::Beginner);
        assert_eq!(at(4).rank(), Rank::Beginner);
        assert_eq!(at(5).rank(), Rank::Regular);
        assert_eq!(at(50).rank(), Rank::Regular);
        assert_eq!(at(51).rank(), Rank::Pro);
    }
}
