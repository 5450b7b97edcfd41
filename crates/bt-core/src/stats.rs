//! Aggregate status counts for the admin view.

use std::fmt;

use serde::Serialize;

use crate::status::Status;
use crate::user::UserSnapshot;

/// How many users are in each status.
///
/// `total_users` always equals the sum of the three status counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsCounts {
    pub total_users: usize,
    pub working_users: usize,
    pub on_break_users: usize,
    pub offline_users: usize,
}

impl StatsCounts {
    fn record(mut self, status: Status) -> Self {
        self.total_users += 1;
        match status {
            Status::Working => self.working_users += 1,
            Status::OnBreak => self.on_break_users += 1,
            Status::Offline => self.offline_users += 1,
        }
        self
    }
}

impl fmt::Display for StatsCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} users: {} working, {} on break, {} offline",
            self.total_users, self.working_users, self.on_break_users, self.offline_users
        )
    }
}

/// Counts users by status.
pub fn reduce_stats<'a, I>(users: I) -> StatsCounts
where
    I: IntoIterator<Item = &'a UserSnapshot>,
{
    users
        .into_iter()
        .fold(StatsCounts::default(), |counts, user| counts.record(user.status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Role, UserId};

    fn user(id: &str, status: Status) -> UserSnapshot {
        let mut user = UserSnapshot::new(UserId::new(id).unwrap(), id, Role::Employee);
        user.status = status;
        user
    }

    #[test]
    fn empty_list() {
        let users: Vec<UserSnapshot> = Vec::new();
        assert_eq!(reduce_stats(&users), StatsCounts::default());
    }

    #[test]
    fn counts_each_status() {
        let users = vec![
            user("a", Status::Working),
            user("b", Status::Working),
            user("c", Status::OnBreak),
            user("d", Status::Offline),
        ];
        let stats = reduce_stats(&users);
        assert_eq!(
            stats,
            StatsCounts {
                total_users: 4,
                working_users: 2,
                on_break_users: 1,
                offline_users: 1,
            }
        );
        assert_eq!(
            stats.to_string(),
            "4 users: 2 working, 1 on break, 1 offline"
        );
    }

    #[test]
    fn partition_is_closed_for_any_mix() {
        // Every combination of statuses for lists up to length 5.
        for len in 0..=5_u32 {
            for code in 0..3_usize.pow(len) {
                let mut rest = code;
                let users: Vec<UserSnapshot> = (0..len)
                    .map(|i| {
                        let status = Status::ALL[rest % 3];
                        rest /= 3;
                        user(&format!("u{i}"), status)
                    })
                    .collect();
                let stats = reduce_stats(&users);
                assert_eq!(stats.total_users, users.len());
                assert_eq!(
                    stats.total_users,
                    stats.working_users + stats.on_break_users + stats.offline_users
                );
            }
        }
    }

    #[test]
    fn order_does_not_matter() {
        let mut users = vec![
            user("a", Status::OnBreak),
            user("b", Status::Offline),
            user("c", Status::Working),
        ];
        let forward = reduce_stats(&users);
        users.reverse();
        assert_eq!(reduce_stats(&users), forward);
    }
}
