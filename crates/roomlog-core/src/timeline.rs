//! Timeline builder.
//!
//! Merges a room's messages and replies into one chronological sequence.
//! Both inputs normally arrive pre-sorted from the store (by timestamp, then
//! id), so this is a linear two-way merge. An input that is not sorted under
//! [`TimelineEntry::chronological_cmp`] is stable-sorted first.

use std::cmp::Ordering;
use std::iter::Peekable;

use roomlog_types::conversation::{Message, Reply};
use roomlog_types::timeline::TimelineEntry;

/// Build the merged timeline for one room.
///
/// Entries come out in non-decreasing timestamp order. Equal timestamps are
/// resolved by owning message id, then message-before-reply, then entry id,
/// so the result is identical on every call for the same data.
pub fn merge_timeline(messages: Vec<Message>, replies: Vec<Reply>) -> Vec<TimelineEntry> {
    let messages = into_sorted_entries(messages);
    let replies = into_sorted_entries(replies);

    let mut merged = Vec::with_capacity(messages.len() + replies.len());
    let mut left = messages.into_iter().peekable();
    let mut right = replies.into_iter().peekable();

    while let Some(entry) = next_in_order(&mut left, &mut right) {
        merged.push(entry);
    }

    merged
}

fn into_sorted_entries<T: Into<TimelineEntry>>(records: Vec<T>) -> Vec<TimelineEntry> {
    let mut entries: Vec<TimelineEntry> = records.into_iter().map(Into::into).collect();
    if !entries.is_sorted_by(|a, b| a.chronological_cmp(b) != Ordering::Greater) {
        entries.sort_by(TimelineEntry::chronological_cmp);
    }
    entries
}

fn next_in_order<L, R>(left: &mut Peekable<L>, right: &mut Peekable<R>) -> Option<TimelineEntry>
where
    L: Iterator<Item = TimelineEntry>,
    R: Iterator<Item = TimelineEntry>,
{
    match (left.peek(), right.peek()) {
        (Some(l), Some(r)) => {
            if r.chronological_cmp(l) == Ordering::Less {
                right.next()
            } else {
                left.next()
            }
        }
        (Some(_), None) => left.next(),
        (None, _) => right.next(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use roomlog_types::ids::{MessageId, ReplyId, RoomId};
    use roomlog_types::timeline::EntryKind;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 4, 12, 0, 0).unwrap()
    }

    fn message(id: i64, at: DateTime<Utc>) -> Message {
        Message {
            id: MessageId(id),
            room_id: RoomId(1),
            body: format!("m{id}"),
            created_at: at,
        }
    }

    fn reply(id: i64, message_id: i64, at: DateTime<Utc>) -> Reply {
        Reply {
            id: ReplyId(id),
            message_id: MessageId(message_id),
            body: format!("r{id}"),
            attachment_path: None,
            created_at: at,
        }
    }

    fn bodies(entries: &[TimelineEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.body.as_str()).collect()
    }

    #[test]
    fn test_empty_inputs() {
        assert!(merge_timeline(Vec::new(), Vec::new()).is_empty());
    }

    #[test]
    fn test_interleaves_by_timestamp() {
        let t = base();
        let messages = vec![message(1, t), message(2, t + Duration::seconds(10))];
        let replies = vec![
            reply(1, 1, t + Duration::seconds(1)),
            reply(2, 2, t + Duration::seconds(11)),
        ];

        let timeline = merge_timeline(messages, replies);
        assert_eq!(bodies(&timeline), vec!["m1", "r1", "m2", "r2"]);
        assert_eq!(timeline[1].kind, EntryKind::Reply);
        assert_eq!(timeline[1].message_id, MessageId(1));
    }

    #[test]
    fn test_identical_timestamps_follow_insertion_order() {
        let t = base();
        let messages = vec![message(1, t), message(2, t), message(3, t)];
        let replies = vec![reply(1, 1, t), reply(2, 2, t), reply(3, 3, t)];

        let timeline = merge_timeline(messages, replies);
        assert_eq!(bodies(&timeline), vec!["m1", "r1", "m2", "r2", "m3", "r3"]);
    }

    #[test]
    fn test_message_with_many_replies_and_message_without() {
        let t = base();
        let messages = vec![message(1, t), message(2, t + Duration::seconds(5))];
        let replies = vec![
            reply(1, 1, t + Duration::seconds(1)),
            reply(2, 1, t + Duration::seconds(2)),
        ];

        let timeline = merge_timeline(messages, replies);
        assert_eq!(bodies(&timeline), vec!["m1", "r1", "r2", "m2"]);
    }

    #[test]
    fn test_unsorted_input_is_sorted_first() {
        let t = base();
        let messages = vec![message(2, t + Duration::seconds(2)), message(1, t)];
        let replies = vec![reply(1, 1, t + Duration::seconds(1))];

        let timeline = merge_timeline(messages, replies);
        assert_eq!(bodies(&timeline), vec!["m1", "r1", "m2"]);
    }

    #[test]
    fn test_output_is_non_decreasing_and_repeatable() {
        let t = base();
        let messages: Vec<Message> = (1..=20)
            .map(|i| message(i, t + Duration::milliseconds(i / 3)))
            .collect();
        let replies: Vec<Reply> = (1..=20)
            .map(|i| reply(i, i, t + Duration::milliseconds(i / 3)))
            .collect();

        let first = merge_timeline(messages.clone(), replies.clone());
        let second = merge_timeline(messages, replies);
        assert_eq!(first, second);
        assert!(first.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }
}
