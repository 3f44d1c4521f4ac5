//! Inbox chat summaries.
//!
//! The inbox list is the one piece of state that is authoritative on the
//! client. It is cleaned on every load: entries pointing at the current user
//! are dropped and duplicates per conversation partner collapse to the most
//! recent one. A cleaned list that differs from what was stored is written
//! back (and therefore broadcast).

use std::collections::HashSet;

use stride_shared::constants::KEY_INBOX_CHATS;
use stride_shared::models::InboxChat;
use stride_shared::types::UserId;

use crate::cache::LocalCache;
use crate::error::{Result, StoreError};

impl LocalCache {
    /// Load the inbox for `current_user`, most recent conversation first.
    pub fn load_inbox(&self, current_user: UserId) -> Result<Vec<InboxChat>> {
        let stored: Vec<InboxChat> = self.get(KEY_INBOX_CHATS)?.unwrap_or_default();
        let cleaned = clean_inbox(&stored, current_user);

        if cleaned != stored {
            tracing::info!(
                before = stored.len(),
                after = cleaned.len(),
                "rewriting cleaned inbox"
            );
            self.set(KEY_INBOX_CHATS, &cleaned)?;
        }

        Ok(cleaned)
    }

    /// Insert or replace the summary for `chat.user_id` and move it to the
    /// front. Returns the updated list.
    pub fn upsert_inbox_chat(&self, current_user: UserId, chat: InboxChat) -> Result<Vec<InboxChat>> {
        if chat.user_id == current_user {
            return Err(StoreError::SelfChat);
        }

        let mut list = self.load_inbox(current_user)?;
        list.retain(|c| c.user_id != chat.user_id);
        list.insert(0, chat);
        self.set(KEY_INBOX_CHATS, &list)?;
        Ok(list)
    }

    pub fn remove_inbox_chat(&self, current_user: UserId, partner: UserId) -> Result<Vec<InboxChat>> {
        let mut list = self.load_inbox(current_user)?;
        let before = list.len();
        list.retain(|c| c.user_id != partner);
        if list.len() != before {
            self.set(KEY_INBOX_CHATS, &list)?;
        }
        Ok(list)
    }
}

/// Drop self-referential entries, keep the newest entry per partner and order
/// the result newest first.
fn clean_inbox(entries: &[InboxChat], current_user: UserId) -> Vec<InboxChat> {
    let mut sorted: Vec<&InboxChat> = entries
        .iter()
        .filter(|c| c.user_id != current_user)
        .collect();
    // Stable: equal timestamps keep their stored order.
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut seen = HashSet::new();
    sorted
        .into_iter()
        .filter(|c| seen.insert(c.user_id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn chat(user: i64, text: &str, minutes_ago: i64) -> InboxChat {
        InboxChat {
            user_id: UserId(user),
            username: format!("user{user}"),
            avatar: None,
            last_message: text.to_string(),
            timestamp: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn load_drops_self_chat_and_persists() {
        let cache = LocalCache::in_memory().unwrap();
        let me = UserId(1);
        cache
            .set(
                KEY_INBOX_CHATS,
                &vec![chat(2, "hi", 5), chat(1, "talking to myself", 1)],
            )
            .unwrap();

        let loaded = cache.load_inbox(me).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].user_id, UserId(2));

        let persisted: Vec<InboxChat> = cache.get(KEY_INBOX_CHATS).unwrap().unwrap();
        assert_eq!(persisted, loaded);
    }

    #[test]
    fn duplicates_collapse_to_newest() {
        let cache = LocalCache::in_memory().unwrap();
        cache
            .set(
                KEY_INBOX_CHATS,
                &vec![chat(2, "old", 30), chat(3, "other", 10), chat(2, "new", 1)],
            )
            .unwrap();

        let loaded = cache.load_inbox(UserId(1)).unwrap();
        let texts: Vec<&str> = loaded.iter().map(|c| c.last_message.as_str()).collect();
        assert_eq!(texts, vec!["new", "other"]);
    }

    #[test]
    fn clean_list_is_not_rewritten() {
        let cache = LocalCache::in_memory().unwrap();
        cache.set(KEY_INBOX_CHATS, &vec![chat(2, "hi", 1)]).unwrap();
        let mut rx = cache.subscribe();

        cache.load_inbox(UserId(1)).unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn upsert_moves_partner_to_front() {
        let cache = LocalCache::in_memory().unwrap();
        let me = UserId(1);
        cache.upsert_inbox_chat(me, chat(2, "first", 10)).unwrap();
        cache.upsert_inbox_chat(me, chat(3, "second", 5)).unwrap();
        let list = cache.upsert_inbox_chat(me, chat(2, "again", 0)).unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list[0].user_id, UserId(2));
        assert_eq!(list[0].last_message, "again");
        assert_eq!(list[1].user_id, UserId(3));
    }

    #[test]
    fn upsert_rejects_self_chat() {
        let cache = LocalCache::in_memory().unwrap();
        let err = cache.upsert_inbox_chat(UserId(1), chat(1, "me", 0));
        assert!(matches!(err, Err(StoreError::SelfChat)));
    }

    #[test]
    fn remove_partner() {
        let cache = LocalCache::in_memory().unwrap();
        let me = UserId(1);
        cache.upsert_inbox_chat(me, chat(2, "a", 1)).unwrap();
        let list = cache.remove_inbox_chat(me, UserId(2)).unwrap();
        assert!(list.is_empty());
    }
}
