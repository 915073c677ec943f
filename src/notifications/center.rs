//! # Notification Center
//!
//! Persistent per-recipient inbox. Stored newest first in the
//! `notifications` slot; every change rewrites the slot before it becomes
//! visible.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use super::errors::{NotificationError, NotificationResult};
use super::{Notification, NotificationDraft, NotificationKind, NotificationSink};
use crate::slot::{load_json, save_json, DurableSlot, NOTIFICATIONS_KEY};

fn lock_poisoned() -> NotificationError {
    NotificationError::StorageError("Lock poisoned".into())
}

#[derive(Debug)]
pub struct NotificationCenter {
    slot: Arc<dyn DurableSlot>,
    notifications: RwLock<Vec<Notification>>,
}

impl NotificationCenter {
    /// Load the inbox; an absent slot is seeded with the example
    /// notifications when `seed` is set.
    pub fn open(slot: Arc<dyn DurableSlot>, seed: bool) -> NotificationResult<Self> {
        let notifications = match load_json::<Vec<Notification>>(slot.as_ref(), NOTIFICATIONS_KEY)? {
            Some(notifications) => notifications,
            None if seed => {
                let seeded = seed_notifications();
                save_json(slot.as_ref(), NOTIFICATIONS_KEY, &seeded)?;
                seeded
            }
            None => Vec::new(),
        };

        Ok(Self {
            slot,
            notifications: RwLock::new(notifications),
        })
    }

    /// Notifications addressed to `recipient_id`, newest first
    pub fn for_recipient(&self, recipient_id: &str) -> NotificationResult<Vec<Notification>> {
        let notifications = self.notifications.read().map_err(|_| lock_poisoned())?;
        let mut mine: Vec<Notification> = notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(mine)
    }

    pub fn unread_count(&self, recipient_id: &str) -> NotificationResult<usize> {
        let notifications = self.notifications.read().map_err(|_| lock_poisoned())?;
        Ok(notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id && !n.read)
            .count())
    }

    pub fn mark_as_read(&self, recipient_id: &str, id: &str) -> NotificationResult<()> {
        self.mutate(|notifications| {
            let notification = notifications
                .iter_mut()
                .find(|n| n.id == id && n.recipient_id == recipient_id)
                .ok_or_else(|| NotificationError::NotFound(id.to_string()))?;
            notification.read = true;
            Ok(())
        })
    }

    /// Returns how many notifications changed
    pub fn mark_all_as_read(&self, recipient_id: &str) -> NotificationResult<usize> {
        let mut changed = 0;
        self.mutate(|notifications| {
            for n in notifications
                .iter_mut()
                .filter(|n| n.recipient_id == recipient_id && !n.read)
            {
                n.read = true;
                changed += 1;
            }
            Ok(())
        })?;
        Ok(changed)
    }

    pub fn clear(&self, recipient_id: &str, id: &str) -> NotificationResult<()> {
        self.mutate(|notifications| {
            let index = notifications
                .iter()
                .position(|n| n.id == id && n.recipient_id == recipient_id)
                .ok_or_else(|| NotificationError::NotFound(id.to_string()))?;
            notifications.remove(index);
            Ok(())
        })
    }

    fn mutate<F>(&self, change: F) -> NotificationResult<()>
    where
        F: FnOnce(&mut Vec<Notification>) -> NotificationResult<()>,
    {
        let mut notifications = self.notifications.write().map_err(|_| lock_poisoned())?;
        let mut next = notifications.clone();
        change(&mut next)?;
        save_json(self.slot.as_ref(), NOTIFICATIONS_KEY, &next)?;
        *notifications = next;
        Ok(())
    }
}

impl NotificationSink for NotificationCenter {
    fn emit(&self, draft: NotificationDraft) -> NotificationResult<()> {
        if draft.recipient_id.trim().is_empty() {
            return Err(NotificationError::Invalid("recipient is required".into()));
        }
        if draft.title.trim().is_empty() || draft.message.trim().is_empty() {
            return Err(NotificationError::Invalid("title and message are required".into()));
        }

        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            recipient_id: draft.recipient_id,
            title: draft.title,
            message: draft.message,
            kind: draft.kind,
            read: false,
            created_at: Utc::now(),
            link: draft.link,
        };

        self.mutate(|notifications| {
            notifications.insert(0, notification);
            Ok(())
        })
    }
}

fn seed_date(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, month, day, 0, 0, 0)
        .single()
        .expect("seed dates are valid calendar dates")
}

fn seed_notifications() -> Vec<Notification> {
    vec![
        Notification {
            id: "1".to_string(),
            recipient_id: "5".to_string(),
            title: "Nouvelle mise à jour".to_string(),
            message: "Votre requête de relevé de notes a été mise à jour.".to_string(),
            kind: NotificationKind::Info,
            read: false,
            created_at: seed_date(6, 20),
            link: Some("/requests/1".to_string()),
        },
        Notification {
            id: "2".to_string(),
            recipient_id: "5".to_string(),
            title: "Requête approuvée".to_string(),
            message: "Votre demande de dispense a été approuvée par le chef de département."
                .to_string(),
            kind: NotificationKind::Success,
            read: true,
            created_at: seed_date(4, 20),
            link: Some("/requests/3".to_string()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::MemorySlot;

    fn draft(recipient: &str, title: &str) -> NotificationDraft {
        NotificationDraft {
            recipient_id: recipient.to_string(),
            title: title.to_string(),
            message: "message".to_string(),
            kind: NotificationKind::Info,
            link: None,
        }
    }

    #[test]
    fn test_seeded_inbox() {
        let center = NotificationCenter::open(Arc::new(MemorySlot::new()), true).unwrap();

        let inbox = center.for_recipient("5").unwrap();
        assert_eq!(inbox.len(), 2);
        assert_eq!(inbox[0].id, "1");
        assert_eq!(center.unread_count("5").unwrap(), 1);
        assert!(center.for_recipient("1").unwrap().is_empty());
    }

    #[test]
    fn test_emit_is_newest_first_and_persisted() {
        let slot = Arc::new(MemorySlot::new());
        let center = NotificationCenter::open(slot.clone(), true).unwrap();

        center.emit(draft("5", "Statut mis à jour")).unwrap();

        let inbox = center.for_recipient("5").unwrap();
        assert_eq!(inbox[0].title, "Statut mis à jour");
        assert!(!inbox[0].read);

        let reopened = NotificationCenter::open(slot, true).unwrap();
        assert_eq!(reopened.for_recipient("5").unwrap().len(), 3);
    }

    #[test]
    fn test_mark_and_clear() {
        let center = NotificationCenter::open(Arc::new(MemorySlot::new()), true).unwrap();

        center.mark_as_read("5", "1").unwrap();
        assert_eq!(center.unread_count("5").unwrap(), 0);

        center.emit(draft("5", "a")).unwrap();
        center.emit(draft("5", "b")).unwrap();
        assert_eq!(center.mark_all_as_read("5").unwrap(), 2);

        center.clear("5", "2").unwrap();
        assert_eq!(center.for_recipient("5").unwrap().len(), 3);
        assert!(matches!(center.clear("5", "2"), Err(NotificationError::NotFound(_))));
    }

    #[test]
    fn test_other_recipients_cannot_touch_inbox() {
        let center = NotificationCenter::open(Arc::new(MemorySlot::new()), true).unwrap();

        assert!(matches!(center.mark_as_read("1", "1"), Err(NotificationError::NotFound(_))));
        assert!(matches!(center.clear("1", "1"), Err(NotificationError::NotFound(_))));
    }

    #[test]
    fn test_invalid_draft_rejected() {
        let center = NotificationCenter::open(Arc::new(MemorySlot::new()), false).unwrap();
        assert!(matches!(center.emit(draft("", "t")), Err(NotificationError::Invalid(_))));
        assert!(matches!(center.emit(draft("5", " ")), Err(NotificationError::Invalid(_))));
    }

    #[test]
    fn test_failed_write_keeps_inbox() {
        let slot = Arc::new(MemorySlot::new());
        let center = NotificationCenter::open(slot.clone(), true).unwrap();

        slot.set_fail_writes(true);
        assert!(matches!(
            center.emit(draft("5", "t")),
            Err(NotificationError::StorageError(_))
        ));
        assert!(center.mark_as_read("5", "1").is_err());

        assert_eq!(center.for_recipient("5").unwrap().len(), 2);
        assert_eq!(center.unread_count("5").unwrap(), 1);
    }
}
