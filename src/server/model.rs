use crate::components::api::User;
use crate::components::calendar::{CalendarEvent, EventColor, NewCalendarEvent};
use crate::utils::time::{add_days, CalendarZone};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::info;

/// Ids handed out at runtime start after this value
pub const FIRST_DYNAMIC_ID: u64 = 100;

/// A user record including the password hash
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: String,
}

impl StoredUser {
    pub fn new(id: u64, name: &str, email: &str, password_hash: String) -> Self {
        Self {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            avatar: avatar_url(name),
        }
    }

    /// The user without the password hash
    pub fn public(&self) -> User {
        User {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// Generated avatar for a display name; spaces encode as `%20`
pub fn avatar_url(name: &str) -> String {
    format!(
        "https://ui-avatars.com/api/?name={}&background=random",
        urlencoding::encode(name)
    )
}

/// Storage behind the mock API
#[async_trait]
pub trait CalendarDb: Send + Sync + 'static {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<StoredUser>, String>;

    async fn find_user(&self, id: u64) -> Result<Option<StoredUser>, String>;

    /// Add a user; `None` when the email is already registered
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: String,
    ) -> Result<Option<StoredUser>, String>;

    /// Every event, in insertion order
    async fn list_events(&self) -> Result<Vec<CalendarEvent>, String>;

    async fn get_event(&self, id: u64) -> Result<Option<CalendarEvent>, String>;

    async fn create_event(&self, event: NewCalendarEvent) -> Result<CalendarEvent, String>;

    /// Overwrite an event in place; `None` when it no longer exists
    async fn replace_event(&self, event: CalendarEvent) -> Result<Option<CalendarEvent>, String>;

    /// Remove an event; `false` when it did not exist
    async fn delete_event(&self, id: u64) -> Result<bool, String>;
}

/// In-memory implementation of the database.
///
/// Users and runtime-created events draw ids from one counter.
#[derive(Debug)]
pub struct InMemoryDb {
    users: RwLock<Vec<StoredUser>>,
    events: RwLock<Vec<CalendarEvent>>,
    id_counter: AtomicU64,
}

impl Default for InMemoryDb {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDb {
    /// Empty database
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            events: RwLock::new(Vec::new()),
            id_counter: AtomicU64::new(FIRST_DYNAMIC_ID),
        }
    }

    /// Database holding the demo user and three events around today
    pub fn seeded(zone: &CalendarZone) -> Result<Self, String> {
        let mut db = Self::new();

        let password_hash = bcrypt::hash("password123", super::auth::PASSWORD_HASH_COST)
            .map_err(|e| format!("Failed to hash seed password: {}", e))?;
        db.users.get_mut().push(StoredUser::new(
            1,
            "Test User",
            "test@example.com",
            password_hash,
        ));

        let today = zone.today();
        let tomorrow = add_days(today, 1);
        let at = |date, hour| {
            zone.instant_at(date, hour, 0)
                .ok_or_else(|| format!("No such local time: {} {}:00", date, hour))
        };

        let events = db.events.get_mut();
        events.push(CalendarEvent {
            id: 1,
            title: "Team Meeting".to_string(),
            description: Some("Weekly team sync".to_string()),
            start: at(today, 10)?,
            end: Some(at(today, 11)?),
            all_day: false,
            color: EventColor::Blue,
            label: Some("Work".to_string()),
            location: Some("Conference Room A".to_string()),
        });
        events.push(CalendarEvent {
            id: 2,
            title: "Lunch with Alex".to_string(),
            description: Some("Discuss project details".to_string()),
            start: at(today, 12)?,
            end: Some(at(today, 13)?),
            all_day: false,
            color: EventColor::Emerald,
            label: Some("Personal".to_string()),
            location: Some("Downtown Cafe".to_string()),
        });
        events.push(CalendarEvent {
            id: 3,
            title: "Doctor Appointment".to_string(),
            description: Some("Annual checkup".to_string()),
            start: at(tomorrow, 14)?,
            end: None,
            all_day: false,
            color: EventColor::Rose,
            label: Some("Health".to_string()),
            location: Some("Medical Center".to_string()),
        });

        info!("Seeded 1 user and {} events", events.len());
        Ok(db)
    }

    fn next_id(&self) -> u64 {
        self.id_counter.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[async_trait]
impl CalendarDb for InMemoryDb {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<StoredUser>, String> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user(&self, id: u64) -> Result<Option<StoredUser>, String> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: String,
    ) -> Result<Option<StoredUser>, String> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == email) {
            return Ok(None);
        }
        let user = StoredUser::new(self.next_id(), name, email, password_hash);
        users.push(user.clone());
        Ok(Some(user))
    }

    async fn list_events(&self) -> Result<Vec<CalendarEvent>, String> {
        let events = self.events.read().await;
        Ok(events.clone())
    }

    async fn get_event(&self, id: u64) -> Result<Option<CalendarEvent>, String> {
        let events = self.events.read().await;
        Ok(events.iter().find(|e| e.id == id).cloned())
    }

    async fn create_event(&self, event: NewCalendarEvent) -> Result<CalendarEvent, String> {
        let mut events = self.events.write().await;
        let event = CalendarEvent::from_new(self.next_id(), event);
        events.push(event.clone());
        Ok(event)
    }

    async fn replace_event(&self, event: CalendarEvent) -> Result<Option<CalendarEvent>, String> {
        let mut events = self.events.write().await;
        match events.iter_mut().find(|e| e.id == event.id) {
            Some(slot) => {
                *slot = event.clone();
                Ok(Some(event))
            }
            None => Ok(None),
        }
    }

    async fn delete_event(&self, id: u64) -> Result<bool, String> {
        let mut events = self.events.write().await;
        let before = events.len();
        events.retain(|e| e.id != id);
        Ok(events.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn new_event(title: &str) -> NewCalendarEvent {
        NewCalendarEvent {
            title: title.to_string(),
            description: None,
            start: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            end: None,
            all_day: false,
            color: EventColor::Blue,
            label: None,
            location: None,
        }
    }

    #[tokio::test]
    async fn test_ids_are_shared_and_start_after_100() {
        let db = InMemoryDb::new();
        let user = db
            .create_user("Ada", "ada@example.com", "hash".to_string())
            .await
            .unwrap()
            .unwrap();
        let event = db.create_event(new_event("Standup")).await.unwrap();
        assert_eq!(user.id, 101);
        assert_eq!(event.id, 102);
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let db = InMemoryDb::new();
        assert!(db.create_user("Ada", "ada@example.com", "h".into()).await.unwrap().is_some());
        assert!(db.create_user("Ada 2", "ada@example.com", "h".into()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_replace_and_delete() {
        let db = InMemoryDb::new();
        let mut event = db.create_event(new_event("Standup")).await.unwrap();
        event.title = "Daily".to_string();
        assert_eq!(db.replace_event(event.clone()).await.unwrap(), Some(event.clone()));
        assert_eq!(db.get_event(event.id).await.unwrap().unwrap().title, "Daily");

        assert!(db.delete_event(event.id).await.unwrap());
        assert!(!db.delete_event(event.id).await.unwrap());
        assert_eq!(db.replace_event(event).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_seed_data() {
        let db = InMemoryDb::seeded(&CalendarZone::Local).unwrap();
        let user = db.find_user_by_email("test@example.com").await.unwrap().unwrap();
        assert_eq!(user.id, 1);
        assert!(bcrypt::verify("password123", &user.password_hash).unwrap());

        let titles: Vec<String> = db
            .list_events()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["Team Meeting", "Lunch with Alex", "Doctor Appointment"]);
    }

    #[test]
    fn test_avatar_url() {
        assert_eq!(
            avatar_url("Test User"),
            "https://ui-avatars.com/api/?name=Test%20User&background=random"
        );
        assert_eq!(
            avatar_url("Ana & Bo+"),
            "https://ui-avatars.com/api/?name=Ana%20%26%20Bo%2B&background=random"
        );
    }
}
