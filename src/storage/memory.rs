/// In-memory event store
///
/// Implements the same contracts as `SqliteStorage`, including the per-day
/// upsert rules, so the engine can be exercised without a database.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::domain::{
    DateRange, FocusSession, Habit, HabitId, HabitLog, MoodEntry, User, UserId,
};
use crate::storage::{EventLog, EventStore, StorageError};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    habits: Vec<Habit>,
    habit_logs: Vec<HabitLog>,
    mood_entries: Vec<MoodEntry>,
    focus_sessions: Vec<FocusSession>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every read fail with `StorageError::Unavailable` until cleared
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("memory store is offline".to_string()));
        }
        self.tables
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))
    }
}

fn require_user(tables: &Tables, user_id: &UserId) -> Result<(), StorageError> {
    if tables.users.iter().any(|u| &u.id == user_id) {
        Ok(())
    } else {
        Err(StorageError::UserNotFound { user_id: user_id.to_string() })
    }
}

impl EventStore for MemoryStore {
    fn get_habits(&self, user_id: &UserId) -> Result<Vec<Habit>, StorageError> {
        let tables = self.tables()?;
        require_user(&tables, user_id)?;

        Ok(tables
            .habits
            .iter()
            .filter(|h| &h.user_id == user_id && !h.archived)
            .cloned()
            .collect())
    }

    fn get_habit_logs(&self, user_id: &UserId, range: DateRange) -> Result<Vec<HabitLog>, StorageError> {
        let tables = self.tables()?;
        let owned: Vec<&HabitId> = tables
            .habits
            .iter()
            .filter(|h| &h.user_id == user_id)
            .map(|h| &h.id)
            .collect();

        Ok(tables
            .habit_logs
            .iter()
            .filter(|log| range.contains(log.date) && owned.contains(&&log.habit_id))
            .cloned()
            .collect())
    }

    fn get_mood_entries(&self, user_id: &UserId, range: DateRange) -> Result<Vec<MoodEntry>, StorageError> {
        let tables = self.tables()?;
        Ok(tables
            .mood_entries
            .iter()
            .filter(|e| &e.user_id == user_id && range.contains(e.date))
            .cloned()
            .collect())
    }

    fn get_focus_sessions(&self, user_id: &UserId, range: DateRange) -> Result<Vec<FocusSession>, StorageError> {
        let tables = self.tables()?;
        Ok(tables
            .focus_sessions
            .iter()
            .filter(|s| &s.user_id == user_id && range.contains(s.date))
            .cloned()
            .collect())
    }

    fn get_previous_window_focus_total(&self, user_id: &UserId, range: DateRange) -> Result<u64, StorageError> {
        Ok(self
            .get_focus_sessions(user_id, range)?
            .iter()
            .map(|s| u64::from(s.duration_minutes))
            .sum())
    }
}

impl EventLog for MemoryStore {
    fn create_user(&self, user: &User) -> Result<(), StorageError> {
        self.tables()?.users.push(user.clone());
        Ok(())
    }

    fn get_user(&self, user_id: &UserId) -> Result<User, StorageError> {
        let tables = self.tables()?;
        tables
            .users
            .iter()
            .find(|u| &u.id == user_id)
            .cloned()
            .ok_or_else(|| StorageError::UserNotFound { user_id: user_id.to_string() })
    }

    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let mut tables = self.tables()?;
        require_user(&tables, &habit.user_id)?;
        tables.habits.push(habit.clone());
        Ok(())
    }

    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError> {
        let tables = self.tables()?;
        tables
            .habits
            .iter()
            .find(|h| &h.id == habit_id)
            .cloned()
            .ok_or_else(|| StorageError::HabitNotFound { habit_id: habit_id.to_string() })
    }

    fn list_habits(&self, user_id: &UserId, include_archived: bool) -> Result<Vec<Habit>, StorageError> {
        let tables = self.tables()?;
        require_user(&tables, user_id)?;

        let mut habits: Vec<Habit> = tables
            .habits
            .iter()
            .filter(|h| &h.user_id == user_id && (include_archived || !h.archived))
            .cloned()
            .collect();
        habits.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.name.cmp(&b.name)));
        Ok(habits)
    }

    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let mut tables = self.tables()?;
        match tables.habits.iter_mut().find(|h| h.id == habit.id) {
            Some(existing) => {
                *existing = habit.clone();
                Ok(())
            }
            None => Err(StorageError::HabitNotFound { habit_id: habit.id.to_string() }),
        }
    }

    fn upsert_habit_log(&self, log: &HabitLog) -> Result<HabitLog, StorageError> {
        let mut tables = self.tables()?;
        let existing = tables
            .habit_logs
            .iter_mut()
            .find(|l| l.habit_id == log.habit_id && l.date == log.date);

        let stored = match existing {
            Some(slot) => {
                slot.completed = log.completed;
                slot.notes = log.notes.clone();
                slot.logged_at = log.logged_at;
                slot.clone()
            }
            None => {
                tables.habit_logs.push(log.clone());
                log.clone()
            }
        };
        Ok(stored)
    }

    fn upsert_mood_entry(&self, entry: &MoodEntry) -> Result<MoodEntry, StorageError> {
        let mut tables = self.tables()?;
        require_user(&tables, &entry.user_id)?;
        let existing = tables
            .mood_entries
            .iter_mut()
            .find(|e| e.user_id == entry.user_id && e.date == entry.date);

        let stored = match existing {
            Some(slot) => {
                slot.mood_level = entry.mood_level;
                slot.energy_level = entry.energy_level;
                slot.sleep_hours = entry.sleep_hours;
                slot.notes = entry.notes.clone();
                slot.logged_at = entry.logged_at;
                slot.clone()
            }
            None => {
                tables.mood_entries.push(entry.clone());
                entry.clone()
            }
        };
        Ok(stored)
    }

    fn append_focus_session(&self, session: &FocusSession) -> Result<(), StorageError> {
        let mut tables = self.tables()?;
        require_user(&tables, &session.user_id)?;
        tables.focus_sessions.push(session.clone());
        Ok(())
    }
}
