//! Authoritative in-memory list of users and their workouts.
//!
//! Every mutation is persisted through the [`Store`] under
//! [`WORKOUT_DATA_KEY`] and published to subscribers before it returns.
//! A mutation whose write fails leaves the list untouched.

use crate::models::{User, Workout, WorkoutType};
use crate::storage::{Store, StoreError, WORKOUT_DATA_KEY};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid workout: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("no user ids left to assign")]
    IdsExhausted,
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct Registry {
    store: Store,
    users: Vec<User>,
    next_id: Option<u64>,
    sender: watch::Sender<Vec<User>>,
}

impl Registry {
    pub async fn load(store: Store) -> Self {
        let users = match store.load(WORKOUT_DATA_KEY).await {
            Some(raw) => match serde_json::from_str::<Vec<User>>(&raw) {
                Ok(users) => users,
                Err(err) => {
                    error!("ignoring malformed {WORKOUT_DATA_KEY}: {err}");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        Self::with_users(store, users)
    }

    pub fn with_users(store: Store, users: Vec<User>) -> Self {
        let next_id = match users.iter().map(|user| user.id).max() {
            Some(max) => max.checked_add(1),
            None => Some(1),
        };
        let (sender, _) = watch::channel(users.clone());
        Self {
            store,
            users,
            next_id,
            sender,
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn get(&self, id: u64) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    /// Receiver that starts at the current snapshot and sees every mutation.
    pub fn subscribe(&self) -> watch::Receiver<Vec<User>> {
        self.sender.subscribe()
    }

    pub async fn add_workout(
        &mut self,
        name: &str,
        kind: &str,
        minutes: i64,
    ) -> Result<User, RegistryError> {
        let (name, workout) = validate_workout(name, kind, minutes)?;

        let key = name.to_lowercase();
        let mut users = self.users.clone();
        match users
            .iter()
            .position(|user| user.name.to_lowercase() == key)
        {
            Some(index) => {
                users[index].workouts.push(workout);
                let user = users[index].clone();
                self.commit(users).await?;
                Ok(user)
            }
            None => {
                let id = self.next_id.ok_or(RegistryError::IdsExhausted)?;
                let user = User {
                    id,
                    name: name.to_string(),
                    workouts: vec![workout],
                };
                users.push(user.clone());
                self.commit(users).await?;
                self.next_id = id.checked_add(1);
                info!(id, name = %name, "created user");
                Ok(user)
            }
        }
    }

    /// Removes the user with `id`. Returns `false` when no such user exists.
    pub async fn delete_user(&mut self, id: u64) -> Result<bool, RegistryError> {
        if self.get(id).is_none() {
            return Ok(false);
        }

        let users = self
            .users
            .iter()
            .filter(|user| user.id != id)
            .cloned()
            .collect();
        self.commit(users).await?;
        info!(id, "deleted user");
        Ok(true)
    }

    pub fn filtered_users(&self, search: Option<&str>, filter_type: Option<&str>) -> Vec<User> {
        let search = search
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase);
        let filter_type = filter_type
            .map(str::trim)
            .filter(|kind| !kind.is_empty())
            .map(str::to_lowercase);

        self.users
            .iter()
            .filter(|user| match &search {
                Some(term) => {
                    user.name.to_lowercase().contains(term)
                        || user
                            .workouts
                            .iter()
                            .any(|w| w.kind.label().to_lowercase().contains(term))
                }
                None => true,
            })
            .filter(|user| match &filter_type {
                Some(kind) => user
                    .workouts
                    .iter()
                    .any(|w| w.kind.label().to_lowercase() == *kind),
                None => true,
            })
            .cloned()
            .collect()
    }

    /// Persists `users`, then makes them current and publishes them.
    async fn commit(&mut self, users: Vec<User>) -> Result<(), RegistryError> {
        let raw = serde_json::to_string(&users).map_err(StoreError::from)?;
        self.store.save(WORKOUT_DATA_KEY, raw).await?;
        self.users = users;
        self.sender.send_replace(self.users.clone());
        Ok(())
    }
}

fn validate_workout<'a>(
    name: &'a str,
    kind: &str,
    minutes: i64,
) -> Result<(&'a str, Workout), RegistryError> {
    let mut errors = Vec::new();

    let name = name.trim();
    if name.is_empty() {
        errors.push("name is required".to_string());
    }

    let kind = if kind.trim().is_empty() {
        errors.push("workout type is required".to_string());
        None
    } else {
        match kind.parse::<WorkoutType>() {
            Ok(kind) => Some(kind),
            Err(_) => {
                errors.push("workout type must be one of Running, Cycling, Swimming, Yoga".to_string());
                None
            }
        }
    };

    let minutes = if minutes <= 0 {
        errors.push("minutes must be greater than 0".to_string());
        None
    } else {
        match u32::try_from(minutes) {
            Ok(minutes) => Some(minutes),
            Err(_) => {
                errors.push(format!("minutes must be at most {}", u32::MAX));
                None
            }
        }
    };

    match (kind, minutes) {
        (Some(kind), Some(minutes)) if errors.is_empty() => Ok((name, Workout { kind, minutes })),
        _ => Err(RegistryError::Validation(errors)),
    }
}
