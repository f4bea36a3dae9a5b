//! Schedule store: the in-memory class collection, mirrored to the key-value
//! store after every mutation.

use std::sync::Arc;

use crate::db::{KeyValueStore, CLASSES_KEY};
use crate::errors::AppError;
use crate::models::ClassRecord;

/// Sole owner of the class collection.
///
/// Views borrow the records only for the duration of a render.
pub struct ScheduleStore {
    kv: Arc<dyn KeyValueStore>,
    classes: Vec<ClassRecord>,
}

impl ScheduleStore {
    /// Create an empty store without reading persisted data.
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            classes: Vec::new(),
        }
    }

    /// Create a store and load the persisted collection.
    ///
    /// Malformed persisted data is logged and treated as an empty collection.
    /// The stored value is left untouched until the next mutation overwrites
    /// it.
    pub async fn open(kv: Arc<dyn KeyValueStore>) -> Result<Self, AppError> {
        let mut store = Self::new(kv);
        match store.load().await {
            Ok(()) => {}
            Err(AppError::MalformedStorage(msg)) => {
                tracing::warn!("Ignoring malformed class collection: {}", msg);
                store.classes.clear();
            }
            Err(e) => return Err(e),
        }
        Ok(store)
    }

    /// Replace the in-memory list with the persisted collection.
    ///
    /// A missing key yields an empty list; unparsable data is an error and
    /// leaves the in-memory list unchanged.
    pub async fn load(&mut self) -> Result<(), AppError> {
        let classes = match self.kv.get_item(CLASSES_KEY).await? {
            Some(raw) => serde_json::from_str::<Vec<ClassRecord>>(&raw)
                .map_err(|e| AppError::MalformedStorage(format!("Stored classes: {}", e)))?,
            None => Vec::new(),
        };

        tracing::debug!("Loaded {} classes", classes.len());
        self.classes = classes;
        Ok(())
    }

    /// Write the in-memory list back to storage.
    pub async fn save(&self) -> Result<(), AppError> {
        let raw = serde_json::to_string(&self.classes)
            .map_err(|e| AppError::Internal(format!("Failed to serialize classes: {}", e)))?;
        self.kv.set_item(CLASSES_KEY, &raw).await
    }

    /// Append a record and persist. On a failed write the record is dropped
    /// again so memory never runs ahead of storage.
    pub async fn add(&mut self, record: ClassRecord) -> Result<(), AppError> {
        self.classes.push(record);

        if let Err(e) = self.save().await {
            self.classes.pop();
            return Err(e);
        }

        if let Some(added) = self.classes.last() {
            tracing::info!("Scheduled class {} ({})", added.id, added.title);
        }
        Ok(())
    }

    /// Remove the first record with `id` and persist.
    ///
    /// Returns `false` without writing when no record matches.
    pub async fn delete(&mut self, id: &str) -> Result<bool, AppError> {
        let Some(index) = self.classes.iter().position(|c| c.id == id) else {
            return Ok(false);
        };

        let removed = self.classes.remove(index);
        if let Err(e) = self.save().await {
            self.classes.insert(index, removed);
            return Err(e);
        }

        tracing::info!("Deleted class {} ({})", removed.id, removed.title);
        Ok(true)
    }

    /// All records in store order.
    pub fn classes(&self) -> &[ClassRecord] {
        &self.classes
    }

    pub fn get(&self, id: &str) -> Option<&ClassRecord> {
        self.classes.iter().find(|c| c.id == id)
    }
}
