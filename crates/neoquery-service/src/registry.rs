//! Named connection registry.
//!
//! An ordered list of `(name, driver)` records. The list itself sits behind
//! a `parking_lot` lock that is never held across an await; each driver
//! sits behind its own `tokio` mutex so operations on one connection are
//! serialized while different connections proceed independently.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::driver::TransportDriver;
use crate::error::ServiceError;

/// Handle to a registered driver.
pub type SharedDriver = Arc<Mutex<Box<dyn TransportDriver>>>;

struct ConnectionRecord {
    name: String,
    driver: SharedDriver,
}

#[derive(Default)]
pub struct ConnectionRegistry {
    records: RwLock<Vec<ConnectionRecord>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `driver` under `name`. Duplicate names are rejected.
    pub fn add(
        &self,
        name: impl Into<String>,
        driver: Box<dyn TransportDriver>,
    ) -> Result<SharedDriver, ServiceError> {
        let name = name.into();
        let mut records = self.records.write();
        if records.iter().any(|r| r.name == name) {
            return Err(ServiceError::DuplicateConnection(name));
        }
        let driver_type = driver.driver_type();
        let driver: SharedDriver = Arc::new(Mutex::new(driver));
        records.push(ConnectionRecord {
            name: name.clone(),
            driver: Arc::clone(&driver),
        });
        drop(records);

        tracing::debug!(connection = %name, transport = %driver_type, "connection registered");
        Ok(driver)
    }

    pub fn get(&self, name: &str) -> Result<SharedDriver, ServiceError> {
        self.records
            .read()
            .iter()
            .find(|r| r.name == name)
            .map(|r| Arc::clone(&r.driver))
            .ok_or_else(|| ServiceError::ConnectionNotFound(name.to_owned()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.read().iter().any(|r| r.name == name)
    }

    /// Registered names in insertion order.
    pub fn names(&self) -> Vec<String> {
        self.records.read().iter().map(|r| r.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Removes the record and closes its driver. A failing close is logged
    /// and does not keep the record alive.
    pub async fn remove(&self, name: &str) -> Result<(), ServiceError> {
        let record = {
            let mut records = self.records.write();
            let pos = records
                .iter()
                .position(|r| r.name == name)
                .ok_or_else(|| ServiceError::ConnectionNotFound(name.to_owned()))?;
            records.remove(pos)
        };
        close_record(record).await;
        Ok(())
    }

    /// Closes and removes every record.
    pub async fn flush_all(&self) {
        let records = std::mem::take(&mut *self.records.write());
        let count = records.len();
        for record in records {
            close_record(record).await;
        }
        tracing::debug!(count, "connections flushed");
    }
}

async fn close_record(record: ConnectionRecord) {
    let mut driver = record.driver.lock().await;
    match driver.close().await {
        Ok(()) => tracing::debug!(connection = %record.name, "connection closed"),
        Err(e) => tracing::warn!(connection = %record.name, "closing connection failed: {e}"),
    }
}
