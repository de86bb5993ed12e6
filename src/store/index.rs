use std::collections::HashMap;
use std::path::PathBuf;

use super::{disk, CredentialRegistry, RegisteredCredential, StoreError};

pub struct RegistrationStore {
    dir: PathBuf,
    by_id: HashMap<Vec<u8>, RegisteredCredential>,
    by_rp: HashMap<String, Vec<Vec<u8>>>,
}

impl RegistrationStore {
    /// Load all registrations from disk into memory.
    pub fn load(dir: PathBuf) -> Result<Self, StoreError> {
        let records = disk::load_all(&dir)?;
        let mut store = Self {
            dir,
            by_id: HashMap::new(),
            by_rp: HashMap::new(),
        };
        for record in records {
            store.index(record);
        }
        Ok(store)
    }

    /// Add or replace a registration: write to disk and index in memory.
    pub fn add(&mut self, record: RegisteredCredential) -> Result<(), StoreError> {
        if record.credential_id.is_empty() {
            return Err(StoreError::Corrupt("empty credential_id".into()));
        }
        disk::write_registration(&self.dir, &record)?;
        self.unindex(&record.credential_id);
        self.index(record);
        Ok(())
    }

    pub fn get_by_id(&self, id: &[u8]) -> Option<&RegisteredCredential> {
        self.by_id.get(id)
    }

    /// All registrations for an RP, most recent first.
    pub fn get_by_rp(&self, rp_id: &str) -> Vec<&RegisteredCredential> {
        let Some(ids) = self.by_rp.get(rp_id) else {
            return Vec::new();
        };
        let mut records: Vec<&RegisteredCredential> =
            ids.iter().filter_map(|id| self.by_id.get(id)).collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }

    /// Enable or disable a registration in place.
    pub fn set_enabled(&mut self, id: &[u8], enabled: bool) -> Result<(), StoreError> {
        let record = self.by_id.get_mut(id).ok_or(StoreError::NotFound)?;
        record.enabled = enabled;
        disk::write_registration(&self.dir, record)?;
        Ok(())
    }

    /// Remove a registration by id; deletes from disk and memory index.
    pub fn remove(&mut self, id: &[u8]) -> Result<bool, StoreError> {
        if !self.by_id.contains_key(id) {
            return Ok(false);
        }
        disk::delete_registration(&self.dir, id)?;
        self.unindex(id);
        Ok(true)
    }

    pub fn registration_count(&self) -> usize {
        self.by_id.len()
    }

    fn index(&mut self, record: RegisteredCredential) {
        self.by_rp
            .entry(record.rp_id.clone())
            .or_default()
            .push(record.credential_id.clone());
        self.by_id.insert(record.credential_id.clone(), record);
    }

    fn unindex(&mut self, id: &[u8]) {
        let Some(record) = self.by_id.remove(id) else {
            return;
        };
        if let Some(ids) = self.by_rp.get_mut(&record.rp_id) {
            ids.retain(|i| i.as_slice() != id);
            if ids.is_empty() {
                self.by_rp.remove(&record.rp_id);
            }
        }
    }
}

impl CredentialRegistry for RegistrationStore {
    fn find_registration(&self, credential_id: &[u8], rp_id: &str) -> Option<RegisteredCredential> {
        self.get_by_id(credential_id)
            .filter(|r| r.rp_id == rp_id)
            .cloned()
    }
}
