use async_trait::async_trait;
use dns_proxy_application::ports::HostnameRepository;
use dns_proxy_domain::{DomainError, HostnameEntry};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Hostname entries kept in memory and persisted as a JSON array after
/// every mutation.
///
/// Reads never wait on disk: the solver path takes the `RwLock` only for
/// the in-memory scan. Writers are serialized by `write_lock`, write the
/// new state to disk first and publish it afterwards, so a failed write
/// leaves both copies unchanged.
pub struct JsonHostnameStore {
    path: PathBuf,
    entries: RwLock<Vec<HostnameEntry>>,
    write_lock: Mutex<()>,
}

impl JsonHostnameStore {
    /// Loads `path`; a missing file is an empty store.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref().to_path_buf();

        let entries: Vec<HostnameEntry> = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                DomainError::IoError(format!(
                    "Invalid hostname store {}: {}",
                    path.display(),
                    e
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Hostname store not found, starting empty");
                Vec::new()
            }
            Err(e) => {
                return Err(DomainError::IoError(format!(
                    "Failed to read hostname store {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        info!(path = %path.display(), entries = entries.len(), "Hostname store loaded");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        match self.entries.read() {
            Ok(entries) => entries.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Vec<HostnameEntry> {
        match self.entries.read() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn publish(&self, next: Vec<HostnameEntry>) {
        match self.entries.write() {
            Ok(mut entries) => *entries = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    async fn persist(&self, entries: &[HostnameEntry]) -> Result<(), DomainError> {
        let json = serde_json::to_vec_pretty(entries)
            .map_err(|e| DomainError::IoError(format!("Failed to encode hostnames: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DomainError::IoError(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &json).await.map_err(|e| {
            DomainError::IoError(format!("Failed to write {}: {}", tmp.display(), e))
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "Hostname store rename failed");
            DomainError::IoError(format!("Failed to replace {}: {}", self.path.display(), e))
        })?;

        Ok(())
    }
}

fn ensure_unique(
    entries: &[HostnameEntry],
    candidate: &HostnameEntry,
    skip_id: Option<u64>,
) -> Result<(), DomainError> {
    let duplicate = entries.iter().any(|e| {
        Some(e.id) != skip_id
            && e.hostname == candidate.hostname
            && e.record_type == candidate.record_type
            && e.value.eq_ignore_ascii_case(&candidate.value)
    });

    if duplicate {
        return Err(DomainError::HostnameAlreadyExists(format!(
            "{} {} {}",
            candidate.hostname, candidate.record_type, candidate.value
        )));
    }
    Ok(())
}

#[async_trait]
impl HostnameRepository for JsonHostnameStore {
    fn lookup(&self, hostname: &str) -> Vec<HostnameEntry> {
        let entries = match self.entries.read() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };

        let best = entries.iter().filter_map(|e| e.matches(hostname)).max();
        let Some(best) = best else {
            return Vec::new();
        };

        entries
            .iter()
            .filter(|e| e.matches(hostname) == Some(best))
            .cloned()
            .collect()
    }

    fn list(&self) -> Vec<HostnameEntry> {
        self.snapshot()
    }

    async fn create(&self, mut entry: HostnameEntry) -> Result<HostnameEntry, DomainError> {
        let _guard = self.write_lock.lock().await;
        let mut next = self.snapshot();

        ensure_unique(&next, &entry, None)?;
        entry.id = next.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        next.push(entry.clone());

        self.persist(&next).await?;
        self.publish(next);
        Ok(entry)
    }

    async fn update(&self, id: u64, mut entry: HostnameEntry) -> Result<HostnameEntry, DomainError> {
        let _guard = self.write_lock.lock().await;
        let mut next = self.snapshot();

        let index = next
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("Hostname {} not found", id)))?;
        ensure_unique(&next, &entry, Some(id))?;

        entry.id = id;
        next[index] = entry.clone();

        self.persist(&next).await?;
        self.publish(next);
        Ok(entry)
    }

    async fn delete(&self, id: u64) -> Result<HostnameEntry, DomainError> {
        let _guard = self.write_lock.lock().await;
        let mut next = self.snapshot();

        let index = next
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("Hostname {} not found", id)))?;
        let removed = next.remove(index);

        self.persist(&next).await?;
        self.publish(next);
        Ok(removed)
    }
}
