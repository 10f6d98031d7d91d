//! In-process cookie jar

use crate::error::{CookieKitError, Result};
use crate::jar::{is_addressed, prepare_write, CookieJar, JarQuery};
use crate::record::CookieRecord;
use serde_json::Value;
use std::sync::{Mutex, MutexGuard};
use url::Url;

/// Cookie jar kept entirely in memory, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryJar {
    cookies: Mutex<Vec<CookieRecord>>,
}

impl MemoryJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the jar without going through write validation.
    pub fn with_records(records: Vec<CookieRecord>) -> Self {
        Self {
            cookies: Mutex::new(records),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().map(|cookies| cookies.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<CookieRecord> {
        self.lock().map(|cookies| cookies.clone()).unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<CookieRecord>>> {
        self.cookies
            .lock()
            .map_err(|_| CookieKitError::Jar("Cookie jar lock poisoned".to_string()))
    }
}

impl CookieJar for MemoryJar {
    async fn list(&self, query: &JarQuery) -> Result<Vec<CookieRecord>> {
        let cookies = self.lock()?;
        Ok(cookies.iter().filter(|c| query.matches(c)).cloned().collect())
    }

    async fn set(&self, record: &CookieRecord, url: &Url) -> Result<()> {
        let stored = prepare_write(record, url)?;
        let key = stored.key();
        let mut cookies = self.lock()?;
        log::debug!("memory jar: set {} for {}", stored.name, url);
        match cookies.iter_mut().find(|existing| existing.key() == key) {
            Some(existing) => *existing = stored,
            None => cookies.push(stored),
        }
        Ok(())
    }

    async fn remove(&self, url: &Url, name: &str, partition_key: Option<&Value>) -> Result<()> {
        let mut cookies = self.lock()?;
        log::debug!("memory jar: remove {} for {}", name, url);
        cookies.retain(|record| !is_addressed(record, url, name, partition_key));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryJar;
    use crate::jar::{CookieJar, JarQuery};
    use crate::record::{CookieRecord, SameSite};
    use url::Url;

    fn url(raw: &str) -> Url {
        Url::parse(raw).expect("valid url")
    }

    #[tokio::test]
    async fn set_overwrites_same_address() {
        let jar = MemoryJar::new();
        let target = url("http://example.com/");
        jar.set(&CookieRecord::new("sid", "one", "example.com"), &target)
            .await
            .expect("first set");
        jar.set(&CookieRecord::new("sid", "two", "example.com"), &target)
            .await
            .expect("second set");

        let cookies = jar.list(&JarQuery::all()).await.expect("list");
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].value, "two");
    }

    #[tokio::test]
    async fn same_name_on_other_path_is_a_separate_record() {
        let jar = MemoryJar::new();
        jar.set(
            &CookieRecord::new("sid", "root", "example.com"),
            &url("http://example.com/"),
        )
        .await
        .expect("root");
        let nested = CookieRecord {
            path: "/app".to_string(),
            ..CookieRecord::new("sid", "app", "example.com")
        };
        jar.set(&nested, &url("http://example.com/app"))
            .await
            .expect("nested");
        assert_eq!(jar.len(), 2);

        jar.remove(&url("http://example.com/app"), "sid", None)
            .await
            .expect("remove");
        let remaining = jar.snapshot();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].value, "root");
    }

    #[tokio::test]
    async fn rejects_no_restriction_without_secure() {
        let jar = MemoryJar::new();
        let record = CookieRecord {
            same_site: SameSite::NoRestriction,
            ..CookieRecord::new("sid", "v", "example.com")
        };
        assert!(jar.set(&record, &url("http://example.com/")).await.is_err());
        assert!(jar.is_empty());
    }

    #[tokio::test]
    async fn removing_missing_record_succeeds() {
        let jar = MemoryJar::new();
        jar.remove(&url("https://example.com/"), "ghost", None)
            .await
            .expect("no-op remove");
    }

    #[tokio::test]
    async fn list_filters_by_exact_domain() {
        let jar = MemoryJar::with_records(vec![
            CookieRecord::new("a", "1", "example.com"),
            CookieRecord::new("b", "2", ".example.com"),
            CookieRecord::new("c", "3", "sub.example.com"),
        ]);
        let cookies = jar
            .list(&JarQuery::domain("example.com"))
            .await
            .expect("list");
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name, "a");
    }
}
