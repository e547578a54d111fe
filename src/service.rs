//! Member Service
//!
//! Cache-aside reads and writes on top of a member cache repository.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::Member;
use crate::error::{CacheError, Result};
use crate::repository::{MemberCacheRepository, WriteJob};

/// Name given to members loaded from the backing store.
pub const RDBMS_MEMBER_NAME: &str = "member name retrieved from rdbms";

// == Fallback Source ==
/// Authoritative source consulted on a cache miss.
pub trait FallbackSource: Send + Sync {
    fn load(&self, id: i64) -> Member;
}

/// Stand-in for the database, producing a fixed name for every id.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticSource;

impl FallbackSource for SyntheticSource {
    fn load(&self, id: i64) -> Member {
        Member::new(id, RDBMS_MEMBER_NAME)
    }
}

// == Member Service ==
pub struct MemberService {
    repository: Arc<dyn MemberCacheRepository>,
    source: Arc<dyn FallbackSource>,
    id_range: i64,
}

impl MemberService {
    /// # Arguments
    /// * `repository` - Member cache
    /// * `source` - Loader used on misses
    /// * `id_range` - Bulk reads cover ids `1..=id_range`
    pub fn new(
        repository: Arc<dyn MemberCacheRepository>,
        source: Arc<dyn FallbackSource>,
        id_range: i64,
    ) -> Self {
        Self {
            repository,
            source,
            id_range,
        }
    }

    // == Set One ==
    /// Caches one member and echoes its id.
    pub async fn set_one(&self, id: i64, name: String) -> i64 {
        self.repository.write_one(Member::new(id, name)).await;
        id
    }

    // == Set Bulk ==
    /// Caches every member and echoes their ids in input order.
    pub async fn set_bulk(&self, records: Vec<(i64, String)>) -> Vec<i64> {
        let ids = records.iter().map(|(id, _)| *id).collect();
        let members = records
            .into_iter()
            .map(|(id, name)| Member::new(id, name))
            .collect();
        self.repository.write_bulk(members).await;
        ids
    }

    // == Get Or Load ==
    /// Cached member, or the fallback member with the cache repopulated
    /// through the background write queue.
    pub async fn get_or_load(&self, id: i64) -> Member {
        if let Some(member) = self.repository.read_one(id).await {
            if member.is_placeholder() {
                warn!(id, name = member.name(), "serving degraded member");
            } else {
                debug!(id, "member cache hit");
            }
            return member;
        }

        let member = self.source.load(id);
        info!(id, "member cache miss, repopulating");
        self.repository.schedule(WriteJob::One(member.clone()));
        member
    }

    // == Get Or Load Bulk ==
    /// Members `start + 1 ..= start + count`.
    ///
    /// Partial hits are discarded: unless every member is cached, the whole
    /// range is loaded from the fallback source and repopulated.
    pub async fn get_or_load_bulk(&self, start: i64, count: i64) -> Result<Vec<Member>> {
        let ids = self.id_window(start, count)?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let cached: Vec<Member> = self
            .repository
            .read_bulk(&ids)
            .await
            .into_iter()
            .flatten()
            .collect();

        if cached.len() == ids.len() {
            debug!(start, count, "member bulk cache hit");
            return Ok(cached);
        }

        info!(
            start,
            count,
            hits = cached.len(),
            "member bulk cache miss, repopulating"
        );
        let members: Vec<Member> = ids.iter().map(|id| self.source.load(*id)).collect();
        self.repository.schedule(WriteJob::Bulk(members.clone()));
        Ok(members)
    }

    /// Ids for a bulk read, bounded by the synthetic id range.
    fn id_window(&self, start: i64, count: i64) -> Result<Vec<i64>> {
        if start < 0 || count < 0 {
            return Err(CacheError::InvalidRequest(
                "start and count must not be negative".into(),
            ));
        }
        match start.checked_add(count) {
            Some(end) if end <= self.id_range => Ok((start + 1..=end).collect()),
            _ => Err(CacheError::InvalidRequest(format!(
                "range start={} count={} exceeds member id range 1..={}",
                start, count, self.id_range
            ))),
        }
    }
}
