//! Repository Module
//!
//! The cache-repository interface used by the service layer and its
//! replicated implementation.

mod fanout;

use async_trait::async_trait;

use crate::domain::Member;

pub use fanout::{FanOutRepository, Replicator, WriteJob};

// == Member Cache Repository ==
/// A single logical member cache.
///
/// Node failures never surface here: reads substitute degraded placeholders
/// and writes log and move on.
#[async_trait]
pub trait MemberCacheRepository: Send + Sync {
    /// Stores one member.
    async fn write_one(&self, member: Member);

    /// Stores every member.
    async fn write_bulk(&self, members: Vec<Member>);

    /// Queues a write on the background worker regardless of the write
    /// mode, so it is applied before the worker finishes draining.
    fn schedule(&self, job: WriteJob);

    /// Cached member, `None` on a miss.
    async fn read_one(&self, id: i64) -> Option<Member>;

    /// Cached members in input order, `None` for each miss.
    async fn read_bulk(&self, ids: &[i64]) -> Vec<Option<Member>>;
}
