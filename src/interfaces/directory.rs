use async_trait::async_trait;

use crate::domains::directory::{EventInfo, MeetingRecord, SellerRecord, TravelPlan, UserProfile, UserRole};
use crate::error::Result;

/// Read-only view over the platform's domain stores. Identity-scoped
/// queries take the caller's `user_id`; implementations must never
/// widen that scope. Failures surface as `DataSourceUnavailable` and
/// the assembler degrades instead of aborting the turn.
#[async_trait]
pub trait DirectorySource: Send + Sync {
    async fn event_info(&self) -> Result<EventInfo>;

    async fn profile(&self, user_id: &str) -> Result<Option<UserProfile>>;

    /// The caller's own meetings only, for the given role.
    async fn meetings(&self, user_id: &str, role: UserRole) -> Result<Vec<MeetingRecord>>;

    async fn travel_plan(&self, user_id: &str) -> Result<Option<TravelPlan>>;

    /// Public seller directory slice matching `query`, capped at `limit`.
    async fn search_sellers(&self, query: &str, limit: usize) -> Result<Vec<SellerRecord>>;
}
