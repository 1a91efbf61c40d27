//! Member store operations

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::member::{Member, MemberPatch, MemberQuery, NewMember};

/// Persistence contract for the member registry
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn insert(&self, member: NewMember) -> AppResult<Member>;

    async fn get(&self, id: i32) -> AppResult<Member>;

    /// Member currently holding `phone`, ignoring inactive members and
    /// the one identified by `exclude_id`
    async fn phone_holder(&self, phone: &str, exclude_id: Option<i32>)
        -> AppResult<Option<Member>>;

    /// Filtered page of members plus the total match count
    async fn list(&self, query: &MemberQuery) -> AppResult<(Vec<Member>, i64)>;

    /// Every member, unpaged (batch jobs and statistics)
    async fn all(&self) -> AppResult<Vec<Member>>;

    async fn update(&self, id: i32, patch: &MemberPatch) -> AppResult<Member>;

    async fn delete(&self, id: i32) -> AppResult<()>;
}
