//! Business repository.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::BusinessEntity;
use crate::metrics::QueryTimer;

/// Repository for business lookups. Businesses are created together with
/// their owner in [`UserRepository::create_owner_with_business`].
///
/// [`UserRepository::create_owner_with_business`]: super::UserRepository::create_owner_with_business
#[derive(Clone)]
pub struct BusinessRepository {
    pool: PgPool,
}

impl BusinessRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<BusinessEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_business_by_id");
        let result = sqlx::query_as::<_, BusinessEntity>(
            "SELECT id, name, invite_code, owner_id, created_at FROM businesses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result)
    }

    /// Looks up a business by its normalized invite code.
    pub async fn find_by_invite_code(
        &self,
        invite_code: &str,
    ) -> Result<Option<BusinessEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_business_by_invite_code");
        let result = sqlx::query_as::<_, BusinessEntity>(
            r#"
            SELECT id, name, invite_code, owner_id, created_at
            FROM businesses
            WHERE invite_code = $1
            "#,
        )
        .bind(invite_code)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result)
    }
}
