use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::page::PageRequest;
use crate::models::registration::{
    NewRegistration, Registration, RegistrationFilter, RegistrationPageItem,
};

/// Persistence seam for registrations.
///
/// Carried in `RegistrationService` as `Arc<dyn RegistrationStore>` so the
/// admission flow can be exercised against in-memory fakes.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// A subject holds at most one registration per event; this is the lookup
    /// the duplicate pre-check relies on.
    async fn find_by_subject_and_event(
        &self,
        subject_id: Uuid,
        event_id: i32,
    ) -> Result<Option<Registration>, AppError>;

    /// Persists a new registration. Returns `None` when the underlying write
    /// produced no row, which callers surface instead of fabricating a record.
    async fn create(&self, new: &NewRegistration) -> Result<Option<Registration>, AppError>;

    /// Filtered page of registrations plus the unpaged total.
    async fn list_page(
        &self,
        filter: &RegistrationFilter,
        page: PageRequest,
    ) -> Result<(Vec<RegistrationPageItem>, i64), AppError>;
}
