use thiserror::Error;

use armory_core::{DomainError, ErrorKind};
use armory_ordering::PlacementStage;

use crate::store::StoreError;

/// Failure of a cart, reservation or checkout operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Deterministic business failure (bad quantity, unknown item, short stock).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Every reservation attempt lost a version race.
    #[error("stock reservation gave up after {attempts} conflicting attempts")]
    ReservationConflict { attempts: u32 },

    /// A store failed before any stock was taken.
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),

    /// A store failed after stock was reserved. Reserved stock is not restored.
    #[error("storage failure while {stage}: {source}")]
    Placement {
        stage: PlacementStage,
        #[source]
        source: StoreError,
    },
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Domain(e) => e.kind(),
            ServiceError::ReservationConflict { .. } => ErrorKind::ReservationConflict,
            ServiceError::Storage(_) | ServiceError::Placement { .. } => ErrorKind::StorageFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_failure_category() {
        assert_eq!(
            ServiceError::from(DomainError::EmptyOrder).kind(),
            ErrorKind::EmptyOrder
        );
        assert_eq!(
            ServiceError::ReservationConflict { attempts: 3 }.kind(),
            ErrorKind::ReservationConflict
        );
        assert_eq!(
            ServiceError::from(StoreError::Backend("down".into())).kind(),
            ErrorKind::StorageFailure
        );
        let late = ServiceError::Placement {
            stage: PlacementStage::Persisting,
            source: StoreError::Backend("down".into()),
        };
        assert_eq!(late.kind(), ErrorKind::StorageFailure);
        assert!(late.to_string().contains("persisting"));
    }
}
