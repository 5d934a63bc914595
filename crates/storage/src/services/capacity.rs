//! Remaining-capacity arithmetic.
//!
//! The cached counter on `Activity` is always rewritten from
//! `capacity - count(APPROVED)`; nothing increments or decrements it.

use crate::error::{Result, StorageError};

pub const NO_SLOTS_MESSAGE: &str = "No hay cupos disponibles para esta actividad";

/// Remaining slots given the authoritative approved count.
pub fn remaining_capacity(capacity: i32, approved: i64) -> i32 {
    let approved = i32::try_from(approved).unwrap_or(i32::MAX);
    capacity.saturating_sub(approved)
}

/// Rejects a reservation when no slot is left.
pub fn ensure_slot_available(capacity: i32, approved: i64) -> Result<()> {
    if remaining_capacity(capacity, approved) <= 0 {
        return Err(StorageError::BadRequest(NO_SLOTS_MESSAGE.to_string()));
    }
    Ok(())
}

/// Capacity edits must keep room for every approved volunteer.
///
/// Callers run this under the same lock that writes the new capacity.
pub fn ensure_capacity_covers(capacity: i32, approved: i64) -> Result<()> {
    if i64::from(capacity) < approved {
        return Err(StorageError::bad_request(format!(
            "La capacidad no puede ser menor que las {} inscripciones aprobadas",
            approved
        )));
    }
    Ok(())
}

/// One slot or less left: the coordinator gets warned.
pub fn is_near_full(remaining: i32) -> bool {
    remaining <= 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_is_capacity_minus_approved() {
        assert_eq!(remaining_capacity(10, 0), 10);
        assert_eq!(remaining_capacity(10, 7), 3);
        assert_eq!(remaining_capacity(1, 1), 0);
    }

    #[test]
    fn capacity_may_equal_but_not_undercut_approved() {
        assert!(ensure_capacity_covers(2, 2).is_ok());
        let err = ensure_capacity_covers(1, 2).unwrap_err();
        assert!(matches!(err, StorageError::BadRequest(ref m) if m.contains("2 inscripciones")));
    }

    #[test]
    fn last_slot_can_still_be_reserved() {
        assert!(ensure_slot_available(3, 2).is_ok());
    }

    #[test]
    fn exhausted_capacity_is_a_bad_request() {
        let err = ensure_slot_available(3, 3).unwrap_err();
        assert!(matches!(err, StorageError::BadRequest(ref m) if m == NO_SLOTS_MESSAGE));
    }

    #[test]
    fn near_full_threshold() {
        assert!(is_near_full(1));
        assert!(is_near_full(0));
        assert!(!is_near_full(2));
    }
}
