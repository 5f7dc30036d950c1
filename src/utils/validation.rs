//! Utilidades de validación
//!
//! Funciones helper para chequeos numéricos que los derives de `validator`
//! no cubren (campos dentro de lotes de asignaciones).

use num_traits::Zero;

use crate::utils::errors::{validation_error, AppError};

/// Validar que un valor sea no negativo
pub fn ensure_non_negative<T: PartialOrd + Zero>(
    field: &'static str,
    value: T,
) -> Result<(), AppError> {
    if value < T::zero() {
        return Err(validation_error(field, "must be non-negative"));
    }
    Ok(())
}

/// Validar que un valor sea estrictamente positivo
pub fn ensure_positive<T: PartialOrd + Zero>(
    field: &'static str,
    value: T,
) -> Result<(), AppError> {
    if value <= T::zero() {
        return Err(validation_error(field, "must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_non_negative() {
        assert!(ensure_non_negative("cost", 0).is_ok());
        assert!(ensure_non_negative("cost", 5000).is_ok());
        assert!(ensure_non_negative("cost", -1).is_err());
    }

    #[test]
    fn test_ensure_positive() {
        assert!(ensure_positive("packages_picked_up", 3).is_ok());
        assert!(ensure_positive("packages_picked_up", 0).is_err());
        assert!(ensure_positive("packages_picked_up", -3).is_err());
    }
}
