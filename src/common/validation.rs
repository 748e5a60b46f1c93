// src/common/validation.rs

use validator::ValidationError;

/// CPF e CNPJ são guardados crus: só dígitos, sem máscara.
pub fn validate_digits(val: &str) -> Result<(), ValidationError> {
    if !val.chars().all(|c| c.is_ascii_digit()) {
        let mut err = ValidationError::new("digits");
        err.message = Some("Deve conter apenas dígitos.".into());
        return Err(err);
    }
    Ok(())
}

/// Remove duplicatas preservando a ordem de chegada.
pub fn dedup_ids(ids: &[i64]) -> Vec<i64> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
