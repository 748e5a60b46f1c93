// src/models/company.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::common::validation::validate_digits;
use crate::models::person::PersonRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: i64,
    pub name: String,
    // 14 dígitos, sem máscara
    pub cnpj: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Empresa com funcionários e clientes embutidos.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub employees: Vec<PersonRecord>,
    pub customers: Vec<PersonRecord>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewCompany {
    #[validate(length(min = 1, max = 255, message = "O nome é obrigatório (máx. 255 caracteres)."))]
    pub name: String,

    #[validate(
        length(equal = 14, message = "O CNPJ deve ter 14 dígitos."),
        custom(function = "validate_digits")
    )]
    pub cnpj: String,

    #[validate(length(min = 1, max = 255, message = "O endereço é obrigatório (máx. 255 caracteres)."))]
    pub address: String,

    pub employee_ids: Option<Vec<i64>>,
    pub customer_ids: Option<Vec<i64>>,
}

/// Atualização parcial: só os campos presentes mudam.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CompanyChanges {
    #[validate(length(min = 1, max = 255, message = "O nome é obrigatório (máx. 255 caracteres)."))]
    pub name: Option<String>,

    #[validate(
        length(equal = 14, message = "O CNPJ deve ter 14 dígitos."),
        custom(function = "validate_digits")
    )]
    pub cnpj: Option<String>,

    #[validate(length(min = 1, max = 255, message = "O endereço é obrigatório (máx. 255 caracteres)."))]
    pub address: Option<String>,

    pub employee_ids: Option<Vec<i64>>,
    pub customer_ids: Option<Vec<i64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_keys_are_rejected() {
        let raw = r#"{"name":"Acme","cnpj":"12345678000190","address":"X","owner":"me"}"#;
        assert!(serde_json::from_str::<NewCompany>(raw).is_err());
    }

    #[test]
    fn cnpj_must_have_fourteen_digits() {
        let company = NewCompany {
            name: "Acme".into(),
            cnpj: "12.345.678/0001-90".into(),
            address: "X".into(),
            ..Default::default()
        };
        let errors = company.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("cnpj"));
    }

    #[test]
    fn partial_changes_only_validate_present_fields() {
        let changes: CompanyChanges = serde_json::from_str(r#"{"employee_ids":[1,2]}"#).unwrap();
        assert!(changes.validate().is_ok());
        assert!(changes.name.is_none() && changes.cnpj.is_none());
        assert_eq!(changes.employee_ids, Some(vec![1, 2]));
    }
}
