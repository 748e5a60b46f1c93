// src/models/link.rs

/// Os três tipos de registro que o sistema conhece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Company,
    Employee,
    Customer,
}

impl EntityKind {
    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Company => "companies",
            EntityKind::Employee => "employees",
            EntityKind::Customer => "customers",
        }
    }

    /// Nome usado nas mensagens de erro.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Company => "Empresa",
            EntityKind::Employee => "Funcionário",
            EntityKind::Customer => "Cliente",
        }
    }

    /// Campo do payload que carrega ids deste tipo ("company_ids", ...).
    pub fn ids_field(self) -> &'static str {
        match self {
            EntityKind::Company => "company_ids",
            EntityKind::Employee => "employee_ids",
            EntityKind::Customer => "customer_ids",
        }
    }

    /// Tabelas-ponte das quais este tipo participa.
    pub fn associations(self) -> &'static [Association] {
        match self {
            EntityKind::Company => &[Association::CompanyEmployee, Association::CompanyCustomer],
            EntityKind::Employee => &[Association::CompanyEmployee],
            EntityKind::Customer => &[Association::CompanyCustomer],
        }
    }
}

/// Uma tabela-ponte N:N. Cada linha é um par (company_id, <pessoa>_id) e nada mais.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Association {
    CompanyEmployee,
    CompanyCustomer,
}

impl Association {
    pub fn table(self) -> &'static str {
        match self {
            Association::CompanyEmployee => "company_employee",
            Association::CompanyCustomer => "company_customer",
        }
    }

    /// O lado "pessoa" da associação.
    pub fn person_kind(self) -> EntityKind {
        match self {
            Association::CompanyEmployee => EntityKind::Employee,
            Association::CompanyCustomer => EntityKind::Customer,
        }
    }

    /// Coluna que guarda o id de `kind`, se `kind` participa da associação.
    pub fn column_for(self, kind: EntityKind) -> Option<&'static str> {
        match (self, kind) {
            (_, EntityKind::Company) => Some("company_id"),
            (Association::CompanyEmployee, EntityKind::Employee) => Some("employee_id"),
            (Association::CompanyCustomer, EntityKind::Customer) => Some("customer_id"),
            _ => None,
        }
    }

    /// O outro lado visto a partir de `kind`.
    pub fn other_side(self, kind: EntityKind) -> Option<EntityKind> {
        match kind {
            EntityKind::Company => Some(self.person_kind()),
            k if k == self.person_kind() => Some(EntityKind::Company),
            _ => None,
        }
    }
}

/// Resultado de uma substituição de conjunto de vínculos.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkDiff {
    pub added: Vec<i64>,
    pub removed: Vec<i64>,
}

impl LinkDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
