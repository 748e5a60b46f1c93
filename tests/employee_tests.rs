mod common;

use common::{new_company, new_person, pdf, spawn_app};
use registry::{
    models::{
        link::{Association, EntityKind},
        person::PersonChanges,
    },
    AppError,
};

#[tokio::test]
async fn created_employee_is_returned_with_companies_and_without_password() {
    let app = spawn_app().await;
    let acme = app
        .state
        .companies
        .create(new_company("Acme", "12345678000190"))
        .await
        .unwrap();

    let mut payload = new_person("jdoe", "12345678901", "j@x.com");
    payload.company_ids = Some(vec![acme.company.id]);
    let created = app.state.employees.create(payload, None).await.unwrap();

    let fetched = app.state.employees.get(created.person.id).await.unwrap();
    assert_eq!(fetched.person.login, "jdoe");
    assert_eq!(fetched.companies.len(), 1);
    assert_eq!(fetched.companies[0].id, acme.company.id);
    assert_eq!(fetched.companies[0].name, "Acme");

    let json = serde_json::to_value(&fetched).unwrap();
    assert!(json.get("password").is_none());
    assert!(json.get("password_hash").is_none());
    assert_eq!(json["companies"][0]["name"], "Acme");
}

#[tokio::test]
async fn duplicate_login_is_rejected_but_own_login_is_accepted() {
    let app = spawn_app().await;
    let first = app
        .state
        .employees
        .create(new_person("jdoe", "12345678901", "j@x.com"), None)
        .await
        .unwrap();

    let err = app
        .state
        .employees
        .create(new_person("jdoe", "98765432100", "other@x.com"), None)
        .await
        .unwrap_err();
    let fields = err.field_errors().expect("erro de validação");
    assert!(fields.contains("login"));
    assert!(!fields.contains("cpf"));
    assert_eq!(app.state.employees.list().await.unwrap().len(), 1);

    let changes = PersonChanges {
        login: Some("jdoe".into()),
        cpf: Some("12345678901".into()),
        email: Some("j@x.com".into()),
        name: Some("John Doe".into()),
        ..Default::default()
    };
    let updated = app.state.employees.update(first.person.id, changes, None).await.unwrap();
    assert_eq!(updated.person.name, "John Doe");
}

#[tokio::test]
async fn update_to_another_employees_email_is_rejected() {
    let app = spawn_app().await;
    app.state
        .employees
        .create(new_person("ana", "11111111111", "ana@x.com"), None)
        .await
        .unwrap();
    let bia = app
        .state
        .employees
        .create(new_person("bia", "22222222222", "bia@x.com"), None)
        .await
        .unwrap();

    let changes = PersonChanges {
        email: Some("ana@x.com".into()),
        ..Default::default()
    };
    let err = app.state.employees.update(bia.person.id, changes, None).await.unwrap_err();
    assert!(err.field_errors().unwrap().contains("email"));

    let unchanged = app.state.employees.get(bia.person.id).await.unwrap();
    assert_eq!(unchanged.person.email, "bia@x.com");
}

#[tokio::test]
async fn malformed_fields_are_all_reported_and_nothing_is_written() {
    let app = spawn_app().await;
    let mut payload = new_person("jdoe", "123", "not-an-email");
    payload.password = "123".into();

    let err = app.state.employees.create(payload, None).await.unwrap_err();
    let fields = err.field_errors().unwrap();
    assert!(fields.contains("cpf"));
    assert!(fields.contains("email"));
    assert!(fields.contains("password"));
    assert!(app.state.employees.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_company_id_fails_before_any_write() {
    let app = spawn_app().await;
    let mut payload = new_person("jdoe", "12345678901", "j@x.com");
    payload.company_ids = Some(vec![999]);

    let err = app.state.employees.create(payload, None).await.unwrap_err();
    assert!(err.field_errors().unwrap().contains("company_ids"));
    assert!(app.state.employees.list().await.unwrap().is_empty());
    assert_eq!(app.link_rows("company_employee").await, 0);
}

#[tokio::test]
async fn setting_the_same_links_twice_keeps_a_single_pair_each() {
    let app = spawn_app().await;
    let a = app.state.companies.create(new_company("A", "11111111000111")).await.unwrap();
    let b = app.state.companies.create(new_company("B", "22222222000122")).await.unwrap();
    let employee = app
        .state
        .employees
        .create(new_person("jdoe", "12345678901", "j@x.com"), None)
        .await
        .unwrap();

    for _ in 0..2 {
        let changes = PersonChanges {
            company_ids: Some(vec![a.company.id, b.company.id, a.company.id]),
            ..Default::default()
        };
        let updated = app
            .state
            .employees
            .update(employee.person.id, changes, None)
            .await
            .unwrap();
        assert_eq!(updated.companies.len(), 2);
    }

    assert_eq!(app.link_rows("company_employee").await, 2);
}

#[tokio::test]
async fn link_list_replaces_the_whole_set() {
    let app = spawn_app().await;
    let a = app.state.companies.create(new_company("A", "11111111000111")).await.unwrap();
    let b = app.state.companies.create(new_company("B", "22222222000122")).await.unwrap();

    let mut payload = new_person("jdoe", "12345678901", "j@x.com");
    payload.company_ids = Some(vec![a.company.id]);
    let employee = app.state.employees.create(payload, None).await.unwrap();

    let changes = PersonChanges {
        company_ids: Some(vec![b.company.id]),
        ..Default::default()
    };
    let updated = app
        .state
        .employees
        .update(employee.person.id, changes, None)
        .await
        .unwrap();
    let ids: Vec<i64> = updated.companies.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![b.company.id]);
}

#[tokio::test]
async fn empty_company_list_removes_every_link() {
    let app = spawn_app().await;
    let acme = app.state.companies.create(new_company("Acme", "12345678000190")).await.unwrap();
    let mut payload = new_person("jdoe", "12345678901", "j@x.com");
    payload.company_ids = Some(vec![acme.company.id]);
    let employee = app.state.employees.create(payload, None).await.unwrap();

    let changes = PersonChanges {
        company_ids: Some(vec![]),
        ..Default::default()
    };
    app.state
        .employees
        .update(employee.person.id, changes, None)
        .await
        .unwrap();

    let links = app
        .state
        .associations
        .links_for(
            &app.state.db_pool,
            Association::CompanyEmployee,
            EntityKind::Employee,
            employee.person.id,
        )
        .await
        .unwrap();
    assert!(links.is_empty());

    let company = app.state.companies.get(acme.company.id).await.unwrap();
    assert!(company.employees.is_empty());
}

#[tokio::test]
async fn omitted_company_list_leaves_links_untouched() {
    let app = spawn_app().await;
    let acme = app.state.companies.create(new_company("Acme", "12345678000190")).await.unwrap();
    let mut payload = new_person("jdoe", "12345678901", "j@x.com");
    payload.company_ids = Some(vec![acme.company.id]);
    let employee = app.state.employees.create(payload, None).await.unwrap();

    let changes = PersonChanges {
        address: Some("Rua Nova, 1".into()),
        ..Default::default()
    };
    let updated = app
        .state
        .employees
        .update(employee.person.id, changes, None)
        .await
        .unwrap();
    assert_eq!(updated.person.address, "Rua Nova, 1");
    assert_eq!(updated.companies.len(), 1);
}

#[tokio::test]
async fn delete_removes_row_links_and_document() {
    let app = spawn_app().await;
    let acme = app.state.companies.create(new_company("Acme", "12345678000190")).await.unwrap();
    let mut payload = new_person("jdoe", "12345678901", "j@x.com");
    payload.company_ids = Some(vec![acme.company.id]);
    let employee = app
        .state
        .employees
        .create(payload, Some(pdf(b"%PDF-1.4 rg")))
        .await
        .unwrap();
    let reference = employee.person.document_path.clone().unwrap();
    assert!(app.file_exists(&reference));

    app.state.employees.delete(employee.person.id, None).await.unwrap();

    assert!(matches!(
        app.state.employees.get(employee.person.id).await,
        Err(AppError::NotFound { .. })
    ));
    assert_eq!(app.link_rows("company_employee").await, 0);
    assert!(!app.file_exists(&reference));

    let company = app.state.companies.get(acme.company.id).await.unwrap();
    assert!(company.employees.is_empty());
}

#[tokio::test]
async fn employee_cannot_delete_itself() {
    let app = spawn_app().await;
    let acme = app.state.companies.create(new_company("Acme", "12345678000190")).await.unwrap();
    let mut payload = new_person("jdoe", "12345678901", "j@x.com");
    payload.company_ids = Some(vec![acme.company.id]);
    let employee = app
        .state
        .employees
        .create(payload, Some(pdf(b"%PDF-1.4 rg")))
        .await
        .unwrap();
    let id = employee.person.id;
    let reference = employee.person.document_path.clone().unwrap();

    let err = app.state.employees.delete(id, Some(id)).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let still_there = app.state.employees.get(id).await.unwrap();
    assert_eq!(still_there.companies.len(), 1);
    assert_eq!(still_there.person.document_path.as_deref(), Some(reference.as_str()));
    assert!(app.file_exists(&reference));
}

#[tokio::test]
async fn self_deletion_guard_applies_even_to_unknown_ids() {
    let app = spawn_app().await;
    let err = app.state.employees.delete(42, Some(42)).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn another_employee_can_delete() {
    let app = spawn_app().await;
    let admin = app
        .state
        .employees
        .create(new_person("admin", "11111111111", "admin@x.com"), None)
        .await
        .unwrap();
    let target = app
        .state
        .employees
        .create(new_person("jdoe", "12345678901", "j@x.com"), None)
        .await
        .unwrap();

    app.state
        .employees
        .delete(target.person.id, Some(admin.person.id))
        .await
        .unwrap();
    assert_eq!(app.state.employees.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn missing_records_are_not_found() {
    let app = spawn_app().await;
    assert!(matches!(app.state.employees.get(7).await, Err(AppError::NotFound { id: 7, .. })));
    assert!(matches!(
        app.state.employees.update(7, PersonChanges::default(), None).await,
        Err(AppError::NotFound { .. })
    ));
    assert!(matches!(
        app.state.employees.delete(7, None).await,
        Err(AppError::NotFound { .. })
    ));
}

#[tokio::test]
async fn list_embeds_companies_for_every_employee() {
    let app = spawn_app().await;
    let a = app.state.companies.create(new_company("A", "11111111000111")).await.unwrap();
    let b = app.state.companies.create(new_company("B", "22222222000122")).await.unwrap();

    let mut first = new_person("ana", "11111111111", "ana@x.com");
    first.company_ids = Some(vec![a.company.id, b.company.id]);
    app.state.employees.create(first, None).await.unwrap();
    app.state
        .employees
        .create(new_person("bia", "22222222222", "bia@x.com"), None)
        .await
        .unwrap();

    let listed = app.state.employees.list().await.unwrap();
    let ana = listed.iter().find(|e| e.person.login == "ana").unwrap();
    let bia = listed.iter().find(|e| e.person.login == "bia").unwrap();
    assert_eq!(ana.companies.len(), 2);
    assert!(bia.companies.is_empty());
}
