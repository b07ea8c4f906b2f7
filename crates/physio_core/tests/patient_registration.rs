use physio_core::db::open_db_in_memory;
use physio_core::{
    PatientForm, PatientGroup, PatientGroupRepository, PatientService, PersonForm,
    PhysiotherapistService, ServiceError, Sex, SqliteTreeStore, UserKind, UserRepository,
};

fn person(name: &str, email: &str, cpf: &str) -> PersonForm {
    PersonForm {
        name: name.to_string(),
        email: email.to_string(),
        sex: Sex::Male,
        cpf: cpf.to_string(),
        address: "Av. Brasil, 100".to_string(),
        postal_code: "20040-002".to_string(),
        birth_date: "1970-11-02T10:00:00-03:00".to_string(),
        active: true,
    }
}

fn patient(name: &str, cpf: &str, responsible: &str) -> PatientForm {
    PatientForm {
        person: person(name, &format!("{}@mail.com", name.to_lowercase()), cpf),
        responsible: responsible.to_string(),
        group: None,
    }
}

fn seed_physiotherapists(store: &SqliteTreeStore<'_>) {
    let service = PhysiotherapistService::new(store);
    service
        .register(&person("Ana", "ana@clinica.com", "11144477735"), None)
        .unwrap();
    service
        .register(&person("Bia", "bia@clinica.com", "52998224725"), None)
        .unwrap();
}

#[test]
fn register_patient_links_responsible_and_creates_credential() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTreeStore::new(&conn);
    seed_physiotherapists(&store);
    let service = PatientService::new(&store);

    let created = service
        .register(&patient("Caio", "123.456.789-09", "1"), None)
        .unwrap();
    assert_eq!(created.key, "1");
    assert_eq!(created.record.responsible, "1");
    assert_eq!(
        created.record.personal.birth_date.to_date().unwrap().to_string(),
        "1970-11-02"
    );

    let user = UserRepository::new(&store)
        .get("12345678909")
        .unwrap()
        .unwrap();
    assert_eq!(user.kind, UserKind::Patient);
    assert_eq!(user.id, "1");
}

#[test]
fn unknown_responsible_physiotherapist_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTreeStore::new(&conn);
    let service = PatientService::new(&store);

    let err = service
        .register(&patient("Caio", "12345678909", "5"), None)
        .unwrap_err();
    match err {
        ServiceError::UnknownPhysiotherapist(id) => assert_eq!(id, "5"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn patient_group_must_exist_when_set() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTreeStore::new(&conn);
    seed_physiotherapists(&store);
    let service = PatientService::new(&store);

    let mut form = patient("Caio", "12345678909", "1");
    form.group = Some("idosos".to_string());
    assert!(matches!(
        service.register(&form, None).unwrap_err(),
        ServiceError::UnknownPatientGroup(_)
    ));

    PatientGroupRepository::new(&store)
        .save(
            "idosos",
            &PatientGroup {
                description: "Idosos".to_string(),
            },
        )
        .unwrap();
    let saved = service.register(&form, None).unwrap();
    assert_eq!(saved.record.group.as_deref(), Some("idosos"));
}

#[test]
fn lists_patients_by_responsible_physiotherapist() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTreeStore::new(&conn);
    seed_physiotherapists(&store);
    let service = PatientService::new(&store);

    service
        .register(&patient("Caio", "12345678909", "1"), None)
        .unwrap();
    service
        .register(&patient("Davi", "98765432100", "2"), None)
        .unwrap();
    service
        .register(&patient("Eva", "24681357928", "1"), None)
        .unwrap();

    let keys: Vec<String> = service
        .list_for_physiotherapist("1")
        .unwrap()
        .into_iter()
        .map(|item| item.key)
        .collect();
    assert_eq!(keys, vec!["1".to_string(), "3".to_string()]);
    assert!(service.list_for_physiotherapist("9").unwrap().is_empty());
    assert_eq!(service.list_recent(Some(1)).unwrap()[0].key, "3");
}

#[test]
fn empty_patient_tree_lists_as_empty() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTreeStore::new(&conn);
    let service = PatientService::new(&store);

    assert!(service.list_recent(None).unwrap().is_empty());
    assert!(service.load_profile("1").unwrap().is_none());
}

#[test]
fn delete_patient_removes_credential() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTreeStore::new(&conn);
    seed_physiotherapists(&store);
    let service = PatientService::new(&store);

    service
        .register(&patient("Caio", "12345678909", "1"), None)
        .unwrap();
    service.delete("1").unwrap();

    assert!(service.get("1").unwrap().is_none());
    assert!(UserRepository::new(&store)
        .get("12345678909")
        .unwrap()
        .is_none());
}

#[test]
fn credential_active_flag_can_be_toggled() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTreeStore::new(&conn);
    seed_physiotherapists(&store);
    let service = PatientService::new(&store);
    let users = UserRepository::new(&store);

    service
        .register(&patient("Caio", "12345678909", "1"), None)
        .unwrap();
    users.set_active("12345678909", false).unwrap();

    let profile = service.load_profile("1").unwrap().unwrap();
    assert!(!profile.active);
    assert!(profile.record.personal.active);
}
