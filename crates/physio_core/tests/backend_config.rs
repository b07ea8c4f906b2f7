use physio_core::{
    Backend, BackendConfig, BackendError, EvaluationService, PersonForm, PhysiotherapistService,
    Sex,
};
use std::fs;

fn write_config(dir: &tempfile::TempDir, database: &str) -> std::path::PathBuf {
    let path = dir.path().join("backend.json");
    let database_path = dir.path().join(database);
    let raw = format!(
        r#"{{
            "databasePath": {},
            "storageBucket": "clinica.appspot.com",
            "downloadBaseUrl": "https://files.example.com/"
        }}"#,
        serde_json::Value::from(database_path.to_string_lossy().into_owned())
    );
    fs::write(&path, raw).unwrap();
    path
}

#[test]
fn backend_opened_from_file_persists_records() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(&dir, "clinic.sqlite3");

    {
        let backend = Backend::open(BackendConfig::from_file(&config_path).unwrap()).unwrap();
        let tree = backend.tree();
        PhysiotherapistService::new(&tree)
            .register(
                &PersonForm {
                    name: "Ana".to_string(),
                    email: "ana@clinica.com".to_string(),
                    sex: Sex::Female,
                    cpf: "11144477735".to_string(),
                    address: "Rua A".to_string(),
                    postal_code: "01001-000".to_string(),
                    birth_date: "1988-01-30".to_string(),
                    active: true,
                },
                None,
            )
            .unwrap();
    }

    let backend = Backend::open(BackendConfig::from_file(&config_path).unwrap()).unwrap();
    let tree = backend.tree();
    let listed = PhysiotherapistService::new(&tree).list_recent(None).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].record.personal.name, "Ana");
}

#[test]
fn backend_blobs_use_configured_bucket() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(&dir, "unused.sqlite3");
    let backend =
        Backend::open_in_memory(BackendConfig::from_file(&config_path).unwrap()).unwrap();

    let tree = backend.tree();
    let blobs = backend.blobs();
    let service = EvaluationService::new(&tree, &blobs);
    assert_eq!(blobs.bucket(), "clinica.appspot.com");
    assert!(service.list_photos("1", "1").unwrap().is_empty());
}

#[test]
fn missing_config_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.json");

    let err = BackendConfig::from_file(&missing).unwrap_err();
    assert!(err.to_string().contains("absent.json"));

    let invalid = BackendConfig {
        storage_bucket: String::new(),
        ..BackendConfig::from_json_str(
            r#"{ "databasePath": "/tmp/x.sqlite3", "storageBucket": "b" }"#,
        )
        .unwrap()
    };
    assert!(matches!(
        Backend::open_in_memory(invalid),
        Err(BackendError::Config(_))
    ));
}
