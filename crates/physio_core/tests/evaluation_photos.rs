use physio_core::db::open_db_in_memory;
use physio_core::{
    BlobMetadata, BlobStore, Evaluation, EvaluationService, PatientForm, PatientService,
    PersonForm, PhysiotherapistService, ServiceError, Sex, SqliteBlobStore, SqliteTreeStore,
    StoragePath, StoreError, StoreResult, TreePath, TreeStore,
};
use serde_json::json;

const BUCKET: &str = "clinica.appspot.com";
const DOWNLOAD_BASE: &str = "https://files.example.com";
// "hello" in base64.
const PHOTO_BASE64: &str = "aGVsbG8=";

fn person(name: &str, email: &str, cpf: &str) -> PersonForm {
    PersonForm {
        name: name.to_string(),
        email: email.to_string(),
        sex: Sex::Female,
        cpf: cpf.to_string(),
        address: "Rua B, 20".to_string(),
        postal_code: "30130-010".to_string(),
        birth_date: "1992-07-15".to_string(),
        active: true,
    }
}

fn seed_patients(store: &SqliteTreeStore<'_>) {
    PhysiotherapistService::new(store)
        .register(&person("Ana", "ana@clinica.com", "11144477735"), None)
        .unwrap();
    let patients = PatientService::new(store);
    for (name, cpf) in [("Caio", "12345678909"), ("Davi", "98765432100")] {
        patients
            .register(
                &PatientForm {
                    person: person(name, &format!("{}@mail.com", name.to_lowercase()), cpf),
                    responsible: "1".to_string(),
                    group: None,
                },
                None,
            )
            .unwrap();
    }
}

fn evaluation(value: serde_json::Value) -> Evaluation {
    Evaluation::from_value(value).unwrap()
}

#[test]
fn evaluation_keys_are_scoped_per_patient() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTreeStore::new(&conn);
    let blobs = SqliteBlobStore::new(&conn, BUCKET, DOWNLOAD_BASE);
    seed_patients(&store);
    let service = EvaluationService::new(&store, &blobs);

    let first = service
        .create("1", &evaluation(json!({"queixa": "dor lombar", "eva": 7})))
        .unwrap();
    let second = service
        .create("1", &evaluation(json!({"queixa": "retorno", "eva": 4})))
        .unwrap();
    let other = service
        .create("2", &evaluation(json!({"queixa": "ombro"})))
        .unwrap();
    assert_eq!((first.as_str(), second.as_str(), other.as_str()), ("1", "2", "1"));

    let listed = service.list("1").unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[1].record.field("eva"), Some(&json!(4)));
    assert!(service.list("3").unwrap().is_empty());
}

#[test]
fn evaluation_requires_existing_patient_and_fields() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTreeStore::new(&conn);
    let blobs = SqliteBlobStore::new(&conn, BUCKET, DOWNLOAD_BASE);
    seed_patients(&store);
    let service = EvaluationService::new(&store, &blobs);

    assert!(matches!(
        service
            .create("7", &evaluation(json!({"queixa": "dor"})))
            .unwrap_err(),
        ServiceError::UnknownPatient(_)
    ));
    assert!(matches!(
        service.create("1", &Evaluation::default()).unwrap_err(),
        ServiceError::Repo(_)
    ));
    assert!(matches!(
        service
            .update("1", "5", &evaluation(json!({"queixa": "dor"})))
            .unwrap_err(),
        ServiceError::NotFound(_)
    ));
}

#[test]
fn update_replaces_form_data() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTreeStore::new(&conn);
    let blobs = SqliteBlobStore::new(&conn, BUCKET, DOWNLOAD_BASE);
    seed_patients(&store);
    let service = EvaluationService::new(&store, &blobs);

    let key = service
        .create("1", &evaluation(json!({"queixa": "dor", "eva": 8})))
        .unwrap();
    service
        .update("1", &key, &evaluation(json!({"queixa": "melhora"})))
        .unwrap();

    let stored = service.get("1", &key).unwrap().unwrap();
    assert_eq!(stored.field("queixa"), Some(&json!("melhora")));
    assert_eq!(stored.field("eva"), None);
}

#[test]
fn attached_photo_gets_download_url_and_content_type() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTreeStore::new(&conn);
    let blobs = SqliteBlobStore::new(&conn, BUCKET, DOWNLOAD_BASE);
    seed_patients(&store);
    let service = EvaluationService::new(&store, &blobs);

    let key = service
        .create("1", &evaluation(json!({"queixa": "dor"})))
        .unwrap();
    let metadata = service
        .attach_photo(
            "1",
            &key,
            "postura.png",
            &format!("data:image/png;base64,{PHOTO_BASE64}"),
        )
        .unwrap();
    assert_eq!(metadata.path, "avaliacoes/1/1/postura.png");
    assert_eq!(metadata.content_type, "image/png");
    assert_eq!(metadata.size_bytes, 5);

    let url = service
        .photo_url("1", &key, "postura.png")
        .unwrap()
        .unwrap();
    assert_eq!(
        url,
        format!(
            "https://files.example.com/v0/b/clinica.appspot.com/o/avaliacoes%2F1%2F1%2Fpostura.png?alt=media&token={}",
            metadata.download_token
        )
    );
    assert_eq!(service.photo_url("1", &key, "missing.png").unwrap(), None);
}

#[test]
fn photos_need_an_existing_evaluation() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTreeStore::new(&conn);
    let blobs = SqliteBlobStore::new(&conn, BUCKET, DOWNLOAD_BASE);
    seed_patients(&store);
    let service = EvaluationService::new(&store, &blobs);

    let err = service
        .attach_photo("1", "9", "postura.jpg", PHOTO_BASE64)
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    assert!(service.list_photos("1", "9").unwrap().is_empty());
}

#[test]
fn deleting_evaluation_removes_its_photos_only() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTreeStore::new(&conn);
    let blobs = SqliteBlobStore::new(&conn, BUCKET, DOWNLOAD_BASE);
    seed_patients(&store);
    let service = EvaluationService::new(&store, &blobs);

    let first = service
        .create("1", &evaluation(json!({"queixa": "dor"})))
        .unwrap();
    let second = service
        .create("1", &evaluation(json!({"queixa": "retorno"})))
        .unwrap();
    for name in ["frente.jpg", "perfil.jpg"] {
        service
            .attach_photo("1", &first, name, PHOTO_BASE64)
            .unwrap();
    }
    service
        .attach_photo("1", &second, "frente.jpg", PHOTO_BASE64)
        .unwrap();

    let photos = service.list_photos("1", &first).unwrap();
    assert_eq!(photos.len(), 2);
    assert!(photos
        .iter()
        .all(|photo| photo.content_type == "image/jpeg"));

    assert_eq!(service.delete("1", &first).unwrap(), 2);
    assert!(service.get("1", &first).unwrap().is_none());
    assert!(service.list_photos("1", &first).unwrap().is_empty());
    assert_eq!(service.list_photos("1", &second).unwrap().len(), 1);

    assert!(matches!(
        service.delete("1", &first).unwrap_err(),
        ServiceError::NotFound(_)
    ));
}

#[test]
fn deleting_missing_photo_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTreeStore::new(&conn);
    let blobs = SqliteBlobStore::new(&conn, BUCKET, DOWNLOAD_BASE);
    seed_patients(&store);
    let service = EvaluationService::new(&store, &blobs);

    let key = service
        .create("1", &evaluation(json!({"queixa": "dor"})))
        .unwrap();
    service
        .attach_photo("1", &key, "frente.jpg", PHOTO_BASE64)
        .unwrap();
    service.delete_photo("1", &key, "frente.jpg").unwrap();

    assert!(matches!(
        service.delete_photo("1", &key, "frente.jpg").unwrap_err(),
        ServiceError::NotFound(_)
    ));
}

#[test]
fn evaluation_with_only_empty_fields_is_rejected_without_using_a_key() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTreeStore::new(&conn);
    let blobs = SqliteBlobStore::new(&conn, BUCKET, DOWNLOAD_BASE);
    seed_patients(&store);
    let service = EvaluationService::new(&store, &blobs);

    let err = service
        .create("1", &evaluation(json!({"obs": null, "medidas": {}})))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Repo(_)));
    assert!(service.list("1").unwrap().is_empty());

    let key = service
        .create("1", &evaluation(json!({"queixa": "dor"})))
        .unwrap();
    assert_eq!(key, "1");
}

#[test]
fn index_named_fields_survive_a_round_trip() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTreeStore::new(&conn);
    let blobs = SqliteBlobStore::new(&conn, BUCKET, DOWNLOAD_BASE);
    seed_patients(&store);
    let service = EvaluationService::new(&store, &blobs);

    let key = service
        .create("1", &evaluation(json!({"0": "dor", "1": "lombar"})))
        .unwrap();

    let stored = service.get("1", &key).unwrap().unwrap();
    assert_eq!(stored.field("0"), Some(&json!("dor")));
    assert_eq!(stored.field("1"), Some(&json!("lombar")));
    assert_eq!(service.list("1").unwrap().len(), 1);
}

#[test]
fn listing_skips_a_malformed_evaluation() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTreeStore::new(&conn);
    let blobs = SqliteBlobStore::new(&conn, BUCKET, DOWNLOAD_BASE);
    seed_patients(&store);
    let service = EvaluationService::new(&store, &blobs);

    service
        .create("1", &evaluation(json!({"queixa": "dor"})))
        .unwrap();
    store
        .set(&TreePath::parse("avaliacao/1/5").unwrap(), &json!("texto solto"))
        .unwrap();
    service
        .create("1", &evaluation(json!({"queixa": "retorno"})))
        .unwrap();

    let keys: Vec<String> = service
        .list("1")
        .unwrap()
        .into_iter()
        .map(|item| item.key)
        .collect();
    assert_eq!(keys, vec!["1".to_string(), "2".to_string()]);
    assert!(store
        .get(&TreePath::parse("avaliacao/1/5").unwrap())
        .unwrap()
        .is_some());
}

/// Bucket whose deletes fail while `broken` is set.
struct FlakyBlobs<'a> {
    inner: &'a SqliteBlobStore<'a>,
    broken: std::cell::Cell<bool>,
}

impl BlobStore for FlakyBlobs<'_> {
    fn put(&self, path: &StoragePath, data: &[u8], content_type: &str) -> StoreResult<BlobMetadata> {
        self.inner.put(path, data, content_type)
    }

    fn get(&self, path: &StoragePath) -> StoreResult<Option<(BlobMetadata, Vec<u8>)>> {
        self.inner.get(path)
    }

    fn delete(&self, path: &StoragePath) -> StoreResult<bool> {
        if self.broken.get() {
            return Err(StoreError::InvalidData("bucket unavailable".to_string()));
        }
        self.inner.delete(path)
    }

    fn list(&self, prefix: &StoragePath) -> StoreResult<Vec<BlobMetadata>> {
        self.inner.list(prefix)
    }

    fn download_url(&self, path: &StoragePath) -> StoreResult<Option<String>> {
        self.inner.download_url(path)
    }
}

#[test]
fn failed_photo_cleanup_keeps_the_evaluation_for_a_retry() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteTreeStore::new(&conn);
    let sqlite_blobs = SqliteBlobStore::new(&conn, BUCKET, DOWNLOAD_BASE);
    let blobs = FlakyBlobs {
        inner: &sqlite_blobs,
        broken: std::cell::Cell::new(false),
    };
    seed_patients(&store);
    let service = EvaluationService::new(&store, &blobs);

    let key = service
        .create("1", &evaluation(json!({"queixa": "dor"})))
        .unwrap();
    service
        .attach_photo("1", &key, "frente.jpg", PHOTO_BASE64)
        .unwrap();

    blobs.broken.set(true);
    assert!(matches!(
        service.delete("1", &key).unwrap_err(),
        ServiceError::Repo(_)
    ));
    assert!(service.get("1", &key).unwrap().is_some());

    blobs.broken.set(false);
    assert_eq!(service.delete("1", &key).unwrap(), 1);
    assert!(service.get("1", &key).unwrap().is_none());
    assert!(service.list_photos("1", &key).unwrap().is_empty());
}
