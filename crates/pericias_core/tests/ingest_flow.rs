use chrono::{TimeZone, Utc};
use pericias_core::{
    Case, CaseRepository, FixedClock, InMemoryCaseRepository, IngestError, IngestOptions,
    IngestRequest, IngestService, Intent, JsonFileCaseRepository, Pericia,
};

const CREATE_TITLE: &str = "[AGREGAR PERICIA] 123-2024";
const UPDATE_TITLE: &str = "[ACTUALIZAR PERICIA] 123-2024";

fn clock() -> Box<FixedClock> {
    Box::new(FixedClock(
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap(),
    ))
}

fn request(title: &str, body: &str, actor: &str) -> IngestRequest {
    IngestRequest {
        title: title.to_string(),
        body: body.to_string(),
        actor: actor.to_string(),
    }
}

fn create_body(caso: &str) -> String {
    format!(
        "### Nº Caso\n\n{caso}\n\n\
         ### Tipo de Pericia\n\nBalística\n\n\
         ### Sección Responsable\n\nBALISTICA\n\n\
         ### Estado\n\nNo iniciada\n\n\
         ### Fecha de Disposición (YYYY-MM-DD)\n\n2024-05-30\n\n\
         ### Última Actualización (YYYY-MM-DD)\n\n_No response_\n\n\
         ### Avance / Acción realizada\n\n_No response_\n\n\
         ### Responsable\n\nCabo Pérez\n\n\
         ### Observaciones\n\nVainillas en custodia"
    )
}

fn update_body(pericia_id: &str, observaciones: &str) -> String {
    format!(
        "### Nº Caso\n\n123-2024\n\n\
         ### ID de Pericia\n\n{pericia_id}\n\n\
         ### Estado\n\nEn proceso\n\n\
         ### Última Actualización (YYYY-MM-DD)\n\n2024-06-01\n\n\
         ### Avance / Acción realizada\n\n_No response_\n\n\
         ### Responsable\n\n_No response_\n\n\
         ### Observaciones\n\n{observaciones}"
    )
}

fn seeded_case() -> Case {
    let mut case = Case::new("123-2024");
    case.pericias = vec![
        Pericia {
            id: "PER-001".to_string(),
            estado: "No iniciada".to_string(),
            avance: "Muestras recibidas".to_string(),
            responsable: "Cabo Pérez".to_string(),
            observaciones: "Cadena de custodia OK".to_string(),
            ..Pericia::default()
        },
        Pericia {
            id: "PER-003".to_string(),
            estado: "Realizada".to_string(),
            ..Pericia::default()
        },
    ];
    case
}

#[test]
fn create_on_new_case_allocates_per_001() {
    let mut service = IngestService::with_clock(InMemoryCaseRepository::new(), clock());

    let outcome = service
        .ingest(&request(CREATE_TITLE, &create_body("123-2024"), "ana"))
        .unwrap();
    assert_eq!(outcome.caso, "123-2024");
    assert_eq!(outcome.pericia_id, "PER-001");
    assert_eq!(outcome.intent, Intent::Create);
    assert!(outcome.case_created);

    let case = service.repo().get("123-2024").unwrap();
    assert_eq!(case.tipo, "Connotación");
    assert_eq!(case.pericias.len(), 1);
    let pericia = &case.pericias[0];
    assert_eq!(pericia.tipo_pericia, "Balística");
    assert_eq!(pericia.seccion, "BALISTICA");
    assert_eq!(pericia.fecha_disposicion, "2024-05-30");
    assert_eq!(pericia.ultima_actualizacion, "");
    assert_eq!(pericia.avance, "");
    assert_eq!(pericia.observaciones, "Vainillas en custodia");
    assert_eq!(pericia.last_editor, "ana");
    assert_eq!(pericia.last_edit_ts, "2024-06-01T12:30:00.000000Z");
}

#[test]
fn create_uses_max_plus_one_not_count_or_gap() {
    let repo = InMemoryCaseRepository::with_cases([seeded_case()]);
    let mut service = IngestService::with_clock(repo, clock());

    let outcome = service
        .ingest(&request(CREATE_TITLE, &create_body("123-2024"), "ana"))
        .unwrap();
    assert_eq!(outcome.pericia_id, "PER-004");
    assert!(!outcome.case_created);

    let case = service.repo().get("123-2024").unwrap();
    let ids: Vec<&str> = case.pericias.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["PER-001", "PER-003", "PER-004"]);
}

#[test]
fn update_overwrites_tracked_fields_and_keeps_observations_when_blank() {
    let repo = InMemoryCaseRepository::with_cases([seeded_case()]);
    let mut service = IngestService::with_clock(repo, clock());

    service
        .ingest(&request(UPDATE_TITLE, &update_body("PER-001", "_No response_"), "luis"))
        .unwrap();

    let case = service.repo().get("123-2024").unwrap();
    let pericia = &case.pericias[0];
    assert_eq!(pericia.estado, "En proceso");
    assert_eq!(pericia.ultima_actualizacion, "2024-06-01");
    assert_eq!(pericia.avance, "");
    assert_eq!(pericia.responsable, "");
    assert_eq!(pericia.observaciones, "Cadena de custodia OK");
    assert_eq!(pericia.last_editor, "luis");
    assert_eq!(case.pericias[1].estado, "Realizada");
    assert_eq!(case.estado_general, "En proceso");
}

#[test]
fn update_with_observations_overwrites_them() {
    let repo = InMemoryCaseRepository::with_cases([seeded_case()]);
    let mut service = IngestService::with_clock(repo, clock());

    service
        .ingest(&request(
            UPDATE_TITLE,
            &update_body("PER-001", "Se solicitó ampliación"),
            "luis",
        ))
        .unwrap();

    let case = service.repo().get("123-2024").unwrap();
    assert_eq!(case.pericias[0].observaciones, "Se solicitó ampliación");
}

#[test]
fn update_of_unknown_pericia_fails_and_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = JsonFileCaseRepository::new(dir.path());
    repo.save(&seeded_case()).unwrap();
    let path = dir.path().join("123-2024.json");
    let before = std::fs::read(&path).unwrap();

    let mut service = IngestService::with_clock(repo, clock());
    let err = service
        .ingest(&request(UPDATE_TITLE, &update_body("PER-002", "x"), "luis"))
        .unwrap_err();

    match err {
        IngestError::ExaminationNotFound { caso, pericia_id } => {
            assert_eq!(caso, "123-2024");
            assert_eq!(pericia_id, "PER-002");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn update_without_pericia_id_fails() {
    let repo = InMemoryCaseRepository::with_cases([seeded_case()]);
    let mut service = IngestService::with_clock(repo, clock());

    let err = service
        .ingest(&request(
            UPDATE_TITLE,
            "### Nº Caso\n\n123-2024\n\n### ID de Pericia\n\n_No response_",
            "luis",
        ))
        .unwrap_err();
    assert!(matches!(err, IngestError::MissingExaminationId));
    assert_eq!(service.repo().get("123-2024"), Some(&seeded_case()));
}

#[test]
fn missing_case_identifier_fails_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let mut service = IngestService::with_clock(JsonFileCaseRepository::new(dir.path()), clock());

    let err = service
        .ingest(&request(
            CREATE_TITLE,
            "### Nº Caso\n\n   \n\n### Estado\n\nNo iniciada",
            "ana",
        ))
        .unwrap_err();
    assert!(matches!(err, IngestError::MissingCaseIdentifier));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn unrecognized_title_fails_without_writing() {
    let mut service = IngestService::with_clock(InMemoryCaseRepository::new(), clock());

    let err = service
        .ingest(&request("Consulta general", &create_body("123-2024"), "ana"))
        .unwrap_err();
    assert!(matches!(err, IngestError::UnrecognizedIntent { .. }));
    assert!(service.repo().is_empty());
}

#[test]
fn title_with_both_markers_is_rejected() {
    let mut service = IngestService::with_clock(InMemoryCaseRepository::new(), clock());

    let err = service
        .ingest(&request(
            "[AGREGAR PERICIA] luego ACTUALIZAR",
            &create_body("123-2024"),
            "ana",
        ))
        .unwrap_err();
    assert!(matches!(err, IngestError::AmbiguousIntent { .. }));
    assert!(service.repo().is_empty());
}

#[test]
fn degree_sign_case_label_and_blank_actor_are_accepted() {
    let mut service = IngestService::with_clock(InMemoryCaseRepository::new(), clock());

    let outcome = service
        .ingest(&request(
            "[agregar pericia]",
            "### N° Caso\n\n88-2023\n\n### Estado\n\nRealizada",
            "  ",
        ))
        .unwrap();
    assert_eq!(outcome.caso, "88-2023");

    let case = service.repo().get("88-2023").unwrap();
    assert_eq!(case.pericias[0].last_editor, "unknown");
    assert_eq!(case.estado_general, "Realizada");
}

#[test]
fn strict_mode_blocks_unknown_section_before_any_write() {
    let mut service = IngestService::with_clock(InMemoryCaseRepository::new(), clock())
        .with_options(IngestOptions {
            strict_catalog: true,
        });

    let body = create_body("123-2024").replace("BALISTICA", "Balística forense");
    let err = service
        .ingest(&request(CREATE_TITLE, &body, "ana"))
        .unwrap_err();
    assert!(matches!(err, IngestError::InvalidCatalogValue(_)));
    assert!(!service.repo().exists("123-2024").unwrap());
}

#[test]
fn successive_creates_persist_through_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut service = IngestService::with_clock(JsonFileCaseRepository::new(dir.path()), clock());

    service
        .ingest(&request(CREATE_TITLE, &create_body("123-2024"), "ana"))
        .unwrap();
    let second = service
        .ingest(&request(CREATE_TITLE, &create_body("123-2024"), "ana"))
        .unwrap();
    assert_eq!(second.pericia_id, "PER-002");
    assert!(!second.case_created);

    let stored = service.into_repo().load("123-2024").unwrap();
    assert_eq!(stored.pericias.len(), 2);
}
