mod common;

use common::{folder, jpeg, setup_pool, FakeDrive, RecordingBackend, TouchOptimizer};
use reel_sync::entity::{columns, Entity};
use reel_sync::pipeline::{EntityError, Pipeline};
use reel_sync::store::Pool;
use reel_sync::template::StyleConfig;
use std::collections::BTreeMap;
use std::path::Path;

fn entity(pairs: &[(&str, &str)]) -> Entity {
    let fields: BTreeMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Entity::new(fields)
}

fn luz() -> Entity {
    entity(&[
        (columns::TITLE, "Luz"),
        (columns::DIRECTOR, "Ana Pérez y Luis Gómez"),
        (columns::MULTI_DIRECTOR, "SI"),
        (columns::DIRECTOR_BIO, "Dúo de Valparaíso."),
        (columns::SECTION, "Drama"),
        (columns::COUNTRY, "Chile"),
        (columns::YEAR, "2024"),
        (columns::DURATION, "0:12:07"),
        (columns::SYNOPSIS, "Una historia de luz."),
        (columns::LINKS, "https://drive.google.com/drive/folders/root"),
    ])
}

fn drive() -> FakeDrive {
    FakeDrive::new()
        .folder("root", vec![folder("f-stills", "Stills"), folder("f-dir", "Dir")])
        .folder("f-stills", vec![jpeg("s1", "still1.jpg")])
        .folder("f-dir", vec![jpeg("d1", "ana-perez.jpg")])
}

fn pipeline<'a>(
    pool: &'a Pool,
    drive: &'a FakeDrive,
    backend: &'a RecordingBackend,
    optimizer: &'a TouchOptimizer,
    films_dir: &Path,
) -> Pipeline<'a> {
    Pipeline {
        pool,
        drive,
        backend,
        optimizer,
        films_dir: films_dir.to_path_buf(),
        year: "2025".into(),
        style: StyleConfig::default(),
        festival: None,
    }
}

#[tokio::test]
async fn entity_runs_end_to_end() {
    let pool = setup_pool().await;
    let td = tempfile::tempdir().unwrap();
    let (drive, backend, optimizer) = (drive(), RecordingBackend::new(), TouchOptimizer::default());
    let p = pipeline(&pool, &drive, &backend, &optimizer, td.path());

    let outcome = p.process_entity(&luz()).await.unwrap();
    assert_eq!(outcome.entity_id, "Luz");
    assert_eq!(outcome.sync.as_ref().unwrap().downloaded, 2);
    assert_eq!(outcome.publish.uploaded, 2);
    assert_eq!(backend.creates().await.len(), 1);

    let entity_dir = td.path().join("Luz");
    let summary = std::fs::read_to_string(entity_dir.join("metadata.json")).unwrap();
    assert_eq!(
        summary,
        "DRAMA 2025 - Luz - ANA PÉREZ & LUIS GÓMEZ - Programación Excéntrico 2025"
    );

    assert_eq!(outcome.template.directors.len(), 2);
    assert_eq!(
        outcome.template.directors[0].image_url,
        "https://cdn.test/uploads/ana-perez_web.jpg"
    );
    assert_eq!(outcome.template.directors[1].image_url, "");
    assert_eq!(outcome.template.gallery_urls, vec!["https://cdn.test/uploads/still1_web.jpg"]);

    let raw = std::fs::read_to_string(&outcome.document).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc["context"], "et_builder");
    let body = doc["data"][outcome.record.post_id.to_string()].as_str().unwrap();
    assert!(body.contains("<h4><span>Ana Pérez</span></h4>"));
    assert!(body.contains("<h4><span>Luis Gómez</span></h4>"));
    assert!(body.contains("Chile · 2024 · 12´07"));
    assert!(body.contains(r#"button_text="convocatoria 2025""#));
    let images = doc["images"].as_object().unwrap();
    assert_eq!(images.len(), 2);
    assert!(images.values().all(|i| i["encoded"] == "Ynl0ZXM="));
}

#[tokio::test]
async fn rerun_updates_without_new_uploads() {
    let pool = setup_pool().await;
    let td = tempfile::tempdir().unwrap();
    let (drive, backend, optimizer) = (drive(), RecordingBackend::new(), TouchOptimizer::default());
    let p = pipeline(&pool, &drive, &backend, &optimizer, td.path());

    let first = p.process_entity(&luz()).await.unwrap();
    let second = p.process_entity(&luz()).await.unwrap();

    assert_eq!(second.record.post_id, first.record.post_id);
    assert_eq!(second.publish.uploaded, 0);
    assert_eq!(second.sync.unwrap().downloaded, 0);
    assert_eq!(backend.creates().await.len(), 1);
    assert_eq!(backend.updates().await.len(), 1);
    assert_eq!(backend.uploads().await.len(), 2);
}

#[tokio::test]
async fn bad_link_fails_entity_but_not_run() {
    let pool = setup_pool().await;
    let td = tempfile::tempdir().unwrap();
    let (drive, backend, optimizer) = (drive(), RecordingBackend::new(), TouchOptimizer::default());
    let p = pipeline(&pool, &drive, &backend, &optimizer, td.path());

    let broken = entity(&[(columns::TITLE, "Sombra"), (columns::LINKS, "see attached")]);
    let err = p.process_entity(&broken).await.unwrap_err();
    assert!(matches!(err, EntityError::DriveLink(_)));

    let report = p.run(&[broken, luz()]).await;
    assert_eq!(report.processed, 2);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.failures[0].0, "Sombra");
}

#[tokio::test]
async fn entity_without_link_skips_drive() {
    let pool = setup_pool().await;
    let td = tempfile::tempdir().unwrap();
    let (drive, backend, optimizer) = (drive(), RecordingBackend::new(), TouchOptimizer::default());
    let p = pipeline(&pool, &drive, &backend, &optimizer, td.path());

    let bare = entity(&[(columns::TITLE, "Sin Enlace")]);
    let outcome = p.process_entity(&bare).await.unwrap();
    assert!(outcome.sync.is_none());
    assert!(drive.listed().await.is_empty());
    assert_eq!(outcome.publish.uploaded, 0);
    assert_eq!(backend.creates().await.len(), 1);
    assert!(td.path().join("Sin Enlace").join("divi_template.json").exists());
}
