//! Capture passes over built zones

use crate::common::TestWorkspace;
use std::fs;
use zonekit::{AssetKind, CaptureMode, Schema, Severity};

#[test]
fn test_references_resolve_against_dependencies() {
    let ws = TestWorkspace::new();
    ws.manifest("common_mp", &["physpreset,human", "material,mc/skin"])
        .source(
            "common_mp",
            "physpreset/human.json",
            r#"{ "mass": 80.0, "bounce": 0.0, "friction": 0.9, "buoyancy": 1.0 }"#,
        )
        .source("common_mp", "materials/mc/skin", r#"{ "techset": "t", "sort_key": 0, "state_flags": 0, "textures": [] }"#)
        .manifest(
            "mp_test",
            &["require,common_mp", "reference,true", "physpreset,human", "material,mc/skin", "image,skin_col"],
        );

    let db = ws.database();
    ws.build(&db, "common_mp");
    ws.build(&db, "mp_test");

    let report = db.dump_zone("mp_test", Schema::Iw6).unwrap();
    assert_eq!(report.mode, CaptureMode::Dump);
    assert_eq!(report.resolved_references, 2);
    assert!(ws.dumped("mp_test", "physpreset/human.json").is_file());
    assert!(ws.dumped("mp_test", "materials/mc/skin").is_file());
    assert!(!ws.dumped("mp_test", "images/skin_col.h1Image").exists());

    let warnings: Vec<_> = report
        .diagnostics
        .entries()
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind, Some(AssetKind::Image));

    let log = fs::read_to_string(report.log.unwrap()).unwrap();
    assert_eq!(
        log.lines().collect::<Vec<_>>(),
        vec!["physpreset,,human", "material,,mc/skin", "image,,skin_col", "rawfile,mp_test"]
    );
}

#[test]
fn test_unresolvable_reference_is_not_found() {
    let ws = TestWorkspace::new();
    ws.manifest("mp_test", &["reference,true", "rawfile,elsewhere.gsc"]);

    let db = ws.database();
    ws.build(&db, "mp_test");
    let report = db.dump_zone("mp_test", Schema::H1).unwrap();

    assert_eq!(report.resolved_references, 0);
    assert_eq!(report.diagnostics.error_count(), 1);
    assert!(report.diagnostics.entries()[0].message.contains("not found"));
    assert!(!ws.dumped("mp_test", "elsewhere.gsc").exists());
    assert!(!ws.dumped("mp_test", ",elsewhere.gsc").exists());
}

#[test]
fn test_verify_writes_nothing() {
    let ws = TestWorkspace::new();
    ws.manifest("mp_test", &["rawfile,a.gsc"]).source("mp_test", "a.gsc", "a");

    let db = ws.database();
    ws.build(&db, "mp_test");
    let report = db.verify_zone("mp_test").unwrap();

    assert_eq!(report.mode, CaptureMode::Verify);
    assert_eq!(report.captured, 2);
    assert!(report.log.is_none());
    assert!(!ws.config.dump_dir.exists());
}
