//! Building zones from manifests

use crate::common::TestWorkspace;
use proptest::prelude::*;
use std::fs;
use zonekit::{AssetKind, Container, Host};

#[test]
fn test_full_manifest_builds_in_order() {
    let ws = TestWorkspace::new();
    ws.manifest(
        "mp_test",
        &[
            "// shared scripts first",
            "include,mp_scripts",
            "iterate,material",
            "localize,menu",
            "stringtable,mp/classes.csv",
            "reference,true",
            "image,,white",
            "physpreset,default",
        ],
    )
    .manifest("mp_scripts", &["rawfile,maps/mp/_load.gsc", "rawfile,maps/mp/_utility.gsc"])
    .source("mp_test", "maps/mp/_load.gsc", "main() {}")
    .source("mp_test", "maps/mp/_utility.gsc", "util() {}")
    .source("mp_test", "materials/mc/wood", r#"{ "techset": "wc_l_sm", "sort_key": 1, "state_flags": 0, "textures": [] }"#)
    .source("mp_test", "localizedstrings/menu.str", "REFERENCE OK\nLANG_ENGLISH \"OK\"\n")
    .source(
        "mp_test",
        "mp/classes.csv.json",
        r#"{ "columns": 2, "rows": 1, "values": ["assault", "ak47"] }"#,
    );

    let db = ws.database();
    let report = ws.build(&db, "mp_test");
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);

    let records = db.read_zone("mp_test").unwrap();
    let names: Vec<(AssetKind, &str)> = records.iter().map(|r| (r.kind, r.name.as_str())).collect();
    assert_eq!(
        names,
        vec![
            (AssetKind::RawFile, "maps/mp/_load.gsc"),
            (AssetKind::RawFile, "maps/mp/_utility.gsc"),
            (AssetKind::Material, "mc/wood"),
            (AssetKind::Localize, "MENU_OK"),
            (AssetKind::StringTable, "mp/classes.csv"),
            (AssetKind::Image, ",white"),
            (AssetKind::PhysPreset, ",default"),
            (AssetKind::RawFile, "mp_test"),
        ]
    );
    assert_eq!(report.assets, names.len());
}

#[test]
fn test_rebuild_is_byte_identical() {
    let ws = TestWorkspace::new();
    ws.manifest("mp_test", &["iterate,all", "rawfile,a.gsc"])
        .source("mp_test", "a.gsc", "a")
        .source("mp_test", "effects/boom.fxe", [7u8; 40])
        .source("mp_test", "materials/b", r#"{ "techset": "t", "sort_key": 0, "state_flags": 0, "textures": [{ "semantic": 1, "image": "b_col" }] }"#);

    let db = ws.database();
    let first = fs::read(ws.build(&db, "mp_test").path).unwrap();
    let second = fs::read(ws.build(&db, "mp_test").path).unwrap();
    assert_eq!(first, second);

    let container = Container::parse(&first).unwrap();
    container.verify().unwrap();
    assert_eq!(container.name, "mp_test");
    assert_eq!(container.assets.len(), 4);
}

#[test]
fn test_require_loads_dependency_first() {
    let ws = TestWorkspace::new();
    ws.manifest("common_mp", &["rawfile,common.gsc"])
        .source("common_mp", "common.gsc", "common")
        .manifest("mp_test", &["require,common_mp", "reference,true", "rawfile,common.gsc"]);

    let db = ws.database();
    ws.build(&db, "common_mp");
    assert!(!db.is_loaded("common_mp"));

    let report = ws.build(&db, "mp_test");
    assert!(report.diagnostics.is_empty());
    assert!(db.is_loaded("common_mp"));
    assert_eq!(db.loaded_zones(), vec!["common_mp".to_string()]);
}

#[test]
fn test_bad_entries_do_not_stop_the_build() {
    let ws = TestWorkspace::new();
    ws.manifest(
        "mp_test",
        &["weapon,ak47", "rawfile,missing.gsc", "physpreset,broken", "rawfile,ok.gsc", "require,nowhere"],
    )
    .source("mp_test", "ok.gsc", "ok")
    .source("mp_test", "physpreset/broken.json", "{ nope");

    let db = ws.database();
    let report = ws.build(&db, "mp_test");
    assert_eq!(report.diagnostics.error_count(), 4);
    assert_eq!(report.assets, 2);

    let records = db.read_zone("mp_test").unwrap();
    assert_eq!(records[0].name, "ok.gsc");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_rawfiles_read_back_in_manifest_order(
        names in prop::collection::btree_set("[a-z]{1,8}", 1..8)
    ) {
        let ws = TestWorkspace::new();
        let lines: Vec<String> = names.iter().map(|n| format!("rawfile,{}.gsc", n)).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        ws.manifest("mp_test", &refs);
        for name in &names {
            ws.source("mp_test", &format!("{}.gsc", name), name.as_bytes());
        }

        let db = ws.database();
        let report = ws.build(&db, "mp_test");
        prop_assert!(report.diagnostics.is_empty());

        let records = db.read_zone("mp_test").unwrap();
        let mut expected: Vec<String> = names.iter().map(|n| format!("{}.gsc", n)).collect();
        expected.push("mp_test".to_string());
        let actual: Vec<String> = records.iter().map(|r| r.name.clone()).collect();
        prop_assert_eq!(actual, expected);
    }
}
