//! Dumping into another schema and converting back

use crate::common::TestWorkspace;
use std::fs;
use zonekit::schema::h1;
use zonekit::{
    convert::convert, AssetKind, AssetPayload, AssetRecord, Error, Schema, ZoneMemory,
};
use zonekit_core::{Bounds, DObjAnimMat, XBoneInfo, XModelCollSurf};

fn body_model() -> h1::XModel {
    let bones = 3;
    let mut model = h1::XModel {
        num_bones: bones as u8,
        num_root_bones: 1,
        num_lods: 1,
        lod_ramp_type: 2,
        coll_lod: 0xFF,
        flags: 0x2,
        scale: 1.0,
        no_scale_part_bits: [0x1, 0, 0, 0, 0, 0x8000_0000, 0, 0],
        bone_names: vec!["tag_origin".into(), "j_spine".into(), "j_head".into()],
        parent_list: vec![0, 1],
        tag_angles: vec![[0, 0, 0, 1], [10, -10, 0, 1]],
        tag_positions: vec![[0.0, 0.0, 40.0], [0.0, 0.0, 20.0]],
        part_classification: vec![0, 1, 2],
        base_mat: vec![DObjAnimMat::default(); bones],
        material_handles: vec!["mc/body".into()],
        coll_surfs: vec![XModelCollSurf {
            bounds: Bounds {
                mid_point: [0.0, 0.0, 30.0],
                half_size: [10.0, 10.0, 30.0],
            },
            bone_idx: 1,
            contents: 1,
            surf_flags: 0,
        }],
        contents: 1,
        bone_info: vec![XBoneInfo::default(); bones],
        radius: 31.5,
        inv_high_mip_radius: vec![0x3C00],
        phys_preset: Some("human".into()),
        quantization: 0.25,
        ..h1::XModel::default()
    };
    model.lod_info[0].dist = 1000.0;
    model.lod_info[0].num_surfs = 1;
    model.lod_info[0].model_surfs = Some("body_lod0".into());
    model
}

#[test]
fn test_model_dumped_to_iw6_converts_back() {
    let ws = TestWorkspace::new();
    let model = body_model();
    ws.manifest("mp_body", &["xmodel,body"]).source(
        "mp_body",
        "xmodel/body.xmodel_export",
        serde_json::to_string_pretty(&model).unwrap(),
    );

    let db = ws.database();
    let report = ws.build(&db, "mp_body");
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);

    let dump = db.dump_zone("mp_body", Schema::Iw6).unwrap();
    assert_eq!(dump.diagnostics.error_count(), 0);

    let text = fs::read_to_string(ws.dumped("mp_body", "xmodel/body.xmodel_export")).unwrap();
    let payload = AssetPayload::from_json(AssetKind::XModel, Schema::Iw6, &text).unwrap();
    let AssetPayload::Iw6XModel(iw6) = &payload else {
        panic!("expected an iw6 model, got {}", payload.variant_name());
    };
    assert_eq!(iw6.pad0, model.lod_ramp_type);
    assert_eq!(iw6.flags, u32::from(model.flags));
    assert_eq!(iw6.no_scale_part_bits[5], 0x8000_0000);

    let mut mem = ZoneMemory::default();
    let record = AssetRecord::in_schema(AssetKind::XModel, "body", Schema::Iw6, payload);
    let back = convert(&record, Schema::Iw6, Schema::H1, &mut mem).unwrap();
    assert_eq!(back.payload, AssetPayload::XModel(model));
}

#[test]
fn test_model_using_high_part_bits_is_not_dumped_to_iw6() {
    let ws = TestWorkspace::new();
    let mut model = body_model();
    model.no_scale_part_bits[7] = 1;
    ws.manifest("mp_body", &["xmodel,body"]).source(
        "mp_body",
        "xmodel/body.xmodel_export",
        serde_json::to_string(&model).unwrap(),
    );

    let db = ws.database();
    ws.build(&db, "mp_body");
    let dump = db.dump_zone("mp_body", Schema::Iw6).unwrap();

    assert!(!ws.dumped("mp_body", "xmodel/body.xmodel_export").exists());
    let message = &dump.diagnostics.entries()[0].message;
    assert!(message.contains("no_scale_part_bits"), "{}", message);
}

#[test]
fn test_dump_to_schema_without_transform_reports_once() {
    let ws = TestWorkspace::new();
    ws.manifest("mp_fx", &["fx,boom", "fx,smoke"])
        .source("mp_fx", "effects/boom.fxe", [1u8, 2, 3])
        .source("mp_fx", "effects/smoke.fxe", [4u8, 5]);

    let db = ws.database();
    ws.build(&db, "mp_fx");
    let dump = db.dump_zone("mp_fx", Schema::S1).unwrap();

    let missing: Vec<_> = dump
        .diagnostics
        .entries()
        .iter()
        .filter(|d| d.message.contains("missing conversion transform"))
        .collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].kind, Some(AssetKind::Fx));
}

#[test]
fn test_conversion_budget_exhaustion_is_fatal() {
    let mut mem = ZoneMemory::new(8);
    let record = AssetRecord::new(AssetKind::XModel, "body", AssetPayload::XModel(body_model()));
    let err = convert(&record, Schema::H1, Schema::Iw6, &mut mem).unwrap_err();
    assert!(matches!(err, Error::Fatal(_)));
}
