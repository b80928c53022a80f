#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;

fn make_aura() -> Aura {
    Aura {
        uuid: Uuid::new_v4(),
        active: true,
        vision_source: true,
        visible: false,
        name: "torch".into(),
        value: 20.0,
        dim: 20.0,
        colour: "rgba(255, 200, 0, 0.4)".into(),
        border_colour: "rgba(0, 0, 0, 0)".into(),
        angle: 90.0,
        direction: 45.0,
        temporary: true,
    }
}

// =============================================================
// Round trip
// =============================================================

#[test]
fn round_trip_keeps_everything_but_temporary() {
    let shape = Uuid::new_v4();
    let auras = vec![make_aura(), Aura { temporary: false, ..make_aura() }];
    let back = auras_from_server(&auras_to_server(shape, &auras));
    assert_eq!(back.len(), auras.len());
    for (a, b) in auras.iter().zip(&back) {
        assert_eq!(Aura { temporary: false, ..a.clone() }, *b);
    }
}

#[test]
fn export_stamps_shape_id() {
    let shape = Uuid::new_v4();
    let wire = auras_to_server(shape, &[make_aura()]);
    assert_eq!(wire[0].shape, shape);
}

#[test]
fn import_resets_temporary() {
    let wire = auras_to_server(Uuid::new_v4(), &[make_aura()]);
    assert!(!auras_from_server(&wire)[0].temporary);
}

// =============================================================
// Serialized field names
// =============================================================

#[test]
fn wire_form_is_snake_case() {
    let wire = auras_to_server(Uuid::nil(), &[make_aura()]);
    let value = serde_json::to_value(&wire[0]).unwrap();
    assert!(value.get("vision_source").is_some());
    assert!(value.get("border_colour").is_some());
    assert!(value.get("shape").is_some());
    assert!(value.get("temporary").is_none());
}

#[test]
fn engine_form_is_camel_case() {
    let value = serde_json::to_value(make_aura()).unwrap();
    assert_eq!(value["visionSource"], json!(true));
    assert_eq!(value["borderColour"], json!("rgba(0, 0, 0, 0)"));
    assert_eq!(value["temporary"], json!(true));
}

#[test]
fn engine_form_defaults_temporary() {
    let mut value = serde_json::to_value(make_aura()).unwrap();
    value.as_object_mut().unwrap().remove("temporary");
    let aura: Aura = serde_json::from_value(value).unwrap();
    assert!(!aura.temporary);
}

// =============================================================
// Partials
// =============================================================

#[test]
fn partial_conversion_preserves_presence() {
    let partial = PartialAura { vision_source: Some(false), border_colour: Some("red".into()), ..Default::default() };
    let wire = partial_aura_to_server(&partial);
    assert_eq!(wire.vision_source, Some(false));
    assert_eq!(wire.border_colour.as_deref(), Some("red"));
    assert!(wire.value.is_none());
    assert_eq!(partial_aura_from_server(&wire), partial);
}

#[test]
fn partial_wire_skips_absent_fields() {
    let wire = PartialServerAura { dim: Some(3.0), ..Default::default() };
    let value = serde_json::to_value(&wire).unwrap();
    assert_eq!(value, json!({ "dim": 3.0 }));
}

#[test]
fn partial_apply_updates_present_fields_only() {
    let mut aura = make_aura();
    PartialAura { value: Some(5.0), name: Some("lamp".into()), ..Default::default() }.apply(&mut aura);
    assert_eq!(aura.value, 5.0);
    assert_eq!(aura.name, "lamp");
    assert_eq!(aura.dim, 20.0);
}

// =============================================================
// Radii
// =============================================================

#[test]
fn radii_are_normalized() {
    assert_eq!(normalize_radius(-3.0), 0.0);
    assert_eq!(normalize_radius(f64::NAN), 0.0);
    assert_eq!(normalize_radius(f64::INFINITY), 0.0);
    assert_eq!(normalize_radius(4.5), 4.5);
    let aura = Aura { value: f64::NAN, dim: -1.0, ..make_aura() };
    assert_eq!(aura.light_radius(), 0.0);
    assert_eq!(aura.dim_radius(), 0.0);
}

#[test]
fn cone_only_below_full_circle() {
    assert!(make_aura().is_cone());
    assert!(!Aura { angle: 360.0, ..make_aura() }.is_cone());
}
