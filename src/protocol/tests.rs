// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sseq-chart and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::{fixture, rstest};
use serde_json::{json, Value};

use super::{
    apply_message, decode_chart_json, ChartMessage, DecodeError, DecoderRegistry, Entity,
    MessageError,
};
use crate::model::{
    ChartError, ChartEvent, ChartId, ChartRegistry, ClassFields, EdgeFields, EdgeType, Page,
    SseqChart,
};

#[fixture]
fn chart() -> SseqChart {
    SseqChart::with_uuid(ChartId::new("main").expect("id"), "main", 2).expect("chart")
}

fn message(value: Value) -> ChartMessage {
    serde_json::from_value(value).expect("message")
}

fn create_class(uuid: &str, x: i32, y: i32) -> ChartMessage {
    message(json!({
        "command": "create",
        "target_type": "ChartClass",
        "target": { "type": "ChartClass", "uuid": uuid, "degree": [x, y] },
    }))
}

#[rstest]
fn create_commits_classes_and_edges(mut chart: SseqChart) {
    chart.apply_message(create_class("a", 0, 0)).expect("a");
    chart.apply_message(create_class("b", 1, 1)).expect("b");
    chart
        .apply_message(message(json!({
            "command": "create",
            "type": "ChartDifferential",
            "target": {
                "type": "ChartDifferential",
                "uuid": "d",
                "source_uuid": "a",
                "target_uuid": "b",
                "page": 2,
            },
        })))
        .expect("edge");

    assert_eq!(chart.num_classes(), 2);
    let edge = chart.edge("d").expect("edge");
    assert_eq!(edge.edge_type(), EdgeType::Differential);
    assert_eq!(chart.class("a").expect("a").edges().count(), 1);
    assert_eq!(chart.drain_events(), vec![ChartEvent::Update]);
}

#[rstest]
fn create_with_unknown_tag_is_rejected(mut chart: SseqChart) {
    let err = chart
        .apply_message(message(json!({
            "command": "create",
            "target_type": "ChartBlob",
            "target": { "type": "ChartBlob" },
        })))
        .unwrap_err();
    assert!(matches!(err, MessageError::Decode(DecodeError::UnknownTag(ref tag)) if tag == "ChartBlob"));
    assert_eq!(chart.num_classes(), 0);
}

#[rstest]
fn create_of_dangling_edge_is_rejected(mut chart: SseqChart) {
    chart.apply_message(create_class("a", 0, 0)).expect("a");
    let err = chart
        .apply_message(message(json!({
            "command": "create",
            "target_type": "ChartStructline",
            "target": { "uuid": "s", "source_uuid": "a", "target_uuid": "missing" },
        })))
        .unwrap_err();
    assert!(matches!(
        err,
        MessageError::Chart(ChartError::DanglingEdge { .. })
    ));
    assert_eq!(chart.num_edges(), 0);
}

#[rstest]
fn update_finds_target_through_update_fields(mut chart: SseqChart) {
    chart.apply_message(create_class("a", 0, 0)).expect("a");
    chart
        .apply_message(message(json!({
            "command": "update",
            "target_type": "ChartClass",
            "update_fields": {
                "uuid": "a",
                "name": { "type": "PageProperty", "values": [[-65535, "x"], [5, "y"]] },
            },
        })))
        .expect("update");

    let class = chart.class("a").expect("a");
    assert_eq!(class.name.value_on_page(Page::Finite(2)), "x");
    assert_eq!(class.name.value_on_page(Page::Finite(5)), "y");
}

#[rstest]
fn update_with_wrong_type_is_rejected(mut chart: SseqChart) {
    chart.apply_message(create_class("a", 0, 0)).expect("a");
    let err = chart
        .apply_message(message(json!({
            "command": "update",
            "target_type": "ChartStructline",
            "target_uuid": "a",
            "update_fields": { "visible": false },
        })))
        .unwrap_err();
    assert!(matches!(
        err,
        MessageError::TypeMismatch { actual: "ChartClass", .. }
    ));
    assert!(*chart.class("a").expect("a").visible.value_on_page(Page::Finite(2)));
}

#[rstest]
#[case::update(json!({ "command": "update", "target_type": "ChartClass", "target_uuid": "ghost" }))]
#[case::delete(json!({ "command": "delete", "target_type": "ChartClass", "target_uuid": "ghost" }))]
fn unknown_targets_are_reported(mut chart: SseqChart, #[case] raw: Value) {
    let err = chart.apply_message(message(raw)).unwrap_err();
    assert!(matches!(err, MessageError::UnknownTarget { ref uuid, .. } if uuid == "ghost"));
}

#[rstest]
fn update_without_uuid_is_rejected(mut chart: SseqChart) {
    let err = chart
        .apply_message(message(json!({
            "command": "update",
            "target_type": "ChartClass",
            "update_fields": { "visible": false },
        })))
        .unwrap_err();
    assert!(matches!(err, MessageError::MissingUuid));
}

#[rstest]
fn delete_class_cascades(mut chart: SseqChart) {
    let a = chart.add_class(ClassFields::at([0, 0])).expect("a");
    let b = chart.add_class(ClassFields::at([1, 0])).expect("b");
    let edge = chart
        .add_extension(EdgeFields::between(&a, &b))
        .expect("edge");

    chart
        .apply_message(message(json!({
            "command": "delete",
            "target_type": "ChartClass",
            "target_uuid": a.as_str(),
        })))
        .expect("delete");
    assert!(chart.edge(edge.as_str()).is_none());
    assert_eq!(chart.class(b.as_str()).expect("b").edges().count(), 0);
}

#[rstest]
fn delete_checks_edge_variant(mut chart: SseqChart) {
    let a = chart.add_class(ClassFields::at([0, 0])).expect("a");
    let b = chart.add_class(ClassFields::at([1, 0])).expect("b");
    let edge = chart
        .add_structline(EdgeFields::between(&a, &b))
        .expect("edge");

    let err = chart
        .apply_message(message(json!({
            "command": "delete",
            "target_type": "ChartExtension",
            "target_uuid": edge.as_str(),
        })))
        .unwrap_err();
    assert!(matches!(err, MessageError::TypeMismatch { actual: "ChartStructline", .. }));
    assert!(chart.edge(edge.as_str()).is_some());
}

#[rstest]
fn chart_update_patches_settings(mut chart: SseqChart) {
    let a = chart.add_class(ClassFields::at([2, 3])).expect("a");
    chart
        .apply_message(message(json!({
            "command": "update",
            "target_type": "SseqChart",
            "target_fields": {
                "x_projection": [1, 1],
                "page_list": [[3, 65535]],
                "x_range": [-5, 5],
            },
        })))
        .expect("update");

    assert_eq!(chart.class(a.as_str()).expect("a").x(), 5);
    assert_eq!(chart.settings().x_range, [-5, 5]);
    assert_eq!(chart.settings().page_list[0].start, Page::Finite(3));
    assert_eq!(chart.settings().page_list[0].end, Page::Infinity);
}

#[rstest]
fn chart_document_round_trips(mut chart: SseqChart) {
    let a = chart.add_class(ClassFields::at([0, 0]).named("h_0")).expect("a");
    let b = chart.add_class(ClassFields::at([1, 1])).expect("b");
    chart
        .add_differential(EdgeFields::between(&a, &b).on_page(2))
        .expect("d");
    chart.add_structline(EdgeFields::between(&a, &b)).expect("s");

    let json = serde_json::to_value(&chart).expect("json");
    assert_eq!(json["type"], "SseqChart");
    assert_eq!(json["num_gradings"], 2);

    let decoded = decode_chart_json(DecoderRegistry::shared(), json).expect("decode");
    assert_eq!(decoded, chart);
}

#[rstest]
fn decoding_rejects_untagged_and_mismatched_objects() {
    let registry = DecoderRegistry::standard();
    assert!(matches!(
        registry.decode(json!({ "degree": [0, 0] })),
        Err(DecodeError::MissingTag)
    ));
    assert!(matches!(
        registry.decode_as("ChartClass", json!({ "type": "ChartExtension" })),
        Err(DecodeError::TagMismatch { .. })
    ));
    let err = decode_chart_json(
        &registry,
        json!({ "type": "SseqChart", "edges": [{ "type": "Unknown" }] }),
    )
    .unwrap_err();
    assert!(matches!(err, DecodeError::UnknownTag(ref tag) if tag == "Unknown"));
}

#[rstest]
fn page_properties_decode_by_tag() {
    let entity = DecoderRegistry::standard()
        .decode(json!({ "type": "PageProperty", "values": [[-65535, 1], [3, 2]] }))
        .expect("decode");
    let Entity::PageProperty(property) = entity else {
        panic!("expected a page property");
    };
    assert_eq!(property.value_on_page(Page::Finite(4)), &json!(2));
}

#[rstest]
fn custom_decoders_can_be_registered() {
    fn decode_dot(_: &DecoderRegistry, value: Value) -> Result<Entity, DecodeError> {
        let degree = value.get("at").cloned().unwrap_or(Value::Null);
        let fields: ClassFields = serde_json::from_value(json!({ "degree": degree }))?;
        Ok(Entity::Class(crate::model::ChartClass::from_fields(fields)?))
    }

    let mut registry = DecoderRegistry::standard();
    assert!(registry.register("Dot", decode_dot).is_none());
    let mut chart = SseqChart::new("dots", 2).expect("chart");
    apply_message(
        &mut chart,
        &registry,
        message(json!({ "command": "create", "target_type": "Dot", "target": { "at": [4, 4] } })),
    )
    .expect("create");
    assert_eq!(chart.classes_in_degree(&[4, 4]).expect("degree").len(), 1);
}

#[rstest]
fn registry_routes_by_chart_id(chart: SseqChart) {
    let mut charts = ChartRegistry::new();
    charts.insert(chart);
    let registry = DecoderRegistry::standard();

    charts
        .apply_message(
            &registry,
            message(json!({
                "command": "create",
                "chart_id": "main",
                "target_type": "ChartClass",
                "target": { "degree": [1, 2] },
            })),
        )
        .expect("routed");
    assert_eq!(charts.get("main").expect("main").num_classes(), 1);

    let err = charts
        .apply_message(&registry, create_class("x", 0, 0))
        .unwrap_err();
    assert!(matches!(err, MessageError::MissingChartId));

    let err = charts
        .apply_message(
            &registry,
            message(json!({
                "command": "delete",
                "chart_id": "other",
                "target_type": "ChartClass",
                "target_uuid": "x",
            })),
        )
        .unwrap_err();
    assert!(matches!(err, MessageError::UnknownChart(ref id) if id == "other"));

    charts
        .apply_message(
            &registry,
            message(json!({
                "command": "create",
                "target_type": "SseqChart",
                "target": { "type": "SseqChart", "uuid": "unit", "name": "unit" },
            })),
        )
        .expect("new chart");
    assert_eq!(charts.len(), 2);
    assert_eq!(charts.get("unit").expect("unit").settings().name, "unit");
}
