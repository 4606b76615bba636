//! Unit tests for input merging and action validation

use cdek_widget_gateway::gateway::request::{
    merge_input, Action, GatewayRequest, ACTION_REQUIRED, UNKNOWN_ACTION,
};
use serde_json::json;

fn query(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_offices_from_query_only() {
    let input = merge_input(query(&[("action", "offices"), ("city_code", "44")]), b"").unwrap();
    let request = GatewayRequest::from_input(input).unwrap();

    assert_eq!(request.action(), Action::Offices);
    match request {
        GatewayRequest::Offices(offices) => {
            let pairs = offices.to_query_pairs();
            assert!(pairs.contains(&("city_code".to_string(), "44".to_string())));
        }
        other => panic!("unexpected request: {:?}", other),
    }
}

#[test]
fn test_calculate_from_query_action_and_json_body() {
    let body = json!({
        "from_location": {"code": 44},
        "to_location": {"code": 270},
        "packages": [{"weight": 300}]
    });
    let input = merge_input(query(&[("action", "calculate")]), body.to_string().as_bytes()).unwrap();

    let request = GatewayRequest::from_input(input).unwrap();
    match request {
        GatewayRequest::Calculate(calculation) => {
            assert_eq!(calculation.from_location.get("code"), Some(&json!(44)));
            assert_eq!(calculation.extra.get("action"), Some(&json!("calculate")));
            assert_eq!(calculation.packages.len(), 1);
        }
        other => panic!("unexpected request: {:?}", other),
    }
}

#[test]
fn test_missing_action() {
    let input = merge_input(query(&[("city_code", "44")]), b"{}").unwrap();
    let err = GatewayRequest::from_input(input).unwrap_err();
    assert_eq!(err.to_string(), ACTION_REQUIRED);
}

#[test]
fn test_unknown_action() {
    let input = merge_input(Vec::new(), br#"{"action": "orders"}"#).unwrap();
    let err = GatewayRequest::from_input(input).unwrap_err();
    assert_eq!(err.to_string(), UNKNOWN_ACTION);
}

#[test]
fn test_action_is_case_sensitive() {
    assert!("offices".parse::<Action>().is_ok());
    assert!("Offices".parse::<Action>().is_err());
    assert_eq!(Action::Calculate.to_string(), "calculate");
}

#[test]
fn test_calculate_cannot_come_from_query_string() {
    let input = merge_input(
        query(&[
            ("action", "calculate"),
            ("from_location", "44"),
            ("to_location", "137"),
            ("packages", "1"),
        ]),
        b"",
    )
    .unwrap();

    assert!(GatewayRequest::from_input(input).is_err());
}
