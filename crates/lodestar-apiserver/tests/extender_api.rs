//! Integration tests for the extender HTTP endpoints

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use futures_util::future::join_all;
use lodestar_apiserver::{ApiServer, AppState, Config};
use lodestar_core::{node_name, ExtenderFilterResult, HostPriority, HostPriorityList, Node, Pod};
use lodestar_scheduler::{
    Extender, FilterPredicate, Policy, PredicateRegistry, PredicateResult, PriorityRegistry,
    SchedulerError, ScoreFunction,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

/// Rejects the listed nodes with fixed reasons
struct RejectWith {
    nodes: Vec<&'static str>,
    reasons: Vec<&'static str>,
}

impl FilterPredicate for RejectWith {
    fn filter(&self, _pod: &Pod, node: &Node) -> lodestar_scheduler::Result<PredicateResult> {
        let name = node_name(node).unwrap_or_default();
        if self.nodes.iter().any(|n| *n == name) {
            Ok(PredicateResult::unfit(
                self.reasons.iter().map(|r| r.to_string()).collect(),
            ))
        } else {
            Ok(PredicateResult::fit())
        }
    }

    fn name(&self) -> &str {
        "RejectWith"
    }
}

/// Fails outright on one node
struct Broken(&'static str);

impl FilterPredicate for Broken {
    fn filter(&self, _pod: &Pod, node: &Node) -> lodestar_scheduler::Result<PredicateResult> {
        if node_name(node) == Some(self.0) {
            Err(SchedulerError::internal_error("label index unavailable"))
        } else {
            Ok(PredicateResult::fit())
        }
    }

    fn name(&self) -> &str {
        "Broken"
    }
}

/// Accepts nodes whose trailing digit is even
struct EvenSuffix;

impl FilterPredicate for EvenSuffix {
    fn filter(&self, _pod: &Pod, node: &Node) -> lodestar_scheduler::Result<PredicateResult> {
        if digit(node) % 2 == 0 {
            Ok(PredicateResult::fit())
        } else {
            Ok(PredicateResult::unfit(vec!["odd node".to_string()]))
        }
    }

    fn name(&self) -> &str {
        "EvenSuffix"
    }
}

/// Scores every node with a fixed value, or per node name
struct Fixed {
    name: &'static str,
    default: i64,
    per_node: HashMap<&'static str, i64>,
}

impl Fixed {
    fn all(name: &'static str, score: i64) -> Self {
        Self {
            name,
            default: score,
            per_node: HashMap::new(),
        }
    }
}

impl ScoreFunction for Fixed {
    fn score(&self, _pod: &Pod, node: &Node) -> lodestar_scheduler::Result<i64> {
        let name = node_name(node).unwrap_or_default();
        Ok(self.per_node.get(name).copied().unwrap_or(self.default))
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Scores a node with its trailing digit
struct DigitScore;

impl ScoreFunction for DigitScore {
    fn score(&self, _pod: &Pod, node: &Node) -> lodestar_scheduler::Result<i64> {
        Ok(digit(node))
    }

    fn name(&self) -> &str {
        "DigitScore"
    }
}

fn digit(node: &Node) -> i64 {
    node_name(node)
        .and_then(|n| n.chars().last())
        .and_then(|c| c.to_digit(10))
        .map(i64::from)
        .unwrap_or(0)
}

fn create_test_router(extender: Extender, url_prefix: &str) -> Router {
    let state = Arc::new(AppState::new(extender));
    let config = Config {
        url_prefix: url_prefix.to_string(),
        ..Config::default()
    };
    ApiServer::new(config, state).build_router()
}

fn extender_with(predicates: PredicateRegistry, priorities: PriorityRegistry) -> Extender {
    Extender::new(predicates, priorities)
}

fn args(nodes: &[&str]) -> Value {
    let items: Vec<Value> = nodes
        .iter()
        .map(|n| json!({"metadata": {"name": n}}))
        .collect();
    json!({
        "Pod": {"metadata": {"name": "nginx", "namespace": "default"}},
        "Nodes": {"items": items}
    })
}

async fn send(router: &Router, method: Method, uri: &str, body: impl Into<Body>) -> (StatusCode, Vec<u8>) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn post_filter(router: &Router, body: &Value) -> ExtenderFilterResult {
    let (status, bytes) = send(router, Method::POST, "/filter", body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&bytes).unwrap()
}

async fn post_prioritize(router: &Router, body: &Value) -> HostPriorityList {
    let (status, bytes) = send(router, Method::POST, "/prioritize", body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&bytes).unwrap()
}

fn filtered_names(result: &ExtenderFilterResult) -> Vec<String> {
    result
        .nodes
        .as_ref()
        .map(|list| {
            list.items
                .iter()
                .filter_map(node_name)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn test_index_and_health() {
    let router = create_test_router(Extender::default(), "");

    let (status, body) = send(&router, Method::GET, "/", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"Welcome!\n");

    for path in ["/healthz", "/livez", "/readyz"] {
        let (status, body) = send(&router, Method::GET, path, Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok");
    }

    let (status, _) = send(&router, Method::GET, "/bind", Body::empty()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_filter_decode_error_shape() {
    let router = create_test_router(Extender::default(), "");

    for body in ["{\"Pod\": ", "", "not json", "{\"Nodes\": {\"items\": []}}"] {
        let (status, bytes) = send(&router, Method::POST, "/filter", body).await;
        assert_eq!(status, StatusCode::OK);

        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(!value["Error"].as_str().unwrap().is_empty(), "body {:?}", body);
        assert!(value["Nodes"].is_null());
        assert!(value["NodeNames"].is_null());
        assert_eq!(value["FailedNodes"], json!({}));
    }
}

#[tokio::test]
async fn test_oversized_body_uses_error_shapes() {
    let state = Arc::new(AppState::new(Extender::default()).with_max_body_bytes(16));
    let router = ApiServer::new(Config::default(), state).build_router();
    let body = args(&["node-1", "node-2"]).to_string();
    assert!(body.len() > 16);

    let (status, bytes) = send(&router, Method::POST, "/filter", body.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(value["Error"]
        .as_str()
        .unwrap()
        .contains("cannot read request body"));
    assert!(value["Nodes"].is_null());
    assert_eq!(value["FailedNodes"], json!({}));

    let (status, bytes) = send(&router, Method::POST, "/prioritize", body).await;
    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value, json!([]));
}

#[tokio::test]
async fn test_prioritize_decode_error_shape() {
    let router = create_test_router(Extender::default(), "");

    for body in ["", "not json", "{\"Nodes\": {\"items\": []}}"] {
        let (status, bytes) = send(&router, Method::POST, "/prioritize", body).await;
        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, json!([]));
    }
}

#[tokio::test]
async fn test_filter_accumulates_reasons() {
    let predicates = PredicateRegistry::builder()
        .register(RejectWith {
            nodes: vec!["b"],
            reasons: vec!["r1", "r2"],
        })
        .unwrap()
        .build();
    let router = create_test_router(extender_with(predicates, PriorityRegistry::default()), "");

    let result = post_filter(&router, &args(&["a", "b", "c"])).await;

    assert!(result.error.is_empty());
    assert_eq!(filtered_names(&result), vec!["a", "c"]);
    assert_eq!(result.failed_nodes.len(), 1);
    assert_eq!(result.failed_nodes["b"], "r1,r2");
    assert!(result.failed_and_unresolvable_nodes.is_empty());
}

#[tokio::test]
async fn test_filter_partitions_every_node() {
    let predicates = PredicateRegistry::builder()
        .register(EvenSuffix)
        .unwrap()
        .build();
    let router = create_test_router(extender_with(predicates, PriorityRegistry::default()), "");

    let nodes = ["n0", "n1", "n2", "n3", "n4", "n5", "n6"];
    let result = post_filter(&router, &args(&nodes)).await;

    let passed = filtered_names(&result);
    assert_eq!(passed, vec!["n0", "n2", "n4", "n6"]);
    assert_eq!(passed.len() + result.failed_nodes.len(), nodes.len());
    assert!(passed.iter().all(|n| !result.failed_nodes.contains_key(n)));
}

#[tokio::test]
async fn test_filter_predicate_error_is_reported_not_partial() {
    let predicates = PredicateRegistry::builder()
        .register(Broken("b"))
        .unwrap()
        .build();
    let router = create_test_router(extender_with(predicates, PriorityRegistry::default()), "");

    let result = post_filter(&router, &args(&["a", "b", "c"])).await;

    assert!(result.error.contains("label index unavailable"));
    assert!(result.nodes.is_none());
    assert!(result.failed_nodes.is_empty());
}

#[tokio::test]
async fn test_filter_node_names_mode() {
    let predicates = PredicateRegistry::builder()
        .register(EvenSuffix)
        .unwrap()
        .build();
    let router = create_test_router(extender_with(predicates, PriorityRegistry::default()), "");

    let body = json!({
        "Pod": {"metadata": {"name": "nginx"}},
        "NodeNames": ["n1", "n2", "n4"]
    });
    let result = post_filter(&router, &body).await;

    assert!(result.nodes.is_none());
    assert_eq!(
        result.node_names,
        Some(vec!["n2".to_string(), "n4".to_string()])
    );
    assert_eq!(result.failed_nodes["n1"], "odd node");
}

#[tokio::test]
async fn test_default_policy_node_names_mode() {
    let extender = Extender::from_policy(&Policy::default()).unwrap();
    let router = create_test_router(extender, "");

    let body = json!({
        "Pod": {
            "metadata": {"name": "nginx", "namespace": "default"},
            "spec": {"containers": [{
                "name": "nginx",
                "resources": {"requests": {"cpu": "100m", "memory": "64Mi"}}
            }]}
        },
        "NodeNames": ["big-node-1", "big-node-2"]
    });

    let result = post_filter(&router, &body).await;
    assert_eq!(
        result.node_names,
        Some(vec!["big-node-1".to_string(), "big-node-2".to_string()])
    );
    assert!(result.failed_nodes.is_empty());
    assert!(result.error.is_empty());

    // Both default scorers fall back to the neutral 5
    let list = post_prioritize(&router, &body).await;
    assert_eq!(
        list,
        vec![
            HostPriority::new("big-node-1", 10),
            HostPriority::new("big-node-2", 10)
        ]
    );
}

#[tokio::test]
async fn test_prioritize_single_function_identity() {
    let priorities = PriorityRegistry::builder()
        .register(Fixed::all("Seven", 7), 1)
        .unwrap()
        .build();
    let router = create_test_router(extender_with(PredicateRegistry::default(), priorities), "");

    let list = post_prioritize(&router, &args(&["a", "b"])).await;

    assert_eq!(
        list,
        vec![HostPriority::new("a", 7), HostPriority::new("b", 7)]
    );
}

#[tokio::test]
async fn test_prioritize_clamps_out_of_range() {
    let priorities = PriorityRegistry::builder()
        .register(
            Fixed {
                name: "Wild",
                default: 5,
                per_node: HashMap::from([("low", -1), ("high", 11)]),
            },
            1,
        )
        .unwrap()
        .build();
    let router = create_test_router(extender_with(PredicateRegistry::default(), priorities), "");

    let list = post_prioritize(&router, &args(&["low", "high", "mid"])).await;

    assert_eq!(
        list,
        vec![
            HostPriority::new("low", 0),
            HostPriority::new("high", 10),
            HostPriority::new("mid", 5),
        ]
    );
}

#[tokio::test]
async fn test_prioritize_one_entry_per_node_in_order() {
    let router = create_test_router(Extender::from_policy(&Policy::default()).unwrap(), "");

    let nodes = ["z", "a", "m", "b"];
    let list = post_prioritize(&router, &args(&nodes)).await;

    let hosts: Vec<&str> = list.iter().map(|p| p.host.as_str()).collect();
    assert_eq!(hosts, nodes);
    assert!(list.iter().all(|p| (0..=10).contains(&p.score)));
}

#[tokio::test]
async fn test_get_and_post_are_equivalent() {
    let predicates = PredicateRegistry::builder()
        .register(EvenSuffix)
        .unwrap()
        .build();
    let priorities = PriorityRegistry::builder()
        .register(DigitScore, 1)
        .unwrap()
        .build();
    let router = create_test_router(extender_with(predicates, priorities), "");
    let body = args(&["n1", "n2"]).to_string();

    for path in ["/filter", "/prioritize"] {
        let (get_status, get_body) = send(&router, Method::GET, path, body.clone()).await;
        let (post_status, post_body) = send(&router, Method::POST, path, body.clone()).await;
        assert_eq!(get_status, StatusCode::OK);
        assert_eq!(post_status, StatusCode::OK);
        assert_eq!(get_body, post_body);
    }
}

#[tokio::test]
async fn test_url_prefix() {
    let router = create_test_router(Extender::default(), "/scheduler/");
    let body = args(&["a"]).to_string();

    let (status, bytes) = send(&router, Method::POST, "/scheduler/filter", body.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let result: ExtenderFilterResult = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(filtered_names(&result), vec!["a"]);

    let (status, _) = send(&router, Method::POST, "/scheduler/prioritize", body.clone()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&router, Method::POST, "/filter", body).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Health endpoints stay at the root
    let (status, _) = send(&router, Method::GET, "/healthz", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_concurrent_requests_match_sequential() {
    let predicates = PredicateRegistry::builder()
        .register(EvenSuffix)
        .unwrap()
        .build();
    let priorities = PriorityRegistry::builder()
        .register(DigitScore, 2)
        .unwrap()
        .register(Fixed::all("Three", 3), 1)
        .unwrap()
        .build();
    let router = create_test_router(extender_with(predicates, priorities), "");

    let node_sets: Vec<Vec<String>> = (0..32)
        .map(|i| (0..(i % 7 + 1)).map(|j| format!("node-{}-{}", i, (i + j) % 10)).collect())
        .collect();
    let bodies: Vec<Value> = node_sets
        .iter()
        .map(|set| {
            let names: Vec<&str> = set.iter().map(String::as_str).collect();
            args(&names)
        })
        .collect();

    let mut sequential = Vec::new();
    for body in &bodies {
        sequential.push((
            post_filter(&router, body).await,
            post_prioritize(&router, body).await,
        ));
    }

    let concurrent = join_all(bodies.iter().map(|body| {
        let router = router.clone();
        async move {
            (
                post_filter(&router, body).await,
                post_prioritize(&router, body).await,
            )
        }
    }))
    .await;

    assert_eq!(concurrent, sequential);
}
