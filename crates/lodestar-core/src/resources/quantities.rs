use crate::{LodestarError, Result};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;

const BINARY_SUFFIXES: [(&str, f64); 6] = [
    ("Ki", 1024.0),
    ("Mi", 1_048_576.0),
    ("Gi", 1_073_741_824.0),
    ("Ti", 1_099_511_627_776.0),
    ("Pi", 1_125_899_906_842_624.0),
    ("Ei", 1_152_921_504_606_846_976.0),
];

const DECIMAL_SUFFIXES: [(&str, f64); 7] = [
    ("m", 0.001),
    ("k", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
    ("P", 1e15),
    ("E", 1e18),
];

/// CPU and memory totals for a node or a pod
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceQuantities {
    /// CPU in millicores (1000 = 1 core)
    pub cpu_millicores: i64,
    /// Memory in bytes
    pub memory_bytes: i64,
}

impl ResourceQuantities {
    /// Parse a CPU quantity (e.g., "2", "1000m", "0.5") into millicores
    pub fn parse_cpu(s: &str) -> Result<i64> {
        let s = s.trim();
        if let Some(m) = s.strip_suffix('m') {
            return m
                .parse::<i64>()
                .map_err(|e| LodestarError::invalid_quantity(s, e.to_string()));
        }
        let cores = parse_scaled(s)?;
        to_i64(s, (cores * 1000.0).ceil())
    }

    /// Parse a memory quantity (e.g., "128Mi", "1Gi", "1G", "1024") into bytes
    pub fn parse_memory(s: &str) -> Result<i64> {
        let s = s.trim();
        let bytes = parse_scaled(s)?;
        to_i64(s, bytes.ceil())
    }

    /// Read CPU and memory from a node's allocatable/capacity map.
    ///
    /// Missing entries count as zero, malformed ones are errors.
    pub fn from_k8s_resource_map(resources: &BTreeMap<String, Quantity>) -> Result<Self> {
        let cpu_millicores = match resources.get("cpu") {
            Some(q) => Self::parse_cpu(&q.0)?,
            None => 0,
        };
        let memory_bytes = match resources.get("memory") {
            Some(q) => Self::parse_memory(&q.0)?,
            None => 0,
        };

        Ok(Self {
            cpu_millicores,
            memory_bytes,
        })
    }

    /// Sum of the requests of every container in the pod
    pub fn pod_requests(pod: &k8s_openapi::api::core::v1::Pod) -> Result<Self> {
        let mut total = Self::default();
        let Some(spec) = &pod.spec else {
            return Ok(total);
        };

        for container in &spec.containers {
            let Some(requests) = container.resources.as_ref().and_then(|r| r.requests.as_ref())
            else {
                continue;
            };
            let requested = Self::from_k8s_resource_map(requests)?;
            total.cpu_millicores = total.cpu_millicores.saturating_add(requested.cpu_millicores);
            total.memory_bytes = total.memory_bytes.saturating_add(requested.memory_bytes);
        }

        Ok(total)
    }

    /// Allocatable resources reported in the node status.
    ///
    /// `None` when the node carries no allocatable map at all, as with the
    /// name-only nodes of a `NodeNames` request. That means "unknown", not
    /// "empty".
    pub fn node_allocatable(node: &k8s_openapi::api::core::v1::Node) -> Result<Option<Self>> {
        node.status
            .as_ref()
            .and_then(|s| s.allocatable.as_ref())
            .map(Self::from_k8s_resource_map)
            .transpose()
    }
}

fn parse_scaled(s: &str) -> Result<f64> {
    if s.is_empty() {
        return Err(LodestarError::invalid_quantity(s, "empty quantity"));
    }

    let (number, multiplier) = BINARY_SUFFIXES
        .iter()
        .chain(DECIMAL_SUFFIXES.iter())
        .find_map(|(suffix, mult)| s.strip_suffix(suffix).map(|n| (n, *mult)))
        .unwrap_or((s, 1.0));

    let value = number
        .parse::<f64>()
        .map_err(|e| LodestarError::invalid_quantity(s, e.to_string()))?;

    if !value.is_finite() || value < 0.0 {
        return Err(LodestarError::invalid_quantity(
            s,
            "quantity must be a finite, non-negative number",
        ));
    }

    Ok(value * multiplier)
}

fn to_i64(original: &str, value: f64) -> Result<i64> {
    if value > i64::MAX as f64 {
        return Err(LodestarError::invalid_quantity(original, "quantity out of range"));
    }
    Ok(value as i64)
}
