//! Metrics definitions for the gateway.

use shared::metrics_defs::{MetricDef, MetricType};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "request.duration",
    metric_type: MetricType::Histogram,
    description: "API request duration in seconds. Tagged with endpoint, status.",
};

pub const UPSTREAM_ERRORS: MetricDef = MetricDef {
    name: "upstream.errors",
    metric_type: MetricType::Counter,
    description: "Failed Azure DevOps calls that failed the request. Tagged with endpoint.",
};

pub const DETAIL_FAILURES: MetricDef = MetricDef {
    name: "work_item.detail.failures",
    metric_type: MetricType::Counter,
    description: "Work items reported as an error record in a details response",
};

pub const ALL_METRICS: &[MetricDef] = &[REQUEST_DURATION, UPSTREAM_ERRORS, DETAIL_FAILURES];
