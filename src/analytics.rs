//! Fire-and-forget analytics hooks.
//!
//! Sinks must never block the funnel or fail it; an absent sink is simply a
//! no-op, which is how deployments without analytics run.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::info;

pub const CALCULATOR_VIEW: &str = "calculator_view";
pub const CONTINUE_CLICK: &str = "continue_click";
pub const CONFIRM_VIEW: &str = "confirm_view";
pub const SUBMIT_CLICK: &str = "submit_click";
pub const SUCCESS_VIEW: &str = "success_view";

/// Optional event parameters.
pub type Params = BTreeMap<String, Value>;

pub trait AnalyticsSink {
    fn emit(&self, event: &str, params: &Params);
}

/// Records events as structured log lines under the `analytics` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAnalytics;

impl AnalyticsSink for TracingAnalytics {
    fn emit(&self, event: &str, params: &Params) {
        if params.is_empty() {
            info!(target: "analytics", event, "analytics event");
        } else {
            let params = Value::Object(params.clone().into_iter().collect());
            info!(target: "analytics", event, %params, "analytics event");
        }
    }
}

/// Holds an optional sink so callers never have to check for one.
#[derive(Default)]
pub struct Analytics {
    sink: Option<Box<dyn AnalyticsSink>>,
}

impl Analytics {
    pub fn new(sink: Box<dyn AnalyticsSink>) -> Self {
        Self { sink: Some(sink) }
    }

    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn event(&self, event: &str) {
        self.event_with(event, &Params::new());
    }

    pub fn event_with(&self, event: &str, params: &Params) {
        if let Some(sink) = &self.sink {
            sink.emit(event, params);
        }
    }
}

impl std::fmt::Debug for Analytics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analytics")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Default, Clone)]
    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl AnalyticsSink for Recorder {
        fn emit(&self, event: &str, _params: &Params) {
            self.0.borrow_mut().push(event.to_string());
        }
    }

    #[test]
    fn enabled_analytics_forwards_to_sink() {
        let recorder = Recorder::default();
        let analytics = Analytics::new(Box::new(recorder.clone()));

        analytics.event(CONTINUE_CLICK);

        assert_eq!(*recorder.0.borrow(), vec![CONTINUE_CLICK.to_string()]);
    }

    #[test]
    fn disabled_analytics_is_silent() {
        let analytics = Analytics::disabled();

        analytics.event(SUCCESS_VIEW);

        assert!(!analytics.is_enabled());
    }

    #[test]
    fn tracing_sink_accepts_params() {
        let mut params = Params::new();
        params.insert("sum".to_string(), Value::from(40_000));

        TracingAnalytics.emit(SUBMIT_CLICK, &params);
    }
}
