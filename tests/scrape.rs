use axum::body::Body;
use axum::http::{Request, StatusCode};
use multipass_exporter::config::Configuration;
use multipass_exporter::data_source::command::{CommandOutput, CommandRunner, RunError};
use multipass_exporter::data_source::multipass::Multipass;
use multipass_exporter::domain::{Collector, Metric, MetricReading};
use multipass_exporter::metrics::exposition;
use multipass_exporter::metrics::instances::Instances;
use multipass_exporter::metrics::schema::MetricSchema;
use multipass_exporter::server::router;
use multipass_exporter::server::state::AppState;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const FIXTURE: &str = r#"{
    "errors": [],
    "info": {
        "instance1": {
            "name": "instance1",
            "state": "Running",
            "ipv4": ["192.168.64.2"],
            "release": "22.04 LTS",
            "memory": {"total": 1073741824, "used": 536870912}
        },
        "instance2": {
            "name": "instance2",
            "state": "Stopped",
            "ipv4": [],
            "release": "20.04 LTS",
            "memory": {"total": 1073741824, "used": 268435456}
        }
    }
}"#;

#[derive(Clone)]
enum Script {
    Stdout(&'static str),
    Exit(i32, &'static str),
    Timeout,
}

/// Plays the same canned outcome on every call.
#[derive(Clone)]
struct ScriptedRunner(Script);

impl CommandRunner for ScriptedRunner {
    fn run(
        &self,
        _program: &str,
        _args: &[&str],
        _timeout: Duration,
    ) -> impl Future<Output = Result<CommandOutput, RunError>> + Send {
        let script = self.0.clone();
        async move {
            match script {
                Script::Stdout(stdout) => Ok(CommandOutput {
                    success: true,
                    code: Some(0),
                    stdout: stdout.as_bytes().to_vec(),
                    stderr: Vec::new(),
                }),
                Script::Exit(code, stderr) => Ok(CommandOutput {
                    success: false,
                    code: Some(code),
                    stdout: Vec::new(),
                    stderr: stderr.as_bytes().to_vec(),
                }),
                Script::Timeout => Err(RunError::TimedOut),
            }
        }
    }
}

fn collector(schema: &Arc<MetricSchema>, script: Script) -> Box<dyn Collector> {
    let data_source = Multipass::new(ScriptedRunner(script), Duration::from_secs(5));
    Instances::new().register(schema.clone(), data_source)
}

fn value(readings: &[MetricReading], name: &str) -> Vec<f64> {
    readings
        .iter()
        .filter(|r| r.descriptor.name == name)
        .map(|r| r.value)
        .collect()
}

#[tokio::test]
async fn test_fixture_end_to_end() {
    let schema = Arc::new(MetricSchema::new());
    let readings = collector(&schema, Script::Stdout(FIXTURE)).collect().await;

    assert_eq!(vec![2.0], value(&readings, "multipass_instances_total"));
    assert_eq!(vec![1.0], value(&readings, "multipass_instances_running"));
    assert_eq!(vec![1.0], value(&readings, "multipass_instances_stopped"));
    assert_eq!(vec![0.0], value(&readings, "multipass_instances_deleted"));
    assert_eq!(vec![0.0], value(&readings, "multipass_instances_suspended"));
    assert_eq!(
        vec![536870912.0, 268435456.0],
        value(&readings, "multipass_instance_memory_bytes")
    );
    assert!(value(&readings, "multipass_instance_cpu_total").is_empty());
    assert!(value(&readings, "multipass_error").is_empty());

    let text = exposition::encode(&schema, &readings).unwrap();
    assert!(text.contains("multipass_instances_total 2"));
    assert!(text.contains(
        r#"multipass_instance_memory_bytes{name="instance1",release="22.04 LTS"} 536870912"#
    ));
    assert!(text.contains(
        r#"multipass_instance_memory_bytes{name="instance2",release="20.04 LTS"} 268435456"#
    ));
}

#[tokio::test]
async fn test_every_failure_kind_yields_only_the_error_indicator() {
    let schema = Arc::new(MetricSchema::new());

    for script in [
        Script::Timeout,
        Script::Exit(1, "multipass socket unavailable"),
        Script::Stdout("{ definitely not json"),
    ] {
        let readings = collector(&schema, script).collect().await;
        assert_eq!(1, readings.len());
        assert_eq!("multipass_error", readings[0].descriptor.name);
        assert_eq!(1.0, readings[0].value);
        assert!(readings[0].label_values.is_empty());
    }
}

#[tokio::test]
async fn test_failed_scrape_does_not_affect_the_next() {
    let schema = Arc::new(MetricSchema::new());

    let failing = collector(&schema, Script::Timeout);
    assert_eq!(1, failing.collect().await.len());

    let healthy = collector(&schema, Script::Stdout(FIXTURE));
    let readings = healthy.collect().await;
    assert_eq!(vec![2.0], value(&readings, "multipass_instances_total"));
    assert!(value(&readings, "multipass_error").is_empty());
}

fn app(script: Script) -> axum::Router {
    app_at("/custom-metrics", script)
}

fn app_at(metrics_path: &str, script: Script) -> axum::Router {
    let schema = Arc::new(MetricSchema::new());
    let configuration = Configuration {
        metrics_path: metrics_path.to_string(),
        ..Default::default()
    };
    configuration.validate().unwrap();

    router(AppState {
        configuration: Arc::new(configuration),
        collectors: Arc::new(vec![collector(&schema, script)]),
        schema,
    })
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (status, body) = get(app(Script::Stdout(FIXTURE)), "/custom-metrics").await;

    assert_eq!(StatusCode::OK, status);
    assert!(body.contains("# TYPE multipass_instances_running gauge"));
    assert!(body.contains("multipass_instances_running 1"));
    assert!(!body.contains("multipass_error"));
}

#[tokio::test]
async fn test_metrics_endpoint_reports_collection_error() {
    let (status, body) = get(app(Script::Exit(2, "boom")), "/custom-metrics").await;

    assert_eq!(StatusCode::OK, status);
    assert!(body.contains("multipass_error 1"));
    assert!(!body.contains("multipass_instances_total"));
}

#[tokio::test]
async fn test_health_check() {
    let (status, body) = get(app(Script::Timeout), "/health").await;

    assert_eq!(StatusCode::OK, status);
    assert_eq!("OK", body);
}

#[tokio::test]
async fn test_nested_metrics_path() {
    let (status, body) = get(
        app_at("/exporter/multipass/metrics", Script::Stdout(FIXTURE)),
        "/exporter/multipass/metrics",
    )
    .await;

    assert_eq!(StatusCode::OK, status);
    assert!(body.contains("multipass_instances_total 2"));
}

#[tokio::test]
async fn test_array_output_is_reported_as_collection_error() {
    let (status, body) = get(app(Script::Stdout("[]")), "/custom-metrics").await;

    assert_eq!(StatusCode::OK, status);
    assert!(body.contains("multipass_error 1"));
    assert!(!body.contains("multipass_instances_total"));
}
