//! The `serve` subcommand: HTTP binding over the dispatcher.
//!
//! The binding is deliberately thin: one route accepting GET query
//! parameters and POST XML bodies, both mapped straight onto the
//! transport-agnostic dispatcher.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use geoproc::protocol::RawRequest;
use geoproc::service::ProcessingService;
use std::collections::HashMap;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

pub async fn run(config_path: &Path) -> Result<(), Box<dyn Error>> {
    let config = geoproc::config::load_config(config_path)?;
    let _logging = geoproc::logging::init_logging(&config.logging.directory, &config.logging.file)?;

    info!("Starting GeoProc v{}", geoproc::VERSION);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let service = ProcessingService::builder(config)
        // Demonstration process; real deployments register their own
        // catalog here.
        .register(
            demo::reverse_descriptor(),
            Arc::new(demo::ReverseAlgorithm),
        )
        .build()?;
    let service = Arc::new(service);

    let app = Router::new()
        .route("/", get(handle_get).post(handle_post))
        .with_state(Arc::clone(&service));

    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    service.shutdown();
    Ok(())
}

async fn handle_get(
    State(service): State<Arc<ProcessingService>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    into_response(service.dispatch(RawRequest::Query(params)).await)
}

async fn handle_post(State(service): State<Arc<ProcessingService>>, body: Bytes) -> Response {
    into_response(service.dispatch(RawRequest::Xml(body.to_vec())).await)
}

fn into_response(outcome: geoproc::protocol::DispatchOutcome) -> Response {
    let status =
        StatusCode::from_u16(outcome.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, outcome.content_type)],
        outcome.body,
    )
        .into_response()
}

mod demo {
    //! A minimal built-in process so a fresh install has something to
    //! execute.

    use geoproc::process::{
        Algorithm, AlgorithmError, ExecutionContext, InputDescriptor, OutputDescriptor,
        ProcessData, ProcessDescriptor, ProcessOutputs,
    };
    use std::future::Future;
    use std::pin::Pin;

    pub fn reverse_descriptor() -> ProcessDescriptor {
        ProcessDescriptor::new("demo.reverse", "Reverse a string")
            .with_abstract("Returns its input text reversed; useful for smoke tests.")
            .with_input(InputDescriptor::literal("text", Some("xs:string")))
            .with_output(OutputDescriptor::literal("result", Some("xs:string")))
    }

    pub struct ReverseAlgorithm;

    impl Algorithm for ReverseAlgorithm {
        fn run<'a>(
            &'a self,
            ctx: &'a ExecutionContext,
        ) -> Pin<Box<dyn Future<Output = Result<ProcessOutputs, AlgorithmError>> + Send + 'a>>
        {
            Box::pin(async move {
                let text = ctx.literal("text").ok_or_else(|| AlgorithmError::InvalidInput {
                    input: "text".to_string(),
                    reason: "expected a single literal".to_string(),
                })?;
                let mut outputs = ProcessOutputs::new();
                outputs.insert(
                    "result".to_string(),
                    ProcessData::literal(text.chars().rev().collect::<String>()),
                );
                Ok(outputs)
            })
        }
    }
}
