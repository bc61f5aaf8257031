//! Request validation and dispatch.

use super::request::{parse_request, ExecuteContent, InputValue, OperationRequest, ParsedRequest, RawRequest};
use super::response::{
    self, exception_report, ExecuteResponseParams, ExecutionStatusElement, LineageEcho,
};
use crate::encoder::OutputEncoder;
use crate::error::ServiceException;
use crate::format::{select, Format};
use crate::process::{
    BindingKind, ComplexData, ComplexPayload, ExecutionContext, ProcessData, ProcessDescriptor,
    ProcessOutputValue, ProcessRegistry,
};
use crate::resolver::ReferenceResolver;
use crate::scheduler::{
    ExecuteJob, ExecutionHandle, ExecutionId, ExecutionOutcome, ExecutionSubmitter, OutputRequest,
    ResponseBody, ResponseForm, WaitOutcome,
};
use crate::store::{ResultStore, StoreError};
use crate::{PROTOCOL_VERSION, SERVICE_TYPE};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Languages the server accepts in the `language` parameter.
const SUPPORTED_LANGUAGES: &[&str] = &["en-US", "en"];

/// Dispatcher-level settings, read once at construction.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Title advertised in the capabilities document.
    pub service_title: String,
    /// Bounded wait applied to synchronous Execute calls.
    pub sync_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            service_title: "GeoProc processing service".to_string(),
            sync_timeout: Duration::from_secs(20),
        }
    }
}

/// Response bytes plus transport metadata.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl DispatchOutcome {
    fn ok(body: ResponseBody) -> Self {
        Self {
            status: 200,
            content_type: body.content_type,
            body: body.bytes,
        }
    }

    fn ok_xml(bytes: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: "text/xml".to_string(),
            body: bytes,
        }
    }

    fn exception(error: &ServiceException) -> Self {
        Self {
            status: error.http_status(),
            content_type: "text/xml".to_string(),
            body: exception_report(error),
        }
    }
}

/// One output slot after early validation and format negotiation.
#[derive(Debug, Clone)]
struct PlannedOutput {
    identifier: String,
    title: Option<String>,
    as_reference: bool,
    /// Negotiated format for complex outputs; unspecified otherwise.
    format: Format,
}

/// Classifies, validates, and drives a request through the pipeline.
pub struct RequestDispatcher {
    registry: Arc<ProcessRegistry>,
    submitter: ExecutionSubmitter,
    resolver: Arc<ReferenceResolver>,
    encoder: Arc<OutputEncoder>,
    store: Arc<dyn ResultStore>,
    config: DispatcherConfig,
}

impl RequestDispatcher {
    pub fn new(
        registry: Arc<ProcessRegistry>,
        submitter: ExecutionSubmitter,
        resolver: Arc<ReferenceResolver>,
        encoder: Arc<OutputEncoder>,
        store: Arc<dyn ResultStore>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            registry,
            submitter,
            resolver,
            encoder,
            store,
            config,
        }
    }

    /// Drives one raw request to a response. Failures come back as
    /// exception-report outcomes, never as errors.
    pub async fn dispatch(&self, raw: RawRequest) -> DispatchOutcome {
        match self.handle(raw).await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(code = error.code(), error = %error, "Request failed");
                DispatchOutcome::exception(&error)
            }
        }
    }

    async fn handle(&self, raw: RawRequest) -> Result<DispatchOutcome, ServiceException> {
        let parsed = parse_request(&raw)?;
        self.validate(&parsed)?;
        debug!(operation = parsed.operation.name(), "Request validated");

        match parsed.operation {
            OperationRequest::GetCapabilities => Ok(DispatchOutcome::ok_xml(
                response::capabilities(&self.config.service_title, self.registry.descriptors()),
            )),
            OperationRequest::DescribeProcess { identifiers } => {
                self.describe_process(&identifiers)
            }
            OperationRequest::RetrieveResult { id } => self.retrieve_result(&id),
            OperationRequest::Execute(content) => self.execute(content).await,
        }
    }

    /// Validation order mandated by the protocol: service, then
    /// language, then version (version only for operations other than
    /// GetCapabilities, which instead negotiates `AcceptVersions`).
    fn validate(&self, parsed: &ParsedRequest) -> Result<(), ServiceException> {
        match &parsed.service {
            None => return Err(ServiceException::missing_parameter("service")),
            Some(service) if !service.eq_ignore_ascii_case(SERVICE_TYPE) => {
                return Err(ServiceException::invalid_parameter(
                    format!("unknown service type: {}", service),
                    "service",
                ))
            }
            Some(_) => {}
        }

        if let Some(language) = &parsed.language {
            let supported = SUPPORTED_LANGUAGES
                .iter()
                .any(|l| l.eq_ignore_ascii_case(language));
            if !supported {
                return Err(ServiceException::invalid_parameter(
                    format!("unsupported language: {}", language),
                    "language",
                ));
            }
        }

        if matches!(parsed.operation, OperationRequest::GetCapabilities) {
            if !parsed.accept_versions.is_empty()
                && !parsed.accept_versions.iter().any(|v| v == PROTOCOL_VERSION)
            {
                return Err(ServiceException::VersionNegotiationFailed {
                    message: format!(
                        "none of the accepted versions is supported; this server speaks {}",
                        PROTOCOL_VERSION
                    ),
                });
            }
        } else {
            match &parsed.version {
                None => return Err(ServiceException::missing_parameter("version")),
                Some(version) if version != PROTOCOL_VERSION => {
                    return Err(ServiceException::invalid_parameter(
                        format!("unsupported version: {}", version),
                        "version",
                    ))
                }
                Some(_) => {}
            }
        }

        Ok(())
    }

    fn describe_process(&self, identifiers: &[String]) -> Result<DispatchOutcome, ServiceException> {
        if identifiers.is_empty() {
            return Err(ServiceException::missing_parameter("identifier"));
        }

        let descriptors: Vec<&ProcessDescriptor> =
            if identifiers.iter().any(|i| i.eq_ignore_ascii_case("all")) {
                self.registry.descriptors().collect()
            } else {
                identifiers
                    .iter()
                    .map(|identifier| {
                        self.registry.descriptor(identifier).ok_or_else(|| {
                            ServiceException::invalid_parameter(
                                format!("no process registered under {}", identifier),
                                "identifier",
                            )
                        })
                    })
                    .collect::<Result<_, _>>()?
            };

        Ok(DispatchOutcome::ok_xml(response::process_descriptions(
            &descriptors,
        )))
    }

    fn retrieve_result(&self, id: &str) -> Result<DispatchOutcome, ServiceException> {
        match self.store.get(id) {
            Ok(artifact) => Ok(DispatchOutcome {
                status: 200,
                content_type: artifact.mime_type,
                body: artifact.bytes,
            }),
            Err(StoreError::NotFound(_)) | Err(StoreError::InvalidId(_)) => {
                Err(ServiceException::invalid_parameter(
                    format!("no stored result under id {}", id),
                    "id",
                ))
            }
            Err(other) => Err(ServiceException::wrap("result store failure", other)),
        }
    }

    async fn execute(&self, content: ExecuteContent) -> Result<DispatchOutcome, ServiceException> {
        let descriptor = self
            .registry
            .descriptor(&content.process_id)
            .cloned()
            .ok_or_else(|| {
                ServiceException::invalid_parameter(
                    format!("no process registered under {}", content.process_id),
                    "identifier",
                )
            })?;
        let algorithm = self
            .registry
            .algorithm(&content.process_id)
            .ok_or_else(|| {
                ServiceException::no_applicable_code(format!(
                    "process {} has no algorithm bound",
                    content.process_id
                ))
            })?;

        // Dereference remote inputs, then validate arity and variants
        // against the descriptor; both happen before anything is
        // scheduled.
        let inputs = self.resolve_inputs(content.inputs).await?;
        descriptor.validate_inputs(&inputs)?;
        let job = ExecuteJob {
            process_id: content.process_id,
            inputs,
            response_form: content.response_form,
        };

        let (plan, raw_mode, lineage, store_response) =
            self.plan_outputs(&descriptor, &job.response_form)?;
        let requested_outputs = match &job.response_form {
            ResponseForm::Document { outputs, .. } => outputs.clone(),
            ResponseForm::RawData(output) => vec![output.clone()],
        };

        let execution_id = ExecutionId::fresh();
        let status_location = self.encoder.retrieval_url(execution_id.as_str());
        info!(
            execution_id = %execution_id,
            process = %descriptor.identifier,
            store_response = store_response,
            "Execute request admitted for scheduling"
        );

        let work = build_execution_work(
            Arc::clone(&algorithm),
            descriptor.clone(),
            job.inputs,
            plan,
            requested_outputs,
            Arc::clone(&self.encoder),
            execution_id.clone(),
            raw_mode,
            lineage,
            status_location.clone(),
        );

        if store_response {
            // Fire-and-store: the Accepted document is visible to
            // status polls before the job runs, and the caller gets it
            // immediately.
            let accepted = response::execute_response(ExecuteResponseParams {
                execution_id: &execution_id,
                process: &descriptor,
                status: ExecutionStatusElement::Accepted,
                outputs: &[],
                lineage: None,
                status_location: Some(&status_location),
            });
            self.store
                .store(execution_id.as_str(), &accepted, "text/xml")
                .map_err(|e| ServiceException::wrap("failed to persist status document", e))?;

            if let Err(error) = self.submitter.submit(execution_id.clone(), work) {
                // Admission failed; do not leave a dangling Accepted
                // document behind.
                let _ = self.store.delete(execution_id.as_str());
                return Err(error);
            }

            return Ok(DispatchOutcome::ok_xml(accepted));
        }

        let mut handle: ExecutionHandle = self.submitter.submit(execution_id.clone(), work)?;
        match handle.wait(self.config.sync_timeout).await {
            WaitOutcome::Completed(ExecutionOutcome::Succeeded(body)) => {
                Ok(DispatchOutcome::ok(body))
            }
            WaitOutcome::Completed(ExecutionOutcome::Failed(error)) => {
                Ok(DispatchOutcome::exception(&error))
            }
            WaitOutcome::TimedOut => {
                debug!(execution_id = %execution_id, "Synchronous wait elapsed, answering Accepted");
                Ok(DispatchOutcome::ok_xml(response::execute_response(
                    ExecuteResponseParams {
                        execution_id: &execution_id,
                        process: &descriptor,
                        status: ExecutionStatusElement::Accepted,
                        outputs: &[],
                        lineage: None,
                        status_location: Some(&status_location),
                    },
                )))
            }
        }
    }

    /// Dereferences remote inputs through the resolver chain.
    async fn resolve_inputs(
        &self,
        inputs: HashMap<String, Vec<InputValue>>,
    ) -> Result<HashMap<String, Vec<ProcessData>>, ServiceException> {
        let mut resolved = HashMap::new();
        for (identifier, values) in inputs {
            let mut out = Vec::with_capacity(values.len());
            for value in values {
                match value {
                    InputValue::Data(data) => out.push(data),
                    InputValue::Reference(reference) => {
                        let stream = self.resolver.resolve(&reference.reference).await?;
                        let format = if reference.format.is_unspecified() {
                            Format::new(stream.mime_type.clone(), stream.encoding.clone(), None::<String>)
                        } else {
                            reference.format.clone()
                        };
                        let payload = if format.is_textual() {
                            ComplexPayload::Text(
                                String::from_utf8_lossy(&stream.bytes).into_owned(),
                            )
                        } else {
                            ComplexPayload::Bytes(stream.bytes)
                        };
                        out.push(ProcessData::Complex(ComplexData { payload, format }));
                    }
                }
            }
            resolved.insert(identifier, out);
        }
        Ok(resolved)
    }

    /// Resolves the requested outputs against the descriptor, negotiating
    /// complex formats up front so unsupported requests fail before
    /// scheduling.
    fn plan_outputs(
        &self,
        descriptor: &ProcessDescriptor,
        response_form: &ResponseForm,
    ) -> Result<(Vec<PlannedOutput>, bool, bool, bool), ServiceException> {
        match response_form {
            ResponseForm::RawData(output) => {
                let planned = self.plan_one_output(descriptor, output)?;
                Ok((vec![planned], true, false, false))
            }
            ResponseForm::Document {
                outputs,
                lineage,
                store_response,
                ..
            } => {
                let plan = if outputs.is_empty() {
                    // No explicit selection: every declared output,
                    // inline, in its default format.
                    descriptor
                        .outputs
                        .iter()
                        .map(|output| PlannedOutput {
                            identifier: output.identifier.clone(),
                            title: output.title.clone(),
                            as_reference: false,
                            format: match &output.kind {
                                BindingKind::Complex { default_format, .. } => {
                                    default_format.clone()
                                }
                                _ => Format::unspecified(),
                            },
                        })
                        .collect()
                } else {
                    outputs
                        .iter()
                        .map(|output| self.plan_one_output(descriptor, output))
                        .collect::<Result<Vec<_>, _>>()?
                };
                Ok((plan, false, *lineage, *store_response))
            }
        }
    }

    fn plan_one_output(
        &self,
        descriptor: &ProcessDescriptor,
        request: &OutputRequest,
    ) -> Result<PlannedOutput, ServiceException> {
        let output = descriptor.output(&request.identifier).ok_or_else(|| {
            ServiceException::invalid_parameter(
                format!(
                    "process {} has no output {}",
                    descriptor.identifier, request.identifier
                ),
                request.identifier.as_str(),
            )
        })?;

        let format = match &output.kind {
            BindingKind::Complex {
                default_format,
                supported_formats,
            } => select(&request.format, default_format, supported_formats).ok_or_else(|| {
                ServiceException::invalid_parameter(
                    format!(
                        "output {} does not support format {}",
                        request.identifier, request.format
                    ),
                    request.identifier.as_str(),
                )
            })?,
            _ => Format::unspecified(),
        };

        Ok(PlannedOutput {
            identifier: output.identifier.clone(),
            title: output.title.clone(),
            as_reference: request.as_reference,
            format,
        })
    }
}

/// Builds the deferred work of one execution: run the algorithm, encode
/// the planned outputs, render the response body.
#[allow(clippy::too_many_arguments)]
fn build_execution_work(
    algorithm: Arc<dyn crate::process::Algorithm>,
    descriptor: ProcessDescriptor,
    inputs: HashMap<String, Vec<ProcessData>>,
    plan: Vec<PlannedOutput>,
    requested_outputs: Vec<OutputRequest>,
    encoder: Arc<OutputEncoder>,
    execution_id: ExecutionId,
    raw_mode: bool,
    lineage: bool,
    status_location: String,
) -> crate::scheduler::ExecutionWork {
    Box::new(move |cancellation| {
        Box::pin(async move {
            let ctx = ExecutionContext::new(inputs, cancellation);
            let mut outputs = algorithm.run(&ctx).await.map_err(|e| {
                ServiceException::RemoteComputationError {
                    message: e.to_string(),
                    source: Some(Box::new(e)),
                }
            })?;

            let mut values = Vec::with_capacity(plan.len());
            for planned in &plan {
                let mut data = outputs.remove(&planned.identifier).ok_or_else(|| {
                    ServiceException::no_applicable_code(format!(
                        "algorithm produced no output {}",
                        planned.identifier
                    ))
                })?;
                // The negotiated format wins over whatever the algorithm
                // attached to its complex payloads.
                if let ProcessData::Complex(complex) = &mut data {
                    if !planned.format.is_unspecified() {
                        complex.format = planned.format.clone();
                    }
                }
                values.push((
                    planned.as_reference,
                    ProcessOutputValue {
                        identifier: planned.identifier.clone(),
                        title: planned.title.clone(),
                        abstract_: None,
                        data,
                    },
                ));
            }

            if raw_mode {
                let (_, value) = values.into_iter().next().ok_or_else(|| {
                    ServiceException::no_applicable_code("raw response without an output")
                })?;
                let (bytes, mime_type) = encoder.encode_raw(&value)?;
                return Ok(ResponseBody::new(bytes, mime_type));
            }

            let mut elements = Vec::with_capacity(values.len());
            for (as_reference, value) in &values {
                elements.push(encoder.encode(value, *as_reference)?);
            }

            let lineage_echo = lineage.then(|| LineageEcho {
                inputs: ctx.inputs(),
                outputs: requested_outputs.as_slice(),
            });

            let xml = response::execute_response(ExecuteResponseParams {
                execution_id: &execution_id,
                process: &descriptor,
                status: ExecutionStatusElement::Succeeded,
                outputs: &elements,
                lineage: lineage_echo,
                status_location: Some(&status_location),
            });
            Ok(ResponseBody::xml(xml))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::GeneratorRegistry;
    use crate::process::testing::{echo_descriptor, EchoAlgorithm};
    use crate::scheduler::{ExecutionScheduler, SchedulerConfig};
    use crate::store::MemoryStore;
    use tokio_util::sync::CancellationToken;

    struct TestService {
        dispatcher: RequestDispatcher,
        store: Arc<MemoryStore>,
        shutdown: CancellationToken,
    }

    impl Drop for TestService {
        fn drop(&mut self) {
            self.shutdown.cancel();
        }
    }

    fn start_service(sync_timeout: Duration) -> TestService {
        let mut registry = ProcessRegistry::new();
        registry.register(echo_descriptor(), Arc::new(EchoAlgorithm));
        let registry = Arc::new(registry);

        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let store_dyn: Arc<dyn ResultStore> = store.clone();

        let (scheduler, submitter) = ExecutionScheduler::new(
            SchedulerConfig::default(),
            store_dyn.clone(),
            Arc::new(response::XmlStatusRenderer),
        );
        let shutdown = CancellationToken::new();
        tokio::spawn(scheduler.run(shutdown.clone()));

        let encoder = Arc::new(OutputEncoder::new(
            GeneratorRegistry::with_builtins(),
            store_dyn.clone(),
            "localhost",
            8080,
        ));

        let dispatcher = RequestDispatcher::new(
            registry,
            submitter,
            Arc::new(ReferenceResolver::new()),
            encoder,
            store_dyn,
            DispatcherConfig {
                service_title: "Test Server".to_string(),
                sync_timeout,
            },
        );

        TestService {
            dispatcher,
            store,
            shutdown,
        }
    }

    fn body_string(outcome: &DispatchOutcome) -> String {
        String::from_utf8_lossy(&outcome.body).into_owned()
    }

    #[tokio::test]
    async fn capabilities_round_trip() {
        let service = start_service(Duration::from_millis(500));
        let outcome = service
            .dispatcher
            .dispatch(RawRequest::query(&[
                ("service", "WPS"),
                ("request", "GetCapabilities"),
            ]))
            .await;

        assert_eq!(outcome.status, 200);
        let body = body_string(&outcome);
        assert!(body.contains("wps:Capabilities"));
        assert!(body.contains("test.echo"));
    }

    #[tokio::test]
    async fn wrong_service_type_is_invalid_parameter() {
        let service = start_service(Duration::from_millis(500));
        let outcome = service
            .dispatcher
            .dispatch(RawRequest::query(&[
                ("service", "FOO"),
                ("request", "GetCapabilities"),
            ]))
            .await;

        assert_eq!(outcome.status, 400);
        assert!(body_string(&outcome).contains(r#"exceptionCode="InvalidParameterValue""#));
    }

    #[tokio::test]
    async fn missing_service_is_missing_parameter() {
        let service = start_service(Duration::from_millis(500));
        let outcome = service
            .dispatcher
            .dispatch(RawRequest::query(&[("request", "GetCapabilities")]))
            .await;
        assert!(body_string(&outcome).contains(r#"exceptionCode="MissingParameterValue""#));
        assert!(body_string(&outcome).contains(r#"locator="service""#));
    }

    #[tokio::test]
    async fn execute_without_version_is_missing_parameter() {
        let service = start_service(Duration::from_millis(500));
        let outcome = service
            .dispatcher
            .dispatch(RawRequest::query(&[
                ("service", "WPS"),
                ("request", "Execute"),
                ("identifier", "test.echo"),
                ("datainputs", "text=hi"),
            ]))
            .await;

        let body = body_string(&outcome);
        assert!(body.contains(r#"exceptionCode="MissingParameterValue""#));
        assert!(body.contains(r#"locator="version""#));
    }

    #[tokio::test]
    async fn unsupported_language_is_invalid_parameter() {
        let service = start_service(Duration::from_millis(500));
        let outcome = service
            .dispatcher
            .dispatch(RawRequest::query(&[
                ("service", "WPS"),
                ("request", "GetCapabilities"),
                ("language", "tlh"),
            ]))
            .await;
        let body = body_string(&outcome);
        assert!(body.contains(r#"locator="language""#));
    }

    #[tokio::test]
    async fn version_negotiation_failure() {
        let service = start_service(Duration::from_millis(500));
        let outcome = service
            .dispatcher
            .dispatch(RawRequest::query(&[
                ("service", "WPS"),
                ("request", "GetCapabilities"),
                ("acceptversions", "2.0.0,3.0.0"),
            ]))
            .await;
        assert!(body_string(&outcome).contains(r#"exceptionCode="VersionNegotiationFailed""#));
    }

    #[tokio::test]
    async fn fast_execute_returns_result_synchronously() {
        let service = start_service(Duration::from_millis(500));
        let outcome = service
            .dispatcher
            .dispatch(RawRequest::query(&[
                ("service", "WPS"),
                ("request", "Execute"),
                ("version", "1.0.0"),
                ("identifier", "test.echo"),
                ("datainputs", "text=hello"),
            ]))
            .await;

        assert_eq!(outcome.status, 200);
        let body = body_string(&outcome);
        assert!(body.contains("wps:ProcessSucceeded"));
        assert!(body.contains(">hello</wps:LiteralData>"));
        assert!(!body.contains("wps:ProcessAccepted"));
    }

    #[tokio::test]
    async fn execute_unknown_process_is_invalid_parameter() {
        let service = start_service(Duration::from_millis(500));
        let outcome = service
            .dispatcher
            .dispatch(RawRequest::query(&[
                ("service", "WPS"),
                ("request", "Execute"),
                ("version", "1.0.0"),
                ("identifier", "test.unknown"),
            ]))
            .await;
        let body = body_string(&outcome);
        assert!(body.contains(r#"exceptionCode="InvalidParameterValue""#));
        assert!(body.contains(r#"locator="identifier""#));
    }

    #[tokio::test]
    async fn execute_missing_required_input_short_circuits() {
        let service = start_service(Duration::from_millis(500));
        let outcome = service
            .dispatcher
            .dispatch(RawRequest::query(&[
                ("service", "WPS"),
                ("request", "Execute"),
                ("version", "1.0.0"),
                ("identifier", "test.echo"),
            ]))
            .await;
        let body = body_string(&outcome);
        assert!(body.contains(r#"exceptionCode="MissingParameterValue""#));
        assert!(body.contains(r#"locator="text""#));
    }

    #[tokio::test]
    async fn store_response_returns_accepted_and_persists_result() {
        let service = start_service(Duration::from_millis(500));
        let outcome = service
            .dispatcher
            .dispatch(RawRequest::query(&[
                ("service", "WPS"),
                ("request", "Execute"),
                ("version", "1.0.0"),
                ("identifier", "test.echo"),
                ("datainputs", "text=stored"),
                ("storeexecuteresponse", "true"),
                ("status", "true"),
            ]))
            .await;

        assert_eq!(outcome.status, 200);
        let body = body_string(&outcome);
        assert!(body.contains("wps:ProcessAccepted"));

        // The Accepted document names the retrieval URL with the
        // execution id; extract it and poll until the terminal document
        // replaces the Accepted one.
        let id = body
            .split("id=")
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .unwrap()
            .to_string();
        let id = urlencoding::decode(&id).unwrap().into_owned();

        let mut terminal = None;
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            if let Ok(artifact) = service.store.get(&id) {
                let text = String::from_utf8_lossy(&artifact.bytes).into_owned();
                if text.contains("ProcessSucceeded") {
                    terminal = Some(text);
                    break;
                }
            }
        }
        let terminal = terminal.expect("stored execution never reached a terminal document");
        assert!(terminal.contains(">stored</wps:LiteralData>"));
    }

    #[tokio::test]
    async fn retrieve_result_unknown_id_is_invalid_parameter() {
        let service = start_service(Duration::from_millis(500));
        let outcome = service
            .dispatcher
            .dispatch(RawRequest::query(&[
                ("service", "WPS"),
                ("request", "RetrieveResult"),
                ("version", "1.0.0"),
                ("id", "does-not-exist"),
            ]))
            .await;

        assert_eq!(outcome.status, 400);
        let body = body_string(&outcome);
        assert!(body.contains(r#"exceptionCode="InvalidParameterValue""#));
        assert!(body.contains(r#"locator="id""#));
    }

    #[tokio::test]
    async fn raw_mode_returns_bare_bytes() {
        let service = start_service(Duration::from_millis(500));
        let outcome = service
            .dispatcher
            .dispatch(RawRequest::query(&[
                ("service", "WPS"),
                ("request", "Execute"),
                ("version", "1.0.0"),
                ("identifier", "test.echo"),
                ("datainputs", "text=raw-bytes"),
                ("rawdataoutput", "result"),
            ]))
            .await;

        assert_eq!(outcome.status, 200);
        assert_eq!(outcome.content_type, "text/plain");
        assert_eq!(outcome.body, b"raw-bytes");
    }

    #[tokio::test]
    async fn describe_process_all_and_unknown() {
        let service = start_service(Duration::from_millis(500));

        let all = service
            .dispatcher
            .dispatch(RawRequest::query(&[
                ("service", "WPS"),
                ("request", "DescribeProcess"),
                ("version", "1.0.0"),
                ("identifier", "all"),
            ]))
            .await;
        assert!(body_string(&all).contains("test.echo"));

        let unknown = service
            .dispatcher
            .dispatch(RawRequest::query(&[
                ("service", "WPS"),
                ("request", "DescribeProcess"),
                ("version", "1.0.0"),
                ("identifier", "nope"),
            ]))
            .await;
        assert!(body_string(&unknown).contains(r#"exceptionCode="InvalidParameterValue""#));
    }
}
