mod common;

use std::sync::Arc;

use backstop::middleware::{BindRenderer, ErrorTranslation, Pipeline};
use backstop::{ErrorConfig, FailureKind, PipelineFailure, Request, Response, StatusCode};
use rstest::rstest;
use serde_json::Value;

use common::{BrokenRenderer, RecordingRenderer, ajax, failing_with, get, with_header};

fn translated(failure: PipelineFailure, config: ErrorConfig) -> Pipeline {
    Pipeline::new(failing_with(failure)).wrap(ErrorTranslation::new(config))
}

async fn hello(_req: Request) -> Response {
    Response::text("hello")
}

#[tokio::test]
async fn passes_successful_responses_through() {
    let pipeline = Pipeline::new(hello).wrap(ErrorTranslation::new(ErrorConfig::new(2, true)));

    let res = pipeline.call(ajax("/")).await.unwrap();

    assert_eq!(res, Response::text("hello"));
}

#[rstest]
#[tokio::test]
async fn contains_every_failure(
    #[values(FailureKind::RouteNotFound, FailureKind::Internal)] kind: FailureKind,
    #[values("plain", "ajax", "template")] client: &str,
    #[values(false, true)] display: bool,
) {
    let failure = PipelineFailure::new(kind, "it broke").with_trace("at handler");
    let mut pipeline = Pipeline::new(failing_with(failure));
    if client == "template" {
        pipeline = pipeline.wrap(BindRenderer::new(RecordingRenderer::default()));
    }
    let pipeline = pipeline.wrap(ErrorTranslation::new(ErrorConfig::new(0, display)));

    let req = if client == "ajax" { ajax("/x") } else { get("/x") };
    let res = pipeline.call(req).await;

    let res = res.expect("failure escaped the error middleware");
    assert!(!res.body().is_empty());
}

#[rstest]
#[case(FailureKind::RouteNotFound, StatusCode::NOT_FOUND)]
#[case(FailureKind::Internal, StatusCode::INTERNAL_SERVER_ERROR)]
#[tokio::test]
async fn maps_kind_to_status(#[case] kind: FailureKind, #[case] status: StatusCode) {
    let pipeline = translated(
        PipelineFailure::new(kind, "x").with_code(404),
        ErrorConfig::default(),
    );

    let res = pipeline.call(get("/")).await.unwrap();

    assert_eq!(res.status_code(), status);
}

#[tokio::test]
async fn ajax_route_miss_without_display() {
    let pipeline = translated(
        PipelineFailure::route_not_found("no route for /missing").with_trace("at router"),
        ErrorConfig::new(1, false),
    );

    let res = pipeline.call(ajax("/missing")).await.unwrap();

    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(res.content_type(), Some("application/json"));
    assert_eq!(
        &res.body()[..],
        br#"{"message":"no route for /missing","code":0,"trace":""}"#
    );
}

#[rstest]
#[case("XMLHttpRequest")]
#[case("xmlhttprequest")]
#[case("XMLHTTPREQUEST")]
#[tokio::test]
async fn ajax_payload_has_exactly_three_fields(#[case] header: &str) {
    let pipeline = translated(
        PipelineFailure::internal("db down").with_code(7).with_trace("at repo"),
        ErrorConfig::new(0, true),
    );

    let res = pipeline.call(with_header("/", "x-requested-with", header)).await.unwrap();

    let json: Value = serde_json::from_slice(res.body()).unwrap();
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), 3);
    assert_eq!(object["message"], "db down");
    assert_eq!(object["code"], 7);
    assert_eq!(object["trace"], "at repo");
}

#[tokio::test]
async fn plain_fallback_shows_message_and_trace_when_displayed() {
    let pipeline = translated(
        PipelineFailure::internal("cache exploded").with_trace("at cache::get\nat handler"),
        ErrorConfig::new(1, true),
    );

    let res = pipeline.call(get("/")).await.unwrap();
    let body = std::str::from_utf8(res.body()).unwrap();

    assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.content_type(), Some("text/plain; charset=utf-8"));
    assert!(body.contains("cache exploded"));
    assert!(body.contains("at cache::get\nat handler"));
}

#[tokio::test]
async fn plain_fallback_hides_trace_by_default() {
    let pipeline = translated(
        PipelineFailure::internal("cache exploded").with_trace("secret internals"),
        ErrorConfig::default(),
    );

    let res = pipeline.call(get("/")).await.unwrap();
    let body = std::str::from_utf8(res.body()).unwrap();

    assert!(body.contains("cache exploded"));
    assert!(!body.contains("secret internals"));
}

#[rstest]
#[case::plain_shown(false, true)]
#[case::plain_hidden(false, false)]
#[case::ajax_shown(true, true)]
#[case::ajax_hidden(true, false)]
#[tokio::test]
async fn bare_failure_trace_follows_display(#[case] is_ajax: bool, #[case] display: bool) {
    let pipeline =
        translated(PipelineFailure::internal("cache exploded"), ErrorConfig::new(1, display));
    let req = if is_ajax { ajax("/") } else { get("/") };

    let res = pipeline.call(req).await.unwrap();

    let trace = if is_ajax {
        let json: Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(json["message"], "cache exploded");
        json["trace"].as_str().unwrap().to_owned()
    } else {
        let body = std::str::from_utf8(res.body()).unwrap();
        let trace = body.strip_prefix("exception:\ncache exploded\n").unwrap();
        trace.to_owned()
    };
    assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(trace.is_empty(), !display, "trace: {trace:?}");
    if display {
        assert!(trace.contains(file!()), "trace: {trace:?}");
    }
}

#[tokio::test]
async fn bound_renderer_gets_status_template() {
    let renderer = RecordingRenderer::default();
    let pipeline = Pipeline::new(failing_with(PipelineFailure::route_not_found("no page")))
        .wrap(BindRenderer::new(renderer.clone()))
        .wrap(ErrorTranslation::new(ErrorConfig::new(0, false)));

    let res = pipeline.call(get("/nowhere")).await.unwrap();

    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(res.content_type(), Some("text/html; charset=utf-8"));
    assert_eq!(&res.body()[..], b"<h1>404</h1><pre>\nno page\n</pre>");

    let calls = renderer.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].name, "error-404");
    assert_eq!(calls[0].message, "no page");
    assert_eq!(calls[0].trace, "");
}

#[tokio::test]
async fn renderer_bound_on_request_is_used() {
    let renderer = RecordingRenderer::default();
    let pipeline = translated(
        PipelineFailure::internal("boom").with_trace("at main"),
        ErrorConfig::new(0, true),
    );

    let req = get("/").with_renderer(Arc::new(renderer.clone()));
    pipeline.call(req).await.unwrap();

    let calls = renderer.calls();
    assert_eq!(calls[0].name, "error-500");
    assert_eq!(calls[0].detail, "\nboom\nat main");
}

#[tokio::test]
async fn renderer_bound_downstream_is_not_seen() {
    let renderer = RecordingRenderer::default();
    let pipeline = Pipeline::new(failing_with(PipelineFailure::internal("boom")))
        .wrap(ErrorTranslation::new(ErrorConfig::new(0, false)))
        .wrap(BindRenderer::new(renderer.clone()));

    let res = pipeline.call(get("/")).await.unwrap();

    assert_eq!(res.content_type(), Some("text/plain; charset=utf-8"));
    assert!(renderer.calls().is_empty());
}

#[tokio::test]
async fn ajax_wins_over_bound_renderer() {
    let renderer = RecordingRenderer::default();
    let pipeline = Pipeline::new(failing_with(PipelineFailure::internal("boom")))
        .wrap(BindRenderer::new(renderer.clone()))
        .wrap(ErrorTranslation::new(ErrorConfig::default()));

    let res = pipeline.call(ajax("/")).await.unwrap();

    assert_eq!(res.content_type(), Some("application/json"));
    assert!(renderer.calls().is_empty());
}

#[tokio::test]
async fn broken_renderer_failure_propagates() {
    let pipeline = Pipeline::new(failing_with(PipelineFailure::route_not_found("missing")))
        .wrap(BindRenderer::new(BrokenRenderer))
        .wrap(ErrorTranslation::new(ErrorConfig::default()));

    let err = pipeline.call(get("/")).await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::Internal);
    assert!(err.message().contains("error-404"));
}

#[rstest]
#[tokio::test]
async fn equivalent_inputs_give_identical_responses(#[values(false, true)] is_ajax: bool) {
    let pipeline = translated(
        PipelineFailure::internal("flaky").with_code(3).with_trace("at retry"),
        ErrorConfig::new(2, true),
    );
    let request = || if is_ajax { ajax("/") } else { get("/") };

    let first = pipeline.call(request()).await.unwrap();
    let second = pipeline.call(request()).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn concurrent_requests_are_independent() {
    let pipeline = Pipeline::new(|req: Request| async move {
        match req.path() {
            "/ok" => Ok(Response::text("fine")),
            "/missing" => Err(PipelineFailure::route_not_found("missing")),
            _ => Err(PipelineFailure::internal("broken")),
        }
    })
    .wrap(ErrorTranslation::new(ErrorConfig::new(0, false)));

    let handles: Vec<_> = ["/ok", "/missing", "/broken"]
        .into_iter()
        .cycle()
        .take(30)
        .map(|path| {
            let pipeline = pipeline.clone();
            tokio::spawn(async move { (path, pipeline.call(get(path)).await) })
        })
        .collect();

    for handle in handles {
        let (path, res) = handle.await.unwrap();
        let status = res.unwrap().status_code();
        match path {
            "/ok" => assert_eq!(status, StatusCode::OK),
            "/missing" => assert_eq!(status, StatusCode::NOT_FOUND),
            _ => assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}
