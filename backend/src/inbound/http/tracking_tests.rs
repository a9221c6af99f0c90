//! Tests for the tracking HTTP handlers.

use super::*;
use crate::domain::ports::{
    EngagementRepository, InMemoryEngagementRepository, MockEngagementRecorder, RecordingError,
};
use crate::domain::{EngagementService, ProxySignatures};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use std::sync::Arc;

fn in_memory_state() -> (Arc<InMemoryEngagementRepository>, web::Data<HttpState>) {
    let repository = Arc::new(InMemoryEngagementRepository::default());
    let recorder = Arc::new(EngagementService::new(
        repository.clone(),
        ProxySignatures::default(),
    ));
    (repository.clone(), web::Data::new(HttpState::new(recorder, repository)))
}

fn failing_state() -> web::Data<HttpState> {
    let mut recorder = MockEngagementRecorder::new();
    recorder
        .expect_record_open()
        .returning(|_, _| Err(RecordingError::storage("store down")));
    recorder
        .expect_record_click()
        .returning(|_, _, _| Err(RecordingError::storage("store down")));
    let repository = Arc::new(InMemoryEngagementRepository::default());
    web::Data::new(HttpState::new(Arc::new(recorder), repository))
}

fn test_app(
    state: web::Data<HttpState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .service(open_pixel)
        .service(click_redirect)
}

async fn get(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    uri: &str,
) -> actix_web::dev::ServiceResponse {
    actix_test::call_service(app, actix_test::TestRequest::get().uri(uri).to_request()).await
}

#[actix_web::test]
async fn open_serves_the_pixel_and_records_the_open() {
    let (repository, state) = in_memory_state();
    let app = actix_test::init_service(test_app(state)).await;

    let response = get(&app, "/open.gif?subject=12&email=a%40b.com").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("image/gif")
    );
    assert_eq!(
        response
            .headers()
            .get(header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok()),
        Some(PIXEL_CACHE_CONTROL)
    );
    assert_eq!(
        response
            .headers()
            .get(header::PRAGMA)
            .and_then(|v| v.to_str().ok()),
        Some("no-cache")
    );
    let body = actix_test::read_body(response).await;
    assert_eq!(&body[..], &TRACKING_PIXEL[..]);

    let record = repository.open_state(12, "a@b.com").expect("open recorded");
    assert!(!record.is_suspect);
}

#[actix_web::test]
async fn open_with_malformed_subject_still_serves_the_pixel_byte_for_byte() {
    let (repository, state) = in_memory_state();
    let app = actix_test::init_service(test_app(state)).await;

    let response = get(&app, "/open.gif?subject=not-a-number&email=a%40b.com").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = actix_test::read_body(response).await;
    assert_eq!(&body[..], &TRACKING_PIXEL[..]);
    assert_eq!(repository.counts().await.expect("counts").opens, 0);
}

#[actix_web::test]
async fn open_without_email_still_serves_the_pixel() {
    let (repository, state) = in_memory_state();
    let app = actix_test::init_service(test_app(state)).await;

    let response = get(&app, "/open.gif?subject=12").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = actix_test::read_body(response).await;
    assert_eq!(&body[..], &TRACKING_PIXEL[..]);
    assert_eq!(repository.counts().await.expect("counts").opens, 0);
}

#[actix_web::test]
async fn open_tolerates_a_cache_buster_parameter() {
    let (repository, state) = in_memory_state();
    let app = actix_test::init_service(test_app(state)).await;

    let response = get(&app, "/open.gif?subject=12&email=a%40b.com&ts=1723012345").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(repository.open_state(12, "a@b.com").is_some());
}

#[actix_web::test]
async fn open_normalizes_the_recipient_before_keying() {
    let (repository, state) = in_memory_state();
    let app = actix_test::init_service(test_app(state)).await;

    // Doubly encoded and mixed case in the URL; one key comes out.
    get(&app, "/open.gif?subject=7&email=User%2540Example.com").await;
    get(&app, "/open.gif?subject=7&email=user%40example.com").await;

    assert_eq!(repository.counts().await.expect("counts").opens, 1);
    assert!(repository.open_state(7, "user@example.com").is_some());
}

#[actix_web::test]
async fn open_through_an_image_proxy_is_flagged_suspect() {
    let (repository, state) = in_memory_state();
    let app = actix_test::init_service(test_app(state)).await;

    let request = actix_test::TestRequest::get()
        .uri("/open.gif?subject=3&email=a%40b.com")
        .insert_header((header::USER_AGENT, "Mozilla/5.0 GoogleImageProxy"))
        .to_request();
    actix_test::call_service(&app, request).await;

    let record = repository.open_state(3, "a@b.com").expect("open recorded");
    assert!(record.is_suspect);
}

#[actix_web::test]
async fn recording_failure_never_blocks_the_pixel() {
    let app = actix_test::init_service(test_app(failing_state())).await;

    let response = get(&app, "/open.gif?subject=12&email=a%40b.com").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = actix_test::read_body(response).await;
    assert_eq!(&body[..], &TRACKING_PIXEL[..]);
}

#[actix_web::test]
async fn click_redirects_to_the_decoded_destination() {
    let (repository, state) = in_memory_state();
    let app = actix_test::init_service(test_app(state)).await;

    let response = get(
        &app,
        "/c?subject=12&email=a%40b.com&u=https%3A%2F%2Fexample.com%2Foffer%3Fx%3D1",
    )
    .await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok()),
        Some("https://example.com/offer?x=1")
    );

    let clicks = repository.click_log();
    assert_eq!(clicks.len(), 1);
    assert_eq!(clicks[0].url, "https://example.com/offer?x=1");
    let record = repository.open_state(12, "a@b.com").expect("click confirms");
    assert!(!record.is_suspect);
}

#[actix_web::test]
async fn click_without_destination_redirects_to_root() {
    let (_repository, state) = in_memory_state();
    let app = actix_test::init_service(test_app(state)).await;

    let response = get(&app, "/c?subject=12&email=a%40b.com").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok()),
        Some("/")
    );
}

#[actix_web::test]
async fn click_with_unusable_parameters_still_redirects() {
    let (repository, state) = in_memory_state();
    let app = actix_test::init_service(test_app(state)).await;

    let response = get(&app, "/c?u=https%3A%2F%2Fexample.com").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok()),
        Some("https://example.com")
    );
    assert!(repository.click_log().is_empty());
}

#[actix_web::test]
async fn click_recording_failure_never_blocks_the_redirect() {
    let app = actix_test::init_service(test_app(failing_state())).await;

    let response = get(&app, "/c?subject=12&email=a%40b.com&u=%2Fnext").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok()),
        Some("/next")
    );
}

#[actix_web::test]
async fn repeated_clicks_all_land_in_the_log() {
    let (repository, state) = in_memory_state();
    let app = actix_test::init_service(test_app(state)).await;

    for _ in 0..3 {
        get(&app, "/c?subject=12&email=a%40b.com&u=%2Foffer").await;
    }

    assert_eq!(repository.click_log().len(), 3);
}

mod parsing {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("12"), Some("a%40b.com"), true)]
    #[case(Some(" 12 "), Some("a@b.com"), true)]
    #[case(Some("12.5"), Some("a@b.com"), false)]
    #[case(Some("twelve"), Some("a@b.com"), false)]
    #[case(None, Some("a@b.com"), false)]
    #[case(Some("12"), None, false)]
    #[case(Some("12"), Some(""), false)]
    #[case(Some("12"), Some("%20%20"), false)]
    fn tracking_key_requires_usable_parameters(
        #[case] subject: Option<&str>,
        #[case] email: Option<&str>,
        #[case] expected: bool,
    ) {
        assert_eq!(tracking_key(subject, email).is_some(), expected);
    }

    #[rstest]
    #[case(None, "/")]
    #[case(Some(""), "/")]
    #[case(Some("%20"), "/")]
    #[case(Some("%2Fnext"), "/next")]
    #[case(Some("https%3A%2F%2Fexample.com"), "https://example.com")]
    #[case(Some("/already/decoded"), "/already/decoded")]
    fn destination_decoding_defaults_to_root(#[case] raw: Option<&str>, #[case] expected: &str) {
        assert_eq!(decode_destination(raw), expected);
    }

    #[rstest]
    fn control_characters_fall_back_to_the_root_location() {
        let response = redirect_response("/bad\r\nLocation: evil");
        assert_eq!(
            response
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("/")
        );
    }
}
