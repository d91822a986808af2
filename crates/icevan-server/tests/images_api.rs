//! HTTP surface tests
//!
//! Drive the full router with `oneshot` against a temporary public root.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use icevan_server::{build_router, ServerConfig};
use icevan_test_utils::{MultipartBody, PublicDirFixture};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(fixture: &PublicDirFixture) -> Router {
    app_with(fixture, |_| {})
}

fn app_with(fixture: &PublicDirFixture, tweak: impl FnOnce(&mut ServerConfig)) -> Router {
    let mut config = ServerConfig {
        public_dir: fixture.path().to_path_buf(),
        ..ServerConfig::default()
    };
    tweak(&mut config);
    build_router(&config).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn multipart_post(uri: &str, body: MultipartBody) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, MultipartBody::content_type())
        .body(Body::from(body.finish()))
        .unwrap()
}

fn json_post(uri: &str, value: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(value.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_answers_ok() {
    let fixture = PublicDirFixture::new();
    let (status, body) = send(app(&fixture), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn list_defaults_to_service_photos() {
    let fixture = PublicDirFixture::new();
    fixture.seed("images/fotos-servicos", &["02-b.jpg", "01-a.jpg", "leia.txt"]);

    let (status, body) = send_json(app(&fixture), get("/api/admin/images")).await;

    assert_eq!(status, StatusCode::OK);
    let images = body["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0]["filename"], "01-a.jpg");
    assert_eq!(images[0]["url"], "/images/fotos-servicos/01-a.jpg");
    assert_eq!(images[0]["folder"], "images/fotos-servicos");
    assert_eq!(images[1]["position"], 1);
    assert!(images[0]["timestamp"].is_i64());
    assert_eq!(body["folders"].as_array().unwrap().len(), 12);
    assert_eq!(body["folders"][0], "images/hero");
}

#[tokio::test]
async fn list_rejects_unknown_folder_without_details() {
    let fixture = PublicDirFixture::new();

    let (status, body) =
        send_json(app(&fixture), get("/api/admin/images?folder=../../etc")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Pasta não permitida" }));
}

#[tokio::test]
async fn upload_appends_with_next_prefix() {
    let fixture = PublicDirFixture::new();
    fixture.seed("images/hero", &["01-a.jpg", "02-b.jpg"]);

    let body = MultipartBody::new()
        .text("folder", "images/hero")
        .file("file", "Banner Verao.WEBP", b"webp-bytes");
    let (status, json) = send_json(app(&fixture), multipart_post("/api/admin/images", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);
    assert_eq!(json["filename"], "03-Banner Verao.webp");
    assert_eq!(json["url"], "/images/hero/03-Banner Verao.webp");
    assert!(json["timestamp"].is_i64());
    assert_eq!(fixture.read("images/hero", "03-Banner Verao.webp"), b"webp-bytes");
}

#[tokio::test]
async fn upload_with_saveas_writes_exact_name() {
    let fixture = PublicDirFixture::new();
    fixture.seed("images/logo", &["logo.svg"]);

    let body = MultipartBody::new()
        .text("folder", "images/logo")
        .text("saveas", "logo.svg")
        .file("file", "nova-logo.svg", b"<svg/>");
    let (status, json) = send_json(app(&fixture), multipart_post("/api/admin/images", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["filename"], "logo.svg");
    assert_eq!(fixture.read("images/logo", "logo.svg"), b"<svg/>");
}

#[tokio::test]
async fn upload_without_folder_is_rejected() {
    let fixture = PublicDirFixture::new();

    let body = MultipartBody::new().file("file", "a.jpg", b"x");
    let (status, json) = send_json(app(&fixture), multipart_post("/api/admin/images", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Arquivo e pasta são obrigatórios");
}

#[tokio::test]
async fn upload_of_executable_is_rejected_and_not_written() {
    let fixture = PublicDirFixture::new();

    let body = MultipartBody::new()
        .text("folder", "images/hero")
        .file("file", "virus.exe", b"MZ");
    let (status, json) = send_json(app(&fixture), multipart_post("/api/admin/images", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Formato de arquivo não permitido");
    assert!(fixture.names("images/hero").is_empty());
}

#[tokio::test]
async fn oversized_upload_is_refused() {
    let fixture = PublicDirFixture::new();
    let app = app_with(&fixture, |config| config.max_upload_bytes = 64);

    let body = MultipartBody::new()
        .text("folder", "images/hero")
        .file("file", "grande.jpg", &[0u8; 4096]);
    let (status, _) = send(app, multipart_post("/api/admin/images", body)).await;

    assert!(status.is_client_error());
    assert!(fixture.names("images/hero").is_empty());
}

#[tokio::test]
async fn io_failure_is_500_with_optional_details() {
    let fixture = PublicDirFixture::new();
    // A regular file where the folder should be makes directory creation fail
    std::fs::create_dir_all(fixture.path().join("images")).unwrap();
    std::fs::write(fixture.path().join("images/og"), b"not a dir").unwrap();

    let upload = || {
        MultipartBody::new()
            .text("folder", "images/og")
            .text("saveas", "og.png")
            .file("file", "og.png", b"png")
    };

    let (status, json) =
        send_json(app(&fixture), multipart_post("/api/admin/images", upload())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({ "error": "Erro no upload" }));

    let verbose = app_with(&fixture, |config| config.expose_error_details = true);
    let (status, json) = send_json(verbose, multipart_post("/api/admin/images", upload())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["details"].as_str().unwrap().contains("images/og"));
}

#[tokio::test]
async fn replace_keeps_prefix() {
    let fixture = PublicDirFixture::new();
    fixture.seed("images/empresa", &["01-a.jpg", "02-b.jpg", "03-c.jpg"]);

    let body = MultipartBody::new()
        .text("folder", "images/empresa")
        .text("target", "02-b.jpg")
        .file("file", "equipe.png", b"png");
    let (status, json) =
        send_json(app(&fixture), multipart_post("/api/admin/images/replace", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["filename"], "02-equipe.png");
    assert_eq!(json["replaced"], "02-b.jpg");
    assert_eq!(
        fixture.names("images/empresa"),
        vec!["01-a.jpg", "02-equipe.png", "03-c.jpg"]
    );
}

#[tokio::test]
async fn replace_with_bad_position_is_rejected() {
    let fixture = PublicDirFixture::new();
    fixture.seed("images/empresa", &["01-a.jpg"]);

    let body = MultipartBody::new()
        .text("folder", "images/empresa")
        .text("target", "01-a.jpg")
        .text("position", "primeiro")
        .file("file", "x.png", b"png");
    let (status, json) =
        send_json(app(&fixture), multipart_post("/api/admin/images/replace", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Parâmetros inválidos");
    assert_eq!(fixture.names("images/empresa"), vec!["01-a.jpg"]);
}

#[tokio::test]
async fn delete_is_idempotent() {
    let fixture = PublicDirFixture::new();
    fixture.seed("images/hero", &["01-a.jpg", "02-b.jpg"]);

    let delete = || {
        Request::builder()
            .method(Method::DELETE)
            .uri("/api/admin/images/01-a.jpg?folder=images/hero")
            .body(Body::empty())
            .unwrap()
    };

    let (status, json) = send_json(app(&fixture), delete()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "ok": true }));
    assert_eq!(fixture.names("images/hero"), vec!["02-b.jpg"]);

    let (status, json) = send_json(app(&fixture), delete()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "ok": true, "message": "Arquivo já não existe" }));
}

#[tokio::test]
async fn delete_without_folder_is_rejected() {
    let fixture = PublicDirFixture::new();
    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/admin/images/01-a.jpg")
        .body(Body::empty())
        .unwrap();

    let (status, json) = send_json(app(&fixture), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Pasta não permitida");
}

#[tokio::test]
async fn rename_moves_file() {
    let fixture = PublicDirFixture::new();
    fixture.seed("images/hero", &["01-a.jpg"]);

    let request = json_post(
        "/api/admin/images/rename",
        &json!({ "folder": "images/hero", "oldFilename": "01-a.jpg", "newFilename": "03-a.jpg" }),
    );
    let (status, json) = send_json(app(&fixture), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({ "ok": true, "oldFilename": "01-a.jpg", "newFilename": "03-a.jpg" })
    );
    assert_eq!(fixture.names("images/hero"), vec!["03-a.jpg"]);
}

#[tokio::test]
async fn rename_errors() {
    let fixture = PublicDirFixture::new();
    fixture.seed("images/hero", &["01-a.jpg"]);

    let missing_field = json_post(
        "/api/admin/images/rename",
        &json!({ "folder": "images/hero", "oldFilename": "01-a.jpg" }),
    );
    let (status, json) = send_json(app(&fixture), missing_field).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Parâmetros inválidos");

    let missing_source = json_post(
        "/api/admin/images/rename",
        &json!({ "folder": "images/hero", "oldFilename": "09-z.jpg", "newFilename": "10-z.jpg" }),
    );
    let (status, json) = send_json(app(&fixture), missing_source).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Arquivo não encontrado");
}

#[tokio::test]
async fn video_upload_slugifies() {
    let fixture = PublicDirFixture::new();

    let body = MultipartBody::new().file("file", "Obra Sprinter.MP4", b"mp4");
    let (status, json) =
        send_json(app(&fixture), multipart_post("/api/admin/videos/upload", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["filename"], "obra-sprinter.mp4");
    assert_eq!(json["url"], "/videos/obra-sprinter.mp4");
    assert!(fixture.exists("videos", "obra-sprinter.mp4"));
}

#[tokio::test]
async fn video_upload_rejects_other_formats() {
    let fixture = PublicDirFixture::new();

    let body = MultipartBody::new().file("file", "obra.mkv", b"mkv");
    let (status, json) =
        send_json(app(&fixture), multipart_post("/api/admin/videos/upload", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Formato não permitido. Use MP4, WebM, MOV ou AVI.");
    assert!(fixture.names("videos").is_empty());
}

#[tokio::test]
async fn replace_onto_another_assets_name_is_a_conflict() {
    let fixture = PublicDirFixture::new();
    fixture.seed("images/empresa", &["01-a.jpg", "02-b.jpg"]);

    let body = MultipartBody::new()
        .text("folder", "images/empresa")
        .text("target", "02-b.jpg")
        .text("position", "0")
        .file("file", "a.jpg", b"new");
    let (status, json) =
        send_json(app(&fixture), multipart_post("/api/admin/images/replace", body)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "Já existe um arquivo com esse nome");
    assert_eq!(fixture.names("images/empresa"), vec!["01-a.jpg", "02-b.jpg"]);
    assert_eq!(fixture.read("images/empresa", "01-a.jpg"), b"01-a.jpg");
}

#[tokio::test]
async fn catalog_endpoints() {
    let fixture = PublicDirFixture::new();
    fixture
        .seed("images/hero", &["02-b.jpg", "01-a.jpg"])
        .seed("images/empresa", &["01-fachada.jpg"])
        .seed("images/logo", &["logo.png"])
        .seed("images/aplicacoes/van-ducato", &["01-capa.jpg", "02-interior.jpg"]);

    let (status, hero) = send_json(app(&fixture), get("/api/hero")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hero["banners"][0]["filename"], "01-a.jpg");
    assert_eq!(hero["banners"][1]["sortOrder"], 2);

    let (_, company) = send_json(app(&fixture), get("/api/empresa/imagens")).await;
    assert_eq!(company, json!({ "imagens": ["/images/empresa/01-fachada.jpg"] }));

    let (_, logo) = send_json(app(&fixture), get("/api/logo")).await;
    assert_eq!(
        logo,
        json!({
            "principal": "/images/logo/logo.png",
            "branca": "/images/logo/logo-white.svg",
            "favicon": "/images/logo/favicon.ico",
        })
    );

    let (status, gallery) =
        send_json(app(&fixture), get("/api/aplicacoes/van-ducato/imagens")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(gallery["thumb"], "/images/aplicacoes/van-ducato/01-capa.jpg");
    assert_eq!(gallery["imagens"].as_array().unwrap().len(), 2);

    let (status, json) = send_json(app(&fixture), get("/api/aplicacoes/kombi/imagens")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Aplicação não encontrada");
}

#[tokio::test]
async fn uploaded_files_are_served_statically() {
    let fixture = PublicDirFixture::new();
    fixture.seed("images/hero", &["01-a.jpg"]);

    let (status, body) = send(app(&fixture), get("/images/hero/01-a.jpg")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"01-a.jpg");
}
