//! # tb-api Handlers
//!
//! This module coordinates the flow between HTTP requests and the
//! tb-core ports. Handlers never see a concrete backend: everything
//! goes through the trait objects in [`AppState`].

use actix_multipart::Multipart;
use actix_web::cookie::{time::Duration as CookieDuration, Cookie};
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use askama::Template;
use futures_util::TryStreamExt;
use serde::Deserialize;
use serde_json::json;
use tb_core::error::AppError;
use tb_core::models::{NewAttachment, NewBoard};
use tb_core::traits::{AuthProvider, BoardRepo, MediaStore, PostRepo, TodoRepo};
use tb_ui::FormTemplate;

/// Name of the session cookie.
const SESSION_COOKIE: &str = "jwt";

/// State shared across all Actix-web workers.
pub struct AppState {
    pub posts: Box<dyn PostRepo>,
    pub todos: Box<dyn TodoRepo>,
    pub boards: Box<dyn BoardRepo>,
    pub store: Box<dyn MediaStore>,
    pub auth: Box<dyn AuthProvider>,
}

/// Translates a domain error into its HTTP shape. Infrastructure
/// failures are logged here and surfaced as an opaque 500; they never
/// crash the process.
fn error_response(err: AppError) -> HttpResponse {
    match err {
        AppError::NotFound(what) => {
            HttpResponse::NotFound().json(json!({ "error": format!("{what} not found") }))
        }
        AppError::InvalidCredentials => {
            HttpResponse::Forbidden().json(json!({ "message": "Invalid username or password" }))
        }
        err => {
            log::error!("request failed: {err}");
            HttpResponse::InternalServerError().json(json!({ "error": "Internal server error" }))
        }
    }
}

/// `GET /` — echoes the caller's address.
pub async fn index(req: HttpRequest) -> HttpResponse {
    let ip = req
        .peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_default();
    HttpResponse::Ok().body(format!("client address: {ip}"))
}

// ── In-memory collections ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PostPayload {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct TodoPayload {
    pub text: String,
}

pub async fn list_posts(data: web::Data<AppState>) -> HttpResponse {
    match data.posts.list().await {
        Ok(posts) => HttpResponse::Ok().json(json!({ "posts": posts })),
        Err(err) => error_response(err),
    }
}

pub async fn create_post(
    data: web::Data<AppState>,
    body: web::Json<PostPayload>,
) -> HttpResponse {
    let payload = body.into_inner();
    match data.posts.create(payload.title, payload.content).await {
        Ok(post) => HttpResponse::Created().json(json!({ "post": post })),
        Err(err) => error_response(err),
    }
}

pub async fn update_post(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<PostPayload>,
) -> HttpResponse {
    let payload = body.into_inner();
    match data
        .posts
        .replace(path.into_inner(), payload.title, payload.content)
        .await
    {
        Ok(post) => HttpResponse::Ok().json(json!({ "post": post })),
        Err(err) => error_response(err),
    }
}

pub async fn delete_post(data: web::Data<AppState>, path: web::Path<i64>) -> HttpResponse {
    match data.posts.delete(path.into_inner()).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err),
    }
}

pub async fn list_todos(data: web::Data<AppState>) -> HttpResponse {
    match data.todos.list().await {
        Ok(todos) => HttpResponse::Ok().json(todos),
        Err(err) => error_response(err),
    }
}

pub async fn create_todo(
    data: web::Data<AppState>,
    body: web::Json<TodoPayload>,
) -> HttpResponse {
    match data.todos.create(body.into_inner().text).await {
        Ok(todo) => HttpResponse::Ok().json(todo),
        Err(err) => error_response(err),
    }
}

pub async fn update_todo(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<TodoPayload>,
) -> HttpResponse {
    match data
        .todos
        .update(path.into_inner(), body.into_inner().text)
        .await
    {
        Ok(todo) => HttpResponse::Ok().json(todo),
        Err(err) => error_response(err),
    }
}

pub async fn delete_todo(data: web::Data<AppState>, path: web::Path<i64>) -> HttpResponse {
    match data.todos.delete(path.into_inner()).await {
        Ok(()) => HttpResponse::Ok().json(json!({ "message": "Todo deleted successfully" })),
        Err(err) => error_response(err),
    }
}

// ── Session surface ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

fn session_removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}

/// `POST /login` — accepts both JSON and HTML-form bodies, since the
/// `/form` page submits urlencoded. The failure body's one stable
/// field is `message`.
pub async fn login(
    data: web::Data<AppState>,
    body: web::Either<web::Json<LoginPayload>, web::Form<LoginPayload>>,
) -> HttpResponse {
    let payload = body.into_inner();
    match data.auth.login(&payload.username, &payload.password) {
        Ok(session) => {
            let cookie = Cookie::build(SESSION_COOKIE, session.token)
                .path("/")
                .http_only(true)
                .finish();
            HttpResponse::Ok().cookie(cookie).json(json!({
                "message": format!("Login successful! Welcome, {}!", session.claims.nickname),
            }))
        }
        Err(err) => error_response(err),
    }
}

/// `GET /form` — welcome page for a valid session, login form
/// otherwise. An invalid or expired cookie is cleared so the client
/// lands back on the login branch instead of failing hard.
pub async fn form(data: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let session_cookie = req.cookie(SESSION_COOKIE);
    let claims = session_cookie
        .as_ref()
        .and_then(|cookie| data.auth.verify(cookie.value()).ok());

    let template = FormTemplate {
        nickname: claims.as_ref().map(|claims| claims.nickname.clone()),
    };
    let html = match template.render() {
        Ok(html) => html,
        Err(err) => {
            log::error!("form template rendering failed: {err}");
            return HttpResponse::InternalServerError()
                .json(json!({ "error": "Internal server error" }));
        }
    };

    let mut response = HttpResponse::Ok();
    if session_cookie.is_some() && claims.is_none() {
        response.cookie(session_removal_cookie());
    }
    response
        .content_type("text/html; charset=utf-8")
        .body(html)
}

/// `GET /logout` — clears the session cookie and bounces home.
pub async fn logout() -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .cookie(session_removal_cookie())
        .finish()
}

/// `GET /cookie` — sets a 15-minute demo cookie.
pub async fn set_demo_cookie() -> HttpResponse {
    let cookie = Cookie::build("cookieName", "cookieValue")
        .path("/")
        .http_only(true)
        .max_age(CookieDuration::seconds(900))
        .finish();
    HttpResponse::Ok()
        .cookie(cookie)
        .json(json!({ "message": "cookie set" }))
}

// ── Persisted board ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct BoardPayload {
    pub title: String,
    pub content: String,
}

pub async fn list_board(data: web::Data<AppState>) -> HttpResponse {
    match data.boards.list_boards().await {
        Ok(boards) => HttpResponse::Ok().json(boards),
        Err(err) => error_response(err),
    }
}

pub async fn read_board(data: web::Data<AppState>, path: web::Path<i64>) -> HttpResponse {
    match data.boards.get_board(path.into_inner()).await {
        Ok(Some((board, attachment))) => {
            HttpResponse::Ok().json(json!({ "board": board, "attachment": attachment }))
        }
        Ok(None) => error_response(AppError::NotFound("Board".to_string())),
        Err(err) => error_response(err),
    }
}

/// `GET /img/:bnum` — streams the attachment of a board row, typed by
/// the MIME recorded at upload time.
pub async fn board_image(data: web::Data<AppState>, path: web::Path<i64>) -> HttpResponse {
    match data.boards.get_board(path.into_inner()).await {
        Ok(Some((_, Some(attachment)))) => match data.store.load(&attachment.savefile).await {
            Ok(bytes) => HttpResponse::Ok()
                .content_type(attachment.filetype)
                .body(bytes),
            Err(err) => error_response(err),
        },
        Ok(_) => error_response(AppError::NotFound("Attachment".to_string())),
        Err(err) => error_response(err),
    }
}

/// Fields collected from the multipart `/insert` form.
#[derive(Default)]
struct InsertForm {
    id: String,
    title: String,
    content: String,
    /// Original filename plus raw bytes, when a file part was sent.
    file: Option<(String, Vec<u8>)>,
}

async fn read_insert_form(
    mut payload: Multipart,
) -> Result<InsertForm, actix_multipart::MultipartError> {
    let mut form = InsertForm::default();
    while let Some(mut field) = payload.try_next().await? {
        let name = field.name().to_string();
        let filename = field
            .content_disposition()
            .get_filename()
            .map(str::to_string);

        let mut data = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            data.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "id" => form.id = String::from_utf8_lossy(&data).into_owned(),
            "title" => form.title = String::from_utf8_lossy(&data).into_owned(),
            "content" => form.content = String::from_utf8_lossy(&data).into_owned(),
            "file" => {
                // Browsers send an empty file part when nothing was picked.
                if let Some(filename) = filename.filter(|f| !f.is_empty()) {
                    if !data.is_empty() {
                        form.file = Some((filename, data));
                    }
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

/// `POST /insert` — creates a board row with an optional single-file
/// attachment. The file is saved first; the row and the attachment
/// record then land in one repo transaction.
pub async fn insert_board(data: web::Data<AppState>, payload: Multipart) -> HttpResponse {
    let form = match read_insert_form(payload).await {
        Ok(form) => form,
        Err(err) => {
            log::error!("multipart parsing failed: {err}");
            return HttpResponse::InternalServerError()
                .json(json!({ "error": "Internal server error" }));
        }
    };

    let attachment = match form.file {
        Some((filename, bytes)) => match data.store.save(bytes, &filename).await {
            Ok(savefile) => {
                let filetype = mime_guess::from_path(&filename)
                    .first_or_octet_stream()
                    .to_string();
                Some(NewAttachment { savefile, filetype })
            }
            Err(err) => return error_response(err),
        },
        None => None,
    };

    let board = NewBoard {
        id: form.id,
        title: form.title,
        content: form.content,
    };
    match data.boards.create_board(board, attachment.clone()).await {
        Ok(board) => HttpResponse::Created().json(json!({ "board": board })),
        Err(err) => {
            // The row never landed, so the upload saved above would be
            // orphaned on disk.
            if let Some(attachment) = &attachment {
                if let Err(cleanup_err) = data.store.remove(&attachment.savefile).await {
                    log::error!(
                        "failed to remove orphaned upload {}: {cleanup_err}",
                        attachment.savefile
                    );
                }
            }
            error_response(err)
        }
    }
}

pub async fn update_board(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<BoardPayload>,
) -> HttpResponse {
    let payload = body.into_inner();
    match data
        .boards
        .update_board(path.into_inner(), payload.title, payload.content)
        .await
    {
        Ok(()) => HttpResponse::Ok().json(json!({ "message": "Board updated successfully" })),
        Err(err) => error_response(err),
    }
}

pub async fn delete_board(data: web::Data<AppState>, path: web::Path<i64>) -> HttpResponse {
    let bnum = path.into_inner();
    // Capture the attachment name before the rows disappear.
    let attachment = match data.boards.get_board(bnum).await {
        Ok(Some((_, attachment))) => attachment,
        Ok(None) => return error_response(AppError::NotFound("Board".to_string())),
        Err(err) => return error_response(err),
    };

    match data.boards.delete_board(bnum).await {
        Ok(()) => {
            // Best effort: the rows are gone either way.
            if let Some(attachment) = attachment {
                if let Err(err) = data.store.remove(&attachment.savefile).await {
                    log::warn!(
                        "failed to remove stored file {}: {err}",
                        attachment.savefile
                    );
                }
            }
            HttpResponse::Ok().json(json!({ "message": "Board deleted successfully" }))
        }
        Err(err) => error_response(err),
    }
}
