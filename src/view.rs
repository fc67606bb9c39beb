use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::handlers::api_key_from;
use crate::models::StoredImage;
use crate::storage::human_readable_size;

use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/view", get(view_page))
}

#[derive(Debug, Deserialize)]
struct ViewQuery {
    key: Option<String>,
}

/// Gated gallery of stored images. The key comes from the `key` query
/// parameter or the `X-API-KEY` header; without a valid key only the prompt
/// page is rendered and no image data is disclosed.
async fn view_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ViewQuery>,
    headers: HeaderMap,
) -> Response {
    if !state.config.enable_view {
        return (StatusCode::NOT_FOUND, Html(render_disabled())).into_response();
    }

    let supplied = query
        .key
        .clone()
        .or_else(|| api_key_from(&headers).map(str::to_string));

    match supplied {
        None => Html(render_prompt(None)).into_response(),
        Some(key) if key != state.config.api_key => {
            Html(render_prompt(Some("Invalid key"))).into_response()
        }
        Some(_) => {
            let images = state.store.list();
            Html(render_gallery(&images)).into_response()
        }
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        :root {{
            --bg: #0a0e1a;
            --card: #1a1f35;
            --border: #2a3152;
            --text: #e8ecf4;
            --muted: #8892a8;
            --accent: #6366f1;
            --danger: #ef4444;
        }}
        * {{ margin:0; padding:0; box-sizing:border-box; }}
        body {{ background:var(--bg); color:var(--text); font-family:system-ui,sans-serif; padding:2rem; }}
        h1 {{ font-size:1.4rem; margin-bottom:1rem; }}
        .muted {{ color:var(--muted); }}
        .error {{ color:var(--danger); margin-top:0.5rem; }}
        .card {{ background:var(--card); border:1px solid var(--border); border-radius:12px; padding:1.5rem; max-width:960px; }}
        input {{ background:var(--bg); color:var(--text); border:1px solid var(--border); border-radius:8px; padding:0.5rem; }}
        button {{ background:var(--accent); color:#fff; border:none; border-radius:8px; padding:0.5rem 1rem; cursor:pointer; }}
        table {{ width:100%; border-collapse:collapse; margin-top:1rem; }}
        th, td {{ text-align:left; padding:0.5rem; border-bottom:1px solid var(--border); }}
        img.thumb {{ max-height:48px; border-radius:6px; }}
        a {{ color:var(--accent); }}
    </style>
</head>
<body>
{body}
</body>
</html>"#
    )
}

fn render_disabled() -> String {
    page(
        "Not Found",
        r#"<div class="card"><h1>Not Found</h1><p class="muted">The image view is disabled on this server.</p></div>"#,
    )
}

fn render_prompt(error: Option<&str>) -> String {
    let error_html = error
        .map(|e| format!(r#"<p class="error">{}</p>"#, escape_html(e)))
        .unwrap_or_default();
    let body = format!(
        r#"<div class="card">
    <h1>Stored Images</h1>
    <p class="muted">Enter the API key to view stored images.</p>
    <form method="get" action="/view">
        <input type="password" name="key" placeholder="API key" autofocus>
        <button type="submit">View</button>
    </form>
    {error_html}
</div>"#
    );
    page("Stored Images", &body)
}

fn render_gallery(images: &[StoredImage]) -> String {
    let total: u64 = images.iter().map(|img| img.size).sum();
    let rows: String = images
        .iter()
        .map(|img| {
            let name = escape_html(&img.filename);
            let url = escape_html(&img.url);
            format!(
                r#"<tr>
    <td><a href="{url}"><img class="thumb" src="{url}" alt="{name}"></a></td>
    <td><a href="{url}">{name}</a></td>
    <td>{size}</td>
    <td>{modified}</td>
</tr>"#,
                size = human_readable_size(img.size),
                modified = escape_html(&img.modified),
            )
        })
        .collect();

    let body = format!(
        r#"<div class="card">
    <h1>Stored Images</h1>
    <p class="muted">{count} image(s), {total} total</p>
    <table>
        <tr><th></th><th>Filename</th><th>Size</th><th>Modified</th></tr>
        {rows}
    </table>
</div>"#,
        count = images.len(),
        total = human_readable_size(total),
    );
    page("Stored Images", &body)
}
