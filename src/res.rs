use axum::{debug_handler, http::header, response::IntoResponse};

#[macro_export]
macro_rules! include_res {
    (bytes, $p:expr) => {
        include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
    (str, $p:expr) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
}

#[debug_handler]
pub async fn stylesheet() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css")],
        crate::include_res!(str, "/style.css"),
    )
}

/// Escape user-supplied text before splicing it into a template.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Shared navbar, with the auth corner flipped by session state.
pub fn navbar(user: Option<&crate::db::Profile>) -> String {
    let auth_link = match user {
        Some(profile) => format!(
            r#"<span class="meta">{}</span> <a href="/auth/logout">Sign Out</a>"#,
            escape_html(profile.display_name.as_deref().unwrap_or("Anonymous")),
        ),
        None => r#"<a href="/auth">Sign In</a>"#.to_owned(),
    };
    crate::include_res!(str, "/pages/nav.html").replace("{auth_link}", &auth_link)
}

/// Inline error markup for one form field, or nothing when the field passed.
pub fn field_error(errors: &crate::validate::FieldErrors, field: &str) -> String {
    match errors.get(field) {
        Some(message) => format!(
            r#"<p class="field-error">{}</p>"#,
            escape_html(message)
        ),
        None => String::new(),
    }
}

/// Render Markdown content (solution bodies) to HTML. Raw HTML in the source
/// is demoted to text, so stored markup never reaches the page live.
pub fn markdown_to_html(content: &str) -> String {
    use pulldown_cmark::Event;

    let parser = pulldown_cmark::Parser::new(content).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}

/// Rough "x ago" label for a unix timestamp, for cards and detail pages.
pub fn time_ago(created_at: i64) -> String {
    let now = time::OffsetDateTime::now_utc().unix_timestamp();
    let secs = (now - created_at).max(0);
    match secs {
        0..60 => "just now".to_owned(),
        60..3600 => format!("{} minutes ago", secs / 60),
        3600..86400 => format!("{} hours ago", secs / 3600),
        _ => format!("{} days ago", secs / 86400),
    }
}
