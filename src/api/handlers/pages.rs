//! Minimal server-rendered pages. The gallery itself is driven from the JSON API.

use crate::models::CurrentUser;
use axum::{Extension, response::Html};

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title} - Image Gallery</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    ))
}

fn error_block(error: Option<&str>) -> String {
    error
        .map(|e| format!("<p class=\"error\" role=\"alert\">{}</p>\n", escape_html(e)))
        .unwrap_or_default()
}

pub fn login_form(error: Option<&str>) -> Html<String> {
    let body = format!(
        "<h1>Log in</h1>\n{}<form method=\"post\" action=\"/login\">\n\
         <label>Username <input name=\"username\" required></label>\n\
         <label>Password <input name=\"password\" type=\"password\" required></label>\n\
         <button type=\"submit\">Log in</button>\n</form>\n\
         <p>No account? <a href=\"/register\">Register</a></p>",
        error_block(error)
    );
    layout("Log in", &body)
}

pub fn register_form(error: Option<&str>) -> Html<String> {
    let body = format!(
        "<h1>Register</h1>\n{}<form method=\"post\" action=\"/register\">\n\
         <label>Username <input name=\"username\" minlength=\"3\" required></label>\n\
         <label>Password <input name=\"password\" type=\"password\" minlength=\"6\" required></label>\n\
         <button type=\"submit\">Register</button>\n</form>\n\
         <p>Already registered? <a href=\"/login\">Log in</a></p>",
        error_block(error)
    );
    layout("Register", &body)
}

pub async fn gallery(Extension(user): Extension<CurrentUser>) -> Html<String> {
    let body = format!(
        "<header><h1>Image Gallery</h1>\n\
         <p>Signed in as <strong>{}</strong> · <a href=\"/logout\">Log out</a></p></header>\n\
         <form method=\"post\" action=\"/upload\" enctype=\"multipart/form-data\">\n\
         <input type=\"file\" name=\"file\" accept=\".png,.jpg,.jpeg,.gif,.webp\" required>\n\
         <input name=\"title\" placeholder=\"Title\" required>\n\
         <input name=\"description\" placeholder=\"Description\">\n\
         <input name=\"tags\" placeholder=\"Tags, comma separated\">\n\
         <button type=\"submit\">Upload</button>\n</form>\n\
         <main id=\"gallery\" data-images=\"/api/images\" data-tags=\"/api/tags\"></main>",
        escape_html(&user.username)
    );
    layout("Gallery", &body)
}

pub async fn login_page() -> Html<String> {
    login_form(None)
}

pub async fn register_page() -> Html<String> {
    register_form(None)
}
