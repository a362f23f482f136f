use super::*;

#[test]
fn landing_page_has_single_heading() {
    let html = landing_page();
    assert_eq!(html.matches("<h1").count(), 1);
    assert!(html.contains("<h1>Photography Gallery</h1>"));
}

#[test]
fn landing_page_links_docs_and_repository() {
    let html = landing_page();
    assert!(html.contains(&format!(r#"href="{DOCS_PATH}""#)));
    assert!(html.contains(&format!(r#"href="{REPOSITORY_URL}""#)));
    assert_eq!(DOCS_PATH, "/api/docs");
    assert_eq!(REPOSITORY_URL, "https://github.com/Shuanggao58/photography-gallery");
}

#[test]
fn browsers_prefer_html() {
    assert!(prefers_html("text/html,application/xhtml+xml,*/*;q=0.8"));
    assert!(prefers_html("text/html;q=0.9, application/json;q=0.9"));
}

#[test]
fn api_clients_prefer_json() {
    assert!(!prefers_html(""));
    assert!(!prefers_html("*/*"));
    assert!(!prefers_html("application/json"));
    assert!(!prefers_html("application/json, text/html;q=0.5"));
    assert!(!prefers_html("text/html;q=0"));
}

#[test]
fn route_index_is_complete() {
    let admin_count = ROUTES.iter().filter(|r| r.auth == "admin").count();
    assert_eq!(admin_count, 13);
    assert!(ROUTES.iter().all(|r| r.path.starts_with('/')));
    assert!(ROUTES.iter().any(|r| r.path == DOCS_PATH));
}
