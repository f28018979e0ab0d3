//! Page-classification markers: CSRF tokens, banners, and the signals that
//! distinguish a login page from an authenticated dashboard page.
//!
//! The panel answers HTTP 200 for both the login page and the dashboard, so
//! marker presence is the only reliable authentication signal.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static TOKEN_INPUT: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"input[name="_token"]"#).expect("token input selector. This is a bug.")
});
static CSRF_META: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[name="csrf-token"]"#).expect("csrf meta selector. This is a bug.")
});
static SUCCESS_BANNER: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".alert-success").expect("success banner selector. This is a bug.")
});
static ERROR_BANNER: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".alert-danger, .error").expect("error banner selector. This is a bug.")
});
static LOGIN_FORM: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"form[action*="login"], #email"#).expect("login form selector. This is a bug.")
});
static ACCOUNT_AREA: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"[class*="account"]"#).expect("account area selector. This is a bug.")
});
static TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("title selector. This is a bug."));
static TURNSTILE_WIDGET: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("[data-sitekey]").expect("turnstile widget selector. This is a bug.")
});

fn element_text(element: scraper::ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Extracts the anti-forgery token from a page: the first `_token` hidden
/// input, falling back to the `csrf-token` meta tag.
pub fn csrf_token(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    if let Some(input) = document.select(&TOKEN_INPUT).next() {
        if let Some(value) = input.value().attr("value") {
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }

    document
        .select(&CSRF_META)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .filter(|content| !content.is_empty())
        .map(|content| content.to_string())
}

/// Text of the first non-empty success banner, if any.
pub fn success_banner(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&SUCCESS_BANNER)
        .map(element_text)
        .find(|text| !text.is_empty())
}

/// Text of the first non-empty error banner, if any.
pub fn error_banner(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&ERROR_BANNER)
        .map(element_text)
        .find(|text| !text.is_empty())
}

/// Whether the page presents a login form.
pub fn has_login_form(html: &str) -> bool {
    let document = Html::parse_document(html);
    document.select(&LOGIN_FORM).next().is_some()
}

/// Whether the page carries authenticated-area markers: account-styled
/// elements, dashboard wording, or an accounts listing title.
pub fn has_authenticated_markers(html: &str) -> bool {
    let document = Html::parse_document(html);

    if document.select(&ACCOUNT_AREA).next().is_some() {
        return true;
    }

    let lowered = html.to_lowercase();
    if lowered.contains("dashboard") || lowered.contains("hosting accounts") {
        return true;
    }

    document
        .select(&TITLE)
        .next()
        .map(element_text)
        .is_some_and(|title| title.to_lowercase().contains("accounts"))
}

/// Site key of an embedded Turnstile widget, needed by the bypass solver.
pub fn turnstile_site_key(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&TURNSTILE_WIDGET)
        .next()
        .and_then(|el| el.value().attr("data-sitekey"))
        .map(|key| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN_PAGE: &str = r#"
        <html><head><title>Client Area Login</title></head><body>
          <form action="/login" method="POST">
            <input type="hidden" name="_token" value="tok-123">
            <input id="email" type="email" name="email">
            <div class="cf-turnstile" data-sitekey="0x4AAAAAAA"></div>
          </form>
        </body></html>
    "#;

    const DASHBOARD_PAGE: &str = r#"
        <html><head><title>Hosting Accounts</title></head><body>
          <div class="account-list">
            <a href="/accounts/if0_40106205">my site</a>
          </div>
        </body></html>
    "#;

    #[test]
    fn extracts_token_from_hidden_input() {
        assert_eq!(csrf_token(LOGIN_PAGE).as_deref(), Some("tok-123"));
    }

    #[test]
    fn falls_back_to_meta_tag_for_token() {
        let html = r#"<head><meta name="csrf-token" content="meta-tok"></head>"#;
        assert_eq!(csrf_token(html).as_deref(), Some("meta-tok"));
    }

    #[test]
    fn missing_token_yields_none() {
        assert_eq!(csrf_token("<html><body>nothing here</body></html>"), None);
    }

    #[test]
    fn login_page_is_classified_as_unauthenticated() {
        assert!(has_login_form(LOGIN_PAGE));
        // "Client Area Login" title plus a token input carries no
        // authenticated-area markers.
        assert!(!has_authenticated_markers(LOGIN_PAGE));
    }

    #[test]
    fn dashboard_page_carries_authenticated_markers() {
        assert!(!has_login_form(DASHBOARD_PAGE));
        assert!(has_authenticated_markers(DASHBOARD_PAGE));
    }

    #[test]
    fn reads_banner_texts() {
        let html = r#"
            <div class="alert-success"> Record created. </div>
            <div class="alert-danger">Host already exists</div>
        "#;
        assert_eq!(success_banner(html).as_deref(), Some("Record created."));
        assert_eq!(error_banner(html).as_deref(), Some("Host already exists"));
        assert_eq!(success_banner("<p>plain</p>"), None);
        assert_eq!(error_banner("<div class='alert-danger'>  </div>"), None);
    }

    #[test]
    fn finds_turnstile_site_key() {
        assert_eq!(
            turnstile_site_key(LOGIN_PAGE).as_deref(),
            Some("0x4AAAAAAA")
        );
        assert_eq!(turnstile_site_key(DASHBOARD_PAGE), None);
    }
}
