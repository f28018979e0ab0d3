//! CSS selectors for the panel pages driven through WebDriver.

use fantoccini::Locator;

/// Login page selectors.
pub struct LoginSelectors;

impl LoginSelectors {
    /// Hidden input Turnstile writes its solved token into.
    pub fn turnstile_response() -> Locator<'static> {
        Locator::Css(r#"input[name="cf-turnstile-response"]"#)
    }
}

/// Domain-creation form selectors. The sub-form elements only exist after a
/// registration mode has been selected; they are waited for, never assumed.
pub struct DomainFormSelectors;

impl DomainFormSelectors {
    pub fn mode_button() -> Locator<'static> {
        Locator::Css("button")
    }

    pub fn subdomain_name_input() -> Locator<'static> {
        Locator::Css(r#"input[placeholder="your-name"]"#)
    }

    pub fn custom_domain_input() -> Locator<'static> {
        Locator::Css(r#"input[type="text"]"#)
    }

    pub fn extension_select() -> Locator<'static> {
        Locator::Css("select")
    }

    pub fn extension_options() -> Locator<'static> {
        Locator::Css("select option")
    }

    /// Scope scanned for keyword-matched action controls.
    pub fn action_controls() -> Locator<'static> {
        Locator::Css(r#"button, a, input[type="submit"]"#)
    }
}
