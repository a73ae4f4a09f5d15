//! SAML browser-POST form scraping.

use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::error::{AtTaskError, Result};
use crate::transport::Params;

/// Input names carried across the SSO hops.
pub const SAML_FIELDS: [&str; 3] = ["SAMLRequest", "SAMLResponse", "RelayState"];

/// Target URL and recognized inputs of a scraped SAML form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamlForm {
    pub action: String,
    pub values: Params,
}

/// Extract the first form on the page.
///
/// Only the inputs named in [`SAML_FIELDS`] are kept; any of them absent from
/// the form is omitted. A relative `action` is resolved against `page_url`.
pub fn extract_form(html: &str, page_url: &str) -> Result<SamlForm> {
    let document = Html::parse_document(html);
    let form_selector = selector("form")?;

    let form = document
        .select(&form_selector)
        .next()
        .ok_or_else(|| AtTaskError::Authentication("no saml form in response".to_string()))?;

    let action = form
        .value()
        .attr("action")
        .ok_or_else(|| AtTaskError::Authentication("saml form has no action".to_string()))?;
    let action = resolve_action(action, page_url)?;

    let mut values = Params::new();
    for field in SAML_FIELDS {
        let input_selector = selector(&format!(r#"input[name="{}"]"#, field))?;
        match form.select(&input_selector).next() {
            Some(input) => {
                let value = input.value().attr("value").unwrap_or_default();
                values.insert(field.to_string(), value.to_string());
            }
            None => debug!(field = field, "SAML input not present"),
        }
    }

    Ok(SamlForm { action, values })
}

fn resolve_action(action: &str, page_url: &str) -> Result<String> {
    match Url::parse(action) {
        Ok(url) => Ok(url.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => Ok(Url::parse(page_url)?.join(action)?.to_string()),
        Err(e) => Err(e.into()),
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| AtTaskError::Authentication(format!("invalid selector {}: {:?}", css, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://example.attask-ondemand.com/";

    #[test]
    fn test_extract_request_form() {
        let html = r#"
            <html><body onload="document.forms[0].submit()">
              <form method="post" action="https://sso.example.com/adfs/ls/">
                <input type="hidden" name="SAMLRequest" value="fVLLbtsw"/>
                <input type="hidden" name="RelayState" value="/attask/"/>
                <noscript><input type="submit" value="Continue"/></noscript>
              </form>
            </body></html>"#;

        let form = extract_form(html, PAGE).unwrap();
        assert_eq!(form.action, "https://sso.example.com/adfs/ls/");
        assert_eq!(form.values.len(), 2);
        assert_eq!(form.values["SAMLRequest"], "fVLLbtsw");
        assert_eq!(form.values["RelayState"], "/attask/");
        assert!(!form.values.contains_key("SAMLResponse"));
    }

    #[test]
    fn test_only_first_form_used() {
        let html = r#"
            <form action="https://first.example.com/acs">
              <input name="SAMLResponse" value="first"/>
            </form>
            <form action="https://second.example.com/acs">
              <input name="SAMLResponse" value="second"/>
            </form>"#;

        let form = extract_form(html, PAGE).unwrap();
        assert_eq!(form.action, "https://first.example.com/acs");
        assert_eq!(form.values["SAMLResponse"], "first");
    }

    #[test]
    fn test_unrecognized_inputs_dropped() {
        let html = r#"
            <form action="/acs">
              <input name="SAMLResponse" value="PHNhbWw+"/>
              <input name="csrf" value="nope"/>
            </form>"#;

        let form = extract_form(html, PAGE).unwrap();
        assert_eq!(form.values.len(), 1);
        assert!(!form.values.contains_key("csrf"));
    }

    #[test]
    fn test_relative_action_resolved() {
        let html = r#"<form action="/saml2/acs"><input name="SAMLResponse" value="x"/></form>"#;
        let form = extract_form(html, "https://example.attask-ondemand.com/login/").unwrap();
        assert_eq!(form.action, "https://example.attask-ondemand.com/saml2/acs");
    }

    #[test]
    fn test_entities_decoded() {
        let html = r#"<form action="https://idp.example.com/sso?a=1&amp;b=2">
            <input name="RelayState" value="x&amp;y"/></form>"#;
        let form = extract_form(html, PAGE).unwrap();
        assert_eq!(form.action, "https://idp.example.com/sso?a=1&b=2");
        assert_eq!(form.values["RelayState"], "x&y");
    }

    #[test]
    fn test_no_form_is_authentication_error() {
        let err = extract_form("<html><body>Welcome</body></html>", PAGE).unwrap_err();
        assert!(err.is_authentication());
        assert!(err.to_string().contains("no saml form"));
    }
}
