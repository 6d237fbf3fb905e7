//! Form data collection for session-start requests.
//!
//! The serialized payload is the enclosing form's fields plus two synthetic
//! fields: the anti-forgery `nonce` and the checkout-origin flag. The
//! synthetic fields live only in the serialized copy; the DOM form is never
//! touched.

use wasm_bindgen::JsCast;
use web_sys::js_sys;
use web_sys::{Element, FormData, HtmlFormElement};

pub(crate) const NONCE_FIELD: &str = "nonce";
pub(crate) const ORIGIN_FIELD: &str = "from_checkout";

const CHECKOUT_FORM_SELECTOR: &str = "form.checkout";

/// Nearest enclosing `<form>` of a button container, if any.
pub fn closest_form(element: &Element) -> Option<HtmlFormElement> {
    element
        .closest("form")
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into().ok())
}

/// The host's checkout form, when the page has one.
pub fn checkout_form() -> Option<HtmlFormElement> {
    gloo_utils::document()
        .query_selector(CHECKOUT_FORM_SELECTOR)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into().ok())
}

/// Serialize `form` (possibly absent) together with the synthetic fields.
/// Always produces a valid url-encoded payload, even for a missing or empty
/// form.
pub fn serialize(form: Option<&HtmlFormElement>, nonce: &str, from_checkout: bool) -> String {
    let mut pairs = form.map(field_pairs).unwrap_or_default();
    pairs.extend(synthetic_fields(nonce, from_checkout));
    encode(&pairs)
}

fn field_pairs(form: &HtmlFormElement) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let Ok(data) = FormData::new_with_form(form) else {
        return pairs;
    };
    if let Ok(Some(entries)) = js_sys::try_iter(&data) {
        for entry in entries.flatten() {
            let entry = js_sys::Array::from(&entry);
            // File entries have no string value and are not part of the
            // url-encoded payload.
            if let (Some(name), Some(value)) = (entry.get(0).as_string(), entry.get(1).as_string())
            {
                pairs.push((name, value));
            }
        }
    }
    pairs
}

pub(crate) fn synthetic_fields(nonce: &str, from_checkout: bool) -> [(String, String); 2] {
    let origin = if from_checkout { "yes" } else { "no" };
    [
        (NONCE_FIELD.to_owned(), nonce.to_owned()),
        (ORIGIN_FIELD.to_owned(), origin.to_owned()),
    ]
}

pub(crate) fn encode(pairs: &[(String, String)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, value) in pairs {
        serializer.append_pair(name, value);
    }
    serializer.finish()
}
