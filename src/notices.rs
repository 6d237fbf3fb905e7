//! Buyer-facing error notices.
//!
//! Messages land in the page-level notice region when one exists (checkout
//! pages), otherwise directly inside the button container (cart and product
//! pages have no such region). Message text is inserted as text nodes, so
//! host-supplied markup is rendered inert.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CustomEvent, Document, Element, Event, HtmlElement};

const NOTICE_REGION_SELECTOR: &str = ".woocommerce-notices-wrapper, form.checkout";
const STALE_NOTICE_SELECTOR: &str =
    ".woocommerce-NoticeGroup-checkout, .woocommerce-error, .woocommerce-message";
const VALIDATED_FIELD_SELECTOR: &str = ".input-text, select, input[type=checkbox]";

pub(crate) const ERROR_LIST_CLASS: &str = "woocommerce-error";
const NOTICE_GROUP_CLASS: &str = "woocommerce-NoticeGroup woocommerce-NoticeGroup-checkout";

/// Page-wide signal other storefront scripts listen for after a failed
/// checkout attempt.
pub const CHECKOUT_ERROR_EVENT: &str = "checkout_error";

/// Render `messages` as the page's current error notice.
pub fn show_errors(messages: &[String], fallback_container: &Element) {
    if messages.is_empty() {
        return;
    }
    let document = gloo_utils::document();
    let Ok(list) = error_list(&document, messages) else {
        return;
    };

    let Some(region) = notice_region(&document) else {
        prepend(fallback_container, &list);
        return;
    };

    remove_matching(&document, STALE_NOTICE_SELECTOR);
    if let Ok(group) = document.create_element("div") {
        group.set_class_name(NOTICE_GROUP_CLASS);
        let _ = group.append_child(&list);
        prepend(&region, &group);
    }
    retrigger_validation(&region);
    emit_checkout_error();
}

/// Drop error markup a prior attempt left inside the button container.
pub fn clear_errors(container: &Element) {
    if let Ok(stale) = container.query_selector_all(&format!(".{ERROR_LIST_CLASS}")) {
        for index in 0..stale.length() {
            if let Some(element) = stale.get(index).and_then(|n| n.dyn_into::<Element>().ok()) {
                element.remove();
            }
        }
    }
}

fn error_list(document: &Document, messages: &[String]) -> Result<Element, JsValue> {
    let list = document.create_element("ul")?;
    list.set_class_name(ERROR_LIST_CLASS);
    list.set_attribute("role", "alert")?;
    for message in messages {
        let item = document.create_element("li")?;
        item.set_text_content(Some(message));
        list.append_child(&item)?;
    }
    Ok(list)
}

fn notice_region(document: &Document) -> Option<Element> {
    document.query_selector(NOTICE_REGION_SELECTOR).ok().flatten()
}

fn prepend(parent: &Element, child: &Element) {
    let _ = parent.insert_before(child, parent.first_child().as_ref());
}

fn remove_matching(document: &Document, selector: &str) {
    if let Ok(stale) = document.query_selector_all(selector) {
        for index in 0..stale.length() {
            if let Some(element) = stale.get(index).and_then(|n| n.dyn_into::<Element>().ok()) {
                element.remove();
            }
        }
    }
}

/// Poke the host's client-side validation so invalid fields light up next
/// to the rendered notice.
fn retrigger_validation(region: &Element) {
    let Ok(fields) = region.query_selector_all(VALIDATED_FIELD_SELECTOR) else {
        return;
    };
    for index in 0..fields.length() {
        let Some(field) = fields.get(index) else {
            continue;
        };
        if let Ok(validate) = Event::new("validate") {
            if let Some(target) = field.dyn_ref::<Element>() {
                let _ = target.dispatch_event(&validate);
            }
        }
        if let Some(field) = field.dyn_ref::<HtmlElement>() {
            let _ = field.blur();
        }
    }
}

fn emit_checkout_error() {
    if let Ok(event) = CustomEvent::new(CHECKOUT_ERROR_EVENT) {
        let _ = gloo_utils::body().dispatch_event(&event);
    }
}
