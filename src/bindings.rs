//! Low-level wasm-bindgen bindings to PayPal checkout.js v4.
//!
//! Exposes the SDK entry points this crate drives — `paypal.Button.render`
//! and the `paypal.request` helper — plus lookups against the runtime
//! `paypal.FUNDING` table. Higher-level orchestration lives in `flow` and
//! `buttons`.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::js_sys::{Array, Function, Object, Promise, Reflect};

use crate::funding::FundingMethod;

#[wasm_bindgen]
extern "C" {
    /// `paypal.Button.render(options, selector)` → JS `Promise`
    ///
    /// `options` carries env/locale/style/funding/commit plus the three
    /// lifecycle callbacks (`validate`, `payment`, `onAuthorize`).
    #[wasm_bindgen(catch, js_namespace = ["paypal", "Button"], js_name = render)]
    pub fn render_button(options: &JsValue, selector: &str) -> Result<Promise, JsValue>;

    /// `paypal.request({ method, url, body })` → JS `Promise` of the parsed
    /// JSON response body.
    #[wasm_bindgen(catch, js_namespace = paypal, js_name = request)]
    pub fn request(options: &JsValue) -> Result<Promise, JsValue>;

    /// Host-provided cart synthesis for single-product pages:
    /// `window.wc_ppec_generate_cart(done)` builds a cart from the current
    /// product/variation selection and invokes `done` when finished.
    #[wasm_bindgen(catch, js_namespace = window, js_name = wc_ppec_generate_cart)]
    pub fn generate_cart(done: &Function) -> Result<(), JsValue>;
}

/// True once checkout.js has installed its `window.paypal` global.
pub fn sdk_loaded() -> bool {
    Reflect::has(&gloo_utils::window(), &JsValue::from_str("paypal")).unwrap_or(false)
}

/// Resolve funding methods against the runtime `paypal.FUNDING` table.
/// Methods the loaded SDK build does not define are dropped.
pub(crate) fn funding_values(methods: &[FundingMethod]) -> Array {
    let values = Array::new();
    let Some(table) = funding_table() else {
        return values;
    };
    for method in methods {
        if let Ok(value) = Reflect::get(&table, &JsValue::from_str(method.sdk_key())) {
            if !value.is_undefined() && !value.is_null() {
                values.push(&value);
            }
        }
    }
    values
}

fn funding_table() -> Option<Object> {
    let paypal = Reflect::get(&gloo_utils::window(), &JsValue::from_str("paypal")).ok()?;
    Reflect::get(&paypal, &JsValue::from_str("FUNDING"))
        .ok()?
        .dyn_into()
        .ok()
}
