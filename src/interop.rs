//! Custom Yew hook to load PayPal checkout.js at runtime (no inline JS).
//!
//! `use_checkout_js()` injects a single
//! `<script id="paypal-checkout-js" src="https://www.paypalobjects.com/api/checkout.js" defer>`
//! into `<head>` on first use, returns `false` until the script's `load`
//! event fires, then `true` on every subsequent call. All components using
//! the hook share the same script insertion and state.

use wasm_bindgen::{prelude::Closure, JsCast};
use web_sys::HtmlScriptElement;
use yew::functional::hook;
use yew::prelude::*;

use crate::bindings;

const SCRIPT_ID: &str = "paypal-checkout-js";
const SCRIPT_SRC: &str = "https://www.paypalobjects.com/api/checkout.js";

/// Load checkout.js exactly once and track readiness.
///
/// Returns `false` while the `<script>` is being fetched and parsed, and
/// `true` once `window.paypal` exists.
#[hook]
pub fn use_checkout_js() -> bool {
    // The SDK may already be on the page (e.g. enqueued by the storefront).
    let loaded = use_state(bindings::sdk_loaded);

    {
        let loaded = loaded.clone();
        use_effect(move || {
            if !*loaded {
                let document = gloo_utils::document();

                if document.get_element_by_id(SCRIPT_ID).is_none() {
                    let script: HtmlScriptElement = document
                        .create_element("script")
                        .expect("create script")
                        .dyn_into()
                        .expect("cast script");

                    script.set_id(SCRIPT_ID);
                    script.set_src(SCRIPT_SRC);
                    script.set_defer(true);

                    let onload = Closure::wrap(Box::new(move || {
                        loaded.set(true);
                    }) as Box<dyn Fn()>);

                    script.set_onload(Some(onload.as_ref().unchecked_ref()));
                    onload.forget(); // lives until the load event

                    document
                        .head()
                        .expect("head missing")
                        .append_child(&script)
                        .expect("append script");
                }
            }
            || ()
        });
    }

    *loaded
}
