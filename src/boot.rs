//! Page bootstrap and the provider-return guard.
//!
//! The guard runs before anything else: when the session-start URL carries
//! the return marker, the buyer just came back from PayPal's hosted pages,
//! the order is revalidated server-side, and no button is rendered for the
//! rest of the page load.

use std::rc::Rc;

use gloo_net::http::Request;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::buttons;
use crate::context::{CheckoutContext, Page, Placement};
use crate::error::ButtonError;
use crate::form;

/// Wire the whole page: return-flow guard first, then the initial render
/// and the host event subscriptions.
pub fn boot(context: CheckoutContext) {
    let context = Rc::new(context);

    if context.is_provider_return() {
        let context = context.clone();
        spawn_local(async move {
            revalidate_returned_order(&context).await;
        });
        return;
    }

    if let Some(page) = context.page {
        // The checkout page waits for the host's first `updated_checkout`
        // event, once the form has finished building.
        if page != Page::Checkout {
            buttons::render(&context, Placement::on_page(Some(page)));
        }
    }
    buttons::listen_for_host_events(context);
}

/// Entry point for classic, server-rendered storefront pages: call
/// `initCheckoutButtons(context)` from the page with the localized context
/// object.
#[wasm_bindgen(js_name = initCheckoutButtons)]
pub fn init_checkout_buttons(context: JsValue) -> Result<(), JsValue> {
    let context = CheckoutContext::from_js(context)?;
    boot(context);
    Ok(())
}

/// Re-run server-side validation for the order the buyer approved on
/// PayPal's side. A host-reported failure falls back to submitting the
/// checkout form so the host renders its own validation errors.
async fn revalidate_returned_order(context: &CheckoutContext) {
    let body = form::serialize(
        form::checkout_form().as_ref(),
        &context.start_checkout_nonce,
        true,
    );
    match post_form(&context.start_checkout_url, body).await {
        Ok(response) => {
            let success = response
                .get("success")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if !success {
                submit_checkout_form();
            }
        }
        Err(err) => log::warn!("order revalidation failed: {err}"),
    }
}

async fn post_form(url: &str, body: String) -> Result<Value, ButtonError> {
    let response = Request::post(url)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(body)
        .map_err(|e| ButtonError::Request(e.to_string()))?
        .send()
        .await
        .map_err(|e| ButtonError::Request(e.to_string()))?;
    response
        .json()
        .await
        .map_err(|e| ButtonError::Response(e.to_string()))
}

fn submit_checkout_form() {
    let Some(checkout) = form::checkout_form() else {
        return;
    };
    if let Err(err) = checkout.submit() {
        log::warn!("fallback form submission failed: {err:?}");
    }
}
