//! Browser-backed implementations of the orchestration seams.
//!
//! [`BrowserGateway`] is the production [`HostGateway`]: it serializes the
//! real form, talks to the session-start endpoint through the SDK's
//! `paypal.request` helper, bridges the host's cart synthesis, and submits
//! the host checkout form. The adapters at the bottom wrap the raw actions
//! objects the SDK hands to its lifecycle callbacks.

use std::rc::Rc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::js_sys::{Function, Promise, Reflect};
use web_sys::{Element, HtmlFormElement, HtmlInputElement};

use crate::bindings;
use crate::context::CheckoutContext;
use crate::error::ButtonError;
use crate::flow::{Authorization, AuthorizeActions, HostGateway};
use crate::{form, notices};

const PAYMENT_TOKEN_FIELD: &str = "paymentToken";
const PAYER_ID_FIELD: &str = "payerID";

pub struct BrowserGateway {
    context: Rc<CheckoutContext>,
    container: Element,
}

impl BrowserGateway {
    pub fn new(context: Rc<CheckoutContext>, container: Element) -> Self {
        Self { context, container }
    }
}

#[derive(Serialize)]
struct SdkRequest<'a> {
    method: &'a str,
    url: &'a str,
    body: &'a str,
}

#[async_trait(?Send)]
impl HostGateway for BrowserGateway {
    fn clear_notices(&self) {
        notices::clear_errors(&self.container);
    }

    async fn create_cart(&self) -> Result<(), ButtonError> {
        let promise = Promise::new(&mut |resolve, reject| {
            if let Err(err) = bindings::generate_cart(&resolve) {
                let _ = reject.call1(&JsValue::UNDEFINED, &err);
            }
        });
        JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(ButtonError::from_js)
    }

    fn collect_form_data(&self, from_checkout: bool) -> String {
        let enclosing = form::closest_form(&self.container);
        form::serialize(
            enclosing.as_ref(),
            &self.context.start_checkout_nonce,
            from_checkout,
        )
    }

    async fn start_checkout(&self, body: String) -> Result<Value, ButtonError> {
        let options = serde_wasm_bindgen::to_value(&SdkRequest {
            method: "post",
            url: &self.context.start_checkout_url,
            body: &body,
        })
        .map_err(|e| ButtonError::Request(e.to_string()))?;

        let promise = bindings::request(&options).map_err(ButtonError::from_js)?;
        let response = JsFuture::from(promise).await.map_err(ButtonError::from_js)?;
        serde_wasm_bindgen::from_value(response)
            .map_err(|e| ButtonError::Response(e.to_string()))
    }

    fn show_notices(&self, messages: &[String]) {
        notices::show_errors(messages, &self.container);
    }

    fn submit_checkout_form(&self, authorization: Option<&Authorization>) {
        let Some(checkout) = form::checkout_form() else {
            log::warn!("no checkout form on this page; nothing to submit");
            return;
        };
        if let Some(auth) = authorization {
            append_hidden_field(&checkout, PAYMENT_TOKEN_FIELD, &auth.payment_token);
            append_hidden_field(&checkout, PAYER_ID_FIELD, &auth.payer_id);
        }
        if let Err(err) = checkout.submit() {
            log::warn!("checkout form submission failed: {err:?}");
        }
    }
}

fn append_hidden_field(form: &HtmlFormElement, name: &str, value: &str) {
    let document = gloo_utils::document();
    let Ok(element) = document.create_element("input") else {
        return;
    };
    let Ok(input) = element.dyn_into::<HtmlInputElement>() else {
        return;
    };
    input.set_type("hidden");
    input.set_name(name);
    input.set_value(value);
    let _ = form.append_child(&input);
}

/// `actions` object passed to the SDK's `onAuthorize` callback.
pub(crate) struct SdkAuthorizeActions {
    inner: JsValue,
}

impl SdkAuthorizeActions {
    pub(crate) fn new(inner: JsValue) -> Self {
        Self { inner }
    }
}

impl AuthorizeActions for SdkAuthorizeActions {
    fn redirect(&self) {
        if let Err(err) = call_method(&self.inner, "redirect") {
            log::warn!("SDK redirect failed: {err:?}");
        }
    }
}

/// `actions` object passed to the SDK's `validate` callback; enables and
/// disables the rendered button.
#[derive(Clone)]
pub(crate) struct SdkButtonActions {
    inner: JsValue,
}

impl SdkButtonActions {
    pub(crate) fn new(inner: JsValue) -> Self {
        Self { inner }
    }

    pub(crate) fn enable(&self) {
        if let Err(err) = call_method(&self.inner, "enable") {
            log::warn!("SDK enable failed: {err:?}");
        }
    }

    pub(crate) fn disable(&self) {
        if let Err(err) = call_method(&self.inner, "disable") {
            log::warn!("SDK disable failed: {err:?}");
        }
    }
}

fn call_method(target: &JsValue, name: &str) -> Result<JsValue, JsValue> {
    let method: Function = Reflect::get(target, &JsValue::from_str(name))?.dyn_into()?;
    method.call0(target)
}
