//! Button rendering and host event wiring.
//!
//! A container is mount-eligible only while it exists in the DOM with zero
//! child elements, which keeps repeated render triggers idempotent. The
//! mini-cart placement is the deliberate exception: the host swaps that
//! widget's markup wholesale on fragment reloads, so its container is
//! cleared and re-mounted every time.

use std::rc::Rc;

use serde::Serialize;
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::{Object, Promise, Reflect};
use web_sys::Element;

use crate::bindings;
use crate::context::{CheckoutContext, Placement};
use crate::error::ButtonError;
use crate::flow::{Authorization, PaymentFlow};
use crate::gateway::{BrowserGateway, SdkAuthorizeActions, SdkButtonActions};

const MINI_CART_WIDGET_SELECTOR: &str = ".widget_shopping_cart #woo_pp_ec_button_mini_cart";
const PRODUCT_CONTAINER_SELECTOR: &str = "#woo_pp_ec_button_product";

/// Host events that re-attempt the page placement.
pub const CART_UPDATE_EVENTS: [&str; 2] = ["updated_cart_totals", "updated_checkout"];
/// Host events that replace the mini-cart widget markup.
pub const FRAGMENT_EVENTS: [&str; 2] = ["wc_fragments_loaded", "wc_fragments_refreshed"];

/// Container eligible for a fresh mount: present, with no child elements.
pub fn mount_target(selector: &str) -> Option<Element> {
    let container = gloo_utils::document()
        .query_selector(selector)
        .ok()
        .flatten()?;
    (container.children().length() == 0).then_some(container)
}

/// Mount one placement's button if its container is eligible. Missing or
/// already-populated containers skip silently; mount failures are logged,
/// never retried.
pub fn render(context: &Rc<CheckoutContext>, placement: Placement) {
    let Some(selector) = context.container_selector(placement) else {
        return;
    };
    let Some(container) = mount_target(&selector) else {
        log::debug!("skipping {selector}: container missing or already mounted");
        return;
    };

    let options = match render_options(context, placement, &container) {
        Ok(options) => options,
        Err(err) => {
            log::warn!("could not assemble button options for {selector}: {err:?}");
            return;
        }
    };

    // The returned promise settles after the SDK finishes mounting; there
    // is nothing useful to chain onto it.
    if let Err(err) = bindings::render_button(&options, &selector) {
        log::warn!("button render failed for {selector}: {err:?}");
    }
}

#[derive(Serialize)]
struct StyleOptions<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shape: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<&'a str>,
    branding: bool,
    tagline: bool,
}

#[derive(Serialize)]
struct StaticOptions<'a> {
    env: &'a str,
    locale: &'a str,
    commit: bool,
    style: StyleOptions<'a>,
}

fn render_options(
    context: &Rc<CheckoutContext>,
    placement: Placement,
    container: &Element,
) -> Result<JsValue, JsValue> {
    let settings = context.placement_settings(placement);

    let options = serde_wasm_bindgen::to_value(&StaticOptions {
        env: context.environment.as_str(),
        locale: &context.locale,
        commit: placement.from_checkout(),
        style: StyleOptions {
            color: context.button_color.as_deref(),
            shape: context.button_shape.as_deref(),
            label: context.button_label.as_deref(),
            layout: settings.layout.as_deref(),
            size: settings.size.as_deref(),
            branding: true,
            tagline: false,
        },
    })
    .map_err(|e| JsValue::from_str(&e.to_string()))?;

    // Funding lists carry opaque `paypal.FUNDING` values, so they bypass
    // serde; an unconfigured list is simply left off the object.
    let funding = Object::new();
    if let Some(allowed) = &settings.allowed {
        Reflect::set(&funding, &"allowed".into(), &bindings::funding_values(allowed))?;
    }
    if let Some(disallowed) = &settings.disallowed {
        Reflect::set(
            &funding,
            &"disallowed".into(),
            &bindings::funding_values(disallowed),
        )?;
    }
    Reflect::set(&options, &"funding".into(), &funding)?;

    let flow = Rc::new(PaymentFlow::new(
        placement,
        BrowserGateway::new(context.clone(), container.clone()),
    ));
    attach_lifecycle_callbacks(&options, flow)?;

    Ok(options)
}

fn attach_lifecycle_callbacks(
    options: &JsValue,
    flow: Rc<PaymentFlow<BrowserGateway>>,
) -> Result<(), JsValue> {
    let validate = Closure::wrap(Box::new(move |actions: JsValue| {
        wire_purchasability(SdkButtonActions::new(actions));
    }) as Box<dyn FnMut(JsValue)>);
    Reflect::set(options, &"validate".into(), validate.as_ref())?;
    validate.forget();

    let payment_flow = flow.clone();
    let payment = Closure::wrap(Box::new(move || -> Promise {
        let flow = payment_flow.clone();
        future_to_promise(async move {
            match flow.begin_payment().await {
                Ok(token) => Ok(JsValue::from_str(token.as_str())),
                // Host rejections already recovered through the fallback
                // form submission; hand the SDK a null token so it winds
                // down quietly. Everything else propagates to the SDK's
                // own error surface.
                Err(err) if err.is_recovered() => Ok(JsValue::NULL),
                Err(ButtonError::InFlight) => Ok(JsValue::NULL),
                Err(err) => Err(err.into()),
            }
        })
    }) as Box<dyn FnMut() -> Promise>);
    Reflect::set(options, &"payment".into(), payment.as_ref())?;
    payment.forget();

    let on_authorize = Closure::wrap(Box::new(move |data: JsValue, actions: JsValue| {
        let authorization: Authorization = match serde_wasm_bindgen::from_value(data) {
            Ok(authorization) => authorization,
            Err(err) => {
                log::warn!("unusable authorization payload: {err}");
                return;
            }
        };
        flow.authorize(&authorization, &SdkAuthorizeActions::new(actions));
    }) as Box<dyn FnMut(JsValue, JsValue)>);
    Reflect::set(options, &"onAuthorize".into(), on_authorize.as_ref())?;
    on_authorize.forget();

    Ok(())
}

/// Variable-product pages toggle purchasability as the buyer picks a
/// variation; the host signals it with `enable`/`disable` events on the
/// product button container.
fn wire_purchasability(actions: SdkButtonActions) {
    let Ok(Some(container)) = gloo_utils::document().query_selector(PRODUCT_CONTAINER_SELECTOR)
    else {
        return;
    };

    let enable_actions = actions.clone();
    let enable = Closure::wrap(Box::new(move || enable_actions.enable()) as Box<dyn FnMut()>);
    let _ = container.add_event_listener_with_callback("enable", enable.as_ref().unchecked_ref());
    enable.forget();

    let disable = Closure::wrap(Box::new(move || actions.disable()) as Box<dyn FnMut()>);
    let _ = container.add_event_listener_with_callback("disable", disable.as_ref().unchecked_ref());
    disable.forget();
}

/// Subscribe the page placement to cart/checkout updates and the mini-cart
/// placement to fragment reloads. Listeners live for the page lifetime.
pub fn listen_for_host_events(context: Rc<CheckoutContext>) {
    let body = gloo_utils::body();

    if context.page.is_some() {
        let page_context = context.clone();
        let remount = Closure::wrap(Box::new(move || {
            render(&page_context, Placement::on_page(page_context.page));
        }) as Box<dyn FnMut()>);
        for event in CART_UPDATE_EVENTS {
            let _ = body.add_event_listener_with_callback(event, remount.as_ref().unchecked_ref());
        }
        remount.forget();
    }

    let refresh = Closure::wrap(Box::new(move || {
        refresh_mini_cart(&context);
    }) as Box<dyn FnMut()>);
    for event in FRAGMENT_EVENTS {
        let _ = body.add_event_listener_with_callback(event, refresh.as_ref().unchecked_ref());
    }
    refresh.forget();
}

fn refresh_mini_cart(context: &Rc<CheckoutContext>) {
    let Ok(Some(container)) = gloo_utils::document().query_selector(MINI_CART_WIDGET_SELECTOR)
    else {
        return;
    };
    // The host replaced the widget markup wholesale; clear whatever button
    // instance came with it and mount a fresh one.
    container.set_inner_html("");
    render(context, Placement::mini_cart(context.page));
}
