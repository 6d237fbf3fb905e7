//! Host-supplied checkout configuration.
//!
//! The storefront localizes one flat JSON object into the page (page
//! identifier, environment, endpoint URL, anti-forgery nonce, button
//! styling, funding lists). It is deserialized once at startup and injected
//! into every component as an immutable value; nothing in this crate reads
//! it back out of ambient globals.

use serde::Deserialize;
use wasm_bindgen::JsValue;

use crate::error::ButtonError;
use crate::funding::{self, FundingMethod};

/// Query marker appended to the session-start URL when the browser comes
/// back from PayPal's hosted pages.
pub const PROVIDER_RETURN_MARKER: &str = "woo-paypal-return=1";

const CONTAINER_ID_PREFIX: &str = "woo_pp_ec_button_";

/// Storefront page the script was enqueued on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Product,
    Cart,
    Checkout,
    /// Any page this crate has no dedicated button container for.
    #[serde(other)]
    Other,
}

impl Page {
    fn slug(self) -> Option<&'static str> {
        match self {
            Page::Product => Some("product"),
            Page::Cart => Some("cart"),
            Page::Checkout => Some("checkout"),
            Page::Other => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Sandbox,
    Production,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Sandbox => "sandbox",
            Environment::Production => "production",
        }
    }
}

/// One of the button spots on the page: the per-page placement or the
/// mini-cart widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub page: Option<Page>,
    pub mini_cart: bool,
}

impl Placement {
    pub fn on_page(page: Option<Page>) -> Self {
        Self {
            page,
            mini_cart: false,
        }
    }

    pub fn mini_cart(page: Option<Page>) -> Self {
        Self {
            page,
            mini_cart: true,
        }
    }

    /// `commit` flag for the SDK, and the `from_checkout` form field: only
    /// the checkout-page placement itself pays immediately.
    pub fn from_checkout(&self) -> bool {
        self.page == Some(Page::Checkout) && !self.mini_cart
    }

    /// Single-product activations must synthesize a cart first.
    pub fn is_single_product(&self) -> bool {
        self.page == Some(Page::Product) && !self.mini_cart
    }
}

/// Size/layout/funding settings resolved for one placement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlacementSettings {
    pub size: Option<String>,
    pub layout: Option<String>,
    pub allowed: Option<Vec<FundingMethod>>,
    pub disallowed: Option<Vec<FundingMethod>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CheckoutContext {
    #[serde(default)]
    pub page: Option<Page>,
    pub environment: Environment,
    #[serde(default = "default_locale")]
    pub locale: String,
    pub start_checkout_url: String,
    pub start_checkout_nonce: String,

    #[serde(default)]
    pub button_color: Option<String>,
    #[serde(default)]
    pub button_shape: Option<String>,
    #[serde(default)]
    pub button_label: Option<String>,

    #[serde(default)]
    pub button_size: Option<String>,
    #[serde(default)]
    pub button_layout: Option<String>,
    #[serde(default)]
    pub allowed_methods: Option<Vec<String>>,
    #[serde(default)]
    pub disallowed_methods: Option<Vec<String>>,

    #[serde(default)]
    pub mini_cart_button_size: Option<String>,
    #[serde(default)]
    pub mini_cart_button_layout: Option<String>,
    #[serde(default)]
    pub mini_cart_allowed_methods: Option<Vec<String>>,
    #[serde(default)]
    pub mini_cart_disallowed_methods: Option<Vec<String>>,
}

fn default_locale() -> String {
    "en_US".to_owned()
}

impl CheckoutContext {
    /// Deserialize the storefront's localized context object.
    pub fn from_js(value: JsValue) -> Result<Self, ButtonError> {
        serde_wasm_bindgen::from_value(value)
            .map_err(|e| ButtonError::Response(format!("invalid checkout context: {e}")))
    }

    /// True when the browser just navigated back from PayPal's hosted
    /// approval pages and the order needs server-side revalidation instead
    /// of any button rendering.
    pub fn is_provider_return(&self) -> bool {
        self.start_checkout_url.contains(PROVIDER_RETURN_MARKER)
    }

    /// CSS selector of the container this placement mounts into, if the
    /// page has one.
    pub fn container_selector(&self, placement: Placement) -> Option<String> {
        if placement.mini_cart {
            return Some(format!("#{CONTAINER_ID_PREFIX}mini_cart"));
        }
        let slug = placement.page?.slug()?;
        Some(format!("#{CONTAINER_ID_PREFIX}{slug}"))
    }

    /// Size, layout and funding lists for the given placement. The
    /// mini-cart placement reads only its own prefixed settings; an absent
    /// setting stays `None` so the SDK falls back to its defaults.
    pub fn placement_settings(&self, placement: Placement) -> PlacementSettings {
        let (size, layout, allowed, disallowed) = if placement.mini_cart {
            (
                &self.mini_cart_button_size,
                &self.mini_cart_button_layout,
                &self.mini_cart_allowed_methods,
                &self.mini_cart_disallowed_methods,
            )
        } else {
            (
                &self.button_size,
                &self.button_layout,
                &self.allowed_methods,
                &self.disallowed_methods,
            )
        };
        PlacementSettings {
            size: size.clone(),
            layout: layout.clone(),
            allowed: allowed.as_deref().map(funding::translate),
            disallowed: disallowed.as_deref().map(funding::translate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context(value: serde_json::Value) -> CheckoutContext {
        serde_json::from_value(value).expect("context should deserialize")
    }

    fn minimal() -> serde_json::Value {
        json!({
            "environment": "sandbox",
            "start_checkout_url": "https://shop.test/?wc-ajax=wc_ppec_start_checkout",
            "start_checkout_nonce": "a1b2c3",
        })
    }

    #[test]
    fn minimal_context_deserializes_with_defaults() {
        let ctx = context(minimal());
        assert_eq!(ctx.page, None);
        assert_eq!(ctx.environment, Environment::Sandbox);
        assert_eq!(ctx.locale, "en_US");
        assert!(ctx.button_color.is_none());
    }

    #[test]
    fn unknown_page_maps_to_other_and_has_no_container() {
        let mut value = minimal();
        value["page"] = json!("order_received");
        let ctx = context(value);
        assert_eq!(ctx.page, Some(Page::Other));
        assert_eq!(
            ctx.container_selector(Placement::on_page(ctx.page)),
            None
        );
    }

    #[test]
    fn container_selectors_follow_the_host_convention() {
        let mut value = minimal();
        value["page"] = json!("product");
        let ctx = context(value);
        assert_eq!(
            ctx.container_selector(Placement::on_page(ctx.page)).as_deref(),
            Some("#woo_pp_ec_button_product")
        );
        assert_eq!(
            ctx.container_selector(Placement::mini_cart(ctx.page)).as_deref(),
            Some("#woo_pp_ec_button_mini_cart")
        );
    }

    #[test]
    fn mini_cart_placement_reads_only_prefixed_settings() {
        let mut value = minimal();
        value["button_size"] = json!("responsive");
        value["button_layout"] = json!("vertical");
        value["allowed_methods"] = json!(["CARD"]);
        value["mini_cart_button_size"] = json!("small");
        let ctx = context(value);

        let page = ctx.placement_settings(Placement::on_page(Some(Page::Cart)));
        assert_eq!(page.size.as_deref(), Some("responsive"));
        assert_eq!(page.allowed, Some(vec![FundingMethod::Card]));

        let mini = ctx.placement_settings(Placement::mini_cart(Some(Page::Cart)));
        assert_eq!(mini.size.as_deref(), Some("small"));
        assert_eq!(mini.layout, None);
        assert_eq!(mini.allowed, None);
    }

    #[test]
    fn provider_return_marker_is_detected_in_the_configured_url() {
        let mut value = minimal();
        value["start_checkout_url"] =
            json!("https://shop.test/?wc-ajax=wc_ppec_start_checkout&woo-paypal-return=1");
        assert!(context(value).is_provider_return());
        assert!(!context(minimal()).is_provider_return());
    }

    #[test]
    fn only_the_checkout_page_placement_commits() {
        assert!(Placement::on_page(Some(Page::Checkout)).from_checkout());
        assert!(!Placement::mini_cart(Some(Page::Checkout)).from_checkout());
        assert!(!Placement::on_page(Some(Page::Cart)).from_checkout());
        assert!(Placement::on_page(Some(Page::Product)).is_single_product());
        assert!(!Placement::mini_cart(Some(Page::Product)).is_single_product());
    }
}
