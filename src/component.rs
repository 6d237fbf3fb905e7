//! A drop-in Yew component for storefronts rendered with Yew.
//!
//! `SmartButtons` renders the button container for the configured page and
//! boots the full orchestration — return-flow guard, initial render, host
//! event wiring — once checkout.js has loaded. The mini-cart container is
//! owned by the storefront's cart widget, not by this component.
//!
//! # Example
//!
//! ```rust,ignore
//! use yew::prelude::*;
//! use wc_paypal_buttons::{CheckoutContext, SmartButtons};
//!
//! #[function_component(CartPage)]
//! fn cart_page() -> Html {
//!     let context: CheckoutContext = use_context::<StoreSettings>()
//!         .expect("store settings")
//!         .paypal_context();
//!     html! {
//!         <>
//!             <CartTotals />
//!             <SmartButtons {context} />
//!         </>
//!     }
//! }
//! ```

use yew::prelude::*;

use crate::boot::boot;
use crate::context::{CheckoutContext, Placement};
use crate::interop::use_checkout_js;

#[derive(Properties, PartialEq, Clone)]
pub struct SmartButtonsProps {
    /// The storefront's localized checkout configuration.
    pub context: CheckoutContext,
}

#[function_component(SmartButtons)]
pub fn smart_buttons(props: &SmartButtonsProps) -> Html {
    let sdk_ready = use_checkout_js();

    {
        let context = props.context.clone();
        use_effect_with(sdk_ready, move |ready| {
            if *ready {
                boot(context);
            }
            || ()
        });
    }

    let container_id = props
        .context
        .container_selector(Placement::on_page(props.context.page))
        .map(|selector| selector.trim_start_matches('#').to_owned());

    match container_id {
        Some(id) => html! { <div id={id} class="wc-paypal-buttons"></div> },
        None => Html::default(),
    }
}
