// Minimal cart page that mounts the smart payment buttons. Point
// `start_checkout_url` at a storefront backend (or a mock) that speaks the
// session-start contract.

use wasm_bindgen::prelude::*;
use yew::prelude::*;

use wc_paypal_buttons::{CheckoutContext, SmartButtons};

#[wasm_bindgen(start)]
pub fn start() {
    yew::Renderer::<CartDemo>::new().render();
}

#[function_component(CartDemo)]
fn cart_demo() -> Html {
    let context: CheckoutContext = serde_json::from_value(serde_json::json!({
        "page": "cart",
        "environment": "sandbox",
        "locale": "en_US",
        "start_checkout_url": "http://127.0.0.1:8080/?wc-ajax=wc_ppec_start_checkout",
        "start_checkout_nonce": "demo-nonce",
        "button_color": "gold",
        "button_shape": "rect",
        "button_size": "responsive",
        "allowed_methods": ["CARD", "VENMO"],
    }))
    .expect("demo context");

    html! {
        <main>
            <h1>{ "Your cart" }</h1>
            <p>{ "Awesome T-shirt — $25.00" }</p>
            <SmartButtons {context} />
        </main>
    }
}
