mod bindings;
mod boot;
mod buttons;
mod component;
mod context;
mod error;
mod flow;
mod form;
mod funding;
mod gateway;
mod interop;
mod notices;

pub use bindings::*;
pub use boot::*;
pub use buttons::*;
pub use component::*;
pub use context::*;
pub use error::*;
pub use flow::*;
pub use form::*;
pub use funding::*;
pub use gateway::*;
pub use interop::*;
pub use notices::*;
