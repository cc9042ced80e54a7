//! Pipeline stage implementations.
//!
//! Every stage has the signature `fn(&str, &mut RenderContext) -> String`
//! and is wired into [`PIPELINE`](crate::PIPELINE). A stage that is switched
//! off by [`RenderOptions`](crate::RenderOptions) returns its input unchanged.

pub(crate) mod block;
pub(crate) mod code;
pub(crate) mod inline;
pub(crate) mod list;
pub(crate) mod table;
