//! The protocol's wire vocabulary, re-exported under a short name.
//!
//! Every module in this crate reaches wire types through `crate::xdr::*`
//! rather than depending on `stellar_xdr` directly, matching how the
//! upstream CLI aliases `stellar_xdr::curr` as `xdr` throughout its source.

pub use stellar_xdr::curr::*;
