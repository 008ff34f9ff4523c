//! Route tree parsing and the depth-first evaluator that binds an alert to
//! an ordered, deduplicated sequence of (receiver, group parameters).

pub mod tree;

pub use tree::{Binding, GroupParams, RouteError, RouteNode, RouteTree, RouteTreeHandle};
