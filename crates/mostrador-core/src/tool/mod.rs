//! Tool domain module.
//!
//! # Module Structure
//!
//! - `call`: the `ToolCall` type and argument accessors
//! - `registry`: the closed set of builtin tools (`ToolKind`, `ToolSpec`, `ToolRegistry`)
//! - `normalize`: alias resolution applied before dispatch
//! - `output`: tool results and their bullet rendering
//! - `dispatch`: typed handlers behind `ToolDispatcher`

mod call;
mod dispatch;
mod normalize;
mod output;
mod registry;

pub use call::{ToolArguments, ToolCall, arg_f64, arg_str};
pub use dispatch::{ToolContext, ToolDispatcher, ToolExecution};
pub use normalize::{canonical_name, normalize, normalize_call};
pub use output::{ToolOutput, render_products};
pub use registry::{ParamDefault, ParamSpec, ParamType, ToolKind, ToolRegistry, ToolSpec};
