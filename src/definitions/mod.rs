//! Breakpoint range definitions.
//!
//! Typed definitions, the four inclusion modes, callback phases, the built-in
//! breakpoint set and the validation rules shared by construction and the
//! mutation operations. JSON loading lives in `json`.

mod core;
mod json;

pub use self::core::{
    Callback, Inclusion, Phase, RangeDefinition, WidthDefinitions, builtin_definitions,
    is_width_included, validate_definitions,
};
pub use json::definitions_from_json;

pub(crate) use json::type_name;
