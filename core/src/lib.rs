//! nincore - an ordered mapping with attribute-style access.
//!
//! [`AttrDict`] keeps keys in insertion order, wraps every nested mapping
//! as another `AttrDict`, can hand out defaults for absent keys, and saves
//! itself as JSON, YAML or a binary object after turning numeric arrays
//! into nested lists.
//!
//! ```
//! use nin_core::{attr_dict, AttrDict, Value};
//!
//! let mut config = attr_dict! {
//!     "lr" => 0.1,
//!     "model" => attr_dict! { "depth" => 4 },
//! };
//! config.set_attr("epochs", 10);
//!
//! let depth = config
//!     .get("model")
//!     .and_then(Value::as_map)
//!     .and_then(|m| m.get("depth"));
//! assert_eq!(depth, Some(&Value::Int(4)));
//! ```
//!
//! YAML and binary export are behind the `yaml` and `binary` features,
//! both on by default.

pub mod array;
pub mod attrdict;
mod display;
pub mod export;
pub mod value;

pub use array::{ArrayData, NdArray};
pub use attrdict::{AttrDict, Lookup, MissingKey, factory_default, set_factory_default};
pub use export::{JsonOptions, Placeholder};
pub use nin_common::error::{CommonError, Result};
pub use value::Value;

/// Build a strict [`AttrDict`] from `key => value` pairs, in order.
///
/// ```
/// use nin_core::attr_dict;
///
/// let d = attr_dict! { "a" => 1, "b" => attr_dict! { "c" => "x" } };
/// assert_eq!(d.keys().collect::<Vec<_>>(), vec!["a", "b"]);
/// ```
#[macro_export]
macro_rules! attr_dict {
    () => {
        $crate::AttrDict::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut dict = $crate::AttrDict::new();
        $(
            dict.set_item($key, $value);
        )+
        dict
    }};
}
