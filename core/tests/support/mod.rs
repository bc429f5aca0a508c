//! Shared fixtures for the integration tests.

use nin_core::{AttrDict, NdArray, Value, attr_dict};

/// The mapping used across the export tests: scalars, a list, nested
/// mappings (one empty) and numeric arrays at two depths.
#[allow(dead_code)]
pub fn sample_mapping() -> AttrDict {
    attr_dict! {
        "a" => 1,
        "b" => vec![1, 2],
        "c" => attr_dict! {
            "d" => 3,
            "e" => attr_dict! { "f" => 4, "h" => attr_dict! { "h" => 5, "j" => 6 } },
            "g" => 5,
        },
        "k" => AttrDict::new(),
        "l" => Vec::<Value>::new(),
        "m" => NdArray::from_vec(vec![1i64, 2, 3]),
        "n" => matrix(),
        "o" => attr_dict! { "p" => NdArray::from_vec(vec![1i64, 2, 3]), "q" => matrix() },
    }
}

/// A 2x3 integer matrix.
#[allow(dead_code)]
pub fn matrix() -> NdArray {
    NdArray::from_shape_vec(vec![2, 3], vec![1i64, 2, 3, 4, 5, 6]).unwrap()
}

/// Collect keys in order.
#[allow(dead_code)]
pub fn keys(dict: &AttrDict) -> Vec<String> {
    dict.keys().map(str::to_string).collect()
}
