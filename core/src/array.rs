//! Dense N-dimensional numeric arrays.
//!
//! Arrays are stored row-major next to their shape. Exporters never see
//! them directly: normalization turns each array into nested sequences
//! first (see [`NdArray::to_nested`]).

use nin_common::error::{CommonError, Result};

use crate::value::Value;

/// Flat element storage of an [`NdArray`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "binary", derive(bincode::Encode, bincode::Decode))]
pub enum ArrayData {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Bool(Vec<bool>),
}

impl ArrayData {
    /// Number of stored elements.
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Int(v) => v.len(),
            ArrayData::Float(v) => v.len(),
            ArrayData::Bool(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element type name.
    pub fn dtype(&self) -> &'static str {
        match self {
            ArrayData::Int(_) => "int64",
            ArrayData::Float(_) => "float64",
            ArrayData::Bool(_) => "bool",
        }
    }

    fn scalar(&self, index: usize) -> Value {
        match self {
            ArrayData::Int(v) => Value::Int(v[index]),
            ArrayData::Float(v) => Value::Float(v[index]),
            ArrayData::Bool(v) => Value::Bool(v[index]),
        }
    }
}

impl From<Vec<i64>> for ArrayData {
    fn from(v: Vec<i64>) -> Self {
        ArrayData::Int(v)
    }
}

impl From<Vec<i32>> for ArrayData {
    fn from(v: Vec<i32>) -> Self {
        ArrayData::Int(v.into_iter().map(i64::from).collect())
    }
}

impl From<Vec<f64>> for ArrayData {
    fn from(v: Vec<f64>) -> Self {
        ArrayData::Float(v)
    }
}

impl From<Vec<f32>> for ArrayData {
    fn from(v: Vec<f32>) -> Self {
        ArrayData::Float(v.into_iter().map(f64::from).collect())
    }
}

impl From<Vec<bool>> for ArrayData {
    fn from(v: Vec<bool>) -> Self {
        ArrayData::Bool(v)
    }
}

/// A dense numeric array with an explicit shape.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "binary", derive(bincode::Encode))]
pub struct NdArray {
    shape: Vec<usize>,
    data: ArrayData,
}

impl NdArray {
    /// Build an array from a shape and row-major elements.
    ///
    /// Fails with `InvalidArgument` when the element count does not match
    /// the product of `shape`. An empty shape describes a single scalar.
    pub fn from_shape_vec<D: Into<ArrayData>>(shape: Vec<usize>, data: D) -> Result<Self> {
        let data = data.into();
        // Nonzero axes must fit in `usize` even when a zero axis empties
        // the array, so every stride is representable.
        let nonzero = shape
            .iter()
            .filter(|&&dim| dim != 0)
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
            .ok_or_else(|| CommonError::invalid_argument(format!("shape {shape:?} overflows")))?;
        let expected = if shape.contains(&0) { 0 } else { nonzero };
        if expected != data.len() {
            return Err(CommonError::invalid_argument(format!(
                "shape {:?} needs {} elements, got {}",
                shape,
                expected,
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// Build a one-dimensional array.
    pub fn from_vec<D: Into<ArrayData>>(data: D) -> Self {
        let data = data.into();
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    /// Convert to nested plain sequences following the shape.
    ///
    /// A zero-dimensional array becomes its single scalar.
    pub fn to_nested(&self) -> Value {
        self.nest(0, 0)
    }

    fn nest(&self, axis: usize, offset: usize) -> Value {
        if axis == self.shape.len() {
            return self.data.scalar(offset);
        }
        let len = self.shape[axis];
        if len == 0 {
            return Value::Seq(Vec::new());
        }
        let trailing = &self.shape[axis + 1..];
        let stride: usize = if trailing.contains(&0) {
            0
        } else {
            trailing.iter().product()
        };
        Value::Seq(
            (0..len)
                .map(|i| self.nest(axis + 1, offset + i * stride))
                .collect(),
        )
    }
}

/// Decoding goes through [`NdArray::from_shape_vec`], so a corrupted file
/// cannot produce an array whose shape disagrees with its data.
#[cfg(feature = "binary")]
impl<Context> bincode::Decode<Context> for NdArray {
    fn decode<D: bincode::de::Decoder<Context = Context>>(
        decoder: &mut D,
    ) -> std::result::Result<Self, bincode::error::DecodeError> {
        let shape: Vec<usize> = bincode::Decode::decode(decoder)?;
        let data: ArrayData = bincode::Decode::decode(decoder)?;
        NdArray::from_shape_vec(shape, data)
            .map_err(|err| bincode::error::DecodeError::OtherString(err.to_string()))
    }
}

#[cfg(feature = "binary")]
bincode::impl_borrow_decode!(NdArray);
