//! Static element type tags for the arrays handed to the converter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Element type of a numeric array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Bool,
}

impl Dtype {
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Dtype::Int8
                | Dtype::Int16
                | Dtype::Int32
                | Dtype::Int64
                | Dtype::UInt8
                | Dtype::UInt16
                | Dtype::UInt32
                | Dtype::UInt64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, Dtype::Float32 | Dtype::Float64)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dtype::Int8 => "int8",
            Dtype::Int16 => "int16",
            Dtype::Int32 => "int32",
            Dtype::Int64 => "int64",
            Dtype::UInt8 => "uint8",
            Dtype::UInt16 => "uint16",
            Dtype::UInt32 => "uint32",
            Dtype::UInt64 => "uint64",
            Dtype::Float32 => "float32",
            Dtype::Float64 => "float64",
            Dtype::Bool => "bool",
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scalar that can sit in a feature matrix or target vector.
///
/// `DTYPE` is the only thing task inference looks at; `render` is the text
/// that ends up inside generated facts.
pub trait Element: Copy {
    const DTYPE: Dtype;

    /// Natural decimal rendering: `3`, `-1`, `0.1`, `2.0`.
    fn render(&self) -> String;

    /// Integer value of the element, `None` for non-integer dtypes.
    fn as_label(&self) -> Option<i128>;
}

macro_rules! impl_int_element {
    ($($t:ty => $d:ident),* $(,)?) => {
        $(
            impl Element for $t {
                const DTYPE: Dtype = Dtype::$d;

                fn render(&self) -> String {
                    self.to_string()
                }

                fn as_label(&self) -> Option<i128> {
                    Some(*self as i128)
                }
            }
        )*
    };
}

macro_rules! impl_float_element {
    ($($t:ty => $d:ident),* $(,)?) => {
        $(
            impl Element for $t {
                const DTYPE: Dtype = Dtype::$d;

                // Debug keeps the trailing `.0` on integral values.
                fn render(&self) -> String {
                    format!("{:?}", self)
                }

                fn as_label(&self) -> Option<i128> {
                    None
                }
            }
        )*
    };
}

impl_int_element!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
);

impl_float_element!(f32 => Float32, f64 => Float64);

impl Element for bool {
    const DTYPE: Dtype = Dtype::Bool;

    fn render(&self) -> String {
        String::from(if *self { "1" } else { "0" })
    }

    fn as_label(&self) -> Option<i128> {
        None
    }
}
