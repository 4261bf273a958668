#![crate_type = "lib"]
#![deny(trivial_casts, trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    missing_docs,
    unused_qualifications,
    unused_import_braces
)]
#![recursion_limit = "60"]

//! This is the core DICOM library, containing various concepts, data structures
//! and traits specific to DICOM content: attribute tags, value representations,
//! element headers and values, a data dictionary abstraction, and attribute
//! selectors for addressing nested attributes.

pub mod dictionary;
pub mod error;
pub mod header;
pub mod ops;
pub mod value;

pub use dictionary::DataDictionary;
pub use error::{Error, Result};
pub use header::{DataElement, DataElementHeader, EmptyObject, HasLength, Length, Tag, VR};
pub use value::{PrimitiveValue, Value as DicomValue};

/// Construct a [`PrimitiveValue`](crate::value::PrimitiveValue) of a given
/// variant from one or more elements, converting each one with `Into`.
///
/// ```
/// # use dicom_core::dicom_value;
/// # use dicom_core::value::PrimitiveValue;
/// assert_eq!(
///     dicom_value!(Strs, ["DERIVED", "PRIMARY"]),
///     PrimitiveValue::Strs(["DERIVED", "PRIMARY"].iter().map(|s| s.to_string()).collect()),
/// );
/// assert_eq!(dicom_value!(U16, 512), PrimitiveValue::from(512_u16));
/// ```
#[macro_export]
macro_rules! dicom_value {
    ($typ: ident, [ $($elem: expr),* $(,)* ]) => {
        $crate::value::PrimitiveValue::$typ(
            $crate::value::C::from(vec![$($elem.into()),*])
        )
    };
    ($typ: ident, $elem: expr) => {
        $crate::value::PrimitiveValue::$typ(
            $crate::value::C::from_elem($elem.into(), 1)
        )
    };
}
