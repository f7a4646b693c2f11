//! Dimension-table macro for the address generator.
//!
//! # Example
//! ```rust
//! use stridesim::dims;
//!
//! let dimensions = dims![
//!     { len: 3, stride: 4 },
//!     { len: 2, stride: 100 },
//!     { off },
//! ];
//! assert_eq!(dimensions.len(), 3);
//! assert!(!dimensions[2].enabled);
//! ```

/// Build a `Vec<DimensionConfig>`, fastest-varying dimension first.
///
/// Entries are `{ len: <expr>, stride: <expr> }` for enabled dimensions or
/// `{ off }` for a disabled placeholder.
#[macro_export]
macro_rules! dims {
    ( $( { $($entry:tt)* } ),* $(,)? ) => {
        vec![ $( $crate::dims!(@entry $($entry)*) ),* ]
    };
    (@entry len: $len:expr, stride: $stride:expr $(,)?) => {
        $crate::core::config::DimensionConfig::new($len, $stride)
    };
    (@entry off) => {
        $crate::core::config::DimensionConfig::disabled()
    };
}
