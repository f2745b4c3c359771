//! Defines helper macros for generating domain port error enums.
//!
//! Each port owns a small error enum; the macro derives `thiserror::Error`
//! and emits one snake-case constructor per variant.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for generated port error constructors.
    define_port_error! {
        pub enum ExampleFeedError {
            Timeout { message: String } => "feed timed out: {message}",
            Status { code: u16 } => "feed returned status {code}",
            Rejected { message: String, count: u32 } => "rejected {count}: {message}",
            Closed => "feed closed",
        }
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = ExampleFeedError::timeout("after 60s");
        assert_eq!(err.to_string(), "feed timed out: after 60s");
    }

    #[test]
    fn constructors_preserve_non_string_types() {
        let err = ExampleFeedError::status(503_u16);
        assert_eq!(err.to_string(), "feed returned status 503");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = ExampleFeedError::rejected("bad row", 2_u32);
        assert_eq!(err.to_string(), "rejected 2: bad row");
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(ExampleFeedError::closed(), ExampleFeedError::Closed);
    }
}
