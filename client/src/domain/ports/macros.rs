//! Helper macro for declaring port error enums.
//!
//! Each generated enum derives `thiserror::Error`, gains one snake_case
//! constructor per variant (string-like fields accept `impl Into<String>`),
//! and exposes `kind()` so adapters can log the failure category without
//! formatting the whole message.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Construct the `", stringify!($variant), "` variant.")]
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
            #[doc = concat!("Construct the `", stringify!($variant), "` variant.")]
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

    (@pattern $variant:ident) => { Self::$variant };
    (@pattern $variant:ident { $($field:ident : $ty:ty),* }) => { Self::$variant { .. } };

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
                $variant $( {
                    $(
                        #[allow(missing_docs, reason = "described by the variant message")]
                        $field : $ty
                    ),*
                } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*

            /// Stable variant name used in structured log fields.
            pub fn kind(&self) -> &'static str {
                match self {
                    $(
                        define_port_error!(@pattern $variant $( { $($field : $ty),* } )?) =>
                            stringify!($variant),
                    )*
                }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    define_port_error! {
        /// Example error used to exercise the macro.
        pub enum ProbeError {
            /// Unit variant.
            Offline => "probe offline",
            /// Single string field.
            Refused { message: String } => "probe refused: {message}",
            /// Mixed field types.
            Throttled { message: String, retries: u32 } => "probe throttled: {message} ({retries})",
        }
    }

    #[test]
    fn string_fields_accept_borrowed_input() {
        let err = ProbeError::refused("connection reset");
        assert_eq!(err.to_string(), "probe refused: connection reset");
    }

    #[test]
    fn mixed_fields_keep_their_types() {
        let err = ProbeError::throttled("slow down", 3_u32);
        assert_eq!(err.to_string(), "probe throttled: slow down (3)");
    }

    #[test]
    fn kind_reports_variant_name() {
        assert_eq!(ProbeError::offline().kind(), "Offline");
        assert_eq!(ProbeError::refused("x").kind(), "Refused");
        assert_eq!(ProbeError::throttled("x", 1_u32).kind(), "Throttled");
    }
}
