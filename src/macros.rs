/// Declares method marker types.
///
/// ```
/// # use serde::{Deserialize, Serialize};
/// #[derive(Serialize, Deserialize)]
/// pub struct Greeting { pub name: String }
///
/// typedrpc::method! {
///     /// Says hello.
///     pub Hello = "hello": Greeting => String;
/// }
///
/// assert_eq!(<Hello as typedrpc::Method>::NAME, "hello");
/// ```
#[macro_export]
macro_rules! method {
    ($($(#[$meta:meta])* $vis:vis $marker:ident = $name:literal : $input:ty => $output:ty;)+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
            $vis struct $marker;

            impl $crate::Method for $marker {
                const NAME: &'static str = $name;
                type Input = $input;
                type Output = $output;
            }
        )+
    };
}

/// Declares a service: its marker type, the enum of its method names, and a
/// [`Provides`](crate::Provides) impl per method.
///
/// Empty or duplicate method names fail to compile.
///
/// ```compile_fail
/// typedrpc::method! {
///     pub First = "same": () => ();
///     pub Second = "same": () => ();
/// }
///
/// typedrpc::service! {
///     pub service Clash: ClashMethod {
///         First(First),
///         Second(Second),
///     }
/// }
/// ```
#[macro_export]
macro_rules! service {
    (
        $(#[$meta:meta])*
        $vis:vis service $service:ident : $names:ident {
            $($variant:ident ( $method:ty )),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        $vis struct $service;

        impl $crate::Service for $service {
            const NAME: &'static str = stringify!($service);
            type MethodName = $names;
        }

        #[doc = concat!("Every method name declared by [`", stringify!($service), "`].")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $names {
            $($variant,)+
        }

        impl $crate::MethodName for $names {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => <$method as $crate::Method>::NAME,)+
                }
            }
        }

        impl ::std::fmt::Display for $names {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::MethodName::as_str(*self))
            }
        }

        impl ::std::str::FromStr for $names {
            type Err = $crate::UnknownMethodName;

            fn from_str(name: &str) -> ::std::result::Result<Self, Self::Err> {
                $crate::parse_method_name(name)
            }
        }

        $(
            impl $crate::Provides<$method> for $service {
                const METHOD: $names = $names::$variant;
            }
        )+

        const _: () = assert!(
            $crate::names_are_valid(&[$(<$method as $crate::Method>::NAME),+]),
            concat!("service `", stringify!($service), "` declares an empty or duplicate method name"),
        );
    };
}
