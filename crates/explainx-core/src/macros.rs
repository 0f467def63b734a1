//! Declarative sugar for traced functions.

/// Define a function whose every call is recorded on the given context.
///
/// The first parameter must be the request's `&TraceContext`; it is not
/// recorded. Every other parameter is snapshotted under its own name. The
/// function keeps its signature, so callers cannot tell it is traced.
///
/// A function written as returning `Result<T, E>` goes through
/// [`TraceContext::try_record`](crate::TraceContext::try_record): an `Err` is
/// recorded as a failed call and handed back unchanged. Any other return type
/// goes through [`TraceContext::record`](crate::TraceContext::record).
///
/// ```ignore
/// traced! {
///     pub fn apply_tax(ctx: &TraceContext, amount: f64, state: &str) -> f64 {
///         amount * rate_for(state)
///     }
/// }
/// ```
#[macro_export]
macro_rules! traced {
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident (
            $ctx:ident : $ctx_ty:ty $(, $arg:ident : $ty:ty)* $(,)?
        ) -> Result<$ok:ty, $err:ty> $body:block
    ) => {
        $(#[$meta])*
        $vis fn $name($ctx: $ctx_ty $(, $arg: $ty)*) -> ::core::result::Result<$ok, $err> {
            const __EXPLAINX_SITE: $crate::CallSite = $crate::CallSite::new(
                stringify!($name),
                concat!(file!(), ":", line!()),
                stringify!(
                    fn $name($ctx: $ctx_ty $(, $arg: $ty)*) -> Result<$ok, $err> $body
                ),
                &[$(stringify!($arg)),*],
            );
            let inputs = $crate::Inputs::new() $(.arg(stringify!($arg), &$arg))*;
            $ctx.try_record(
                &__EXPLAINX_SITE,
                inputs,
                move || -> ::core::result::Result<$ok, $err> { $body },
            )
        }
    };

    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident (
            $ctx:ident : $ctx_ty:ty $(, $arg:ident : $ty:ty)* $(,)?
        ) -> $ret:ty $body:block
    ) => {
        $(#[$meta])*
        $vis fn $name($ctx: $ctx_ty $(, $arg: $ty)*) -> $ret {
            const __EXPLAINX_SITE: $crate::CallSite = $crate::CallSite::new(
                stringify!($name),
                concat!(file!(), ":", line!()),
                stringify!(fn $name($ctx: $ctx_ty $(, $arg: $ty)*) -> $ret $body),
                &[$(stringify!($arg)),*],
            );
            let inputs = $crate::Inputs::new() $(.arg(stringify!($arg), &$arg))*;
            $ctx.record(&__EXPLAINX_SITE, inputs, move || -> $ret { $body })
        }
    };
}
