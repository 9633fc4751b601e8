//! Internal helper macros.

/// Returns early with `$error` unless `$predicate` holds.
///
/// ```ignore
/// ensure!(first_space > 0, ParseError::bad_request_line("missing method"));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
