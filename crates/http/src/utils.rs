//! Utility macros for the transport crate.

/// Early-returns `Err($error)` when `$predicate` does not hold.
///
/// ```ignore
/// ensure!(!certs.is_empty(), TlsError::no_certificates(path));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
