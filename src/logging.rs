//! Crate-internal logging macros.
//!
//! With the `tracing` feature enabled every macro forwards to the matching `tracing` macro under
//! the `vault_scanner` target. Without it the macros only evaluate their field expressions by
//! reference, so call sites compile the same either way and nothing is emitted.

#[cfg(feature = "tracing")]
macro_rules! error {
    ($($arg:tt)*) => {
        tracing::error!(target: "vault_scanner", $($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::__discard_fields!($($arg)*)
    };
}

#[cfg(feature = "tracing")]
macro_rules! info {
    ($($arg:tt)*) => {
        tracing::info!(target: "vault_scanner", $($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::__discard_fields!($($arg)*)
    };
}

#[cfg(feature = "tracing")]
macro_rules! debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "vault_scanner", $($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::__discard_fields!($($arg)*)
    };
}

#[cfg(feature = "tracing")]
macro_rules! trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "vault_scanner", $($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace {
    ($($arg:tt)*) => {
        $crate::__discard_fields!($($arg)*)
    };
}

#[doc(hidden)]
#[macro_export]
#[cfg(not(feature = "tracing"))]
macro_rules! __discard_fields {
    ($field:ident = % $value:expr, $($rest:tt)*) => {
        { let _ = &$value; $crate::__discard_fields!($($rest)*); }
    };
    ($field:ident = ? $value:expr, $($rest:tt)*) => {
        { let _ = &$value; $crate::__discard_fields!($($rest)*); }
    };
    ($field:ident = $value:expr, $($rest:tt)*) => {
        { let _ = &$value; $crate::__discard_fields!($($rest)*); }
    };
    // shorthand `field,` records a local of the same name
    ($field:ident, $($rest:tt)*) => {
        { let _ = &$field; $crate::__discard_fields!($($rest)*); }
    };
    ($message:literal $($rest:tt)*) => {
        $crate::__discard_fields!($($rest)*)
    };
    () => {};
}

#[cfg(test)]
mod tests {
    #[test]
    fn accepts_every_field_form_used_by_the_scanner() {
        let head = 58_000u64;
        let range = 8_000u64..=17_999;
        let error = std::io::Error::other("boom");

        info!(head, cursor = 18_000u64, "processing block");
        debug!(block_range = ?range, head, "Issuing batch");
        error!(error = %error, "failed to get logs for block range");
        trace!("decoded status update");

        assert_eq!(head, 58_000);
        assert_eq!(range.count(), 10_000);
    }
}
