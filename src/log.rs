//! Logging shim for the library.
//!
//! Forwards to `defmt` when the `defmt` feature is enabled, prints to stderr
//! in host tests, and compiles to nothing otherwise. Only the `{}` / `{:?}`
//! placeholders are understood by both back ends.

#![allow(unused_macros)]

#[cfg(all(not(test), feature = "defmt"))]
macro_rules! debug {
    ($($arg:expr),*) => {
        defmt::debug!($($arg,)*)
    };
}

#[cfg(all(not(test), feature = "defmt"))]
macro_rules! info {
    ($($arg:expr),*) => {
        defmt::info!($($arg,)*)
    };
}

#[cfg(all(not(test), feature = "defmt"))]
macro_rules! warn {
    ($($arg:expr),*) => {
        defmt::warn!($($arg,)*)
    };
}

#[cfg(test)]
macro_rules! debug {
    ($($arg:expr),*) => {
        std::eprintln!("DEBUG: {}", std::format!($($arg,)*))
    };
}

#[cfg(test)]
macro_rules! info {
    ($($arg:expr),*) => {
        std::eprintln!("INFO: {}", std::format!($($arg,)*))
    };
}

#[cfg(test)]
macro_rules! warn {
    ($($arg:expr),*) => {
        std::eprintln!("WARN: {}", std::format!($($arg,)*))
    };
}

#[cfg(all(not(test), not(feature = "defmt")))]
macro_rules! debug {
    ($($arg:expr),*) => {{
        let _ = ($(&$arg),*);
    }};
}

#[cfg(all(not(test), not(feature = "defmt")))]
macro_rules! info {
    ($($arg:expr),*) => {{
        let _ = ($(&$arg),*);
    }};
}

#[cfg(all(not(test), not(feature = "defmt")))]
macro_rules! warn {
    ($($arg:expr),*) => {{
        let _ = ($(&$arg),*);
    }};
}
