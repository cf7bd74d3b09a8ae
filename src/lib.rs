#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

cfg_if::cfg_if! {
    if #[cfg(feature = "log")] {
        pub(crate) use log::debug;
        pub(crate) use log::trace;
    } else {
        macro_rules! debug {
            ($($arg:tt)+) => {{
                let _ = format_args!($($arg)+);
            }};
        }

        macro_rules! trace {
            ($($arg:tt)+) => {{
                let _ = format_args!($($arg)+);
            }};
        }
    }
}

mod error;
mod handle;

pub mod prime;

pub mod table;

pub use error::TableError;
pub use handle::Handle;
pub use table::SlotView;
pub use table::Table;
#[cfg(feature = "stats")]
pub use table::TableStats;
