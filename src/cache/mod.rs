pub mod detail;
pub mod fingerprint;

mod macros;

pub use detail::DetailCache;
pub use fingerprint::{Fingerprint, FingerprintCache};
