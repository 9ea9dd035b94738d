pub use tenon_core::*;
