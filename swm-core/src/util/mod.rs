#[cfg(feature = "config-file")]
pub(crate) mod load_cfg;
pub mod macros;
