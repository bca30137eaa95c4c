mod key;
mod params;

pub use key::{validate_filename, validate_tenant_key};
pub use params::{clamp_dimension, clamp_quality};
