// Adapters layer: concrete calendar sources and stores behind the domain ports.

pub mod source;
pub mod store;
