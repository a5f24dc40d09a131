pub mod generic;
pub mod overrides;
pub mod remote;

pub use generic::GenericSource;
pub use overrides::OverrideSource;
pub use remote::RemoteSource;
