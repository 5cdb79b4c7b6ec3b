pub mod proxy;
pub mod sbt;
pub mod vendor_sbt;
