#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use pcreg_3d as k3d;

#[doc(inline)]
pub use pcreg_augment as augment;

#[doc(inline)]
pub use pcreg_icp as icp;
