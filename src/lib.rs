//! ICC profile synthesis.
//!
//! Builds virtual profiles (matrix-shaper RGB, gray, Lab, XYZ, sRGB, abstract adjustments and
//! simple device links) and bakes arbitrary color transforms into device link profiles whose
//! pipelines can actually be stored in an ICC file.
//!
//! Heavily based on Little CMS.
//!
//! # Examples
//! ## Baking a Transform into a Device Link
//! See [`transform_to_device_link`](device_link/fn.transform_to_device_link.html) for the
//! details of how pipelines are fitted into storable layouts.
//!
//! ```
//! # use iccsynth::{*, pipeline::*, profile::*};
//! // an sRGB-ish transfer curve followed by a matrix, as in a linked display profile
//! let srgb = IccProfile::new_srgb().expect("failed to create sRGB profile");
//! assert_eq!(srgb.description(), Some("sRGB built-in"));
//!
//! let mut pipeline = Pipeline::new();
//! pipeline
//!     .append_stage(PipelineStage::new_curve_set(vec![ToneCurve::new_srgb(); 3]))
//!     .unwrap();
//! pipeline
//!     .append_stage(PipelineStage::new_matrix(
//!         3,
//!         vec![0.4361, 0.2225, 0.0139, 0.3851, 0.7169, 0.0971, 0.1431, 0.0606, 0.7141],
//!         None,
//!     ))
//!     .unwrap();
//! pipeline
//!     .append_stage(PipelineStage::new_ident_curve_set(3))
//!     .unwrap();
//!
//! let transform =
//!     Transform::new(pipeline, ColorSpace::RGB, ColorSpace::XYZ, Intent::Perceptual).unwrap();
//!
//! // version 4 profiles can hold a curves-matrix-curves pipeline as is
//! let link = transform.to_device_link(&DeviceLinkOptions::default()).unwrap();
//! assert_eq!(link.device_class, ProfileClass::Input);
//! assert!(link.contains_tag(IccTag::AToB0));
//!
//! // version 2 profiles need a lookup table
//! let options = DeviceLinkOptions {
//!     version: (2, 1),
//!     ..DeviceLinkOptions::default()
//! };
//! let link = transform.to_device_link(&options).unwrap();
//! let lut = link.get_tag(IccTag::AToB0).and_then(IccValue::as_pipeline).unwrap();
//! assert!(lut.stage_types().any(|ty| ty == StageType::CLut));
//! ```

#[macro_use]
mod util;

pub mod adjust;
pub mod color;
pub mod device_link;
pub mod encoding;
pub mod error;
pub mod fixed;
pub mod grid;
pub mod named;
pub mod pipeline;
pub mod profile;
pub mod tone_curve;
pub mod transform;

pub use device_link::DeviceLinkOptions;
pub use error::{ErrorKind, ProfileError, Result};
pub use profile::IccProfile;
pub use tone_curve::ToneCurve;
pub use transform::Transform;
