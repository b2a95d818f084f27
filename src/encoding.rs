//! Stage layouts that can be stored in a profile.
//!
//! Only a few sequences of stages can be written to the LUT tag types of each profile version.
//! [`ALLOWED_ENCODINGS`] lists them, and [`find_encoding`] picks the first one a pipeline fits.

use crate::pipeline::{Pipeline, StageType};
use crate::profile::{IccDataType, IccTag};
use tracing::trace;

/// A stage sequence that a LUT tag type can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowedEncoding {
    /// Whether this layout belongs to version 4 profiles (otherwise version 2).
    pub is_v4: bool,
    /// The only destination tag this layout may be written to, if restricted.
    pub required_tag: Option<IccTag>,
    /// The tag type the pipeline is serialized as.
    pub lut_type: IccDataType,
    /// Expected stage types, in order.
    pub stages: &'static [StageType],
}

use StageType::{CLut, CurveSet, Matrix};

/// All legal layouts, in order of preference.
pub static ALLOWED_ENCODINGS: [AllowedEncoding; 11] = [
    AllowedEncoding {
        is_v4: false,
        required_tag: None,
        lut_type: IccDataType::Lut16,
        stages: &[Matrix, CurveSet, CLut, CurveSet],
    },
    AllowedEncoding {
        is_v4: false,
        required_tag: None,
        lut_type: IccDataType::Lut16,
        stages: &[CurveSet, CLut, CurveSet],
    },
    AllowedEncoding {
        is_v4: false,
        required_tag: None,
        lut_type: IccDataType::Lut16,
        stages: &[CurveSet, CLut],
    },
    AllowedEncoding {
        is_v4: true,
        required_tag: None,
        lut_type: IccDataType::LutAToB,
        stages: &[CurveSet],
    },
    AllowedEncoding {
        is_v4: true,
        required_tag: Some(IccTag::AToB0),
        lut_type: IccDataType::LutAToB,
        stages: &[CurveSet, Matrix, CurveSet],
    },
    AllowedEncoding {
        is_v4: true,
        required_tag: Some(IccTag::AToB0),
        lut_type: IccDataType::LutAToB,
        stages: &[CurveSet, CLut, CurveSet],
    },
    AllowedEncoding {
        is_v4: true,
        required_tag: Some(IccTag::AToB0),
        lut_type: IccDataType::LutAToB,
        stages: &[CurveSet, CLut, CurveSet, Matrix, CurveSet],
    },
    AllowedEncoding {
        is_v4: true,
        required_tag: Some(IccTag::BToA0),
        lut_type: IccDataType::LutBToA,
        stages: &[CurveSet],
    },
    AllowedEncoding {
        is_v4: true,
        required_tag: Some(IccTag::BToA0),
        lut_type: IccDataType::LutBToA,
        stages: &[CurveSet, Matrix, CurveSet],
    },
    AllowedEncoding {
        is_v4: true,
        required_tag: Some(IccTag::BToA0),
        lut_type: IccDataType::LutBToA,
        stages: &[CurveSet, CLut, CurveSet],
    },
    AllowedEncoding {
        is_v4: true,
        required_tag: Some(IccTag::BToA0),
        lut_type: IccDataType::LutBToA,
        stages: &[CurveSet, Matrix, CurveSet, CLut, CurveSet],
    },
];

/// Returns true if the pipeline's stage types are exactly those of the encoding.
pub fn matches_exactly(pipeline: &Pipeline, encoding: &AllowedEncoding) -> bool {
    pipeline.stages().len() == encoding.stages.len()
        && pipeline
            .stage_types()
            .zip(encoding.stages)
            .all(|(ty, expected)| ty == *expected)
}

/// Finds the first encoding of the requested version that can be written to `destination` and
/// that the pipeline matches exactly.
///
/// # Examples
/// ```
/// # use iccsynth::encoding::find_encoding;
/// # use iccsynth::pipeline::{Pipeline, PipelineStage};
/// # use iccsynth::profile::IccTag;
/// let mut pipeline = Pipeline::new();
/// pipeline.append_stage(PipelineStage::new_ident_curve_set(3)).unwrap();
///
/// assert!(find_encoding(&pipeline, true, IccTag::AToB0).is_some());
/// // version 2 LUTs always need a table
/// assert!(find_encoding(&pipeline, false, IccTag::AToB0).is_none());
/// ```
pub fn find_encoding(
    pipeline: &Pipeline,
    is_v4: bool,
    destination: IccTag,
) -> Option<&'static AllowedEncoding> {
    ALLOWED_ENCODINGS
        .iter()
        .enumerate()
        .filter(|(_, encoding)| encoding.is_v4 == is_v4)
        .filter(|(_, encoding)| encoding.required_tag.map_or(true, |tag| tag == destination))
        .find(|(index, encoding)| {
            let found = matches_exactly(pipeline, encoding);
            if !found {
                trace!(row = index, "stage layout does not match");
            }
            found
        })
        .map(|(_, encoding)| encoding)
}

#[cfg(test)]
fn pipeline_of(types: &[StageType]) -> Pipeline {
    use crate::pipeline::PipelineStage;

    let mut pipeline = Pipeline::new();
    for ty in types {
        let stage = match ty {
            CurveSet => PipelineStage::new_ident_curve_set(3),
            Matrix => PipelineStage::new_matrix(3, vec![0.; 9], None),
            CLut => PipelineStage::new_identity_clut(3).unwrap(),
            _ => unreachable!(),
        };
        pipeline.append_stage(stage).unwrap();
    }
    pipeline
}

#[test]
fn every_row_finds_itself() {
    for (index, encoding) in ALLOWED_ENCODINGS.iter().enumerate() {
        let pipeline = pipeline_of(encoding.stages);
        let destination = encoding.required_tag.unwrap_or(IccTag::AToB0);

        let found = find_encoding(&pipeline, encoding.is_v4, destination).unwrap();
        let found_index = ALLOWED_ENCODINGS
            .iter()
            .position(|e| std::ptr::eq(e, found))
            .unwrap();

        // an earlier row can only win if it has the very same shape
        assert!(found_index <= index);
        assert_eq!(found.stages, encoding.stages);
        assert!(matches_exactly(&pipeline, encoding));
    }
}

#[test]
fn length_must_match() {
    for encoding in &ALLOWED_ENCODINGS {
        let mut longer = encoding.stages.to_vec();
        longer.push(CurveSet);
        assert!(!matches_exactly(&pipeline_of(&longer), encoding));

        let shorter = &encoding.stages[..encoding.stages.len() - 1];
        assert!(!matches_exactly(&pipeline_of(shorter), encoding));
    }
}

#[test]
fn destination_and_version_filter() {
    let shaper = pipeline_of(&[CurveSet, Matrix, CurveSet]);

    let a2b = find_encoding(&shaper, true, IccTag::AToB0).unwrap();
    assert_eq!(a2b.lut_type, IccDataType::LutAToB);
    assert_eq!(a2b.required_tag, Some(IccTag::AToB0));

    let b2a = find_encoding(&shaper, true, IccTag::BToA0).unwrap();
    assert_eq!(b2a.lut_type, IccDataType::LutBToA);

    assert!(find_encoding(&shaper, false, IccTag::AToB0).is_none());

    let v2 = pipeline_of(&[Matrix, CurveSet, CLut, CurveSet]);
    assert_eq!(
        find_encoding(&v2, false, IccTag::BToA0).map(|e| e.lut_type),
        Some(IccDataType::Lut16)
    );
    assert!(find_encoding(&v2, true, IccTag::AToB0).is_none());
}
