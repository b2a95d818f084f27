use approx::assert_abs_diff_eq;
use iccsynth::adjust::Bchsw;
use iccsynth::color::{CxyY, Cxyz, D50, D65};
use iccsynth::encoding::{find_encoding, ALLOWED_ENCODINGS};
use iccsynth::grid::Grid;
use iccsynth::named::NamedColorList;
use iccsynth::pipeline::{Pipeline, PipelineStage, StageKernel, StageType};
use iccsynth::profile::*;
use iccsynth::{DeviceLinkOptions, ErrorKind, IccProfile, ToneCurve, Transform};

fn lut(profile: &IccProfile, tag: IccTag) -> &Pipeline {
    profile
        .get_tag(tag)
        .and_then(IccValue::as_pipeline)
        .expect("missing LUT tag")
}

fn shaper_pipeline() -> Pipeline {
    let mut pipeline = Pipeline::new();
    pipeline
        .append_stage(PipelineStage::new_curve_set(vec![ToneCurve::new_gamma(2.2); 3]))
        .unwrap();
    pipeline
        .append_stage(PipelineStage::new_matrix(
            3,
            vec![0.4361, 0.2225, 0.0139, 0.3851, 0.7169, 0.0971, 0.1431, 0.0606, 0.7141],
            None,
        ))
        .unwrap();
    pipeline
        .append_stage(PipelineStage::new_curve_set(vec![ToneCurve::new_gamma(1. / 2.2); 3]))
        .unwrap();
    pipeline
}

#[test]
fn rgb_profile_shares_one_curve() {
    let d65 = CxyY {
        x: 0.3127,
        y: 0.3290,
        Y: 1.0,
    };
    let rec709 = (
        CxyY {
            x: 0.64,
            y: 0.33,
            Y: 1.0,
        },
        CxyY {
            x: 0.30,
            y: 0.60,
            Y: 1.0,
        },
        CxyY {
            x: 0.15,
            y: 0.06,
            Y: 1.0,
        },
    );
    let srgb = ToneCurve::new_srgb();

    let profile =
        IccProfile::new_rgb(Some(d65), Some(rec709), Some([&srgb, &srgb, &srgb])).unwrap();

    assert_eq!(profile.device_class, ProfileClass::Display);
    assert_eq!(profile.version(), (4, 3));
    assert_eq!(
        profile.tag_data(IccTag::RedTRC),
        Some(&IccTagData::Value(IccValue::Curve(srgb.clone())))
    );
    for tag in [IccTag::GreenTRC, IccTag::BlueTRC] {
        assert_eq!(
            profile.tag_data(tag),
            Some(&IccTagData::Linked(IccTag::RedTRC.into()))
        );
    }
    assert!(profile.contains_tag(IccTag::ChromaticAdaptation));
    assert!(profile.contains_tag(IccTag::Chromaticity));
    assert_eq!(profile.media_white_point(), D50);

    // the adaptation matrix maps the white point onto D50
    let chad = profile.adaptation_matrix().unwrap();
    let white = Cxyz::from(d65);
    let white = [white.x, white.y, white.z];
    let adapted: Vec<f64> = (0..3)
        .map(|i| (0..3).map(|j| chad[i][j] * white[j]).sum())
        .collect();
    assert_abs_diff_eq!(adapted[0], D50.x, epsilon = 2e-3);
    assert_abs_diff_eq!(adapted[1], D50.y, epsilon = 2e-3);
    assert_abs_diff_eq!(adapted[2], D50.z, epsilon = 2e-3);
}

#[test]
fn shaper_is_stored_as_is() {
    let pipeline = shaper_pipeline();
    let encoding = find_encoding(&pipeline, true, IccTag::AToB0).unwrap();
    assert!(std::ptr::eq(encoding, &ALLOWED_ENCODINGS[4]));

    let transform = Transform::new(
        pipeline.clone(),
        ColorSpace::RGB,
        ColorSpace::XYZ,
        Intent::RelativeColorimetric,
    )
    .unwrap()
    .with_white_points(D65, D50);

    let profile = transform
        .to_device_link(&DeviceLinkOptions::default())
        .unwrap();

    assert_eq!(profile.device_class, ProfileClass::Input);
    assert_eq!((profile.color_space, profile.pcs), (ColorSpace::RGB, ColorSpace::XYZ));
    assert_eq!(profile.rendering_intent, Intent::RelativeColorimetric);
    assert_eq!(profile.description(), Some("devicelink"));
    assert!(profile.contains_tag(IccTag::Copyright));
    assert!(!profile.contains_tag(IccTag::BToA0));

    // tier 1 leaves the pipeline untouched
    assert_eq!(lut(&profile, IccTag::AToB0), &pipeline);

    // input profiles carry the source white point
    assert_eq!(profile.media_white_point(), D65);
}

#[test]
fn optimizer_makes_pipelines_storable() {
    let mut pipeline = shaper_pipeline();
    pipeline
        .append_stage(PipelineStage::new_xyz_to_lab())
        .unwrap();
    pipeline
        .append_stage(PipelineStage::new_lab_to_xyz())
        .unwrap();

    let transform =
        Transform::new(pipeline.clone(), ColorSpace::RGB, ColorSpace::XYZ, Intent::Perceptual)
            .unwrap();
    let profile = transform
        .to_device_link(&DeviceLinkOptions::default())
        .unwrap();

    let stored = lut(&profile, IccTag::AToB0);
    let types: Vec<_> = stored.stage_types().collect();
    assert_eq!(
        types,
        [StageType::CurveSet, StageType::Matrix, StageType::CurveSet]
    );

    let mut expected = [0.; 3];
    let mut actual = [0.; 3];
    for color in [[0.2, 0.4, 0.6], [1., 1., 1.], [0.05, 0.9, 0.3]] {
        pipeline.transform(&color, &mut expected);
        stored.transform(&color, &mut actual);
        for i in 0..3 {
            assert_abs_diff_eq!(expected[i], actual[i], epsilon = 1e-3);
        }
    }
}

#[test]
fn forced_table_is_always_storable() {
    let options = DeviceLinkOptions {
        force_clut: true,
        grid_points: Some(9),
        ..DeviceLinkOptions::default()
    };

    for version in [(2, 1), (4, 3)] {
        let transform =
            Transform::new(shaper_pipeline(), ColorSpace::RGB, ColorSpace::RGB, Intent::Perceptual)
                .unwrap();
        let profile = transform
            .to_device_link(&DeviceLinkOptions { version, ..options })
            .unwrap();

        assert_eq!(profile.version(), version);
        let stored = lut(&profile, IccTag::AToB0);
        let types: Vec<_> = stored.stage_types().collect();
        assert_eq!(types, [StageType::CurveSet, StageType::CLut, StageType::CurveSet]);

        match &stored.stages()[1].kernel {
            StageKernel::CLut(grid) => assert_eq!(grid.dimensions(), &[9, 9, 9]),
            other => panic!("expected a table, got {:?}", other),
        }

        let is_v4 = version.0 >= 4;
        assert!(find_encoding(stored, is_v4, IccTag::AToB0).is_some());
    }
}

fn averaging_pipeline(entry: ColorSpace, exit: ColorSpace) -> Pipeline {
    let (inputs, outputs) = (entry.channels(), exit.channels());
    let weight = 0.9 / inputs as f64;

    let mut pipeline = Pipeline::new();
    pipeline
        .append_stage(PipelineStage::new_matrix(outputs, vec![weight; inputs * outputs], None))
        .unwrap();
    pipeline
}

#[test]
fn resampled_tables_fit_every_class() {
    use ColorSpace::*;

    let cases = [
        (Lab, CMYK, ProfileClass::Output, 33),
        (Lab, Gray, ProfileClass::Output, 33),
        (Gray, Gray, ProfileClass::Link, 33),
        (MCH6, Lab, ProfileClass::Input, 7),
        (CMYK, CMYK, ProfileClass::Link, 17),
    ];

    for (entry, exit, class, points) in cases {
        let transform =
            Transform::new(averaging_pipeline(entry, exit), entry, exit, Intent::Perceptual)
                .unwrap();

        for version in [(2, 1), (4, 3)] {
            for force_clut in [false, true] {
                let options = DeviceLinkOptions {
                    version,
                    force_clut,
                    ..DeviceLinkOptions::default()
                };
                let profile = transform.to_device_link(&options).unwrap();
                assert_eq!(profile.device_class, class, "{} -> {}", entry, exit);

                let tag = if class == ProfileClass::Output {
                    IccTag::BToA0
                } else {
                    IccTag::AToB0
                };
                let stored = lut(&profile, tag);
                assert!(find_encoding(stored, version.0 >= 4, tag).is_some());

                let types: Vec<_> = stored.stage_types().collect();
                assert_eq!(types, [StageType::CurveSet, StageType::CLut, StageType::CurveSet]);
                assert_eq!(stored.input_channels(), entry.channels());
                assert_eq!(stored.output_channels(), exit.channels());

                if force_clut {
                    match &stored.stages()[1].kernel {
                        StageKernel::CLut(grid) => {
                            assert_eq!(grid.dimensions(), &vec![points; entry.channels()][..])
                        }
                        other => panic!("expected a table, got {:?}", other),
                    }
                }
            }
        }
    }
}

#[test]
fn tiers_never_lose_a_match() {
    // a pipeline that tier 1 can store stays in tier 1 for every destination it allows
    let pipeline = shaper_pipeline();
    for (class_spaces, tag) in [
        ((ColorSpace::RGB, ColorSpace::XYZ), IccTag::AToB0),
        ((ColorSpace::XYZ, ColorSpace::RGB), IccTag::BToA0),
    ] {
        let (entry, exit) = class_spaces;
        let transform =
            Transform::new(pipeline.clone(), entry, exit, Intent::Perceptual).unwrap();
        let profile = transform
            .to_device_link(&DeviceLinkOptions::default())
            .unwrap();
        assert_eq!(lut(&profile, tag), &pipeline);
    }
}

#[test]
fn output_profiles_use_btoa() {
    let table = Grid::sample_uniform(5, 3, 4, |input, output| {
        let gray = 65535 - input[0];
        output.copy_from_slice(&[0, 0, 0, gray]);
        true
    })
    .unwrap();

    let mut pipeline = Pipeline::new();
    pipeline
        .append_stage(PipelineStage::new_ident_curve_set(3))
        .unwrap();
    pipeline.append_stage(PipelineStage::new_clut(table)).unwrap();
    pipeline
        .append_stage(PipelineStage::new_ident_curve_set(4))
        .unwrap();

    let transform = Transform::new(pipeline, ColorSpace::Lab, ColorSpace::CMYK, Intent::Perceptual)
        .unwrap()
        .with_white_points(D50, D65);

    let profile = transform
        .to_device_link(&DeviceLinkOptions::default())
        .unwrap();
    assert_eq!(profile.device_class, ProfileClass::Output);
    assert_eq!((profile.color_space, profile.pcs), (ColorSpace::CMYK, ColorSpace::Lab));
    assert!(profile.contains_tag(IccTag::BToA0));
    assert!(!profile.contains_tag(IccTag::AToB0));
    assert_eq!(profile.media_white_point(), D65);

    let mut out = [0; 4];
    lut(&profile, IccTag::BToA0).transform_16(&[0, 32768, 32768], &mut out);
    assert_eq!(out, [0, 0, 0, 65535]);

    // without guessing, everything is a link stored in AToB0
    let options = DeviceLinkOptions {
        guess_device_class: false,
        ..DeviceLinkOptions::default()
    };
    let profile = transform.to_device_link(&options).unwrap();
    assert_eq!(profile.device_class, ProfileClass::Link);
    assert_eq!((profile.color_space, profile.pcs), (ColorSpace::Lab, ColorSpace::CMYK));
    assert!(profile.contains_tag(IccTag::AToB0));
}

#[test]
fn legacy_lab_is_converted() {
    let mut pipeline = Pipeline::new();
    pipeline
        .append_stage(PipelineStage::new_ident_curve_set(3))
        .unwrap();

    let transform =
        Transform::new(pipeline, ColorSpace::Lab, ColorSpace::Lab, Intent::Perceptual).unwrap();
    let options = DeviceLinkOptions {
        version: (2, 1),
        ..DeviceLinkOptions::default()
    };
    let profile = transform.to_device_link(&options).unwrap();

    assert_eq!(profile.version(), (2, 1));
    assert_eq!(profile.device_class, ProfileClass::Abstract);

    let stored = lut(&profile, IccTag::AToB0);
    let types: Vec<_> = stored.stage_types().collect();
    assert_eq!(types, [StageType::CurveSet, StageType::CLut, StageType::CurveSet]);

    // white in the version 2 encoding stays white
    let mut out = [0.; 3];
    stored.transform(&[65280. / 65535., 0.5, 0.5], &mut out);
    assert_abs_diff_eq!(out[0], 65280. / 65535., epsilon = 1e-2);
}

#[test]
fn link_metadata() {
    let mut pipeline = Pipeline::new();
    pipeline
        .append_stage(PipelineStage::new_matrix(
            4,
            vec![1., 0., 0., 0., 0., 1., 0., 0., 0., 0., 1., 0.],
            None,
        ))
        .unwrap();

    let mut inks = NamedColorList::new(4, "", "");
    for name in ["cyan", "magenta", "yellow", "black"] {
        inks.push(name, [0, 0, 0], &[]);
    }

    let sequence = vec![
        ProfileSequenceItem::new("maker", "scanner"),
        ProfileSequenceItem::new("maker", "press"),
    ];

    let transform = Transform::new(pipeline, ColorSpace::RGB, ColorSpace::CMYK, Intent::Saturation)
        .unwrap()
        .with_output_colorants(inks.clone())
        .with_sequence(sequence.clone())
        .with_white_points(D65, D50);

    let options = DeviceLinkOptions {
        grid_points: Some(5),
        save_as_8_bits: true,
        ..DeviceLinkOptions::default()
    };
    let profile = transform.to_device_link(&options).unwrap();

    assert_eq!(profile.device_class, ProfileClass::Link);
    assert_eq!(profile.rendering_intent, Intent::Saturation);
    assert!(!profile.contains_tag(IccTag::ColorantTable));
    assert_eq!(
        profile.get_tag(IccTag::ColorantTableOut),
        Some(&IccValue::ColorantTable(inks))
    );
    assert_eq!(
        profile.get_tag(IccTag::ProfileSequenceDesc),
        Some(&IccValue::ProfileSequence(sequence))
    );
    assert_eq!(profile.media_white_point(), D50);

    let stored = lut(&profile, IccTag::AToB0);
    assert!(stored.save_as_8_bits());
    assert_eq!((stored.input_channels(), stored.output_channels()), (3, 4));
    assert!(stored.stage_types().any(|ty| ty == StageType::CLut));
}

#[test]
fn named_colors_pass_through() {
    let mut list = NamedColorList::new(4, "PMS ", " C");
    list.push("100", [60000, 30000, 40000], &[0, 0, 40000, 0]);
    list.push("200", [30000, 50000, 35000], &[0, 65535, 40000, 10000]);
    list.push("300", [20000, 30000, 20000], &[65535, 20000, 0, 0]);

    let mut pipeline = Pipeline::new();
    pipeline
        .append_stage(PipelineStage::new_named_color(list.clone(), false))
        .unwrap();

    let transform =
        Transform::new(pipeline, ColorSpace::Named, ColorSpace::CMYK, Intent::Perceptual).unwrap();
    let profile = transform
        .to_device_link(&DeviceLinkOptions::default())
        .unwrap();

    assert_eq!(profile.device_class, ProfileClass::NamedColor);
    assert_eq!((profile.color_space, profile.pcs), (ColorSpace::CMYK, ColorSpace::Lab));
    assert_eq!(profile.description(), Some("Named color devicelink"));
    assert!(!profile.contains_tag(IccTag::AToB0));

    let colors = match profile.get_tag(IccTag::NamedColor2) {
        Some(IccValue::NamedColorList(colors)) => colors,
        other => panic!("unexpected named colors {:?}", other),
    };
    assert_eq!(colors.len(), 3);
    assert_eq!(colors.colorant_count(), 4);
    assert_eq!(colors.prefix, "PMS ");
    for (stored, original) in colors.iter().zip(list.iter()) {
        assert_eq!(stored.name, original.name);
        assert_eq!(stored.pcs, original.pcs);
        assert_eq!(stored.device_colorant, original.device_colorant);
    }
}

#[test]
fn ink_limiting_link() {
    let profile = IccProfile::new_ink_limiting_link(ColorSpace::CMYK, 300.).unwrap();
    assert_eq!(profile.device_class, ProfileClass::Link);
    assert_eq!(profile.description(), Some("ink-limiting built-in"));

    let stored = lut(&profile, IccTag::AToB0);
    let types: Vec<_> = stored.stage_types().collect();
    assert_eq!(types, [StageType::CurveSet, StageType::CLut, StageType::CurveSet]);

    // at a grid node the table holds the exact limited value
    let mut out = [0; 4];
    stored.transform_16(&[65535; 4], &mut out);
    for channel in &out[..3] {
        assert!((*channel as i32 - 43690).abs() <= 1, "{:?}", out);
    }
    assert_eq!(out[3], 65535);

    stored.transform_16(&[0, 0, 0, 65535], &mut out);
    assert_eq!(out, [0, 0, 0, 65535]);

    let err = IccProfile::new_ink_limiting_link(ColorSpace::RGB, 300.).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DomainError);
}

#[test]
fn neutral_bchs_is_identity() {
    let profile = IccProfile::new_bchsw_abstract(&Bchsw::default()).unwrap();
    assert_eq!(profile.device_class, ProfileClass::Abstract);
    assert_eq!((profile.color_space, profile.pcs), (ColorSpace::Lab, ColorSpace::Lab));
    assert_eq!(profile.version(), (2, 1));

    let stored = lut(&profile, IccTag::AToB0);
    let grid = match &stored.stages()[..] {
        [stage] => match &stage.kernel {
            StageKernel::CLut(grid) => grid,
            other => panic!("expected a table, got {:?}", other),
        },
        stages => panic!("expected a single table, got {} stages", stages.len()),
    };

    let identity = Grid::sample(grid.dimensions(), 3, |input, output| {
        output.copy_from_slice(input);
        true
    })
    .unwrap();
    assert_eq!(grid.table(), identity.table());
}
