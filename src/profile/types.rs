use std::fmt;

enum_primitive! {
    /// Rendering intents.
    ///
    /// When in doubt, use perceptual. Refer to the ICC specification for details.
    pub Intent (u32) {
        Perceptual = 0,
        RelativeColorimetric = 1,
        Saturation = 2,
        AbsoluteColorimetric = 3,
    }
}

enum_primitive! {
    /// ICC tags.
    pub IccTag (u32) {
        /// `A2B0`
        AToB0 = 0x41324230,
        /// `A2B1`
        AToB1 = 0x41324231,
        /// `A2B2`
        AToB2 = 0x41324232,
        /// `bXYZ`
        BlueColorant = 0x6258595A,
        /// `bTRC`
        BlueTRC = 0x62545243,
        /// `B2A0`
        BToA0 = 0x42324130,
        /// `B2A1`
        BToA1 = 0x42324131,
        /// `B2A2`
        BToA2 = 0x42324132,
        /// `chad`
        ChromaticAdaptation = 0x63686164,
        /// `chrm`
        Chromaticity = 0x6368726D,
        /// `clrt`
        ColorantTable = 0x636C7274,
        /// `clot`
        ColorantTableOut = 0x636C6F74,
        /// `cprt`
        Copyright = 0x63707274,
        /// `kTRC`
        GrayTRC = 0x6b545243,
        /// `gXYZ`
        GreenColorant = 0x6758595A,
        /// `gTRC`
        GreenTRC = 0x67545243,
        /// `wtpt`
        MediaWhitePoint = 0x77747074,
        /// `ncl2`
        NamedColor2 = 0x6E636C32,
        /// `desc`
        ProfileDescription = 0x64657363,
        /// `pseq`
        ProfileSequenceDesc = 0x70736571,
        /// `rXYZ`
        RedColorant = 0x7258595A,
        /// `rTRC`
        RedTRC = 0x72545243,
    }
}

enum_primitive! {
    /// Tag types a pipeline can be stored as.
    pub IccDataType (u32) {
        /// `mft1`
        Lut8 = 0x6d667431,
        /// `mft2`
        Lut16 = 0x6d667432,
        /// `mAB `
        LutAToB = 0x6d414220,
        /// `mBA `
        LutBToA = 0x6d424120,
    }
}

enum_primitive! {
    /// ICC profile classes.
    pub ProfileClass (u32) {
        /// `scnr`
        Input = 0x73636E72,
        /// `mntr`
        Display = 0x6D6E7472,
        /// `prtr`
        Output = 0x70727472,
        /// `link`
        Link = 0x6C696E6B,
        /// `abst`
        Abstract = 0x61627374,
        /// `spac`
        ColorSpace = 0x73706163,
        /// `nmcl`
        NamedColor = 0x6e6d636c,
    }
}

enum_primitive! {
    /// Values for the ICC technology tag.
    pub Technology (u32) {
        /// `dcam`
        DigitalCamera = 0x6463616D,
        /// `fscn`
        FilmScanner = 0x6673636E,
        /// `rscn`
        ReflectiveScanner = 0x7273636E,
        /// `ijet`
        InkJetPrinter = 0x696A6574,
        /// `twax`
        ThermalWaxPrinter = 0x74776178,
        /// `epho`
        ElectrophotographicPrinter = 0x6570686F,
        /// `esta`
        ElectrostaticPrinter = 0x65737461,
        /// `dsub`
        DyeSublimationPrinter = 0x64737562,
        /// `rpho`
        PhotographicPaperPrinter = 0x7270686F,
        /// `fprn`
        FilmWriter = 0x6670726E,
        /// `vidm`
        VideoMonitor = 0x7669646D,
        /// `vidc`
        VideoCamera = 0x76696463,
        /// `pjtv`
        ProjectionTelevision = 0x706A7476,
        /// `CRT `
        CRTDisplay = 0x43525420,
        /// `PMD `
        PMDisplay = 0x504D4420,
        /// `AMD `
        AMDisplay = 0x414D4420,
        /// `KPCD`
        PhotoCD = 0x4B504344,
        /// `imgs`
        PhotoImageSetter = 0x696D6773,
        /// `grav`
        Gravure = 0x67726176,
        /// `offs`
        OffsetLithography = 0x6F666673,
        /// `silk`
        Silkscreen = 0x73696C6B,
        /// `flex`
        Flexography = 0x666C6578,
        /// `mpfs`
        MotionPictureFilmScanner = 0x6D706673,
        /// `mpfr`
        MotionPictureFilmRecorder = 0x6D706672,
        /// `dmpc`
        DigitalMotionPictureCamera = 0x646D7063,
        /// `dcpj`
        DigitalCinemaProjector = 0x64636A70,
    }
}

enum_primitive! {
    /// ICC color spaces.
    pub ColorSpace (u32) {
        /// `XYZ `
        XYZ = 0x58595a20,
        /// `Lab `
        Lab = 0x4C616220,
        /// `Luv `
        Luv = 0x4C757620,
        /// `YCbr`
        YCbCr = 0x59436272,
        /// `Yxy `
        Yxy = 0x59787920,
        /// `RGB `
        RGB = 0x52474220,
        /// `GRAY`
        Gray = 0x47524159,
        /// `HSV `
        HSV = 0x48535620,
        /// `HLS `
        HLS = 0x484C5320,
        /// `CMYK`
        CMYK = 0x434D594B,
        /// `CMY `
        CMY = 0x434D5920,
        /// `MCH1`
        MCH1 = 0x4D434831,
        /// `MCH2`
        MCH2 = 0x4D434832,
        /// `MCH3`
        MCH3 = 0x4D434833,
        /// `MCH4`
        MCH4 = 0x4D434834,
        /// `MCH5`
        MCH5 = 0x4D434835,
        /// `MCH6`
        MCH6 = 0x4D434836,
        /// `MCH7`
        MCH7 = 0x4D434837,
        /// `MCH8`
        MCH8 = 0x4D434838,
        /// `MCH9`
        MCH9 = 0x4D434839,
        /// `MCHA`
        MCHA = 0x4D434841,
        /// `MCHB`
        MCHB = 0x4D434842,
        /// `MCHC`
        MCHC = 0x4D434843,
        /// `MCHD`
        MCHD = 0x4D434844,
        /// `MCHE`
        MCHE = 0x4D434845,
        /// `MCHF`
        MCHF = 0x4D434846,
        /// `nmcl`
        Named = 0x6E6D636C,
        /// `1CLR`
        S1Color = 0x31434C52,
        /// `2CLR`
        S2Color = 0x32434C52,
        /// `3CLR`
        S3Color = 0x33434C52,
        /// `4CLR`
        S4Color = 0x34434C52,
        /// `5CLR`
        S5Color = 0x35434C52,
        /// `6CLR`
        S6Color = 0x36434C52,
        /// `7CLR`
        S7Color = 0x37434C52,
        /// `8CLR`
        S8Color = 0x38434C52,
        /// `9CLR`
        S9Color = 0x39434C52,
        /// `ACLR`
        S10Color = 0x41434C52,
        /// `BCLR`
        S11Color = 0x42434C52,
        /// `CCLR`
        S12Color = 0x43434C52,
        /// `DCLR`
        S13Color = 0x44434C52,
        /// `ECLR`
        S14Color = 0x45434C52,
        /// `FCLR`
        S15Color = 0x46434C52,
        /// `LuvK`
        LuvK = 0x4C75764B,
    }
}

impl ColorSpace {
    /// Returns the number of channels in the color space.
    pub fn channels(self) -> usize {
        use ColorSpace::*;
        match self {
            MCH1 | S1Color | Gray => 1,
            MCH2 | S2Color => 2,
            XYZ | Lab | Luv | YCbCr | Yxy | RGB | HSV | HLS | CMY | MCH3 | S3Color => 3,
            LuvK | CMYK | MCH4 | S4Color => 4,
            MCH5 | S5Color => 5,
            MCH6 | S6Color => 6,
            MCH7 | S7Color => 7,
            MCH8 | S8Color => 8,
            MCH9 | S9Color => 9,
            MCHA | S10Color => 10,
            MCHB | S11Color => 11,
            MCHC | S12Color => 12,
            MCHD | S13Color => 13,
            MCHE | S14Color => 14,
            MCHF | S15Color => 15,
            // a single color index
            Named => 1,
        }
    }

    /// Returns true for spaces that can be a profile connection space.
    pub fn is_pcs(self) -> bool {
        matches!(self, ColorSpace::XYZ | ColorSpace::Lab)
    }
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ColorSpace::*;
        match self {
            XYZ => write!(f, "XYZ"),
            Lab => write!(f, "L*a*b*"),
            Luv => write!(f, "L*u*v*"),
            YCbCr => write!(f, "YCbCr"),
            Yxy => write!(f, "xyY"),
            RGB => write!(f, "RGB"),
            Gray => write!(f, "Gray"),
            HSV => write!(f, "HSV"),
            HLS => write!(f, "HLS"),
            CMYK => write!(f, "CMYK"),
            CMY => write!(f, "CMY"),
            LuvK => write!(f, "L*u*v*K"),
            Named => write!(f, "named color"),
            MCH1 | MCH2 | MCH3 | MCH4 | MCH5 | MCH6 | MCH7 | MCH8 | MCH9 | MCHA | MCHB | MCHC
            | MCHD | MCHE | MCHF => write!(f, "multi-channel ({})", self.channels()),
            _ => write!(f, "{} color", self.channels()),
        }
    }
}

#[test]
fn color_space_classes() {
    assert!(ColorSpace::Lab.is_pcs());
    assert!(ColorSpace::XYZ.is_pcs());
    assert!(!ColorSpace::RGB.is_pcs());
    assert_eq!(ColorSpace::CMYK.channels(), 4);
    assert_eq!(ColorSpace::MCHA.to_string(), "multi-channel (10)");
    assert_eq!(ColorSpace::S6Color.to_string(), "6 color");
}
