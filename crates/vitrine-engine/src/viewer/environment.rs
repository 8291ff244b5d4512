use anyhow::{Context, Result, ensure};

const KTX1_MAGIC: [u8; 12] = [
    0xAB, b'K', b'T', b'X', b' ', b'1', b'1', 0xBB, b'\r', b'\n', 0x1A, b'\n',
];
const ENDIAN_LE: u32 = 0x0403_0201;
const ENDIAN_BE: u32 = 0x0102_0304;

// 12-byte magic followed by 13 u32 header fields.
const HEADER_LEN: usize = 12 + 13 * 4;

/// Shape of a KTX1 container holding prefiltered environment data.
///
/// The payload itself is opaque to the viewer; only the container header is
/// identified, per the "raw bytes, consumer identifies format" contract of
/// the asset bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KtxInfo {
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub faces: u32,
    pub mip_levels: u32,
}

impl KtxInfo {
    pub fn is_cubemap(&self) -> bool {
        self.faces == 6
    }
}

/// Parses the header of a KTX1 container.
pub fn parse_ktx1(bytes: &[u8]) -> Result<KtxInfo> {
    ensure!(
        bytes.len() >= HEADER_LEN,
        "KTX header truncated ({} bytes)",
        bytes.len()
    );
    ensure!(bytes[..12] == KTX1_MAGIC, "not a KTX1 container");

    let endianness = u32::from_le_bytes(bytes[12..16].try_into().expect("4-byte slice"));
    let swap = match endianness {
        ENDIAN_LE => false,
        ENDIAN_BE => true,
        other => anyhow::bail!("invalid KTX endianness field {other:#010x}"),
    };

    let field = |index: usize| -> u32 {
        let offset = 12 + index * 4;
        let raw = u32::from_le_bytes(bytes[offset..offset + 4].try_into().expect("4-byte slice"));
        if swap { raw.swap_bytes() } else { raw }
    };

    // Field order after endianness: glType, glTypeSize, glFormat,
    // glInternalFormat, glBaseInternalFormat, pixelWidth, pixelHeight,
    // pixelDepth, numberOfArrayElements, numberOfFaces,
    // numberOfMipmapLevels, bytesOfKeyValueData.
    let pixel_width = field(6);
    let pixel_height = field(7);
    let faces = field(10).max(1);
    let mip_levels = field(11).max(1);

    ensure!(pixel_width > 0, "KTX pixel width is zero");

    Ok(KtxInfo {
        pixel_width,
        pixel_height,
        faces,
        mip_levels,
    })
}

/// Indirect light derived from an environment asset.
#[derive(Debug, Clone, PartialEq)]
pub struct IndirectLight {
    pub info: KtxInfo,

    /// Light intensity in engine units.
    pub intensity: f32,
}

impl IndirectLight {
    /// Intensity applied to freshly loaded environments.
    pub const DEFAULT_INTENSITY: f32 = 30_000.0;

    /// Identifies a KTX1 environment buffer and attaches the default
    /// intensity.
    pub fn from_ktx1(bytes: &[u8]) -> Result<Self> {
        let info = parse_ktx1(bytes).context("failed to identify environment asset")?;
        if !info.is_cubemap() {
            log::warn!("environment is not a cubemap ({} faces)", info.faces);
        }
        Ok(Self {
            info,
            intensity: Self::DEFAULT_INTENSITY,
        })
    }

    /// Normalized ambient strength for the shading pass.
    pub fn ambient_strength(&self) -> f32 {
        (self.intensity / 100_000.0).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ktx1_header(le: bool, width: u32, height: u32, faces: u32, mips: u32) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN);
        bytes.extend_from_slice(&KTX1_MAGIC);

        let put = |bytes: &mut Vec<u8>, v: u32| {
            if le {
                bytes.extend_from_slice(&v.to_le_bytes());
            } else {
                bytes.extend_from_slice(&v.to_be_bytes());
            }
        };

        // The endianness marker is the value 0x04030201 written in the
        // file's native byte order.
        put(&mut bytes, ENDIAN_LE);
        put(&mut bytes, 0); // glType (compressed)
        put(&mut bytes, 1); // glTypeSize
        put(&mut bytes, 0); // glFormat
        put(&mut bytes, 0x8D64); // glInternalFormat (ETC1)
        put(&mut bytes, 0x1907); // glBaseInternalFormat (RGB)
        put(&mut bytes, width);
        put(&mut bytes, height);
        put(&mut bytes, 0); // pixelDepth
        put(&mut bytes, 0); // numberOfArrayElements
        put(&mut bytes, faces);
        put(&mut bytes, mips);
        put(&mut bytes, 0); // bytesOfKeyValueData
        bytes
    }

    #[test]
    fn parses_little_endian_cubemap() {
        let bytes = ktx1_header(true, 256, 256, 6, 9);
        let info = parse_ktx1(&bytes).unwrap();
        assert_eq!(
            info,
            KtxInfo {
                pixel_width: 256,
                pixel_height: 256,
                faces: 6,
                mip_levels: 9,
            }
        );
        assert!(info.is_cubemap());
    }

    #[test]
    fn parses_big_endian_header() {
        let bytes = ktx1_header(false, 128, 64, 1, 1);
        let info = parse_ktx1(&bytes).unwrap();
        assert_eq!(info.pixel_width, 128);
        assert_eq!(info.pixel_height, 64);
        assert!(!info.is_cubemap());
    }

    #[test]
    fn rejects_truncated_header() {
        let bytes = ktx1_header(true, 256, 256, 6, 9);
        assert!(parse_ktx1(&bytes[..HEADER_LEN - 1]).is_err());
        assert!(parse_ktx1(&[]).is_err());
    }

    #[test]
    fn rejects_wrong_magic() {
        let mut bytes = ktx1_header(true, 256, 256, 6, 9);
        bytes[1] = b'X';
        assert!(parse_ktx1(&bytes).is_err());
    }

    #[test]
    fn rejects_bad_endianness_field() {
        let mut bytes = ktx1_header(true, 256, 256, 6, 9);
        bytes[12..16].copy_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
        assert!(parse_ktx1(&bytes).is_err());
    }

    #[test]
    fn indirect_light_gets_default_intensity() {
        let bytes = ktx1_header(true, 256, 256, 6, 9);
        let light = IndirectLight::from_ktx1(&bytes).unwrap();
        assert_eq!(light.intensity, IndirectLight::DEFAULT_INTENSITY);
        assert!(light.ambient_strength() > 0.0 && light.ambient_strength() <= 1.0);
    }
}
