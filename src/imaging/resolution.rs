//! Minimal pixel-density reader and writer for JPEG, PNG, TIFF and BMP.
//!
//! The `image` crate decodes pixels but drops density metadata, so it is read
//! straight from the container:
//! - JPEG: JFIF APP0 density, falling back to the EXIF (APP1) TIFF header.
//! - PNG: the `pHYs` chunk (dots per meter).
//! - TIFF: IFD0 tags XResolution (282), YResolution (283), ResolutionUnit (296).
//! - BMP: `biXPelsPerMeter` / `biYPelsPerMeter` in the info header.
//!
//! On the write side [`insert_png_phys`] splices a `pHYs` chunk into encoder
//! output and [`set_bmp_density`] patches the BMP info header in place. JPEG
//! and TIFF density go through their encoders.

use super::params::Resolution;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const JFIF_HEADER: &[u8] = b"JFIF\0";
const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Read the pixel density from encoded image bytes, sniffing the container
/// from its magic number. Returns `None` when absent, unitless, or malformed.
pub fn read_resolution(data: &[u8]) -> Option<Resolution> {
    if data.starts_with(&[0xFF, 0xD8]) {
        read_jpeg_resolution(data)
    } else if data.starts_with(PNG_SIGNATURE) {
        read_png_resolution(data)
    } else if data.starts_with(b"II*\0") || data.starts_with(b"MM\0*") {
        read_tiff_resolution(data)
    } else if data.starts_with(BMP_SIGNATURE) {
        read_bmp_resolution(data)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// JPEG: JFIF APP0, then EXIF APP1
// ---------------------------------------------------------------------------

fn read_jpeg_resolution(data: &[u8]) -> Option<Resolution> {
    let mut exif = None;

    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }
        let marker = data[pos + 1];
        // SOS (0xDA) means image data starts; stop scanning
        if marker == 0xDA || marker == 0xD9 {
            break;
        }
        // Fill bytes and markers without a length field
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            pos += 2;
            continue;
        }

        let seg_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        let seg_start = pos + 4;
        let seg_end = (pos + 2 + seg_len).min(data.len());
        if seg_end < seg_start {
            break;
        }
        let segment = &data[seg_start..seg_end];

        match marker {
            0xE0 if segment.starts_with(JFIF_HEADER) => {
                if let Some(res) = parse_jfif_density(segment) {
                    return Some(res);
                }
            }
            0xE1 if exif.is_none() && segment.starts_with(EXIF_HEADER) => {
                exif = Some(&segment[EXIF_HEADER.len()..]);
            }
            _ => {}
        }

        pos += 2 + seg_len;
    }

    exif.and_then(read_tiff_resolution)
}

/// JFIF APP0 payload: "JFIF\0", version (2), units (1), Xdensity (2), Ydensity (2).
///
/// Units: 0 = aspect ratio only (no density), 1 = dots per inch, 2 = dots per cm.
fn parse_jfif_density(segment: &[u8]) -> Option<Resolution> {
    if segment.len() < 12 {
        return None;
    }
    let units = segment[7];
    let x = f64::from(u16::from_be_bytes([segment[8], segment[9]]));
    let y = f64::from(u16::from_be_bytes([segment[10], segment[11]]));
    match units {
        1 => Resolution::new(x, y),
        2 => Resolution::from_dots_per_centimeter(x, y),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// PNG: pHYs chunk
// ---------------------------------------------------------------------------

/// Iterate `(type, data, chunk_start, chunk_end)` over PNG chunks.
fn png_chunks(data: &[u8]) -> impl Iterator<Item = (&[u8], &[u8], usize, usize)> {
    let mut pos = PNG_SIGNATURE.len();
    std::iter::from_fn(move || {
        if pos + 12 > data.len() {
            return None;
        }
        let len =
            u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]) as usize;
        let start = pos;
        let end = pos.checked_add(12)?.checked_add(len)?;
        if end > data.len() {
            return None;
        }
        let kind = &data[pos + 4..pos + 8];
        let body = &data[pos + 8..pos + 8 + len];
        pos = end;
        Some((kind, body, start, end))
    })
}

fn read_png_resolution(data: &[u8]) -> Option<Resolution> {
    for (kind, body, _, _) in png_chunks(data) {
        match kind {
            b"pHYs" if body.len() == 9 => {
                // Unit 1 = meter; 0 = aspect ratio only
                if body[8] != 1 {
                    return None;
                }
                let x = u32::from_be_bytes([body[0], body[1], body[2], body[3]]);
                let y = u32::from_be_bytes([body[4], body[5], body[6], body[7]]);
                return Resolution::from_dots_per_meter(x, y);
            }
            // pHYs must precede image data
            b"IDAT" | b"IEND" => return None,
            _ => {}
        }
    }
    None
}

/// Return a copy of `png` with a `pHYs` chunk for `resolution` placed right
/// after `IHDR`. Any existing `pHYs` chunk is replaced.
///
/// Returns `None` if `png` does not start with a signature and `IHDR`.
pub fn insert_png_phys(png: &[u8], resolution: Resolution) -> Option<Vec<u8>> {
    let mut chunks = png_chunks(png);
    let (kind, _, _, ihdr_end) = chunks.next()?;
    if !png.starts_with(PNG_SIGNATURE) || kind != b"IHDR" {
        return None;
    }

    let (x, y) = resolution.to_dots_per_meter();
    let mut body = Vec::with_capacity(9);
    body.extend_from_slice(&x.to_be_bytes());
    body.extend_from_slice(&y.to_be_bytes());
    body.push(1);

    let mut out = Vec::with_capacity(png.len() + 21);
    out.extend_from_slice(&png[..ihdr_end]);
    write_png_chunk(&mut out, b"pHYs", &body);

    let mut copied_to = ihdr_end;
    for (kind, _, start, end) in chunks {
        if kind == b"pHYs" {
            out.extend_from_slice(&png[copied_to..start]);
            copied_to = end;
        }
    }
    out.extend_from_slice(&png[copied_to..]);
    Some(out)
}

fn write_png_chunk(out: &mut Vec<u8>, kind: &[u8; 4], body: &[u8]) {
    out.extend_from_slice(&(body.len() as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(body);
    let crc = crc32(kind.iter().chain(body));
    out.extend_from_slice(&crc.to_be_bytes());
}

/// CRC-32 (ISO-HDLC), as PNG chunk trailers use.
fn crc32<'a>(bytes: impl IntoIterator<Item = &'a u8>) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in bytes {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

// ---------------------------------------------------------------------------
// BMP: pels-per-meter fields of BITMAPINFOHEADER and its successors
// ---------------------------------------------------------------------------

const BMP_SIGNATURE: &[u8] = b"BM";
const BMP_INFO_HEADER_OFFSET: usize = 14;
const BMP_X_PELS_OFFSET: usize = 38;
const BMP_Y_PELS_OFFSET: usize = 42;

/// Both density fields exist only in info headers of 40 bytes or more.
fn bmp_has_density_fields(data: &[u8]) -> bool {
    let Some(b) = data.get(BMP_INFO_HEADER_OFFSET..BMP_INFO_HEADER_OFFSET + 4) else {
        return false;
    };
    data.starts_with(BMP_SIGNATURE)
        && u32::from_le_bytes([b[0], b[1], b[2], b[3]]) >= 40
        && data.len() >= BMP_Y_PELS_OFFSET + 4
}

fn read_bmp_resolution(data: &[u8]) -> Option<Resolution> {
    if !bmp_has_density_fields(data) {
        return None;
    }
    let read_i32 = |offset: usize| {
        i32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
    };
    // Zero (what most encoders write) or negative means unspecified
    let x = u32::try_from(read_i32(BMP_X_PELS_OFFSET)).ok()?;
    let y = u32::try_from(read_i32(BMP_Y_PELS_OFFSET)).ok()?;
    Resolution::from_dots_per_meter(x, y)
}

/// Write `resolution` into the pels-per-meter fields of an encoded BMP.
///
/// Returns `false`, leaving `bmp` untouched, if it is not a BMP with a
/// 40-byte or larger info header.
pub fn set_bmp_density(bmp: &mut [u8], resolution: Resolution) -> bool {
    if !bmp_has_density_fields(bmp) {
        return false;
    }
    let (x, y) = resolution.to_dots_per_meter();
    let clamp = |ppm: u32| ppm.min(i32::MAX as u32).to_le_bytes();
    bmp[BMP_X_PELS_OFFSET..BMP_X_PELS_OFFSET + 4].copy_from_slice(&clamp(x));
    bmp[BMP_Y_PELS_OFFSET..BMP_Y_PELS_OFFSET + 4].copy_from_slice(&clamp(y));
    true
}

// ---------------------------------------------------------------------------
// TIFF (and EXIF, which embeds a TIFF header)
// ---------------------------------------------------------------------------

const TAG_X_RESOLUTION: u16 = 282;
const TAG_Y_RESOLUTION: u16 = 283;
const TAG_RESOLUTION_UNIT: u16 = 296;
const TYPE_RATIONAL: u16 = 5;

/// Read XResolution/YResolution/ResolutionUnit from IFD0.
///
/// ResolutionUnit: 1 = none, 2 = inch (default when absent), 3 = centimeter.
fn read_tiff_resolution(data: &[u8]) -> Option<Resolution> {
    if data.len() < 8 {
        return None;
    }

    let big_endian = match &data[0..2] {
        b"MM" => true,
        b"II" => false,
        _ => return None,
    };

    let read_u16 = |offset: usize| -> Option<u16> {
        let b = data.get(offset..offset + 2)?;
        Some(if big_endian {
            u16::from_be_bytes([b[0], b[1]])
        } else {
            u16::from_le_bytes([b[0], b[1]])
        })
    };

    let read_u32 = |offset: usize| -> Option<u32> {
        let b = data.get(offset..offset + 4)?;
        Some(if big_endian {
            u32::from_be_bytes([b[0], b[1], b[2], b[3]])
        } else {
            u32::from_le_bytes([b[0], b[1], b[2], b[3]])
        })
    };

    let read_rational = |offset: usize| -> Option<f64> {
        let num = read_u32(offset)?;
        let den = read_u32(offset + 4)?;
        (den != 0).then(|| f64::from(num) / f64::from(den))
    };

    // Verify TIFF magic (42)
    if read_u16(2)? != 42 {
        return None;
    }

    let ifd_offset = read_u32(4)? as usize;
    let entry_count = read_u16(ifd_offset)? as usize;

    let mut x = None;
    let mut y = None;
    let mut unit = 2;

    for i in 0..entry_count {
        let entry = ifd_offset + 2 + i * 12;
        let tag = read_u16(entry)?;
        let typ = read_u16(entry + 2)?;
        match tag {
            TAG_X_RESOLUTION if typ == TYPE_RATIONAL => {
                x = read_rational(read_u32(entry + 8)? as usize);
            }
            TAG_Y_RESOLUTION if typ == TYPE_RATIONAL => {
                y = read_rational(read_u32(entry + 8)? as usize);
            }
            // SHORT values are left-justified in the value field
            TAG_RESOLUTION_UNIT => unit = read_u16(entry + 8)?,
            _ => {}
        }
    }

    let (x, y) = (x?, y?);
    match unit {
        2 => Resolution::new(x, y),
        3 => Resolution::from_dots_per_centimeter(x, y),
        _ => None,
    }
}
