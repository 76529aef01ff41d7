//! Encoded polyline decoding (Google precision 5, Valhalla-style precision 6)

use crate::error::DirectionsError;

fn invalid() -> DirectionsError {
    DirectionsError::rejected("INVALID_RESPONSE", "Invalid polyline encoding")
}

/// Read one zig-zag varint starting at `*i`
fn decode_value(bytes: &[u8], i: &mut usize) -> Result<i64, DirectionsError> {
    let mut shift = 0;
    let mut result = 0i64;
    loop {
        let byte = *bytes.get(*i).ok_or_else(invalid)? as i64 - 63;
        if !(0..64).contains(&byte) || shift > 60 {
            return Err(invalid());
        }
        *i += 1;
        result |= (byte & 0x1f) << shift;
        shift += 5;
        if byte < 0x20 {
            break;
        }
    }
    Ok(if result & 1 != 0 { !(result >> 1) } else { result >> 1 })
}

/// Decode to GeoJSON `[lng, lat]` pairs
pub fn decode_polyline(encoded: &str, precision: u32) -> Result<Vec<[f64; 2]>, DirectionsError> {
    let factor = 10_f64.powi(precision as i32);
    let bytes = encoded.as_bytes();
    let mut coordinates = Vec::new();
    let mut lat = 0i64;
    let mut lng = 0i64;
    let mut i = 0;

    while i < bytes.len() {
        lat = lat.checked_add(decode_value(bytes, &mut i)?).ok_or_else(invalid)?;
        lng = lng.checked_add(decode_value(bytes, &mut i)?).ok_or_else(invalid)?;
        coordinates.push([lng as f64 / factor, lat as f64 / factor]);
    }

    Ok(coordinates)
}
