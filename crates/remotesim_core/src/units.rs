use crate::error::{CoreError, Domain, ErrorKind, Result};

/// Default precision for rounding float values returned by the remote API.
///
/// Several server-reported floats are slightly imprecise (time steps around
/// the 10th decimal digit, bounding-box limits around the 6th).
pub const FLOAT_PREC: u32 = 4;

/// Round to `prec` digits after the decimal point.
pub fn round_to(value: f32, prec: u32) -> f32 {
    let scale = 10f32.powi(prec as i32);
    (value * scale).round() / scale
}

/// Round each component, when a precision is requested.
pub fn round_vec3(v: [f32; 3], prec: Option<u32>) -> [f32; 3] {
    match prec {
        Some(prec) => v.map(|c| round_to(c, prec)),
        None => v,
    }
}

/// Regroup a flat coordinate payload into per-object `[x, y, z]` triples,
/// optionally rounding each component.
///
/// The server returns bulk positions/orientations as one flat float run;
/// a length that is not a multiple of 3 is a malformed payload.
pub fn group_vec3s(flat: &[f32], prec: Option<u32>) -> Result<Vec<[f32; 3]>> {
    if flat.len() % 3 != 0 {
        return Err(CoreError::warn()
            .domain(Domain::Data)
            .kind(ErrorKind::InvalidArgument)
            .msgf(format_args!(
                "flat coordinate payload of {} floats is not a multiple of 3",
                flat.len()
            ))
            .build());
    }

    Ok(flat
        .chunks_exact(3)
        .map(|c| round_vec3([c[0], c[1], c[2]], prec))
        .collect())
}
