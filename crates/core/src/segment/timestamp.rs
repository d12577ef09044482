use super::SegmentError;

/// Parse a clock value with 1-3 colon-separated fields (`H:M:S`, `M:S`, or
/// bare seconds) into total seconds.
pub fn parse_timestamp(value: &str) -> Result<f64, SegmentError> {
    let malformed = || SegmentError::MalformedTimestamp {
        value: value.to_owned(),
    };

    let mut fields = Vec::new();
    for raw in value.split(':') {
        let n: f64 = raw.trim().parse().map_err(|_| malformed())?;
        fields.push(n);
    }

    match fields.as_slice() {
        [s] => Ok(*s),
        [m, s] => Ok(m * 60.0 + s),
        [h, m, s] => Ok(h * 3600.0 + m * 60.0 + s),
        _ => Err(malformed()),
    }
}
