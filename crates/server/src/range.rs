/// Inclusive byte span of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn content_range(&self, size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    /// Not a single `bytes=` range; the header is ignored.
    Invalid,
    /// Well formed but outside the file; answered with 416.
    Unsatisfiable,
}

pub fn parse_range_header(value: &str, size: u64) -> Result<ByteRange, RangeError> {
    let ranges = value
        .trim()
        .strip_prefix("bytes=")
        .ok_or(RangeError::Invalid)?;
    if ranges.contains(',') {
        return Err(RangeError::Invalid);
    }
    if size == 0 {
        return Err(RangeError::Unsatisfiable);
    }

    if let Some(suffix) = ranges.strip_prefix('-') {
        let suffix: u64 = suffix.parse().map_err(|_| RangeError::Invalid)?;
        if suffix == 0 {
            return Err(RangeError::Unsatisfiable);
        }
        return Ok(ByteRange {
            start: size.saturating_sub(suffix),
            end: size - 1,
        });
    }

    let (start, end) = ranges.split_once('-').ok_or(RangeError::Invalid)?;
    let start: u64 = start.parse().map_err(|_| RangeError::Invalid)?;
    let end = match end {
        "" => size - 1,
        value => {
            let end: u64 = value.parse().map_err(|_| RangeError::Invalid)?;
            if end < start {
                return Err(RangeError::Invalid);
            }
            end.min(size - 1)
        }
    };
    if start >= size {
        return Err(RangeError::Unsatisfiable);
    }
    Ok(ByteRange { start, end })
}

#[cfg(test)]
mod tests {
    use super::{parse_range_header, ByteRange, RangeError};

    #[test]
    fn open_ended_range_runs_to_the_end() {
        let range = parse_range_header("bytes=1024-", 4096).unwrap();
        assert_eq!(range, ByteRange { start: 1024, end: 4095 });
        assert_eq!(range.len(), 3072);
        assert_eq!(range.content_range(4096), "bytes 1024-4095/4096");
    }

    #[test]
    fn closed_range_is_inclusive() {
        let range = parse_range_header("bytes=0-0", 10).unwrap();
        assert_eq!(range.len(), 1);
    }

    #[test]
    fn end_past_the_file_is_clamped() {
        let range = parse_range_header("bytes=90-200", 100).unwrap();
        assert_eq!(range, ByteRange { start: 90, end: 99 });
    }

    #[test]
    fn suffix_range_counts_from_the_end() {
        assert_eq!(
            parse_range_header("bytes=-10", 100).unwrap(),
            ByteRange { start: 90, end: 99 }
        );
        assert_eq!(
            parse_range_header("bytes=-500", 100).unwrap(),
            ByteRange { start: 0, end: 99 }
        );
    }

    #[test]
    fn malformed_headers_are_invalid() {
        for value in ["items=0-1", "bytes=0-1,2-3", "bytes=10-5", "bytes=-", "bytes=a-b", "bytes=5"] {
            assert_eq!(parse_range_header(value, 100), Err(RangeError::Invalid), "{}", value);
        }
    }

    #[test]
    fn ranges_outside_the_file_are_unsatisfiable() {
        assert_eq!(parse_range_header("bytes=100-", 100), Err(RangeError::Unsatisfiable));
        assert_eq!(parse_range_header("bytes=-0", 100), Err(RangeError::Unsatisfiable));
        assert_eq!(parse_range_header("bytes=0-", 0), Err(RangeError::Unsatisfiable));
    }
}
