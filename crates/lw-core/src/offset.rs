//! Per-source clock offset correction.

use crate::error::{MergeError, MergeResult};

/// Shift an instant by a signed millisecond offset.
///
/// Saturates instead of wrapping so a corrupt offset cannot flip ordering.
pub fn adjust(instant: i64, offset_ms: i64) -> i64 {
    instant.saturating_add(offset_ms)
}

/// Parse a comma-separated offset list (`"250,-1200"`) into one offset per
/// source. Sources beyond the list get 0; blank input means all zero.
pub fn parse_offsets(source_count: usize, list: Option<&str>) -> MergeResult<Vec<i64>> {
    let mut offsets = Vec::with_capacity(source_count);

    if let Some(list) = list.filter(|l| !l.trim().is_empty()) {
        for token in list.split(',') {
            let value = token
                .trim()
                .parse::<i64>()
                .map_err(|_| MergeError::Offsets(list.to_string()))?;
            offsets.push(value);
        }
    }

    if offsets.len() > source_count {
        tracing::warn!(
            given = offsets.len(),
            sources = source_count,
            "more timestamp offsets than sources; extra offsets ignored"
        );
    }
    offsets.resize(source_count, 0);
    Ok(offsets)
}
