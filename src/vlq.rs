//! Base64 VLQ codec for the source map `mappings` string.
//!
//! Values are encoded as little-endian groups of 5 payload bits with a
//! continuation bit, the sign carried in the least significant payload bit.
//! Besides the raw codec this module holds the shared parse/serialize logic
//! for whole mappings strings; the backends differ only in how they store
//! the decoded segments.

use crate::interfaces::container::{
    Mapping, MappingError, OriginalLocation, Position, Result,
};

/// Payload bits per base64 character.
const VLQ_BASE_SHIFT: u32 = 5;
/// Continuation bit.
const VLQ_CONTINUATION: u8 = 1 << VLQ_BASE_SHIFT;
/// Mask selecting the payload bits.
const VLQ_BASE_MASK: u8 = VLQ_CONTINUATION - 1;

const BASE64_CHARS: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Encode one value, appending its base64 VLQ representation to `out`.
pub fn encode(value: i64, out: &mut String) {
    let mut vlq = if value < 0 {
        (value.unsigned_abs() << 1) | 1
    } else {
        (value as u64) << 1
    };

    loop {
        let mut digit = (vlq & u64::from(VLQ_BASE_MASK)) as u8;
        vlq >>= VLQ_BASE_SHIFT;
        if vlq > 0 {
            digit |= VLQ_CONTINUATION;
        }
        out.push(char::from(BASE64_CHARS[digit as usize]));
        if vlq == 0 {
            break;
        }
    }
}

/// Decode one base64 character to its 6-bit value.
pub fn decode_base64_char(c: char) -> Option<u8> {
    match c {
        'A'..='Z' => Some(c as u8 - b'A'),
        'a'..='z' => Some(c as u8 - b'a' + 26),
        '0'..='9' => Some(c as u8 - b'0' + 52),
        '+' => Some(62),
        '/' => Some(63),
        _ => None,
    }
}

/// Parse a full VLQ mappings string, feeding each decoded segment to `sink`.
///
/// Field values are deltas: decode state persists across segments and lines,
/// except the generated column which resets to `column_offset` at every `;`.
/// 4-field segments carry a source and original position, 5-field segments
/// add a name; `sources` and `names` remap the string's local indices into
/// the caller's interned tables.
pub fn parse_mappings<F>(
    input: &str,
    sources: &[u32],
    names: &[u32],
    line_offset: u32,
    column_offset: u32,
    mut sink: F,
) -> Result<()>
where
    F: FnMut(Mapping),
{
    let mut line = i64::from(line_offset);
    let mut fields = [i64::from(column_offset), 0, 0, 0, 0];
    let mut field_count = 0usize;

    // In-progress VLQ value.
    let mut value: i64 = 0;
    let mut shift = 0u32;

    for (offset, c) in input.char_indices() {
        match c {
            ',' | ';' => {
                if shift != 0 {
                    return Err(MappingError::UnterminatedVlq);
                }
                if field_count > 0 {
                    flush_segment(&fields, field_count, line, sources, names, &mut sink)?;
                }
                if c == ';' {
                    fields[0] = i64::from(column_offset);
                    line += 1;
                }
                field_count = 0;
            }
            _ => {
                let digit = decode_base64_char(c)
                    .ok_or(MappingError::InvalidBase64 { character: c, offset })?;

                // 12 groups of 5 payload bits cap the magnitude below 2^60;
                // a 13th group would shift past i64.
                if shift + VLQ_BASE_SHIFT >= i64::BITS {
                    return Err(MappingError::VlqOverflow { offset });
                }
                value += i64::from(digit & VLQ_BASE_MASK) << shift;

                if digit & VLQ_CONTINUATION != 0 {
                    shift += VLQ_BASE_SHIFT;
                } else {
                    if field_count >= fields.len() {
                        return Err(MappingError::MalformedSegment {
                            fields: field_count + 1,
                        });
                    }
                    // The low bit holds the sign.
                    let magnitude = value >> 1;
                    fields[field_count] += if value & 1 != 0 { -magnitude } else { magnitude };
                    field_count += 1;
                    value = 0;
                    shift = 0;
                }
            }
        }
    }

    if shift != 0 {
        return Err(MappingError::UnterminatedVlq);
    }
    // Last segment has no trailing delimiter.
    if field_count > 0 {
        flush_segment(&fields, field_count, line, sources, names, &mut sink)?;
    }

    Ok(())
}

fn flush_segment<F>(
    fields: &[i64; 5],
    field_count: usize,
    line: i64,
    sources: &[u32],
    names: &[u32],
    sink: &mut F,
) -> Result<()>
where
    F: FnMut(Mapping),
{
    let generated = position(line, fields[0])?;

    let original = match field_count {
        1 => None,
        4 | 5 => {
            let source = remap(fields[1], sources).ok_or(MappingError::SourceOutOfRange {
                index: fields[1],
                len: sources.len(),
            })?;
            let name = if field_count == 5 {
                Some(remap(fields[4], names).ok_or(MappingError::NameOutOfRange {
                    index: fields[4],
                    len: names.len(),
                })?)
            } else {
                None
            };
            Some(OriginalLocation {
                position: position(fields[2], fields[3])?,
                source,
                name,
            })
        }
        other => return Err(MappingError::MalformedSegment { fields: other }),
    };

    sink(Mapping { generated, original });
    Ok(())
}

fn remap(index: i64, table: &[u32]) -> Option<u32> {
    usize::try_from(index).ok().and_then(|i| table.get(i)).copied()
}

fn position(line: i64, column: i64) -> Result<Position> {
    match (u32::try_from(line), u32::try_from(column)) {
        (Ok(line), Ok(column)) => Ok(Position { line, column }),
        _ => Err(MappingError::PositionOutOfRange { line, column }),
    }
}

/// Serialize per-line segment slices as a relative-encoded VLQ string.
///
/// Lines are joined by `;`, segments by `,`. Source, original position, and
/// name deltas persist across lines; the generated column delta resets per
/// line. Callers must pass each line's segments sorted by generated column.
pub fn serialize_mappings<'a, I>(lines: I) -> String
where
    I: IntoIterator<Item = &'a [Mapping]>,
{
    let mut out = String::new();

    let mut previous_source: i64 = 0;
    let mut previous_original_line: i64 = 0;
    let mut previous_original_column: i64 = 0;
    let mut previous_name: i64 = 0;

    for (line_index, line) in lines.into_iter().enumerate() {
        if line_index > 0 {
            out.push(';');
        }

        let mut previous_generated_column: i64 = 0;
        for (segment_index, mapping) in line.iter().enumerate() {
            if segment_index > 0 {
                out.push(',');
            }

            encode(
                i64::from(mapping.generated.column) - previous_generated_column,
                &mut out,
            );
            previous_generated_column = i64::from(mapping.generated.column);

            if let Some(original) = mapping.original {
                encode(i64::from(original.source) - previous_source, &mut out);
                previous_source = i64::from(original.source);

                encode(
                    i64::from(original.position.line) - previous_original_line,
                    &mut out,
                );
                previous_original_line = i64::from(original.position.line);

                encode(
                    i64::from(original.position.column) - previous_original_column,
                    &mut out,
                );
                previous_original_column = i64::from(original.position.column);

                if let Some(name) = original.name {
                    encode(i64::from(name) - previous_name, &mut out);
                    previous_name = i64::from(name);
                }
            }
        }
    }

    out
}

/// A failed codec self-check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("VLQ check vector {value} encoded to {actual:?}, expected {expected:?}")]
pub struct SelfCheckMismatch {
    pub value: i64,
    pub expected: &'static str,
    pub actual: String,
}

/// Canonical encode vectors used by the backend self-checks.
const CHECK_VECTORS: &[(i64, &str)] = &[
    (0, "A"),
    (1, "C"),
    (-1, "D"),
    (2, "E"),
    (-2, "F"),
    (15, "e"),
    (16, "gB"),
    (511, "+f"),
    (1000, "w+B"),
];

/// Round-trip the canonical check vectors.
///
/// Backends run this once during initialization before exposing their API.
pub fn self_check() -> std::result::Result<(), SelfCheckMismatch> {
    for &(value, expected) in CHECK_VECTORS {
        let mut actual = String::new();
        encode(value, &mut actual);
        if actual != expected {
            return Err(SelfCheckMismatch {
                value,
                expected,
                actual,
            });
        }
    }
    Ok(())
}
