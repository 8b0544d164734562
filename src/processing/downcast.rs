//! Lossless float → integer narrowing.

use crate::types::{ColumnDescriptor, ColumnKind, ColumnValues, FieldType, ResolvedColumn};

/// Integer widths, narrowest first.
const INTEGER_WIDTHS: [usize; 4] = [1, 2, 4, 8];

/// Narrow every float column whose values are all exact integers.
///
/// A value qualifies when its integer candidate, widened back to the column's float width, is
/// bit-for-bit identical to the original (so `-0.0`, NaN and infinities never qualify). A column
/// with any non-qualifying row is left untouched. Qualifying columns become the narrowest integer
/// width that holds every value. Zero-row columns are left untouched.
///
/// Returns the names of the narrowed columns.
pub fn downcast_columns(columns: &mut [ResolvedColumn]) -> Vec<String> {
    let mut narrowed = Vec::new();
    for col in columns.iter_mut() {
        if col.descriptor.kind != ColumnKind::Float || col.values.is_empty() {
            continue;
        }
        let ColumnValues::Float(values) = &col.values else {
            continue;
        };
        let Some(ints) = exact_integers(values, col.descriptor.width) else {
            continue;
        };

        let width = smallest_integer_width(&ints);
        col.descriptor = ColumnDescriptor::new(col.descriptor.name.clone(), FieldType::integer(width));
        col.values = ColumnValues::Integer(ints);
        narrowed.push(col.descriptor.name.clone());
    }
    narrowed
}

/// Convert every value to its integer candidate, or `None` if any value is not exact.
pub(crate) fn exact_integers(values: &[f64], float_width: usize) -> Option<Vec<i64>> {
    values
        .iter()
        .map(|&v| float_to_integer_exact(v, float_width))
        .collect()
}

/// The integer that re-expands to exactly `v` at `float_width` bytes, if there is one.
pub(crate) fn float_to_integer_exact(v: f64, float_width: usize) -> Option<i64> {
    // 2^63; `i64::MIN` is exactly representable, `i64::MAX` is not.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if !v.is_finite() || v.trunc() != v || v < -LIMIT || v >= LIMIT {
        return None;
    }
    let candidate = v as i64;
    let round_trips = match float_width {
        4 => (candidate as f32).to_bits() == (v as f32).to_bits(),
        _ => (candidate as f64).to_bits() == v.to_bits(),
    };
    round_trips.then_some(candidate)
}

/// Narrowest width in 1/2/4/8 bytes whose signed range covers every value.
pub(crate) fn smallest_integer_width(values: &[i64]) -> usize {
    INTEGER_WIDTHS
        .into_iter()
        .find(|&w| values.iter().all(|&v| fits_integer_width(v, w)))
        .unwrap_or(8)
}

/// Whether `v` survives a round trip through a signed integer of `width` bytes.
pub(crate) fn fits_integer_width(v: i64, width: usize) -> bool {
    match width {
        1 => i8::try_from(v).is_ok(),
        2 => i16::try_from(v).is_ok(),
        4 => i32::try_from(v).is_ok(),
        8 => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn float_column(name: &str, width: usize, values: Vec<f64>) -> ResolvedColumn {
        ResolvedColumn {
            descriptor: ColumnDescriptor::new(name, FieldType::float(width)),
            values: ColumnValues::Float(values),
        }
    }

    #[test]
    fn integral_floats_narrow_to_smallest_width() {
        let mut cols = vec![
            float_column("small", 8, vec![0.0, 14.0, -100.0]),
            float_column("medium", 8, vec![1.0, 40_000.0]),
            float_column("large", 4, vec![3_000_000_000.0]),
        ];
        let narrowed = downcast_columns(&mut cols);

        assert_eq!(narrowed, vec!["small", "medium", "large"]);
        assert_eq!(cols[0].descriptor.field_type(), FieldType::integer(1));
        assert_eq!(cols[0].values, ColumnValues::Integer(vec![0, 14, -100]));
        assert_eq!(cols[1].descriptor.field_type(), FieldType::integer(4));
        assert_eq!(cols[2].descriptor.field_type(), FieldType::integer(8));
    }

    #[test]
    fn a_single_fractional_row_keeps_the_column_float() {
        let mut cols = vec![float_column("f", 8, vec![1.0, 2.0, 2.5])];
        assert!(downcast_columns(&mut cols).is_empty());
        assert_eq!(cols[0].descriptor.field_type(), FieldType::float(8));
        assert_eq!(cols[0].values, ColumnValues::Float(vec![1.0, 2.0, 2.5]));
    }

    #[test]
    fn negative_zero_nan_and_infinity_are_not_exact() {
        assert_eq!(float_to_integer_exact(-0.0, 8), None);
        assert_eq!(float_to_integer_exact(f64::NAN, 8), None);
        assert_eq!(float_to_integer_exact(f64::INFINITY, 4), None);
        assert_eq!(float_to_integer_exact(0.0, 8), Some(0));
        assert_eq!(float_to_integer_exact(-9_223_372_036_854_775_808.0, 8), Some(i64::MIN));
        assert_eq!(float_to_integer_exact(9_223_372_036_854_775_808.0, 8), None);
    }

    #[test]
    fn narrowed_values_widen_back_bit_for_bit() {
        let originals = vec![-128.0, 127.0, 65_536.0, 1e15];
        let mut cols = vec![float_column("x", 8, originals.clone())];
        downcast_columns(&mut cols);

        let ColumnValues::Integer(ints) = &cols[0].values else {
            panic!("column was not narrowed");
        };
        for (i, orig) in ints.iter().zip(&originals) {
            assert_eq!((*i as f64).to_bits(), orig.to_bits());
        }
    }

    #[test]
    fn non_float_and_empty_columns_are_untouched() {
        let mut cols = vec![
            ResolvedColumn {
                descriptor: ColumnDescriptor::new("i", FieldType::integer(8)),
                values: ColumnValues::Integer(vec![1, 2]),
            },
            ResolvedColumn {
                descriptor: ColumnDescriptor::new("s", FieldType::character(2)),
                values: ColumnValues::Text(vec!["1".into(), "2".into()]),
            },
            float_column("empty", 8, vec![]),
        ];
        let before = cols.clone();
        assert!(downcast_columns(&mut cols).is_empty());
        assert_eq!(cols, before);
    }
}
