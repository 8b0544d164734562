use std::fmt::Write as _;

use crate::types::ColumnKind;

use super::{FieldGroup, ProgramSpec, TargetLanguage};

const INDENT: &str = "   ";
const COMPONENT_INDENT: &str = "      ";
const CONTINUATION_INDENT: &str = "         ";
/// Declaration lines are wrapped before they grow past this many columns.
const MAX_LINE: usize = 100;

/// Fortran 2008 free form: a `sequence` derived type read from a stream-access unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fortran;

impl TargetLanguage for Fortran {
    fn name(&self) -> &'static str {
        "Fortran"
    }

    fn extension(&self) -> &'static str {
        "f90"
    }

    fn declaration(&self, group: &FieldGroup<'_>) -> String {
        let width = group.field_type.width;
        let mut out = match group.field_type.kind {
            ColumnKind::Integer => format!("integer({width}) :: "),
            ColumnKind::Float => format!("real({width}) :: "),
            ColumnKind::Character => format!("character(len={width}) :: "),
        };

        let mut line_len = COMPONENT_INDENT.len() + out.len();
        for (i, name) in group.names.iter().enumerate() {
            if i > 0 {
                if line_len + 2 + name.len() > MAX_LINE {
                    out.push_str(", &\n");
                    out.push_str(CONTINUATION_INDENT);
                    line_len = CONTINUATION_INDENT.len();
                } else {
                    out.push_str(", ");
                    line_len += 2;
                }
            }
            out.push_str(name);
            line_len += name.len();
        }
        out
    }

    fn program(&self, spec: &ProgramSpec<'_>) -> String {
        let mut src = String::new();
        let numeric = &spec.numeric_columns;
        let rows = spec.row_count;

        let _ = writeln!(src, "! Reads {} and prints the mean of every numeric column.", spec.binary_file);
        src.push_str("program main\n\n");
        let _ = writeln!(src, "{INDENT}implicit none\n");

        let _ = writeln!(src, "{INDENT}type record");
        let _ = writeln!(src, "{COMPONENT_INDENT}sequence");
        for decl in &spec.declarations {
            let _ = writeln!(src, "{COMPONENT_INDENT}{decl}");
        }
        let _ = writeln!(src, "{INDENT}end type record\n");

        let _ = writeln!(src, "{INDENT}type(record) :: rec");
        if !numeric.is_empty() {
            let _ = writeln!(src, "{INDENT}real(8) :: sums({})", numeric.len());
        }
        let _ = writeln!(src, "{INDENT}integer(8) :: i");
        let _ = writeln!(src, "{INDENT}integer :: unit_no, ios\n");
        if !numeric.is_empty() {
            let _ = writeln!(src, "{INDENT}sums = 0.0d0\n");
        }

        let _ = writeln!(
            src,
            "{INDENT}open(newunit=unit_no, file='{}', form='unformatted', access='stream', &",
            quote(spec.binary_file)
        );
        let _ = writeln!(src, "{INDENT}     status='old', action='read', iostat=ios)");
        let _ = writeln!(src, "{INDENT}if (ios /= 0) then");
        let _ = writeln!(src, "{INDENT}{INDENT}print '(a)', 'Cannot open the file.'");
        let _ = writeln!(src, "{INDENT}{INDENT}stop 1");
        let _ = writeln!(src, "{INDENT}end if\n");

        let _ = writeln!(src, "{INDENT}do i = 1_8, {rows}_8");
        let _ = writeln!(src, "{INDENT}{INDENT}read(unit_no, iostat=ios) rec");
        let _ = writeln!(src, "{INDENT}{INDENT}if (ios /= 0) then");
        let _ = writeln!(src, "{INDENT}{INDENT}{INDENT}print '(a,i0)', 'Short read at record ', i");
        let _ = writeln!(src, "{INDENT}{INDENT}{INDENT}stop 1");
        let _ = writeln!(src, "{INDENT}{INDENT}end if");
        for (i, col) in numeric.iter().enumerate() {
            let n = i + 1;
            let _ = writeln!(src, "{INDENT}{INDENT}sums({n}) = sums({n}) + rec%{col}");
        }
        let _ = writeln!(src, "{INDENT}end do");
        let _ = writeln!(src, "{INDENT}close(unit_no)\n");

        let _ = writeln!(src, "{INDENT}print '(/,a,/)', 'means of numerical columns'");
        for (i, col) in numeric.iter().enumerate() {
            let _ = writeln!(
                src,
                "{INDENT}print '(a20,f24.5)', '{}', sums({}) / {rows}.0d0",
                quote(col),
                i + 1
            );
        }
        src.push_str("\nend program main\n");
        src
    }
}

/// Escape text for a single-quoted Fortran character literal.
fn quote(s: &str) -> String {
    s.replace('\'', "''")
}
