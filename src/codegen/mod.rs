//! Declaration and reader-program generation.
//!
//! One generator serves every target: descriptors are validated once, grouped by
//! [`group_fields`], and each target only supplies its own syntax through [`TargetLanguage`].
//!
//! ```rust
//! use ds2bin::codegen::{generate, C};
//! use ds2bin::types::{ColumnDescriptor, FieldType};
//!
//! let descriptors = vec![
//!     ColumnDescriptor::new("a", FieldType::integer(4)),
//!     ColumnDescriptor::new("b", FieldType::character(4)),
//! ];
//! let source = generate(&C, &descriptors, "data.bin", 3).unwrap();
//! assert!(source.contains("int32_t a;"));
//! assert!(source.contains("char b[4];"));
//! ```

mod c;
mod fortran;

use std::collections::HashSet;

use crate::error::{ConvertError, ConvertResult};
use crate::types::{ColumnDescriptor, ColumnKind, FieldType};

pub use c::C;
pub use fortran::Fortran;

/// Maximum number of names in one declaration statement.
pub const MAX_GROUP_LEN: usize = 8;

/// Longest name a Fortran 2008 compiler must accept.
pub const MAX_NAME_LEN: usize = 63;

/// Words a struct member may not be named in C: keywords (C99 through C23, plus `asm`), the
/// typedefs and object-like macros of the two headers the reader includes.
const C_RESERVED: &[&str] = &[
    "alignas", "alignof", "asm", "auto", "bool", "break", "case", "char", "const", "constexpr",
    "continue", "default", "do", "double", "else", "enum", "extern", "false", "float", "for",
    "goto", "if", "inline", "int", "long", "nullptr", "register", "restrict", "return", "short",
    "signed", "sizeof", "static", "static_assert", "struct", "switch", "thread_local", "true",
    "typedef", "typeof", "typeof_unqual", "union", "unsigned", "void", "volatile", "while",
    "BUFSIZ", "EOF", "FILE", "FILENAME_MAX", "FOPEN_MAX", "L_tmpnam", "NULL", "SEEK_CUR",
    "SEEK_END", "SEEK_SET", "TMP_MAX", "fpos_t", "intmax_t", "intptr_t", "size_t", "stderr",
    "stdin", "stdout", "uintmax_t", "uintptr_t",
];

/// Consecutive same-typed fields declared by one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldGroup<'a> {
    pub field_type: FieldType,
    pub names: Vec<&'a str>,
}

/// Everything a target needs to emit its reader program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSpec<'a> {
    /// File name of the binary data, as opened by the generated program.
    pub binary_file: &'a str,
    /// Number of records to read.
    pub row_count: usize,
    /// Numeric (integer and float) columns, in record order.
    pub numeric_columns: Vec<&'a str>,
    /// One declaration statement per [`FieldGroup`], already rendered by the target.
    pub declarations: Vec<String>,
}

/// Syntax of one generated language.
pub trait TargetLanguage: Send + Sync {
    /// Human-readable language name.
    fn name(&self) -> &'static str;

    /// Source file extension, without the dot.
    fn extension(&self) -> &'static str;

    /// Render one declaration statement. The group's type has already been validated.
    fn declaration(&self, group: &FieldGroup<'_>) -> String;

    /// Render the complete program around the declarations.
    fn program(&self, spec: &ProgramSpec<'_>) -> String;
}

/// Check that every descriptor maps to a type both targets can declare.
///
/// Integer and float fields must be 4 or 8 bytes wide; character fields any positive length.
pub fn validate_widths(descriptors: &[ColumnDescriptor]) -> ConvertResult<()> {
    for d in descriptors {
        let ok = match d.kind {
            ColumnKind::Integer | ColumnKind::Float => matches!(d.width, 4 | 8),
            ColumnKind::Character => d.width > 0,
        };
        if !ok {
            return Err(ConvertError::UnsupportedWidth {
                column: d.name.clone(),
                kind: d.kind,
                width: d.width,
            });
        }
    }
    Ok(())
}

/// Check that every column name is a field name both targets can declare.
///
/// A name must start with an ASCII letter, continue with ASCII letters, digits or `_`, be at most
/// [`MAX_NAME_LEN`] bytes long and not be reserved in C. Fortran ignores letter case, so no two
/// names may differ only in case.
pub fn validate_names(descriptors: &[ColumnDescriptor]) -> ConvertResult<()> {
    let mut seen = HashSet::with_capacity(descriptors.len());
    for d in descriptors {
        let reason = identifier_problem(&d.name).or_else(|| {
            (!seen.insert(d.name.to_ascii_lowercase()))
                .then(|| "another column has the same name in a different letter case".to_string())
        });
        if let Some(reason) = reason {
            return Err(ConvertError::InvalidColumnName {
                column: d.name.clone(),
                reason,
            });
        }
    }
    Ok(())
}

fn identifier_problem(name: &str) -> Option<String> {
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Some("must start with an ASCII letter".to_string());
    }
    if let Some(c) = name.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '_') {
        return Some(format!("contains {c:?}; only ASCII letters, digits and '_' are allowed"));
    }
    if name.len() > MAX_NAME_LEN {
        return Some(format!("longer than {MAX_NAME_LEN} characters"));
    }
    if C_RESERVED.contains(&name) || is_stdint_name(name) {
        return Some("reserved in C".to_string());
    }
    None
}

/// `<stdint.h>` typedefs (`int32_t`, `uint_least8_t`, ...) and limit macros (`INT32_MAX`, ...).
fn is_stdint_name(name: &str) -> bool {
    let typedef = name
        .strip_suffix("_t")
        .map(|stem| stem.strip_prefix('u').unwrap_or(stem))
        .and_then(|stem| stem.strip_prefix("int"))
        .map(|rest| {
            let rest = rest
                .strip_prefix("_least")
                .or_else(|| rest.strip_prefix("_fast"))
                .unwrap_or(rest);
            !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit())
        })
        .unwrap_or(false);

    let limit = ["INT", "UINT", "PTRDIFF", "SIZE", "SIG_ATOMIC", "WCHAR", "WINT"]
        .iter()
        .any(|p| name.starts_with(p))
        && ["_MAX", "_MIN", "_C"].iter().any(|s| name.ends_with(s));

    typedef || limit
}

/// Group consecutive fields sharing a `(kind, width)` pair, at most [`MAX_GROUP_LEN`] per group.
///
/// Groups only affect how declarations are written; concatenating their names yields the
/// descriptors' order exactly.
pub fn group_fields(descriptors: &[ColumnDescriptor]) -> Vec<FieldGroup<'_>> {
    let mut groups: Vec<FieldGroup<'_>> = Vec::new();
    let mut prev: Option<FieldType> = None;
    let mut run = 0;

    for d in descriptors {
        let ft = d.field_type();
        if prev == Some(ft) && run < MAX_GROUP_LEN {
            if let Some(group) = groups.last_mut() {
                group.names.push(d.name.as_str());
                run += 1;
            }
        } else {
            groups.push(FieldGroup {
                field_type: ft,
                names: vec![d.name.as_str()],
            });
            run = 1;
        }
        prev = Some(ft);
    }
    groups
}

/// Generate the declarations and reader program for `target`.
pub fn generate(
    target: &dyn TargetLanguage,
    descriptors: &[ColumnDescriptor],
    binary_file: &str,
    row_count: usize,
) -> ConvertResult<String> {
    validate_widths(descriptors)?;
    validate_names(descriptors)?;

    let declarations = group_fields(descriptors)
        .iter()
        .map(|g| target.declaration(g))
        .collect();
    let numeric_columns = descriptors
        .iter()
        .filter(|d| d.is_numeric())
        .map(|d| d.name.as_str())
        .collect();

    Ok(target.program(&ProgramSpec {
        binary_file,
        row_count,
        numeric_columns,
        declarations,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptors(types: &[(&str, FieldType)]) -> Vec<ColumnDescriptor> {
        types
            .iter()
            .map(|(name, ft)| ColumnDescriptor::new(*name, *ft))
            .collect()
    }

    #[test]
    fn consecutive_same_types_share_a_group() {
        let ds = descriptors(&[
            ("a", FieldType::integer(4)),
            ("b", FieldType::integer(4)),
            ("c", FieldType::integer(8)),
            ("d", FieldType::integer(4)),
            ("s", FieldType::character(2)),
            ("t", FieldType::character(3)),
        ]);
        let groups = group_fields(&ds);
        let shape: Vec<(FieldType, Vec<&str>)> = groups
            .into_iter()
            .map(|g| (g.field_type, g.names))
            .collect();
        assert_eq!(
            shape,
            vec![
                (FieldType::integer(4), vec!["a", "b"]),
                (FieldType::integer(8), vec!["c"]),
                (FieldType::integer(4), vec!["d"]),
                (FieldType::character(2), vec!["s"]),
                (FieldType::character(3), vec!["t"]),
            ]
        );
    }

    #[test]
    fn runs_are_split_after_eight_names() {
        let names: Vec<String> = (1..=17).map(|i| format!("f{i}")).collect();
        let ds: Vec<ColumnDescriptor> = names
            .iter()
            .map(|n| ColumnDescriptor::new(n.as_str(), FieldType::float(8)))
            .collect();
        let groups = group_fields(&ds);
        let sizes: Vec<usize> = groups.iter().map(|g| g.names.len()).collect();
        assert_eq!(sizes, vec![8, 8, 1]);

        let ungrouped: Vec<&str> = groups.iter().flat_map(|g| g.names.iter().copied()).collect();
        let expected: Vec<&str> = names.iter().map(String::as_str).collect();
        assert_eq!(ungrouped, expected);
    }

    #[test]
    fn narrow_numeric_widths_are_rejected_before_generation() {
        let ds = descriptors(&[("a", FieldType::integer(4)), ("b", FieldType::integer(2))]);
        let err = generate(&C, &ds, "x.bin", 1).unwrap_err();
        match err {
            ConvertError::UnsupportedWidth { column, kind, width } => {
                assert_eq!(column, "b");
                assert_eq!(kind, ColumnKind::Integer);
                assert_eq!(width, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(validate_widths(&descriptors(&[("f", FieldType::float(2))])).is_err());
        assert!(validate_widths(&descriptors(&[("s", FieldType::character(0))])).is_err());
        assert!(validate_widths(&descriptors(&[("s", FieldType::character(99))])).is_ok());
    }

    #[test]
    fn names_must_be_identifiers_in_both_targets() {
        let field = |name: &str| ColumnDescriptor::new(name, FieldType::integer(8));
        for bad in [
            "first name", "x-1", "1st", "_tmp", "caf\u{e9}", "int", "while", "EOF", "stdout",
            "int32_t", "uint_least8_t", "INT64_MAX",
        ] {
            let err = validate_names(&[field(bad)]).unwrap_err();
            assert!(
                matches!(err, ConvertError::InvalidColumnName { ref column, .. } if column == bad),
                "{bad}: {err}"
            );
        }

        let long = "n".repeat(MAX_NAME_LEN + 1);
        assert!(validate_names(&[field(&long)]).is_err());
        assert!(validate_names(&[field(&long[1..])]).is_ok());

        for good in ["id", "x_1", "Int", "count", "record", "int32", "sums", "FILE_ID"] {
            assert!(validate_names(&[field(good)]).is_ok(), "{good}");
        }
    }

    #[test]
    fn names_differing_only_in_case_are_rejected() {
        let ds = descriptors(&[("Score", FieldType::float(8)), ("score", FieldType::float(8))]);
        let err = generate(&C, &ds, "x.bin", 1).unwrap_err();
        assert!(err.to_string().contains("column name 'score'"), "{err}");
        assert!(err.to_string().contains("letter case"), "{err}");
    }

    #[test]
    fn numeric_columns_exclude_character_fields() {
        struct Capture;
        impl TargetLanguage for Capture {
            fn name(&self) -> &'static str {
                "capture"
            }
            fn extension(&self) -> &'static str {
                "txt"
            }
            fn declaration(&self, group: &FieldGroup<'_>) -> String {
                format!("{} {}", group.field_type, group.names.join(","))
            }
            fn program(&self, spec: &ProgramSpec<'_>) -> String {
                format!(
                    "{}|{}|{}|{}",
                    spec.binary_file,
                    spec.row_count,
                    spec.numeric_columns.join(","),
                    spec.declarations.join(";")
                )
            }
        }

        let ds = descriptors(&[
            ("a", FieldType::integer(4)),
            ("b", FieldType::character(4)),
            ("c", FieldType::float(8)),
        ]);
        let out = generate(&Capture, &ds, "t.bin", 3).unwrap();
        assert_eq!(out, "t.bin|3|a,c|int32 a;S4 b;float64 c");
    }
}
