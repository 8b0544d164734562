use std::fmt::Write as _;

use crate::types::ColumnKind;

use super::{FieldGroup, ProgramSpec, TargetLanguage};

const INDENT: &str = "    ";

/// C99: a packed struct of `<stdint.h>` types read with `fread`.
#[derive(Debug, Clone, Copy, Default)]
pub struct C;

impl TargetLanguage for C {
    fn name(&self) -> &'static str {
        "C"
    }

    fn extension(&self) -> &'static str {
        "c"
    }

    fn declaration(&self, group: &FieldGroup<'_>) -> String {
        let width = group.field_type.width;
        match group.field_type.kind {
            ColumnKind::Character => {
                let fields: Vec<String> = group.names.iter().map(|n| format!("{n}[{width}]")).collect();
                format!("char {};", fields.join(", "))
            }
            ColumnKind::Integer => {
                let ty = if width == 4 { "int32_t" } else { "int64_t" };
                format!("{ty} {};", group.names.join(", "))
            }
            ColumnKind::Float => {
                let ty = if width == 4 { "float" } else { "double" };
                format!("{ty} {};", group.names.join(", "))
            }
        }
    }

    fn program(&self, spec: &ProgramSpec<'_>) -> String {
        let mut src = String::new();
        let numeric = &spec.numeric_columns;

        let _ = writeln!(src, "/* Reads {} and prints the mean of every numeric column. */", spec.binary_file);
        src.push_str("#include <stdint.h>\n#include <stdio.h>\n\n");
        src.push_str("#pragma pack(push, 1)\nstruct record {\n");
        for decl in &spec.declarations {
            let _ = writeln!(src, "{INDENT}{decl}");
        }
        src.push_str("};\n#pragma pack(pop)\n\n");

        src.push_str("int main(void) {\n");
        let _ = writeln!(src, "{INDENT}struct record rec;");
        let _ = writeln!(src, "{INDENT}const long row_count = {}L;", spec.row_count);
        if !numeric.is_empty() {
            let _ = writeln!(src, "{INDENT}double sums[{}] = {{ 0.0 }};", numeric.len());
        }
        let _ = writeln!(src, "{INDENT}FILE *fp;");
        let _ = writeln!(src, "{INDENT}long i;\n");

        let _ = writeln!(src, "{INDENT}fp = fopen(\"{}\", \"rb\");", escape(spec.binary_file));
        let _ = writeln!(src, "{INDENT}if (fp == NULL) {{");
        let _ = writeln!(src, "{INDENT}{INDENT}puts(\"Cannot open the file.\");");
        let _ = writeln!(src, "{INDENT}{INDENT}return 1;");
        let _ = writeln!(src, "{INDENT}}}\n");

        let _ = writeln!(src, "{INDENT}for (i = 0; i < row_count; i++) {{");
        let _ = writeln!(src, "{INDENT}{INDENT}if (fread(&rec, sizeof(rec), 1, fp) != 1) {{");
        let _ = writeln!(
            src,
            "{INDENT}{INDENT}{INDENT}fprintf(stderr, \"Short read at record %ld\\n\", i + 1);"
        );
        let _ = writeln!(src, "{INDENT}{INDENT}{INDENT}fclose(fp);");
        let _ = writeln!(src, "{INDENT}{INDENT}{INDENT}return 1;");
        let _ = writeln!(src, "{INDENT}{INDENT}}}");
        for (i, col) in numeric.iter().enumerate() {
            let _ = writeln!(src, "{INDENT}{INDENT}sums[{i}] += rec.{col};");
        }
        let _ = writeln!(src, "{INDENT}}}");
        let _ = writeln!(src, "{INDENT}fclose(fp);\n");

        let _ = writeln!(src, "{INDENT}printf(\"\\nmeans of numerical columns\\n\\n\");");
        for (i, col) in numeric.iter().enumerate() {
            let _ = writeln!(
                src,
                "{INDENT}printf(\"%-20s %24.5f\\n\", \"{}\", sums[{i}] / (double) row_count);",
                escape(col)
            );
        }
        let _ = writeln!(src, "{INDENT}return 0;");
        src.push_str("}\n");
        src
    }
}

/// Escape text for a C string literal.
fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::generate;
    use crate::types::{ColumnDescriptor, FieldType};

    #[test]
    fn declarations_use_fixed_width_types() {
        let group = |ft: FieldType, names: Vec<&'static str>| FieldGroup { field_type: ft, names };
        assert_eq!(C.declaration(&group(FieldType::integer(4), vec!["a", "b"])), "int32_t a, b;");
        assert_eq!(C.declaration(&group(FieldType::integer(8), vec!["c"])), "int64_t c;");
        assert_eq!(C.declaration(&group(FieldType::float(4), vec!["f"])), "float f;");
        assert_eq!(C.declaration(&group(FieldType::float(8), vec!["g", "h"])), "double g, h;");
        assert_eq!(
            C.declaration(&group(FieldType::character(4), vec!["s", "t"])),
            "char s[4], t[4];"
        );
    }

    #[test]
    fn program_sums_numeric_columns_only() {
        let ds = vec![
            ColumnDescriptor::new("a", FieldType::integer(4)),
            ColumnDescriptor::new("b", FieldType::character(4)),
            ColumnDescriptor::new("c", FieldType::float(8)),
        ];
        let src = generate(&C, &ds, "data.bin", 3).unwrap();

        assert!(src.contains("#pragma pack(push, 1)\nstruct record {\n    int32_t a;\n    char b[4];\n    double c;\n};"));
        assert!(src.contains("const long row_count = 3L;"));
        assert!(src.contains("double sums[2] = { 0.0 };"));
        assert!(src.contains("fp = fopen(\"data.bin\", \"rb\");"));
        assert!(src.contains("sums[0] += rec.a;"));
        assert!(src.contains("sums[1] += rec.c;"));
        assert!(!src.contains("rec.b;"));
        assert!(src.contains("printf(\"%-20s %24.5f\\n\", \"a\", sums[0] / (double) row_count);"));
        assert!(!src.contains("\"b\", sums"));
    }

    #[test]
    fn program_without_numeric_columns_has_no_sums() {
        let ds = vec![ColumnDescriptor::new("s", FieldType::character(2))];
        let src = generate(&C, &ds, "text.bin", 1).unwrap();
        assert!(!src.contains("sums"));
        assert!(src.contains("char s[2];"));
    }

    #[test]
    fn string_literals_are_escaped() {
        assert_eq!(escape(r#"dir\a"b.bin"#), r#"dir\\a\"b.bin"#);
    }
}
