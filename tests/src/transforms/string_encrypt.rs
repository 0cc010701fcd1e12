use kmodcloak_core::literal::xor_decode;
use kmodcloak_core::StringConfig;
use kmodcloak_transform::obfuscator::obfuscate_string_source;
use regex::Regex;

const SOURCE: &str = r#"#include <linux/module.h>
#include <linux/kprobes.h>

static void *resolve(void)
{
    void *p = find_sym_pointer(O_STRING("commit_creds"));
    printk(KERN_INFO "%s\n", O_STRING("sys-call.table"));
    kp.symbol_name = O_STRING("kallsyms_lookup_name");
    return p ? p : find_sym_pointer(O_STRING("commit_creds"));
}
"#;

#[test]
fn test_full_source_rewrite() {
    let config = StringConfig::default();
    let (out, header, table, _) =
        obfuscate_string_source(SOURCE, "obf_strings.h", &config).unwrap();

    assert_eq!(table.len(), 3);
    assert!(!out.contains("O_STRING"));
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), SOURCE.lines().count() + 1);
    assert_eq!(lines[0], "#include <linux/module.h>");
    assert_eq!(lines[1], "#include \"obf_strings.h\"");
    assert_eq!(lines[2], "#include <linux/kprobes.h>");

    assert_eq!(
        out.matches("deobfuscate(OBF_COMMIT_CREDS, OBF_COMMIT_CREDS_LEN, OBF_COMMIT_CREDS_KEY)")
            .count(),
        2
    );
    assert!(out.contains(
        "printk(KERN_INFO \"%s\\n\", deobfuscate(OBF_SYS_CALL_TABLE, OBF_SYS_CALL_TABLE_LEN, OBF_SYS_CALL_TABLE_KEY));"
    ));
    assert!(out.contains("OBF_KALLSYMS_LOOKUP_NAME_KEY); /* \"kallsyms_lookup_name\" */"));

    // Every macro the source now names is defined by the header.
    let used = Regex::new(r"\bOBF_[A-Z0-9_]+").unwrap();
    for m in used.find_iter(&out) {
        assert!(
            header.contains(&format!("#define {} ", m.as_str()))
                || header.contains(&format!("{}[] = ", m.as_str())),
            "{} is not defined",
            m.as_str()
        );
    }
}

#[test]
fn test_custom_wrapper_decoder_and_key() {
    let config = StringConfig {
        key: 0x5C,
        wrapper: "HIDE".to_string(),
        decoder: "xs".to_string(),
        ..Default::default()
    };
    let source = "a = HIDE(\"value\");\nb = O_STRING(\"kept\");\n";
    let (out, header, table, _) = obfuscate_string_source(source, "h.h", &config).unwrap();

    assert_eq!(
        out,
        "#include \"h.h\"\na = xs(OBF_VALUE, OBF_VALUE_LEN, OBF_VALUE_KEY); /* \"value\" */\nb = O_STRING(\"kept\");\n"
    );
    assert!(header.contains("#define OBF_VALUE_KEY 0x5C\n"));
    let entry = table.get("value").unwrap();
    assert_eq!(xor_decode(&entry.cipher, 0x5C), b"value");
}

#[test]
fn test_colliding_macro_names_stay_distinct() {
    let source = "a = O_STRING(\"a.b\");\nb = O_STRING(\"a_b\");\n";
    let (out, header, _, _) =
        obfuscate_string_source(source, "h.h", &StringConfig::default()).unwrap();
    assert!(out.contains("deobfuscate(OBF_A_B, OBF_A_B_LEN, OBF_A_B_KEY); /* \"a.b\" */"));
    assert!(out.contains("deobfuscate(OBF_A_B_2, OBF_A_B_2_LEN, OBF_A_B_2_KEY); /* \"a_b\" */"));
    assert!(header.contains("#define OBF_A_B_2_LEN 4\n"));
}

#[test]
fn test_header_already_included() {
    let source = "#include \"h.h\"\nx = O_STRING(\"abc\");\n";
    let (out, _, _, applied) =
        obfuscate_string_source(source, "h.h", &StringConfig::default()).unwrap();
    assert_eq!(out.matches("#include \"h.h\"").count(), 1);
    assert_eq!(applied, vec!["StringEncrypt"]);
}

#[test]
fn test_invalid_decoder_rejected() {
    let config = StringConfig {
        decoder: "not valid".to_string(),
        ..Default::default()
    };
    assert!(obfuscate_string_source("x = O_STRING(\"a\");", "h.h", &config).is_err());
}

#[test]
fn test_header_never_defines_an_identifier_twice() {
    let source = "a = O_STRING(\"a\");\nb = O_STRING(\"a_len\");\nc = O_STRING(\"a_key\");\n";
    let (out, header, _, _) =
        obfuscate_string_source(source, "h.h", &StringConfig::default()).unwrap();

    let defined = Regex::new(r"(?m)^(?:#define (\w+) |static const unsigned char (\w+)\[\])").unwrap();
    let mut seen = std::collections::HashSet::new();
    for caps in defined.captures_iter(&header) {
        let name = caps.get(1).or_else(|| caps.get(2)).unwrap().as_str();
        assert!(seen.insert(name.to_string()), "{name} defined twice");
    }
    assert!(out.contains("deobfuscate(OBF_A_LEN_2, OBF_A_LEN_2_LEN, OBF_A_LEN_2_KEY); /* \"a_len\" */"));
    assert!(out.contains("deobfuscate(OBF_A_KEY_2, OBF_A_KEY_2_LEN, OBF_A_KEY_2_KEY); /* \"a_key\" */"));
}

#[test]
fn test_literal_split_across_lines_left_alone() {
    let source = "x = O_STRING(\"ab\ncd\");\n";
    let (out, header, table, _) =
        obfuscate_string_source(source, "h.h", &StringConfig::default()).unwrap();
    assert!(table.is_empty());
    assert!(!header.contains("cd\""));
    assert_eq!(out, format!("#include \"h.h\"\n{source}"));
}
