use kmodcloak_core::header::{emit_macro_header, emit_string_header};
use kmodcloak_core::literal::xor_decode;
use kmodcloak_core::{run_rng, AnnotationScanner, NameGenerator, StringConfig, StringTable};
use kmodcloak_transform::obfuscator::rewrite_symbol_source;
use rand::rngs::StdRng;
use rand::SeedableRng;
use regex::Regex;

const DECLS: &str = r#"
/* Init and exit functions */
static int __init flipswitch_init(void); // obfuscate
static void __exit flipswitch_exit(void); // obfuscate

/* Function prototypes */
void *find_kallsyms_lookup_name(void); // obfuscate
void *find_sym_pointer(const char *symbol_name); // obfuscate
asmlinkage int fake_kill(const struct pt_regs *regs); // obfuscate
static inline int is_hooked(void); // obfuscate

/* Globals */
static t_syscall orig_kill = NULL; // obfuscate
static unsigned long *sys_call_table = NULL; // obfuscate
int hook_enabled = 1; // obfuscate
int not_marked = 0;
"#;

#[test]
fn test_header_defines_every_symbol_once() {
    let symbols = AnnotationScanner::default().scan_str(DECLS);
    assert_eq!(symbols.len(), 9);

    let mut rng = StdRng::seed_from_u64(42);
    let names = NameGenerator::default().generate(&symbols, &mut rng).unwrap();
    let header = emit_macro_header(&names, "FUNC_OBF_MACROS_H");

    let defines: Vec<Vec<&str>> = header
        .lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>())
        .filter(|t| t.len() == 3 && t[0] == "#define")
        .collect();
    assert_eq!(defines.len(), symbols.len());
    for name in symbols.names() {
        assert_eq!(defines.iter().filter(|t| t[1] == name).count(), 1, "{name}");
    }
    assert!(!header.contains("not_marked"));
}

#[test]
fn test_aliases_have_fixed_shape() {
    let symbols = AnnotationScanner::default().scan_str(DECLS);
    let shape = Regex::new(r"^f_[a-z0-9]{8}$").unwrap();

    for _ in 0..20 {
        let names = NameGenerator::default()
            .generate(&symbols, &mut run_rng(None))
            .unwrap();
        for (original, alias) in names.iter() {
            assert!(shape.is_match(alias), "{alias}");
            assert!(!symbols.contains(alias), "{original} -> {alias}");
        }
    }
}

#[test]
fn test_custom_alias_shape() {
    let symbols = AnnotationScanner::default().scan_str(DECLS);
    let generator = NameGenerator::new("__k", 12).unwrap();
    let names = generator.generate(&symbols, &mut run_rng(None)).unwrap();
    let shape = Regex::new(r"^__k[a-z0-9]{12}$").unwrap();
    assert!(names.iter().all(|(_, a)| shape.is_match(a)));
}

#[test]
fn test_generation_is_structural_not_literal() {
    let symbols = AnnotationScanner::default().scan_str(DECLS);
    let a = NameGenerator::default()
        .generate(&symbols, &mut run_rng(None))
        .unwrap();
    let b = NameGenerator::default()
        .generate(&symbols, &mut run_rng(None))
        .unwrap();

    let keys_a: Vec<&str> = a.iter().map(|(k, _)| k).collect();
    let keys_b: Vec<&str> = b.iter().map(|(k, _)| k).collect();
    assert_eq!(keys_a, keys_b);

    // Same map in, same header out.
    assert_eq!(
        emit_macro_header(&a, "FUNC_OBF_MACROS_H"),
        emit_macro_header(&a.clone(), "FUNC_OBF_MACROS_H")
    );
}

#[test]
fn test_string_round_trip() {
    let literals = [
        "prepare_creds",
        "commit_creds",
        "kallsyms_lookup_name",
        "x64_sys_call",
        "with spaces, punctuation: !#%&'()*+,-./:;<=>?@[]^_`{|}~",
        "unicode \u{00e9}\u{4e2d}",
    ];
    for key in [0x01, 0x5C, 0xAA, 0xFF] {
        let config = StringConfig {
            key,
            ..Default::default()
        };
        let mut table = StringTable::new(config.key);
        for text in literals {
            table.add(text, &config.macro_prefix);
        }
        for entry in table.entries() {
            assert_eq!(entry.cipher.last(), Some(&0));
            assert_eq!(entry.cipher.len(), entry.original.len() + 1);
            assert_eq!(xor_decode(&entry.cipher, key), entry.original.as_bytes());
        }
    }
}

#[test]
fn test_string_header_bytes_decode() {
    let table = StringTable::scan(
        r#"p = O_STRING("commit_creds");"#,
        &StringConfig::default(),
    )
    .unwrap();
    let header = emit_string_header(&table, "OBFUSCATED_STRINGS_H");

    let array = Regex::new(r"OBF_COMMIT_CREDS\[\] = \{([^}]*)\}").unwrap();
    let caps = array.captures(&header).unwrap();
    let bytes: Vec<u8> = caps[1]
        .split(", ")
        .map(|b| u8::from_str_radix(b.trim_start_matches("0x"), 16).unwrap())
        .collect();
    assert_eq!(xor_decode(&bytes, 0xAA), b"commit_creds");
    assert!(header.contains("#define OBF_COMMIT_CREDS_LEN 13\n"));
}

#[test]
fn test_rewriter_adds_exactly_the_include_lines() {
    let source = "#include <linux/module.h>\n\nint main(void)\n{\n    return do_work(5);\n}\n";
    let names = [("do_work".to_string(), "f_abcdefgh".to_string())]
        .into_iter()
        .collect();
    let original: Vec<&str> = source.lines().collect();

    let (out, _) = rewrite_symbol_source(source, &names, "func_obf_macros.h", None).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), original.len() + 1);
    assert_eq!(lines[0], "#include \"func_obf_macros.h\"");
    assert_eq!(&lines[1..], &original[..]);

    let (out, _) =
        rewrite_symbol_source(source, &names, "func_obf_macros.h", Some("meta.h")).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), original.len() + 2);
    assert_eq!(lines[1], "#include \"meta.h\"");
    assert_eq!(&lines[2..], &original[..]);
}

#[test]
fn test_rewriter_preserves_missing_trailing_newline() {
    let names = kmodcloak_core::NameMap::new();
    let (out, _) = rewrite_symbol_source("int x;", &names, "m.h", None).unwrap();
    assert_eq!(out, "#include \"m.h\"\nint x;");
}
