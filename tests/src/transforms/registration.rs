use kmodcloak_core::{AnnotationScanner, NameGenerator};
use kmodcloak_transform::obfuscator::rewrite_symbol_source;
use rand::rngs::StdRng;
use rand::SeedableRng;

const DECLS: &str = "\
static int __init flipswitch_init(void); // obfuscate
static void __exit flipswitch_exit(void); // obfuscate
";

const SOURCE: &str = "\
#include \"main.h\"

static int __init flipswitch_init(void)
{
    return 0;
}

static void __exit flipswitch_exit(void)
{
}

module_init(flipswitch_init);
module_exit(  flipswitch_exit );
MODULE_LICENSE(\"GPL\");
";

#[test]
fn test_registration_points_at_aliases() {
    let symbols = AnnotationScanner::default().scan_str(DECLS);
    let names = NameGenerator::default()
        .generate(&symbols, &mut StdRng::seed_from_u64(7))
        .unwrap();
    let init = names.get("flipswitch_init").unwrap();
    let exit = names.get("flipswitch_exit").unwrap();

    let (out, applied) = rewrite_symbol_source(SOURCE, &names, "func_obf_macros.h", None).unwrap();
    assert_eq!(applied, vec!["RegistrationRewrite", "PrependIncludes"]);
    assert!(out.contains(&format!("module_init({init});\n")));
    assert!(out.contains(&format!("module_exit({exit});\n")));

    // Definitions keep their names; the macros rename them at compile time.
    assert!(out.contains("static int __init flipswitch_init(void)\n"));
    assert!(out.contains("MODULE_LICENSE(\"GPL\");\n"));
}

#[test]
fn test_registration_without_renamed_symbols() {
    let names = [("helper".to_string(), "f_00000000".to_string())]
        .into_iter()
        .collect();
    let (out, applied) = rewrite_symbol_source(SOURCE, &names, "func_obf_macros.h", None).unwrap();
    assert_eq!(applied, vec!["PrependIncludes"]);
    assert_eq!(out, format!("#include \"func_obf_macros.h\"\n{SOURCE}"));
}
