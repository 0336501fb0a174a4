use std::{fs, path::PathBuf};

use fight::{config::Config, error::Error, interpreter::value::core::Value, run, run_file};

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn run_in_fixtures(src: &str) -> Result<Option<Value>, Error> {
    run(src, &Config::default().with_base_dir(fixtures()))
}

fn assert_import_kind(src: &str, kind: &str) {
    match run_in_fixtures(src) {
        Err(Error::Runtime(e)) => assert_eq!(e.kind_name(), kind, "{e}"),
        other => panic!("expected {kind}, got {other:?}"),
    }
}

#[test]
fn exported_functions_run_against_their_module() {
    let out = run_in_fixtures("let SCALE = 100; \
                               use (Area) from \"geometry.fight\"; \
                               Area(2, 3);").unwrap();
    assert_eq!(out, Some(Value::Integer(6)));
}

#[test]
fn imported_functions_cannot_write_the_callers_fields() {
    let out = run_in_fixtures("use (SetX) from \"setter.fight\"; \
                               class A { fields { X = 1; } methods { def Go() void { SetX(); } } } \
                               let a = new A(); \
                               a->Go(); \
                               a->X;").unwrap();
    assert_eq!(out, Some(Value::Integer(1)));
    let out = run_in_fixtures("use (SetX) from \"setter.fight\"; \
                               class A { fields { X = 1; } methods { def Go() int { return SetX(); } } } \
                               let a = new A(); \
                               a->Go();").unwrap();
    assert_eq!(out, Some(Value::Integer(99)));
}

#[test]
fn every_declaration_kind_can_be_imported() {
    let out = run_in_fixtures("use (SCALE, Size, Unit, Measured, Rect) from \"geometry\"; \
                               let s = Size{w: 2, h: 5}; \
                               let u: Unit = enum::Unit::Inch; \
                               let r = new Rect(s::w, s::h); \
                               assert(HasImplInterface(\"Rect\", \"Measured\")); \
                               r->Measure() + SCALE;").unwrap();
    assert_eq!(out, Some(Value::Integer(11)));
}

#[test]
fn names_outside_the_export_list_are_rejected() {
    assert_import_kind("use (hidden) from \"geometry.fight\";", "ImportError");
    assert_import_kind("use (Ghost) from \"geometry.fight\";", "ImportError");
    assert_import_kind("use (Value) from \"no_exports.fight\";", "ImportError");
}

#[test]
fn missing_broken_and_circular_modules() {
    assert_import_kind("use (X) from \"nowhere.fight\";", "ImportError");
    assert_import_kind("use (X) from \"broken.fight\";", "ImportError");
    assert_import_kind("use (A) from \"cycle_a.fight\";", "ImportError");
}

#[test]
fn import_errors_can_be_caught() {
    let out = run_in_fixtures("let ok = false; \
                               try { use (X) from \"nowhere\"; } catch (ImportError) { ok = true; } \
                               ok;").unwrap();
    assert_eq!(out, Some(Value::Bool(true)));
}

#[test]
fn library_directories_are_searched() {
    let lib = tempfile::tempdir().unwrap();
    fs::write(lib.path().join("greet.fight"),
              "def Greet(name) string { return \"hi \" + name; } exports (Greet);").unwrap();

    let config = Config::default().with_base_dir(fixtures())
                                  .with_lib_dir(lib.path());
    let out = run("use (Greet) from \"greet\"; Greet(\"bob\");", &config).unwrap();
    assert_eq!(out, Some(Value::from("hi bob")));
}

#[test]
fn script_files_import_their_neighbours() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("consts.fight"), "let Answer = 42; exports (Answer);").unwrap();
    let main = dir.path().join("main.fight");
    fs::write(&main, "use (Answer) from \"consts\";\nAnswer;\n").unwrap();

    let out = run_file(&main, &Config::default()).unwrap();
    assert_eq!(out, Some(Value::Integer(42)));

    let missing = dir.path().join("missing.fight");
    assert!(matches!(run_file(&missing, &Config::default()), Err(Error::Io { .. })));
}
