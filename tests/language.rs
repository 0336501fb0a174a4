use fight::{config::Config, error::Error, get_result, interpreter::value::core::Value, run};

fn assert_success(src: &str) {
    if let Err(e) = get_result(src, false) {
        panic!("Script failed: {e}\n{src}");
    }
}

fn assert_failure(src: &str) {
    if get_result(src, false).is_ok() {
        panic!("Script succeeded but was expected to fail:\n{src}")
    }
}

fn assert_error_kind(src: &str, kind: &str) {
    match get_result(src, false) {
        Err(Error::Runtime(e)) => assert_eq!(e.kind_name(), kind, "{e}\n{src}"),
        Err(e) => panic!("Expected {kind}, got a non-runtime error: {e}"),
        Ok(()) => panic!("Script succeeded but was expected to raise {kind}:\n{src}"),
    }
}

fn value_of(src: &str) -> Option<Value> {
    run(src, &Config::default()).unwrap_or_else(|e| panic!("Script failed: {e}\n{src}"))
}

#[test]
fn assignment_and_basic_arithmetic() {
    assert_success("let x = 1 + 2; assert(x == 3);");
    assert_success("let x = 7 * 9; assert(x == 63);");
    assert_success("let x = 8 - 5; assert(x == 3);");
    assert_success("let x = 10 / 4; assert(x == 2.5);");
    assert_success("assert(7 // 2 == 3); assert(-7 % 3 == 2); assert(2 ^ 10 == 1024);");
    assert_success("assert(1 == 1.0); assert(\"ab\" + \"c\" == \"abc\"); assert([1] + [2] == [1, 2]);");
}

#[test]
fn division_by_zero() {
    assert_error_kind("let x = 1 / 0;", "ZeroDivisionError");
    assert_error_kind("let x = 1 % 0;", "ZeroDivisionError");
}

#[test]
fn reassigning_a_different_type_is_a_type_error() {
    assert_error_kind("let x = 5; x = \"hi\";", "TypeError");
    assert_error_kind("let x: float = 1.5; x = [1];", "TypeError");
    assert_success("let x: any = 5; x = \"hi\";");
    assert_success("let x = 5; x = 6; x += 1; assert(x == 7);");
}

#[test]
fn constants_cannot_be_reassigned() {
    assert_error_kind("const PI = 3.14; PI = 3;", "ValueError");
    assert_error_kind("const NAMES = [\"a\"]; NAMES = [\"b\"];", "ValueError");
}

#[test]
fn methods_update_fields_and_honour_void() {
    assert_success("class A { fields { X: int = 10; } \
                    methods { def Inc(n: int = 1) void { X += n; } } init() { } } \
                    let a: A = new A(); \
                    a->Inc(n = 5); \
                    assert(a->X == 15); \
                    a->Inc(); \
                    assert(a->X == 16);");
}

#[test]
fn constructors_are_chosen_by_arity() {
    let person = "class Person { fields { A = 0; D = 0; } \
                  init(a, b) { A = a; } init(a, b, c, d) { A = a; D = d; } } ";
    assert_error_kind(&format!("{person} let p = new Person(1, 2, 3);"), "ValueError");
    assert_success(&format!("{person} let p = new Person(1, 2); assert(p->A == 1);"));
    assert_success(&format!("{person} let p = new Person(1, 2, 3, 4); assert(p->D == 4);"));
}

#[test]
fn struct_paths_name_the_missing_field() {
    let src = "struct Point { x: int, y: int } let p = Point{x: 1, y: 2}; p::z;";
    match get_result(src, false) {
        Err(Error::Runtime(e)) => {
            assert_eq!(e.kind_name(), "NameError");
            assert!(e.message().contains("'z'"), "{e}");
        },
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_success("struct Inner { v: int } struct Outer { inner: Inner } \
                    let o = Outer{inner: Inner{v: 7}}; assert(o::inner::v == 7);");
}

#[test]
fn interfaces_are_checked_at_declaration() {
    assert_success("interface Drawable { Draw(); } \
                    class Circle implements Drawable { methods { def Draw() void { } } init() { } }");
    assert_error_kind("interface Drawable { Draw(); } \
                       class Circle implements Drawable { init() { } }",
                      "NotImplementedError");
    assert_error_kind("interface Shape { Area(scale: float) float; } \
                       class Sq implements Shape { methods { def Area(scale: float) int { return 1; } } }",
                      "TypeError");
}

#[test]
fn lowercase_members_are_private() {
    let class = "class Vault { fields { secret = 1; Open = 2; } \
                 methods { def peek() int { return secret; } def Reveal() int { return this->peek(); } } \
                 init() { } } let v = new Vault(); ";
    assert_error_kind(&format!("{class} v->secret;"), "NameError");
    assert_error_kind(&format!("{class} v->peek();"), "NameError");
    assert_success(&format!("{class} assert(v->Open == 2); assert(v->Reveal() == 1);"));
}

#[test]
fn return_types_hold_through_nested_blocks() {
    assert_error_kind("def f(x: int) int { if (x > 0) { loop (true) { return \"no\"; } } return 0; } f(1);",
                      "TypeError");
    assert_error_kind("def g() void { return 1; } g();", "TypeError");
    assert_success("def f(x: int) int { if (x > 0) { return 1; } elif (x < 0) { return -1; } else { return 0; } } \
                    assert(f(-5) == -1);");
}

#[test]
fn inheritance_and_super() {
    assert_success("class Animal { fields { Name = \"\"; } \
                    methods { def Speak() string { return \"...\"; } } init() { } } \
                    class Dog extends Animal { \
                        methods { def Speak() string { return Name + \" barks\"; } } \
                        init(n) { super(Name = n); } } \
                    let d = new Dog(\"rex\"); \
                    assert(d->Speak() == \"rex barks\"); \
                    assert(IsInstance(d, \"Animal\")); \
                    assert(GetType(d) == \"Dog\");");
}

#[test]
fn static_members_live_on_the_class() {
    assert_success("class Counter { fields { static COUNT = 0; } \
                    methods { static def Make() Counter { Counter->COUNT = Counter->COUNT + 1; return new Counter(); } } } \
                    let a = Counter->Make(); let b = Counter->Make(); \
                    assert(Counter->COUNT == 2);");
}

#[test]
fn try_catch_finally() {
    assert_success("let log = []; \
                    try { let x = 1 / 0; } catch (TypeError) { log = log + [\"type\"]; } \
                    catch (ZeroDivisionError) { log = log + [\"zero\"]; } finally { log = log + [\"done\"]; } \
                    assert(log == [\"zero\", \"done\"]);");
    assert_success("let hit = false; try { undefined_name; } catch (Exception) { hit = true; } assert(hit);");
    assert_success("try { assert(false); } catch (KeyError) { }");
}

#[test]
fn uncaught_errors_stop_the_program() {
    assert_error_kind("assert(1 == 2);", "AssertionError");
    assert_error_kind("let xs = [1, 2]; xs[5];", "IndexError");
    assert_error_kind("let d = {a: 1}; d{\"b\"};", "KeyError");
    assert_error_kind("let y = x + 1;", "NameError");
    assert_error_kind("let b = 1 and true;", "TypeError");
}

#[test]
fn loops_and_switch() {
    assert_success("let total = 0; for (i : 1 to 4) { total += i; } assert(total == 10);");
    assert_success("let s = \"\"; for (c in \"abc\") { s = c + s; } assert(s == \"cba\");");
    assert_success("let n = 0; loop (true) { n++; if (n == 3) { break; } } assert(n == 3);");
    assert_success("let r = \"\"; switch (3) { case (1) { r = \"one\"; } default { r = \"other\"; } } \
                    assert(r == \"other\");");
}

#[test]
fn break_inside_switch_leaves_the_loop() {
    assert_eq!(value_of("let n = 0; \
                         loop (n < 5) { n++; switch (n) { case (3) { break; } default { } } } \
                         n;"),
               Some(Value::Integer(3)));
}

#[test]
fn loop_variables_follow_binding_rules() {
    assert_error_kind("const K = 1; for (K in [1, 2]) { }", "ValueError");
    assert_error_kind("const I = 0; for (I : 1 to 3) { }", "ValueError");
    assert_error_kind("let x = 5; for (x in [\"s\"]) { }", "TypeError");
    assert_eq!(value_of("let x = 0; for (x in [4, 7]) { } x;"), Some(Value::Integer(7)));
}

#[test]
fn functions_lambdas_and_generators() {
    assert_success("def fib(n: int) int { if (n < 2) { return n; } return fib(n - 1) + fib(n - 2); } \
                    assert(fib(15) == 610);");
    assert_success("let double = lambda x: x * 2; assert(double(4) == 8);");
    assert_success("let squares = generator[i * i; i = 1 to 4]; assert(squares == [1, 4, 9, 16]);");
    assert_success("let word = match (2) { 1 => \"one\", 2 => \"two\", _ => \"many\" }; assert(word == \"two\");");
    assert_success("let sign = if (-3 < 0) \"neg\" : \"pos\"; assert(sign == \"neg\");");
}

#[test]
fn builtin_methods_on_values() {
    assert_success("let xs = [3, 1]; xs->append(2); assert(xs == [3, 1, 2]); \
                    assert(xs->length() == 3); assert(xs->indexOf(1) == 1);");
    assert_success("let d = {a: 1}; d->update({b: 2}); assert(d->hasKey(\"b\")); \
                    assert(d->getKeys() == [\"a\", \"b\"]);");
    assert_success("let s = set<1, 2>; s->add(3); assert(s->size() == 3);");
    assert_success("let csv = \"a,b\"; let parts = csv->split(\",\"); assert(parts == [\"a\", \"b\"]);");
    assert_error_kind("let n = 5; n->frobnicate();", "NameError");
}

#[test]
fn builtin_library() {
    assert_success("assert(StrLength(\"abc\") == 3); assert(StrUpper(\"ab\") == \"AB\"); \
                    assert(StrFind(\"abc\", \"z\") == -1);");
    assert_success("assert(Gcd(12, 18) == 6); assert(Factorial(5) == 120); assert(Floor(2.7) == 2);");
    assert_success("assert(ObjectGet({a: 1}, \"b\", 0) == 0); assert(SetUnion(set<1>, set<2>) == set<1, 2>);");
    assert_success("assert(ToInteger(\"12\") == 12); assert(ToInteger(\"nope\") == false);");
    assert_error_kind("StrLength();", "TypeError");
    assert_error_kind("NoSuchBuiltin(1);", "NameError");
}

#[test]
fn container_builtins_update_their_argument() {
    assert_success("let xs = [3, 1]; ListAppend(xs, 4); ListInsert(xs, 0, 9); ListRemove(xs, 1); \
                    assert(xs == [9, 3, 4]); assert(ListPop(xs) == 4); ListClear(xs); assert(xs == []);");
    assert_success("let d = {a: 1}; ObjectUpdate(d, {b: 2}); assert(ObjectPop(d, \"a\") == 1); \
                    assert(ObjHasAttribute(d, \"b\")); ObjectClear(d); assert(ObjectKeys(d) == []);");
    assert_error_kind("ObjHasAttribute([1], \"a\");", "TypeError");
}

#[test]
fn random_numbers_repeat_under_a_seed() {
    assert_success("SetSeed(2024); let a = [GetInt(1, 100), GetFloat01(), GetChoice([\"x\", \"y\", \"z\"])]; \
                    SetSeed(2024); let b = [GetInt(1, 100), GetFloat01(), GetChoice([\"x\", \"y\", \"z\"])]; \
                    assert(a == b);");
    assert_success("let n = GetInt(5, 5); assert(n == 5); assert(ListLength(GetSample([1, 2, 3], 2)) == 2);");
    assert_error_kind("GetSample([1], 2);", "ValueError");
}

#[test]
fn annotations_are_readable_at_runtime() {
    assert_success("@annotation(returnType = \"int\", paramsNum = 2) \
                    def add(a, b = 10) { return a + b; } \
                    let dc = GetFnAnnotations(add); \
                    assert(dc{\"paramsNum\"} == 2); assert(add(1) == 11);");
    assert_success("class User { fields { @annotation(column = \"name\") Name = \"\"; } \
                    methods { @annotation(cached = true) def Greet() { return \"hi\"; } } } \
                    let u = new User(); \
                    let m = GetMethodAnnotations(u, \"Greet\"); assert(m{\"cached\"}); \
                    let f = GetFieldAnnotations(u, \"Name\"); assert(f{\"Name\"}{\"column\"} == \"name\");");
}

#[test]
fn enums_compare_as_member_names() {
    assert_success("enum Color { Red, Green } let c: Color = enum::Color::Green; \
                    assert(c == \"Green\"); assert(GetType(c) == \"Color\");");
    assert_error_kind("enum Color { Red } enum::Color::Blue;", "NameError");
}

#[test]
fn string_interpolation() {
    assert_success("let name = \"fight\"; assert(\"hello ${name}\" == \"hello fight\");");
}

#[test]
fn last_expression_value_is_returned() {
    assert_eq!(value_of("let x = 20; x + 22;"), Some(Value::Integer(42)));
    assert_eq!(value_of("let x = 1;"), None);
    assert_success("1 + 1;");
    assert!(get_result("2 * 3;", true).is_ok());
}

#[test]
fn syntax_errors_are_parse_errors() {
    assert!(matches!(get_result("let = ;", false), Err(Error::Parse(_))));
    assert!(matches!(get_result("let x = 1 @ 2;", false), Err(Error::Parse(_))));
    assert_failure("def f( { }");
}
