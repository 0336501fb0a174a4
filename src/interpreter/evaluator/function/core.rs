use tracing::trace;

use crate::{
    ast::{CallArgs, Expr},
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::{Context, EvalResult},
            function::{common, file, list, math, object, print, random, reflect, set, string, time},
            method::core::MethodOutcome,
        },
        value::core::Value,
    },
};

/// A builtin that only looks at its arguments.
type PureFn = fn(&[Value], usize) -> EvalResult<Value>;

/// A builtin that needs the evaluation context, such as the reflection
/// helpers that call back into user code.
type ContextFn = fn(&mut Context, &[Value], usize) -> EvalResult<Value>;

/// A builtin that changes its first argument. The new value is written back
/// when that argument is a plain variable.
type MutatingFn = fn(&[Value], usize) -> EvalResult<MethodOutcome>;

#[derive(Clone, Copy)]
enum Handler {
    Pure(PureFn),
    Context(ContextFn),
    Mutating(MutatingFn),
}

/// Specifies the allowed number of arguments for a builtin.
///
/// - `Exact(n)` means the builtin must receive exactly `n` arguments.
/// - `OneOf(slice)` means the builtin accepts any arity listed in `slice`.
/// - `AtLeast(n)` means the builtin is variadic with `n` required arguments.
#[derive(Clone, Copy)]
enum Arity {
    Exact(usize),
    OneOf(&'static [usize]),
    AtLeast(usize),
}

/// Defines builtin functions by generating a lookup table and a name list.
///
/// Each entry provides:
/// - a string name,
/// - an arity specification,
/// - a handler implementing the builtin.
///
/// The macro produces:
/// - `BuiltinDef` (internal metadata),
/// - `BUILTIN_TABLE` (static table for lookup),
/// - `BUILTIN_FUNCTIONS` (public list of builtin names).
macro_rules! builtin_functions {
    (
        $(
            $name:literal => {
                arity: $arity:expr,
                func: $func:expr $(,)?
            }
        ),* $(,)?
    ) => {
        struct BuiltinDef {
            name:  &'static str,
            arity: Arity,
            func:  Handler,
        }
        static BUILTIN_TABLE: &[BuiltinDef] = &[
            $(
                BuiltinDef { name: $name, arity: $arity, func: $func },
            )*
        ];
        /// Names of every builtin function, in table order.
        pub const BUILTIN_FUNCTIONS: &[&str] = &[
            $($name,)*
        ];
    };
}

use Arity::{AtLeast, Exact, OneOf};
use Handler::{Context as Ctx, Mutating as Mut, Pure};

builtin_functions! {
    "print"              => { arity: AtLeast(0), func: Pure(print::print) },
    "println"            => { arity: AtLeast(0), func: Pure(print::println) },
    "printlnRed"         => { arity: AtLeast(0), func: Pure(|args, line| print::println_colored(print::RED, args, line)) },
    "printlnYellow"      => { arity: AtLeast(0), func: Pure(|args, line| print::println_colored(print::YELLOW, args, line)) },
    "printlnBlue"        => { arity: AtLeast(0), func: Pure(|args, line| print::println_colored(print::BLUE, args, line)) },
    "printlnCyan"        => { arity: AtLeast(0), func: Pure(|args, line| print::println_colored(print::CYAN, args, line)) },
    "printlnLightGreen"  => { arity: AtLeast(0), func: Pure(|args, line| print::println_colored(print::LIGHT_GREEN, args, line)) },
    "printlnMagenta"     => { arity: AtLeast(0), func: Pure(|args, line| print::println_colored(print::MAGENTA, args, line)) },
    "printlnHex"         => { arity: AtLeast(1), func: Pure(|args, line| print::println_radix(16, args, line)) },
    "printlnBin"         => { arity: AtLeast(1), func: Pure(|args, line| print::println_radix(2, args, line)) },
    "printlnOct"         => { arity: AtLeast(1), func: Pure(|args, line| print::println_radix(8, args, line)) },
    "assert"             => { arity: Exact(1), func: Pure(print::assert_fn) },

    "IsNumber"           => { arity: Exact(1), func: Pure(|args, _| Ok(Value::Bool(matches!(args[0], Value::Integer(_) | Value::Float(_))))) },
    "IsInt"              => { arity: Exact(1), func: Pure(|args, _| Ok(Value::Bool(matches!(args[0], Value::Integer(_))))) },
    "IsFloat"            => { arity: Exact(1), func: Pure(|args, _| Ok(Value::Bool(matches!(args[0], Value::Float(_))))) },
    "IsString"           => { arity: Exact(1), func: Pure(|args, _| Ok(Value::Bool(matches!(args[0], Value::Str(_))))) },
    "IsBool"             => { arity: Exact(1), func: Pure(|args, _| Ok(Value::Bool(matches!(args[0], Value::Bool(_))))) },
    "IsList"             => { arity: Exact(1), func: Pure(|args, _| Ok(Value::Bool(matches!(args[0], Value::List(_))))) },
    "IsObject"           => { arity: Exact(1), func: Pure(|args, _| Ok(Value::Bool(matches!(args[0], Value::Object(_))))) },
    "IsSet"              => { arity: Exact(1), func: Pure(|args, _| Ok(Value::Bool(matches!(args[0], Value::Set(_))))) },
    "IsFunction"         => { arity: Exact(1), func: Pure(|args, _| Ok(Value::Bool(matches!(args[0], Value::Function(_))))) },
    "IsInstance"         => { arity: Exact(2), func: Pure(common::is_instance) },
    "HasImplInterface"   => { arity: Exact(2), func: Ctx(reflect::has_impl_interface) },

    "GetType"            => { arity: Exact(1), func: Ctx(|ctx, args, _| Ok(Value::from(ctx.get_value_type(&args[0])))) },
    "ToInteger"          => { arity: Exact(1), func: Pure(common::to_integer) },
    "ToFloat"            => { arity: Exact(1), func: Pure(common::to_float) },
    "ToNumber"           => { arity: Exact(1), func: Pure(common::to_number) },
    "ToBoolean"          => { arity: Exact(1), func: Pure(common::to_boolean) },
    "ToString"           => { arity: Exact(1), func: Pure(|args, _| Ok(Value::from(args[0].to_string()))) },

    "ObjectKeys"         => { arity: Exact(1), func: Pure(object::keys) },
    "ObjectValues"       => { arity: Exact(1), func: Pure(object::values) },
    "ObjectGet"          => { arity: OneOf(&[2, 3]), func: Pure(object::get) },
    "ObjectContains"     => { arity: Exact(2), func: Pure(object::contains) },
    "ObjectCopy"         => { arity: Exact(1), func: Pure(object::copy) },
    "ObjectMerge"        => { arity: Exact(1), func: Pure(object::merge) },
    "ObjectSet"          => { arity: Exact(3), func: Mut(object::set) },
    "ObjectClear"        => { arity: Exact(1), func: Mut(object::clear) },
    "ObjectUpdate"       => { arity: Exact(2), func: Mut(object::update) },
    "ObjectPop"          => { arity: OneOf(&[2, 3]), func: Mut(object::pop) },
    "ObjHasAttribute"    => { arity: Exact(2), func: Pure(object::has_attribute) },

    "SetLength"          => { arity: Exact(1), func: Pure(set::length) },
    "SetContains"        => { arity: Exact(2), func: Pure(set::contains) },
    "SetIsSubset"        => { arity: Exact(2), func: Pure(set::is_subset) },
    "SetIsSuperset"      => { arity: Exact(2), func: Pure(set::is_superset) },
    "SetUnion"           => { arity: Exact(2), func: Pure(set::union) },
    "SetIntersection"    => { arity: Exact(2), func: Pure(set::intersection) },
    "SetDiff"            => { arity: Exact(2), func: Pure(set::difference) },

    "StrLength"          => { arity: Exact(1), func: Pure(string::length) },
    "StrUpper"           => { arity: Exact(1), func: Pure(|args, line| string::map(args, line, str::to_uppercase)) },
    "StrLower"           => { arity: Exact(1), func: Pure(|args, line| string::map(args, line, str::to_lowercase)) },
    "StrStrip"           => { arity: Exact(1), func: Pure(|args, line| string::map(args, line, |s| s.trim().to_string())) },
    "StrCapitalize"      => { arity: Exact(1), func: Pure(|args, line| string::map(args, line, string::capitalize)) },
    "StrTitle"           => { arity: Exact(1), func: Pure(|args, line| string::map(args, line, string::title)) },
    "StrSwapcase"        => { arity: Exact(1), func: Pure(|args, line| string::map(args, line, string::swapcase)) },
    "StrReverse"         => { arity: Exact(1), func: Pure(|args, line| string::map(args, line, |s| s.chars().rev().collect())) },
    "StrConcat"          => { arity: AtLeast(1), func: Pure(string::concat) },
    "StrSplit"           => { arity: OneOf(&[1, 2]), func: Pure(string::split) },
    "StrJoin"            => { arity: Exact(2), func: Pure(string::join) },
    "StrReplace"         => { arity: Exact(3), func: Pure(string::replace) },
    "StrFind"            => { arity: Exact(2), func: Pure(string::find) },
    "StrCount"           => { arity: Exact(2), func: Pure(string::count) },
    "StrStartsWith"      => { arity: Exact(2), func: Pure(|args, line| string::test_pair(args, line, |s, p| s.starts_with(p))) },
    "StrEndsWith"        => { arity: Exact(2), func: Pure(|args, line| string::test_pair(args, line, |s, p| s.ends_with(p))) },
    "StrContains"        => { arity: Exact(2), func: Pure(|args, line| string::test_pair(args, line, |s, p| s.contains(p))) },
    "StrIsNumeric"       => { arity: Exact(1), func: Pure(|args, line| string::test_chars(args, line, |c| c.is_numeric())) },
    "StrIsAlpha"         => { arity: Exact(1), func: Pure(|args, line| string::test_chars(args, line, char::is_alphabetic)) },
    "StrIsAlphanumeric"  => { arity: Exact(1), func: Pure(|args, line| string::test_chars(args, line, char::is_alphanumeric)) },
    "Char2Asc"           => { arity: Exact(1), func: Pure(string::char_to_code) },
    "Asc2Char"           => { arity: Exact(1), func: Pure(string::code_to_char) },

    "ListLength"         => { arity: Exact(1), func: Pure(list::length) },
    "ListIndex"          => { arity: Exact(2), func: Pure(list::index) },
    "ListCount"          => { arity: Exact(2), func: Pure(list::count) },
    "ListReverse"        => { arity: Exact(1), func: Pure(list::reverse) },
    "ListSlice"          => { arity: OneOf(&[2, 3]), func: Pure(list::slice) },
    "ListJoin"           => { arity: Exact(2), func: Pure(list::join) },
    "ListShallowCopy"    => { arity: Exact(1), func: Pure(list::shallow_copy) },
    "ListAppend"         => { arity: Exact(2), func: Mut(list::append) },
    "ListExtend"         => { arity: Exact(2), func: Mut(list::extend) },
    "ListInsert"         => { arity: Exact(3), func: Mut(list::insert) },
    "ListRemove"         => { arity: Exact(2), func: Mut(list::remove) },
    "ListPop"            => { arity: OneOf(&[1, 2]), func: Mut(list::pop) },
    "ListClear"          => { arity: Exact(1), func: Mut(list::clear) },

    "Sqrt"               => { arity: Exact(1), func: Pure(math::sqrt) },
    "Sin"                => { arity: Exact(1), func: Pure(math::sin) },
    "Cos"                => { arity: Exact(1), func: Pure(math::cos) },
    "Tan"                => { arity: Exact(1), func: Pure(math::tan) },
    "Asin"               => { arity: Exact(1), func: Pure(math::asin) },
    "Acos"               => { arity: Exact(1), func: Pure(math::acos) },
    "Atan"               => { arity: Exact(1), func: Pure(math::atan) },
    "Exp"                => { arity: Exact(1), func: Pure(math::exp) },
    "Log10"              => { arity: Exact(1), func: Pure(math::log10) },
    "Degrees"            => { arity: Exact(1), func: Pure(math::degrees) },
    "Radians"            => { arity: Exact(1), func: Pure(math::radians) },
    "Atan2"              => { arity: Exact(2), func: Pure(math::atan2) },
    "Hypot"              => { arity: Exact(2), func: Pure(math::hypot) },
    "Pow"                => { arity: Exact(2), func: Pure(math::pow) },
    "Log"                => { arity: OneOf(&[1, 2]), func: Pure(math::log) },
    "Ceil"               => { arity: Exact(1), func: Pure(|args, line| math::round_with(args, line, f64::ceil)) },
    "Floor"              => { arity: Exact(1), func: Pure(|args, line| math::round_with(args, line, f64::floor)) },
    "Round"              => { arity: OneOf(&[1, 2]), func: Pure(math::round) },
    "Pi"                 => { arity: Exact(0), func: Pure(|_, _| Ok(Value::Float(std::f64::consts::PI))) },
    "Factorial"          => { arity: Exact(1), func: Pure(math::factorial) },
    "Comb"               => { arity: Exact(2), func: Pure(math::comb) },
    "Perm"               => { arity: Exact(2), func: Pure(math::perm) },
    "Gcd"                => { arity: Exact(2), func: Pure(math::gcd) },
    "Lcm"                => { arity: Exact(2), func: Pure(math::lcm) },

    "GetCurrentTimestamp" => { arity: Exact(0), func: Pure(time::timestamp) },
    "TimeNs"             => { arity: Exact(0), func: Pure(time::time_ns) },
    "Sleep"              => { arity: Exact(1), func: Pure(time::sleep) },
    "GetCurrentTimeObj"  => { arity: Exact(0), func: Pure(time::current_time_obj) },
    "FormatTime"         => { arity: Exact(1), func: Pure(time::format_time) },
    "ParseTime"          => { arity: Exact(2), func: Pure(time::parse_time) },

    "GetCurrentDirectory" => { arity: Exact(0), func: Pure(file::current_directory) },
    "ListDirectory"      => { arity: OneOf(&[0, 1]), func: Pure(file::list_directory) },
    "FileExists"         => { arity: Exact(1), func: Pure(|args, line| file::test_path(args, line, |p| p.exists())) },
    "IsFile"             => { arity: Exact(1), func: Pure(|args, line| file::test_path(args, line, |p| p.is_file())) },
    "IsDirectory"        => { arity: Exact(1), func: Pure(|args, line| file::test_path(args, line, |p| p.is_dir())) },
    "GetFileSize"        => { arity: Exact(1), func: Pure(file::file_size) },
    "JoinPath"           => { arity: AtLeast(1), func: Pure(file::join_path) },
    "GetAbsolutePath"    => { arity: Exact(1), func: Pure(file::absolute_path) },
    "GetFileExtension"   => { arity: Exact(1), func: Pure(file::extension) },
    "GetEnvironmentVariable" => { arity: Exact(1), func: Pure(file::env_var) },
    "SetEnvironmentVariable" => { arity: Exact(2), func: Pure(file::set_env_var) },
    "GetSystemName"      => { arity: Exact(0), func: Pure(file::system_name) },
    "ChangeDirectory"    => { arity: Exact(1), func: Pure(file::change_directory) },
    "CreateDirectory"    => { arity: Exact(1), func: Pure(file::create_directory) },
    "CreateDirectories"  => { arity: Exact(1), func: Pure(file::create_directories) },
    "RemoveFile"         => { arity: Exact(1), func: Pure(file::remove_file) },
    "RemoveDirectory"    => { arity: Exact(1), func: Pure(file::remove_directory) },
    "RemoveDirectoryTree" => { arity: Exact(1), func: Pure(file::remove_directory_tree) },
    "RenameFile"         => { arity: Exact(2), func: Pure(file::rename) },
    "CopyFile"           => { arity: Exact(2), func: Pure(file::copy_file) },
    "MoveFile"           => { arity: Exact(2), func: Pure(file::move_file) },
    "SplitPath"          => { arity: Exact(1), func: Pure(file::split_path) },
    "GetFileModificationTime" => { arity: Exact(1), func: Pure(file::modification_time) },

    "SetSeed"            => { arity: Exact(1), func: Pure(random::set_seed) },
    "GetInt"             => { arity: Exact(2), func: Pure(random::int) },
    "GetFloat01"         => { arity: Exact(0), func: Pure(random::float01) },
    "GetFloatRange"      => { arity: Exact(2), func: Pure(random::float_range) },
    "GetChoice"          => { arity: Exact(1), func: Pure(random::choice) },
    "GetChoices"         => { arity: Exact(2), func: Pure(random::choices) },
    "GetSample"          => { arity: Exact(2), func: Pure(random::sample) },
    "Shuffle"            => { arity: Exact(1), func: Mut(random::shuffle) },
    "ShuffleInPlace"     => { arity: Exact(1), func: Mut(random::shuffle) },
    "GetBool"            => { arity: Exact(0), func: Pure(random::boolean) },
    "GetWeightedChoice"  => { arity: Exact(2), func: Pure(random::weighted_choice) },
    "GetGaussian"        => { arity: OneOf(&[0, 1, 2]), func: Pure(random::gaussian) },
    "GetExponential"     => { arity: OneOf(&[0, 1]), func: Pure(random::exponential) },
    "GetByte"            => { arity: Exact(0), func: Pure(random::byte) },
    "GetBytes"           => { arity: Exact(1), func: Pure(random::bytes) },
    "GetBits"            => { arity: Exact(1), func: Pure(random::bits) },
    "GetSystemFloat"     => { arity: Exact(0), func: Pure(random::system_float) },

    "GetParamsByName"    => { arity: Exact(1), func: Ctx(reflect::params_by_name) },
    "GetDefaultValues"   => { arity: Exact(1), func: Ctx(reflect::default_values) },
    "InvokeFunc"         => { arity: OneOf(&[1, 2]), func: Ctx(reflect::invoke_func) },
    "GetFieldsByClassName" => { arity: Exact(1), func: Ctx(reflect::fields_by_class_name) },
    "GetInstanceFields"  => { arity: Exact(1), func: Pure(reflect::instance_fields) },
    "GetInstanceMethods" => { arity: Exact(1), func: Pure(reflect::instance_methods) },
    "SetInstanceField"   => { arity: Exact(2), func: Ctx(reflect::set_instance_field) },
    "InvokeInstanceMethod" => { arity: OneOf(&[2, 3]), func: Ctx(reflect::invoke_instance_method) },
    "GetFnAnnotations"   => { arity: Exact(1), func: Ctx(reflect::fn_annotations) },
    "GetMethodAnnotations" => { arity: Exact(2), func: Pure(reflect::method_annotations) },
    "GetFieldAnnotations" => { arity: Exact(2), func: Pure(reflect::field_annotations) },
}

impl Arity {
    /// Tests whether the given argument count satisfies this arity constraint.
    ///
    /// Returns `true` if the count is permitted, `false` otherwise.
    fn check(&self, n: usize) -> bool {
        match self {
            Self::Exact(m) => n == *m,
            Self::OneOf(arr) => arr.contains(&n),
            Self::AtLeast(m) => n >= *m,
        }
    }
}

/// Tests whether `name` is a builtin function.
///
/// # Example
/// ```
/// use fight::interpreter::evaluator::function::core::is_builtin;
///
/// assert!(is_builtin("println"));
/// assert!(!is_builtin("nothing"));
/// ```
#[must_use]
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_FUNCTIONS.contains(&name)
}

impl Context {
    /// Calls a builtin function.
    ///
    /// Reached only when `name` is not bound by the program. Arguments are
    /// evaluated left to right, then checked against the builtin's arity.
    ///
    /// # Parameters
    /// - `name`: Function name.
    /// - `args`: Unevaluated call arguments.
    /// - `line`: Line number for error reporting.
    ///
    /// # Errors
    /// - `NameError` when no builtin has that name.
    /// - `TypeError` for named arguments or a wrong argument count.
    pub(crate) fn call_builtin(&mut self, name: &str, args: &CallArgs, line: usize) -> EvalResult<Value> {
        let Some(builtin) = BUILTIN_TABLE.iter().find(|b| b.name == name) else {
            return Err(RuntimeError::name(format!("Function '{name}' not defined"), line));
        };
        if let Some((arg, _)) = args.named.first() {
            return Err(RuntimeError::type_error(format!("{name}() does not accept named argument '{arg}'"),
                                                line));
        }

        let arg_vals = args.positional
                           .iter()
                           .map(|e| self.eval(e))
                           .collect::<EvalResult<Vec<_>>>()?;
        if !builtin.arity.check(arg_vals.len()) {
            return Err(RuntimeError::type_error(format!("{name}() got {} argument(s)", arg_vals.len()),
                                                line));
        }

        trace!(builtin = name, args = arg_vals.len(), "builtin call");
        match builtin.func {
            Handler::Pure(func) => func(&arg_vals, line),
            Handler::Context(func) => func(self, &arg_vals, line),
            Handler::Mutating(func) => {
                let outcome = func(&arg_vals, line)?;
                if let Some(updated) = outcome.updated
                   && let Some(Expr::Variable { name: var, .. }) = args.positional.first()
                {
                    self.assign_name(var, updated, line)?;
                }
                Ok(outcome.result)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interpreter::{lexer::tokenize, parser::core::parse_program};

    fn run(source: &str) -> EvalResult<Option<Value>> {
        let tokens = tokenize(source).unwrap();
        let program = parse_program(&mut tokens.iter().peekable()).unwrap();
        Context::new().run_program(&program)
    }

    #[test]
    fn builtin_names_are_unique() {
        for (i, name) in BUILTIN_FUNCTIONS.iter().enumerate() {
            assert!(!BUILTIN_FUNCTIONS[i + 1..].contains(name), "{name}");
        }
    }

    #[test]
    fn user_bindings_shadow_builtins() {
        let out = run("def StrLength(s) { return 0; } StrLength(\"abc\");").unwrap();
        assert_eq!(out, Some(Value::Integer(0)));
    }

    #[test]
    fn arity_and_unknown_names() {
        assert_eq!(run("StrLength();").unwrap_err().kind_name(), "TypeError");
        assert_eq!(run("StrLength(s = \"a\");").unwrap_err().kind_name(), "TypeError");
        assert_eq!(run("NoSuchThing(1);").unwrap_err().kind_name(), "NameError");
    }

    #[test]
    fn mutating_builtins_write_back_to_variables() {
        let out = run("let xs = [1]; ListAppend(xs, 2); ListExtend(xs, [3]); ListPop(xs, 0); xs;").unwrap();
        assert_eq!(out.unwrap().to_string(), "[2, 3]");
        let out = run("let d = {a: 1}; ObjectSet(d, \"b\", 2); ObjectPop(d, \"a\") + d{\"b\"};").unwrap();
        assert_eq!(out, Some(Value::Integer(3)));
        let out = run("ListPop([7, 8]);").unwrap();
        assert_eq!(out, Some(Value::Integer(8)));
    }

    #[test]
    fn write_back_keeps_binding_rules() {
        assert_eq!(run("const XS = [1]; ListClear(XS);").unwrap_err().kind_name(), "ValueError");
    }

    #[test]
    fn seeded_shuffles_repeat() {
        let out = run("let a = [1, 2, 3, 4, 5, 6]; let b = a; \
                       SetSeed(99); Shuffle(a); SetSeed(99); ShuffleInPlace(b); \
                       a == b && ListLength(a) == 6;")
                      .unwrap();
        assert_eq!(out, Some(Value::Bool(true)));
    }

    #[test]
    fn get_type_reports_enum_names() {
        let out = run("enum Color { Red } GetType(enum::Color::Red);").unwrap();
        assert_eq!(out, Some(Value::from("Color")));
    }
}
