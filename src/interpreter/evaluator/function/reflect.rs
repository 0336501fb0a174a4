//! Builtins that inspect declarations and call back into user code.

use std::{cell::RefCell, rc::Rc};

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{core::{Context, EvalResult}, object::class::ClassRecord},
        value::{
            core::Value,
            object_map::ObjectMap,
            record::{Function, Instance},
        },
    },
    util::is_public,
};

fn instance_arg(value: &Value, line: usize) -> EvalResult<&Rc<RefCell<Instance>>> {
    match value {
        Value::Instance(instance) => Ok(instance),
        other => Err(RuntimeError::type_error(format!("expected an instance, got {}",
                                                      other.type_name()),
                                              line)),
    }
}

/// Converts an object of `name: value` pairs into named call arguments.
fn named_args(value: Option<&Value>, line: usize) -> EvalResult<Vec<(String, Value)>> {
    match value {
        Some(value) => Ok(value.as_object(line)?
                               .iter()
                               .map(|(k, v)| (k.to_string(), v.clone()))
                               .collect()),
        None => Ok(Vec::new()),
    }
}

impl Context {
    fn function_named(&self, value: &Value, line: usize) -> EvalResult<Rc<Function>> {
        let name = value.as_str(line)?;
        match self.lookup(name) {
            Some(Value::Function(func)) => Ok(func),
            _ => Err(RuntimeError::name(format!("Function '{name}' not defined"), line)),
        }
    }

    /// Accepts a function value or the name of one.
    fn function_arg(&self, value: &Value, line: usize) -> EvalResult<Rc<Function>> {
        match value {
            Value::Function(func) => Ok(func.clone()),
            other => self.function_named(other, line),
        }
    }

    fn class_named(&self, value: &Value, line: usize) -> EvalResult<Rc<ClassRecord>> {
        let name = value.as_str(line)?;
        self.env
            .classes
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::name(format!("Class '{name}' not defined"), line))
    }
}

/// `HasImplInterface("Class", "Interface")`.
pub fn has_impl_interface(ctx: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let class = ctx.class_named(&args[0], line)?;
    Ok(Value::Bool(class.implements(args[1].as_str(line)?)))
}

/// `GetParamsByName("f")`: parameter names of a function, in order.
pub fn params_by_name(ctx: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let func = ctx.function_named(&args[0], line)?;
    Ok(Value::from(func.def
                       .params
                       .iter()
                       .map(|p| Value::from(p.name.as_str()))
                       .collect::<Vec<_>>()))
}

/// `GetDefaultValues("f")`: an object mapping every parameter that has a
/// default to its evaluated default.
pub fn default_values(ctx: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let func = ctx.function_named(&args[0], line)?;
    let mut defaults = ObjectMap::new();
    for param in &func.def.params {
        if let Some(default) = &param.default {
            let value = ctx.eval(default)?;
            defaults.insert(param.name.as_str(), value);
        }
    }
    Ok(Value::from(defaults))
}

/// `InvokeFunc("f"[, {name: value}])`: calls a function with named
/// arguments taken from an object.
pub fn invoke_func(ctx: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let func = ctx.function_named(&args[0], line)?;
    let named = named_args(args.get(1), line)?;
    ctx.call_value(&Value::Function(func), Vec::new(), named, line)
}

/// `GetFieldsByClassName("C")`: public instance field names of a class.
pub fn fields_by_class_name(ctx: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let class = ctx.class_named(&args[0], line)?;
    Ok(Value::from(class.public_fields().map(Value::from).collect::<Vec<_>>()))
}

/// `GetInstanceFields(inst)`: an object of the instance's public fields and
/// their current values.
pub fn instance_fields(args: &[Value], line: usize) -> EvalResult<Value> {
    let instance = instance_arg(&args[0], line)?.borrow();
    Ok(Value::from(instance.fields
                           .iter()
                           .filter(|(name, _)| is_public(name))
                           .map(|(name, value)| (name.to_string(), value.clone()))
                           .collect::<ObjectMap>()))
}

/// `GetInstanceMethods(inst)`: public method names, sorted.
pub fn instance_methods(args: &[Value], line: usize) -> EvalResult<Value> {
    let instance = instance_arg(&args[0], line)?.borrow();
    Ok(Value::from(instance.class
                           .public_methods()
                           .into_iter()
                           .map(Value::from)
                           .collect::<Vec<_>>()))
}

/// `SetInstanceField(inst, {Field: value})`: assigns public fields.
///
/// # Errors
/// `NameError` for a private or unknown field; `TypeError` when a value does
/// not match the field type.
pub fn set_instance_field(ctx: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let instance = instance_arg(&args[0], line)?;
    for (field, value) in args[1].as_object(line)?.iter() {
        if !is_public(field) {
            return Err(RuntimeError::name(format!("Field '{field}' of class '{}' is not public",
                                                  instance.borrow().class_name()),
                                          line));
        }
        ctx.write_field(instance, field, value.clone(), line)?;
    }
    Ok(Value::Void)
}

/// `InvokeInstanceMethod(inst, "M"[, {name: value}])`: calls a public
/// method with named arguments taken from an object.
pub fn invoke_instance_method(ctx: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let instance = instance_arg(&args[0], line)?;
    let method = args[1].as_str(line)?;
    let named = named_args(args.get(2), line)?;
    ctx.call_method(instance, method, Vec::new(), named, false, line)
}

/// `GetFnAnnotations(f)`: the annotations of a function, given as a value
/// or by name. Unannotated functions give `{}`.
pub fn fn_annotations(ctx: &mut Context, args: &[Value], line: usize) -> EvalResult<Value> {
    let func = ctx.function_arg(&args[0], line)?;
    Ok(Value::Object(func.annotations.clone()))
}

/// `GetMethodAnnotations(inst, "M")`: the annotations of a method, or `{}`
/// when it has none or does not exist.
pub fn method_annotations(args: &[Value], line: usize) -> EvalResult<Value> {
    let instance = instance_arg(&args[0], line)?.borrow();
    let method = args[1].as_str(line)?;
    Ok(Value::from(instance.class
                           .method_annotations
                           .get(method)
                           .cloned()
                           .unwrap_or_default()))
}

/// `GetFieldAnnotations(inst, "F")`: `{F: annotations}`, or `{}` when the
/// field has none or does not exist.
pub fn field_annotations(args: &[Value], line: usize) -> EvalResult<Value> {
    let instance = instance_arg(&args[0], line)?.borrow();
    let field = args[1].as_str(line)?;
    let mut out = ObjectMap::new();
    if let Some(annotations) = instance.class.field_annotations.get(field) {
        out.insert(field, Value::from(annotations.clone()));
    }
    Ok(Value::from(out))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::interpreter::{
        evaluator::core::{Context, EvalResult},
        lexer::tokenize,
        parser::core::parse_program,
        value::core::Value,
    };

    fn run(source: &str) -> EvalResult<Option<Value>> {
        let tokens = tokenize(source).unwrap();
        let program = parse_program(&mut tokens.iter().peekable()).unwrap();
        Context::new().run_program(&program)
    }

    const ACCOUNT: &str = "class Account { fields { Owner = \"ann\"; Balance = 0; pin = 1234; } \
                           methods { def Deposit(amount: int) int { Balance = Balance + amount; return Balance; } \
                           def audit() { } } init() { } } let acct = new Account();";

    #[test]
    fn function_signatures_are_visible() {
        let source = "def f(a, b = 2, c = \"x\") { return a; } ";
        assert_eq!(run(&format!("{source} GetParamsByName(\"f\");")).unwrap().unwrap().to_string(),
                   "[\"a\", \"b\", \"c\"]");
        assert_eq!(run(&format!("{source} GetDefaultValues(\"f\");")).unwrap().unwrap().to_string(),
                   "{b: 2, c: \"x\"}");
        assert_eq!(run(&format!("{source} InvokeFunc(\"f\", {{a: 7}});")).unwrap(),
                   Some(Value::Integer(7)));
    }

    #[test]
    fn only_public_members_are_reported() {
        let fields = run(&format!("{ACCOUNT} GetInstanceFields(acct);")).unwrap().unwrap();
        assert_eq!(fields.to_string(), "{Owner: \"ann\", Balance: 0}");
        let methods = run(&format!("{ACCOUNT} GetInstanceMethods(acct);")).unwrap().unwrap();
        assert_eq!(methods.to_string(), "[\"Deposit\"]");
        let names = run(&format!("{ACCOUNT} GetFieldsByClassName(\"Account\");")).unwrap().unwrap();
        assert_eq!(names.to_string(), "[\"Owner\", \"Balance\"]");
    }

    #[test]
    fn fields_and_methods_can_be_driven_reflectively() {
        let out = run(&format!("{ACCOUNT} SetInstanceField(acct, {{Balance: 10}}); \
                                InvokeInstanceMethod(acct, \"Deposit\", {{amount: 5}});"))
            .unwrap();
        assert_eq!(out, Some(Value::Integer(15)));

        let err = run(&format!("{ACCOUNT} SetInstanceField(acct, {{pin: 0}});")).unwrap_err();
        assert_eq!(err.kind_name(), "NameError");
        let err = run(&format!("{ACCOUNT} SetInstanceField(acct, {{Balance: \"lots\"}});")).unwrap_err();
        assert_eq!(err.kind_name(), "TypeError");
    }

    #[test]
    fn interfaces_are_queried_by_name() {
        let out = run("interface Named { Name(); } \
                       class P implements Named { methods { def Name() { return 1; } } } \
                       HasImplInterface(\"P\", \"Named\");")
            .unwrap();
        assert_eq!(out, Some(Value::Bool(true)));
        assert_eq!(run("HasImplInterface(\"Q\", \"Named\");").unwrap_err().kind_name(), "NameError");
    }

    const ENTITY: &str = "class Entity { \
                            fields { @annotation(column = \"user_id\", key = true) Id = 0; Name = \"\"; } \
                            methods { @annotation(route = \"/save\", verbs = [\"POST\"]) def Save() { } \
                                      def Load() { } } } \
                          class Admin extends Entity { } \
                          let e = new Entity(); let a = new Admin();";

    #[test]
    fn annotations_are_evaluated_once_and_reported() {
        let out = run("let base = \"/api\"; \
                       @annotation(route = base + \"/add\", arity = 1 + 1) \
                       def add(a, b) { return a + b; } \
                       base = \"/changed\"; \
                       [GetFnAnnotations(add), GetFnAnnotations(\"add\")];")
            .unwrap()
            .unwrap();
        assert_eq!(out.to_string(), "[{route: \"/api/add\", arity: 2}, {route: \"/api/add\", arity: 2}]");
        let out = run("def plain() { } GetFnAnnotations(plain);").unwrap().unwrap();
        assert_eq!(out.to_string(), "{}");
    }

    #[test]
    fn member_annotations_follow_the_class() {
        let method = run(&format!("{ENTITY} GetMethodAnnotations(e, \"Save\");")).unwrap().unwrap();
        assert_eq!(method.to_string(), "{route: \"/save\", verbs: [\"POST\"]}");
        let field = run(&format!("{ENTITY} GetFieldAnnotations(a, \"Id\");")).unwrap().unwrap();
        assert_eq!(field.to_string(), "{Id: {column: \"user_id\", key: true}}");

        for query in ["GetMethodAnnotations(e, \"Load\")",
                      "GetMethodAnnotations(e, \"Missing\")",
                      "GetFieldAnnotations(e, \"Name\")"]
        {
            let out = run(&format!("{ENTITY} {query};")).unwrap().unwrap();
            assert_eq!(out.to_string(), "{}", "{query}");
        }
        let err = run("GetMethodAnnotations(1, \"Save\");").unwrap_err();
        assert_eq!(err.kind_name(), "TypeError");
    }
}
