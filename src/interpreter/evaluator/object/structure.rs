use std::rc::Rc;

use tracing::debug;

use crate::{
    ast::{Expr, StructDef},
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        value::{core::Value, object_map::ObjectMap},
    },
};

impl Context {
    /// Declares a struct shape.
    ///
    /// # Errors
    /// `TypeError` when a field name is repeated.
    pub(crate) fn declare_struct(&mut self, def: &StructDef) -> EvalResult<()> {
        for (index, (field, _)) in def.fields.iter().enumerate() {
            if def.fields[..index].iter().any(|(other, _)| other == field) {
                return Err(RuntimeError::type_error(format!("Field '{field}' declared twice in struct '{}'",
                                                            def.name),
                                                    def.line));
            }
        }
        debug!(name = %def.name, fields = def.fields.len(), "struct declared");
        self.env.structs.insert(def.name.clone(), Rc::new(def.clone()));
        Ok(())
    }

    /// Evaluates `Name{field: value, ...}`.
    ///
    /// Field values are evaluated in source order, then checked against the
    /// declaration.
    pub(crate) fn eval_struct_literal(&mut self,
                                      name: &str,
                                      fields: &[(String, Expr)],
                                      line: usize)
                                      -> EvalResult<Value> {
        let mut given = ObjectMap::new();
        for (field, expr) in fields {
            let value = self.eval(expr)?;
            if given.insert(field.clone(), value).is_some() {
                return Err(RuntimeError::type_error(format!("Field '{field}' given twice for struct '{name}'"),
                                                    line));
            }
        }
        self.build_struct(name, given, line)
    }

    /// Evaluates a field path `base::a::b`.
    ///
    /// Each segment is looked up in the value the previous one produced.
    ///
    /// # Errors
    /// - `NameError` naming the first segment that does not exist.
    /// - `TypeError` when a segment is applied to something other than a
    ///   struct or object.
    pub(crate) fn eval_struct_access(&mut self,
                                     base: &Expr,
                                     path: &[String],
                                     line: usize)
                                     -> EvalResult<Value> {
        let mut current = self.eval(base)?;
        for segment in path {
            current = match &current {
                Value::Struct(s) => s.fields.get(segment).cloned().ok_or_else(|| {
                                       RuntimeError::name(format!("Field '{segment}' not found in struct '{}'",
                                                                  s.name),
                                                          line)
                                   })?,
                Value::Object(map) => map.get(segment).cloned().ok_or_else(|| {
                                         RuntimeError::name(format!("Field '{segment}' not found in object"),
                                                            line)
                                     })?,
                other => {
                    return Err(RuntimeError::type_error(format!("Cannot access field '{segment}' of {}",
                                                                other.type_name()),
                                                        line));
                },
            };
        }
        Ok(current)
    }
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

    #[test]
    fn missing_path_segment_is_named() {
        let err = run("struct Point { x: int, y: int } let p = Point{x: 1, y: 2}; p::z;").unwrap_err();
        assert_eq!(err.kind_name(), "NameError");
        assert!(err.message().contains("'z'"));
    }

    #[test]
    fn nested_paths_resolve_segment_by_segment() {
        let out = run("struct Inner { v: int } struct Outer { inner: Inner } \
                       let o = Outer{inner: {v: 7}}; o::inner::v;").unwrap();
        assert_eq!(out, Some(Value::Integer(7)));
    }

    #[test]
    fn struct_values_display_with_their_name() {
        let out = run("struct Point { x: int, y: int } Point{y: 2, x: 1};").unwrap();
        assert_eq!(out.unwrap().to_string(), "Point{x: 1, y: 2}");
    }

    #[test]
    fn field_types_are_enforced() {
        let err = run("struct Point { x: int } Point{x: \"no\"};").unwrap_err();
        assert_eq!(err.kind_name(), "TypeError");
        let err = run("struct Point { x: int } Point{};").unwrap_err();
        assert_eq!(err.kind_name(), "TypeError");
    }
}
