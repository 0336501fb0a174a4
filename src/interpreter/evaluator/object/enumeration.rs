use std::rc::Rc;

use tracing::debug;

use crate::{
    ast::EnumDef,
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        value::core::Value,
    },
};

impl Context {
    /// Declares an enum.
    ///
    /// # Errors
    /// `ValueError` when a member name is repeated.
    pub(crate) fn declare_enum(&mut self, def: &EnumDef) -> EvalResult<()> {
        for (index, member) in def.members.iter().enumerate() {
            if def.members[..index].contains(member) {
                return Err(RuntimeError::value(format!("Member '{member}' declared twice in enum '{}'",
                                                       def.name),
                                               def.line));
            }
        }
        debug!(name = %def.name, members = def.members.len(), "enum declared");
        self.env.enums.insert(def.name.clone(), Rc::new(def.clone()));
        Ok(())
    }

    /// Evaluates `enum::Name::Member`.
    ///
    /// Members are plain strings at runtime.
    ///
    /// # Errors
    /// `NameError` for an unknown enum or member.
    pub(crate) fn eval_enum_access(&self,
                                   enum_name: &str,
                                   member: &str,
                                   line: usize)
                                   -> EvalResult<Value> {
        let def = self.env.enums.get(enum_name).ok_or_else(|| {
                                    RuntimeError::name(format!("Enum '{enum_name}' not defined"), line)
                                })?;
        if def.members.iter().any(|m| m == member) {
            Ok(Value::from(member))
        } else {
            Err(RuntimeError::name(format!("'{member}' is not a member of enum '{enum_name}'"),
                                   line))
        }
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
    fn members_are_strings_typed_by_their_enum() {
        let out = run("enum Color { Red, Green } let c: Color = enum::Color::Green; c;").unwrap();
        assert_eq!(out, Some(Value::from("Green")));
    }

    #[test]
    fn unknown_member_is_a_name_error() {
        let err = run("enum Color { Red } enum::Color::Blue;").unwrap_err();
        assert_eq!(err.kind_name(), "NameError");
    }
}
