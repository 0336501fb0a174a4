use std::rc::Rc;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        value::{core::Value, object_map::ObjectMap, record::StructValue},
    },
};

/// Type tag that disables checking for a binding.
pub const ANY: &str = "any";

/// Type tag of the absent value.
pub const VOID: &str = "void";

impl Context {
    /// Returns the runtime type tag of a value.
    ///
    /// Identical to [`Value::type_name`] except that a string naming a member
    /// of a declared enum reports that enum's name.
    ///
    /// # Example
    /// ```
    /// use fight::interpreter::{evaluator::core::Context, value::core::Value};
    ///
    /// let ctx = Context::new();
    /// assert_eq!(ctx.get_value_type(&Value::Integer(1)), "int");
    /// assert_eq!(ctx.get_value_type(&Value::from("Red")), "string");
    /// ```
    #[must_use]
    pub fn get_value_type(&self, value: &Value) -> String {
        if let Value::Str(s) = value
           && let Some(enum_name) = self.env.enum_of_member(s)
        {
            return enum_name.to_string();
        }
        value.type_name()
    }

    /// Tests whether a value satisfies a declared type.
    ///
    /// `any` accepts everything. A plain `string` also accepts enum members,
    /// which are strings at runtime. Every other type must match the runtime
    /// tag exactly.
    #[must_use]
    pub fn type_matches(&self, declared: &str, value: &Value) -> bool {
        if declared == ANY {
            return true;
        }
        if declared == "string" && matches!(value, Value::Str(_)) {
            return true;
        }
        self.get_value_type(value) == declared
    }

    /// Checks a value against the declared type of a binding.
    ///
    /// # Errors
    /// `TypeError` naming the binding, the expected type and the actual one.
    pub(crate) fn check_binding_type(&self,
                                     name: &str,
                                     declared: &str,
                                     value: &Value,
                                     line: usize)
                                     -> EvalResult<()> {
        if self.type_matches(declared, value) {
            return Ok(());
        }
        Err(RuntimeError::type_error(format!("Cannot assign {} to '{name}' declared as {declared}",
                                             self.get_value_type(value)),
                                     line))
    }

    /// Converts a value to the form its declared type requires.
    ///
    /// An object assigned to a struct-typed binding becomes a value of that
    /// struct; nested struct-typed fields are converted the same way. All
    /// other values are returned unchanged.
    pub(crate) fn coerce_to_declared(&self,
                                     declared: &str,
                                     value: Value,
                                     line: usize)
                                     -> EvalResult<Value> {
        match value {
            Value::Object(map) if self.env.structs.contains_key(declared) => {
                self.build_struct(declared, (*map).clone(), line)
            },
            other => Ok(other),
        }
    }

    /// Builds a struct value from named field values.
    ///
    /// Every declared field must be present and no other field may be
    /// given. Field values are checked against the declared field types and
    /// reordered into declaration order.
    ///
    /// # Errors
    /// - `NameError` when the struct is not declared.
    /// - `TypeError` for unknown, missing or mistyped fields.
    pub(crate) fn build_struct(&self,
                               struct_name: &str,
                               mut given: ObjectMap,
                               line: usize)
                               -> EvalResult<Value> {
        let def = self.env
                      .structs
                      .get(struct_name)
                      .cloned()
                      .ok_or_else(|| {
                          RuntimeError::name(format!("Struct '{struct_name}' not defined"), line)
                      })?;

        if let Some(unknown) = given.keys()
                                    .find(|key| !def.fields.iter().any(|(name, _)| name == key))
        {
            return Err(RuntimeError::type_error(format!("Field '{unknown}' is not defined in struct '{struct_name}'"),
                                                line));
        }

        let mut fields = ObjectMap::new();
        for (field, declared) in &def.fields {
            let value = given.remove(field).ok_or_else(|| {
                            RuntimeError::type_error(format!("Missing field '{field}' for struct '{struct_name}'"),
                                                     line)
                        })?;
            let value = match declared {
                Some(declared) => {
                    let value = self.coerce_to_declared(declared, value, line)?;
                    if !self.type_matches(declared, &value) {
                        return Err(RuntimeError::type_error(format!("Field '{field}' of struct '{struct_name}' is declared as {declared}, got {}",
                                                                    self.get_value_type(&value)),
                                                            line));
                    }
                    value
                },
                None => value,
            };
            fields.insert(field.clone(), value);
        }

        Ok(Value::Struct(Rc::new(StructValue { name: struct_name.to_string(),
                                               fields })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::EnumDef;

    #[test]
    fn enum_members_report_their_enum() {
        let mut ctx = Context::new();
        ctx.env.enums.insert("Color".to_string(),
                             Rc::new(EnumDef { name:    "Color".to_string(),
                                               members: vec!["Red".to_string()],
                                               line:    1, }));

        assert_eq!(ctx.get_value_type(&Value::from("Red")), "Color");
        assert!(ctx.type_matches("Color", &Value::from("Red")));
        assert!(ctx.type_matches("string", &Value::from("Red")));
        assert!(!ctx.type_matches("Color", &Value::from("Blue")));
    }

    #[test]
    fn any_accepts_everything() {
        let ctx = Context::new();
        assert!(ctx.type_matches(ANY, &Value::Void));
        assert!(!ctx.type_matches("float", &Value::Integer(1)));
    }
}
