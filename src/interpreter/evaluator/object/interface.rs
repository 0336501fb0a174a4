use std::rc::Rc;

use tracing::debug;

use crate::{
    ast::InterfaceDef,
    error::RuntimeError,
    interpreter::evaluator::{
        core::{Context, EvalResult},
        object::class::ClassRecord,
    },
};

impl Context {
    /// Declares an interface.
    pub(crate) fn declare_interface(&mut self, def: &InterfaceDef) -> EvalResult<()> {
        debug!(interface = %def.name, methods = def.methods.len(), "interface declared");
        self.env.interfaces.insert(def.name.clone(), Rc::new(def.clone()));
        Ok(())
    }

    /// Checks that `class` satisfies the interface `interface`.
    ///
    /// Every interface method must exist on the class with the same number
    /// of parameters. Where the interface gives a return type or a parameter
    /// type, the class method must declare exactly the same type.
    ///
    /// # Errors
    /// - `NameError` when the interface is not declared.
    /// - `NotImplementedError` when a method is missing.
    /// - `TypeError` on an arity or type mismatch.
    pub(crate) fn check_interface(&self,
                                  class: &ClassRecord,
                                  interface: &str,
                                  line: usize)
                                  -> EvalResult<()> {
        let def = self.env.interfaces.get(interface).ok_or_else(|| {
                                         RuntimeError::name(format!("Interface '{interface}' not defined"),
                                                            line)
                                     })?;

        for required in &def.methods {
            let Some(method) = class.methods.get(&required.name) else {
                return Err(RuntimeError::not_implemented(format!("Class '{}' must implement method '{}' of interface '{interface}'",
                                                                 class.name, required.name),
                                                         line));
            };

            if method.params.len() != required.params.len() {
                return Err(RuntimeError::type_error(format!("Method '{}' of class '{}' takes {} parameter(s), interface '{interface}' requires {}",
                                                            required.name,
                                                            class.name,
                                                            method.params.len(),
                                                            required.params.len()),
                                                    line));
            }

            if let Some(expected) = &required.return_type
               && method.return_type.as_ref() != Some(expected)
            {
                return Err(RuntimeError::type_error(format!("Method '{}' of class '{}' must return {expected} as required by interface '{interface}'",
                                                            required.name, class.name),
                                                    line));
            }

            for (index, (param, contract)) in method.params.iter().zip(&required.params).enumerate() {
                if let Some(expected) = &contract.type_name
                   && param.type_name.as_ref() != Some(expected)
                {
                    return Err(RuntimeError::type_error(format!("Parameter {} of method '{}' in class '{}' must be {expected} as required by interface '{interface}'",
                                                                index + 1,
                                                                required.name,
                                                                class.name),
                                                        line));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::interpreter::{
        evaluator::core::{Context, EvalResult},
        lexer::tokenize,
        parser::core::parse_program,
    };

    fn run(source: &str) -> EvalResult<Context> {
        let tokens = tokenize(source).unwrap();
        let program = parse_program(&mut tokens.iter().peekable()).unwrap();
        let mut ctx = Context::new();
        ctx.run_program(&program)?;
        Ok(ctx)
    }

    #[test]
    fn conforming_class_declares() {
        let ctx = run("interface Drawable { Draw(); } \
                       class Circle implements Drawable { methods { def Draw() void { } } init() { } }")
            .unwrap();
        assert!(ctx.env.classes["Circle"].implements("Drawable"));
    }

    #[test]
    fn missing_method_is_not_implemented() {
        let err = run("interface Drawable { Draw(); } \
                       class Circle implements Drawable { init() { } }").err()
                                                                       .unwrap();
        assert_eq!(err.kind_name(), "NotImplementedError");
    }

    #[test]
    fn signature_mismatches_are_type_errors() {
        for class in ["class S implements Shape { methods { def Area() float { return 1.0; } } }",
                      "class S implements Shape { methods { def Area(scale: int) float { return 1.0; } } }",
                      "class S implements Shape { methods { def Area(scale: float) int { return 1; } } }"]
        {
            let source = format!("interface Shape {{ Area(scale: float) float; }} {class}");
            let err = run(&source).err().unwrap();
            assert_eq!(err.kind_name(), "TypeError", "{class}");
        }
    }

    #[test]
    fn unknown_interface_is_a_name_error() {
        let err = run("class S implements Nothing { }").err().unwrap();
        assert_eq!(err.kind_name(), "NameError");
    }
}
