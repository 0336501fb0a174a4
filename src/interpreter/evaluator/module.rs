use std::{fs, path::Path, rc::Rc};

use tracing::debug;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::{Context, EvalResult},
            environment::Environment,
        },
        value::{core::Value, record::Function},
    },
    parse,
};

impl Context {
    /// Executes `use (names) from "path";`.
    ///
    /// The module is parsed and run in a context of its own, sharing nothing
    /// with the importer but the configuration. Only names listed in the
    /// module's `exports` declaration may be imported. Each imported name
    /// keeps its category: classes, interfaces, structs and enums go to the
    /// matching registry, everything else becomes a binding in the current
    /// frame. Imported functions carry the module's environment and run
    /// against it.
    ///
    /// # Errors
    /// - `ImportError` when the module cannot be found or parsed, imports
    ///   itself, has no `exports` declaration, or does not export a name.
    /// - `IOError` when the module file cannot be read.
    /// - Any error raised while running the module.
    #[tracing::instrument(level = "debug", skip(self, names, line), fields(names = names.len()))]
    pub(crate) fn import_module(&mut self, names: &[String], path: &str, line: usize) -> EvalResult<()> {
        let file = self.config
                       .resolve_module(path)
                       .ok_or_else(|| RuntimeError::import(format!("Module '{path}' not found"), line))?;
        let file = fs::canonicalize(&file).unwrap_or(file);
        if self.module_stack.contains(&file) {
            return Err(RuntimeError::import(format!("Circular import of module '{path}'"), line));
        }

        let source = fs::read_to_string(&file).map_err(|e| {
                                                  RuntimeError::io(format!("Failed to read module '{path}': {e}"),
                                                                   line)
                                              })?;
        let program = parse(&source).map_err(|e| {
                                        RuntimeError::import(format!("Module '{path}' failed to parse: {e}"),
                                                             line)
                                    })?;

        let base_dir = file.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
        let mut module = Self::with_config(self.config.clone().with_base_dir(base_dir));
        module.module_stack = self.module_stack.clone();
        module.module_stack.push(file.clone());
        module.run_program(&program)?;

        let exports = module.exports.take().ok_or_else(|| {
                                               RuntimeError::import(format!("Module '{path}' has no exports declaration"),
                                                                    line)
                                           })?;
        let module_env = Rc::new(module.env.clone());
        for name in names {
            if !exports.contains(name) {
                return Err(RuntimeError::import(format!("'{name}' is not exported by module '{path}'"),
                                                line));
            }
            self.import_binding(&module, &module_env, name, path, line)?;
        }
        debug!(module = %file.display(), "module imported");
        Ok(())
    }

    fn import_binding(&mut self,
                      module: &Self,
                      module_env: &Rc<Environment>,
                      name: &str,
                      path: &str,
                      line: usize)
                      -> EvalResult<()> {
        if let Some(class) = module.env.classes.get(name) {
            self.env.classes.insert(name.to_string(), class.clone());
        } else if let Some(interface) = module.env.interfaces.get(name) {
            self.env.interfaces.insert(name.to_string(), interface.clone());
        } else if let Some(def) = module.env.structs.get(name) {
            self.env.structs.insert(name.to_string(), def.clone());
        } else if let Some(def) = module.env.enums.get(name) {
            self.env.enums.insert(name.to_string(), def.clone());
        } else if let Some(value) = module.env.get_global(name) {
            let value = match value {
                Value::Function(func) if func.closure.is_none() => {
                    Value::Function(Rc::new(Function { def:         func.def.clone(),
                                                       closure:     Some(module_env.clone()),
                                                       annotations: func.annotations.clone(), }))
                },
                other => other.clone(),
            };
            if let Value::Instance(instance) = &value {
                self.instances.insert(name.to_string(), instance.clone());
            }
            let tag = module.get_value_type(&value);
            self.env.define(name, value, &tag);
        } else {
            return Err(RuntimeError::import(format!("Module '{path}' exports '{name}' but does not define it"),
                                            line));
        }
        Ok(())
    }

    /// Records the names listed by `exports (...)`.
    pub(crate) fn record_exports(&mut self, names: &[String]) {
        debug!(count = names.len(), "exports declared");
        self.exports
            .get_or_insert_with(Vec::new)
            .extend(names.iter().cloned());
    }
}
