use std::{
    collections::{BTreeMap, HashMap, HashSet},
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::{
    ast::{EnumDef, InterfaceDef, StructDef},
    interpreter::{evaluator::object::class::ClassRecord, value::core::Value},
};

/// Source of frame identities, shared by every environment in the process.
static NEXT_FRAME_ID: AtomicU64 = AtomicU64::new(0);

/// One frame of bindings.
///
/// Every binding carries the type tag recorded when it was first bound;
/// constants are tracked per frame next to it.
#[derive(Debug, Clone)]
pub struct Scope {
    id:        u64,
    bindings:  HashMap<String, Value>,
    types:     HashMap<String, String>,
    constants: HashSet<String>,
}

impl Scope {
    fn new() -> Self {
        Self { id:        NEXT_FRAME_ID.fetch_add(1, Ordering::Relaxed),
               bindings:  HashMap::new(),
               types:     HashMap::new(),
               constants: HashSet::new(), }
    }

    fn bind(&mut self, name: &str, value: Value, type_tag: String) {
        self.bindings.insert(name.to_string(), value);
        self.types.insert(name.to_string(), type_tag);
    }
}

/// All bindings and declarations visible to a running program.
///
/// Variables live in a stack of frames. Function and method calls push a
/// frame and pop it on return; blocks and loops run in the frame of their
/// enclosing call. Reads walk the frames from the innermost outwards, so a
/// callee sees the bindings of its callers.
///
/// Declarations live in separate registries so that a user variable can
/// never collide with a class, interface, struct, or enum name.
#[derive(Debug, Clone)]
pub struct Environment {
    scopes:         Vec<Scope>,
    /// Declared classes by name.
    pub classes:    HashMap<String, Rc<ClassRecord>>,
    /// Declared interfaces by name.
    pub interfaces: HashMap<String, Rc<InterfaceDef>>,
    /// Declared structs by name.
    pub structs:    HashMap<String, Rc<StructDef>>,
    /// Declared enums by name, iterated in name order.
    pub enums:      BTreeMap<String, Rc<EnumDef>>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Creates an environment holding a single, empty global frame.
    #[must_use]
    pub fn new() -> Self {
        Self { scopes:     vec![Scope::new()],
               classes:    HashMap::new(),
               interfaces: HashMap::new(),
               structs:    HashMap::new(),
               enums:      BTreeMap::new(), }
    }

    /// Pushes a new innermost frame.
    ///
    /// # Example
    /// ```
    /// use fight::interpreter::{evaluator::environment::Environment, value::core::Value};
    ///
    /// let mut env = Environment::new();
    /// env.define("x", Value::Integer(1), "int");
    ///
    /// env.push_frame();
    /// env.define("x", Value::Integer(2), "int");
    /// assert_eq!(env.get("x"), Some(&Value::Integer(2)));
    ///
    /// env.pop_frame();
    /// assert_eq!(env.get("x"), Some(&Value::Integer(1)));
    /// ```
    pub fn push_frame(&mut self) {
        self.scopes.push(Scope::new());
    }

    /// Pops the innermost frame. The global frame is never removed.
    pub fn pop_frame(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Identity of the innermost frame.
    ///
    /// Every pushed frame gets an identity no other frame has had, in this
    /// environment or any other, so a frame can be recognised after the
    /// environment has been swapped out and back.
    #[must_use]
    pub fn frame_id(&self) -> u64 {
        self.scopes.last().map_or(0, |scope| scope.id)
    }

    /// Number of live frames, the global frame included.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Looks a name up through every frame, innermost first.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.bindings.get(name))
    }

    /// Looks a name up in the innermost frame only.
    #[must_use]
    pub fn get_local(&self, name: &str) -> Option<&Value> {
        self.current().bindings.get(name)
    }

    /// Looks a name up in the global frame only.
    #[must_use]
    pub fn get_global(&self, name: &str) -> Option<&Value> {
        self.scopes.first().and_then(|scope| scope.bindings.get(name))
    }

    /// Tests whether the name is bound in any frame.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Binds a name in the innermost frame, recording its type tag.
    ///
    /// An existing binding of the same name in that frame is replaced along
    /// with its type tag. No type or constant checks are made here.
    pub fn define(&mut self, name: &str, value: Value, type_tag: &str) {
        self.current_mut().bind(name, value, type_tag.to_string());
    }

    /// Marks a name of the innermost frame as constant.
    pub fn mark_constant(&mut self, name: &str) {
        self.current_mut().constants.insert(name.to_string());
    }

    /// Tests whether the nearest binding of `name` is a constant.
    ///
    /// # Example
    /// ```
    /// use fight::interpreter::{evaluator::environment::Environment, value::core::Value};
    ///
    /// let mut env = Environment::new();
    /// env.define("PI", Value::Float(3.14), "float");
    /// env.mark_constant("PI");
    ///
    /// assert!(env.is_constant("PI"));
    /// assert!(!env.is_constant("E"));
    /// ```
    #[must_use]
    pub fn is_constant(&self, name: &str) -> bool {
        self.owning_scope(name)
            .is_some_and(|scope| scope.constants.contains(name))
    }

    /// The type tag recorded for the nearest binding of `name`.
    #[must_use]
    pub fn declared_type(&self, name: &str) -> Option<&str> {
        self.owning_scope(name)
            .and_then(|scope| scope.types.get(name))
            .map(String::as_str)
    }

    /// Replaces the value of an existing binding.
    ///
    /// A binding of the innermost frame is updated in place. A binding that
    /// only exists in an outer frame is copied into the innermost frame with
    /// its type tag and constant flag, and the copy is updated; the outer
    /// binding is left untouched, so a call never changes its caller's
    /// variables.
    ///
    /// Returns `false` when the name is not bound anywhere.
    ///
    /// # Example
    /// ```
    /// use fight::interpreter::{evaluator::environment::Environment, value::core::Value};
    ///
    /// let mut env = Environment::new();
    /// env.define("count", Value::Integer(0), "int");
    ///
    /// env.push_frame();
    /// assert!(env.assign("count", Value::Integer(5)));
    /// assert_eq!(env.get("count"), Some(&Value::Integer(5)));
    /// env.pop_frame();
    ///
    /// assert_eq!(env.get("count"), Some(&Value::Integer(0)));
    /// assert!(!env.assign("missing", Value::Void));
    /// ```
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.current_mut().bindings.get_mut(name) {
            *slot = value;
            return true;
        }

        let Some(owner) = self.owning_scope(name) else {
            return false;
        };
        let type_tag = owner.types.get(name).cloned().unwrap_or_else(|| "any".to_string());
        let constant = owner.constants.contains(name);

        let current = self.current_mut();
        current.bind(name, value, type_tag);
        if constant {
            current.constants.insert(name.to_string());
        }
        true
    }

    /// Names bound in the global frame, in no particular order.
    pub fn global_names(&self) -> impl Iterator<Item = &str> {
        self.scopes
            .first()
            .into_iter()
            .flat_map(|scope| scope.bindings.keys().map(String::as_str))
    }

    /// Finds the enum that declares `member`, if any.
    #[must_use]
    pub fn enum_of_member(&self, member: &str) -> Option<&str> {
        self.enums
            .values()
            .find(|def| def.members.iter().any(|m| m == member))
            .map(|def| def.name.as_str())
    }

    fn owning_scope(&self, name: &str) -> Option<&Scope> {
        self.scopes.iter().rev().find(|scope| scope.bindings.contains_key(name))
    }

    fn current(&self) -> &Scope {
        // `scopes` always holds the global frame.
        &self.scopes[self.scopes.len() - 1]
    }

    fn current_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn inner_frames_shadow_outer_ones() {
        let mut env = Environment::new();
        env.define("x", Value::Integer(1), "int");
        env.push_frame();
        env.define("x", Value::from("inner"), "string");

        assert_eq!(env.get("x"), Some(&Value::from("inner")));
        assert_eq!(env.declared_type("x"), Some("string"));

        env.pop_frame();
        assert_eq!(env.declared_type("x"), Some("int"));
    }

    #[test]
    fn reads_see_caller_frames() {
        let mut env = Environment::new();
        env.define("g", Value::Integer(1), "int");
        env.push_frame();
        env.push_frame();
        assert_eq!(env.get("g"), Some(&Value::Integer(1)));
        assert_eq!(env.get_local("g"), None);
    }

    #[test]
    fn shadow_copies_keep_type_and_constness() {
        let mut env = Environment::new();
        env.define("K", Value::Integer(1), "int");
        env.mark_constant("K");
        env.push_frame();

        assert!(env.assign("K", Value::Integer(2)));
        assert!(env.is_constant("K"));
        assert_eq!(env.declared_type("K"), Some("int"));
    }

    #[test]
    fn global_frame_survives_extra_pops() {
        let mut env = Environment::new();
        env.define("x", Value::Integer(1), "int");
        env.pop_frame();
        env.pop_frame();
        assert_eq!(env.depth(), 1);
        assert_eq!(env.get_global("x"), Some(&Value::Integer(1)));
    }

    #[test]
    fn frames_at_the_same_depth_are_distinct() {
        let mut env = Environment::new();
        env.push_frame();
        let first = env.frame_id();
        env.pop_frame();
        env.push_frame();
        assert_ne!(env.frame_id(), first);

        let copy = env.clone();
        assert_eq!(copy.frame_id(), env.frame_id());
    }
}
