use super::array::{Array, DEFAULT_SLOTS};
use super::Object;
use crate::error;
use crate::lang::{Error, Ident, Suffix};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// Largest number of elements one array may hold.
const MAX_ELEMENTS: usize = u16::max_value() as usize + 1;

/// ## Variable memory
///
/// A chain of scopes. The global scope has no outer link; each user
/// function call gets a child scope for its parameters. Names are keyed
/// upper-cased with their suffix, arrays under the name followed by `()`.

#[derive(Debug, Default)]
struct Scope {
    vars: HashMap<Rc<str>, Object>,
    outer: Option<Environment>,
}

#[derive(Debug, Default, Clone)]
pub struct Environment(Rc<RefCell<Scope>>);

fn key(name: &str) -> Rc<str> {
    name.to_ascii_uppercase().into()
}

fn array_key(ident: &Ident) -> Rc<str> {
    format!("{}()", key(ident.name())).into()
}

impl Environment {
    pub fn new() -> Environment {
        Environment::default()
    }

    pub fn enclosed(outer: &Environment) -> Environment {
        Environment(Rc::new(RefCell::new(Scope {
            vars: HashMap::new(),
            outer: Some(outer.clone()),
        })))
    }

    pub fn clear(&self) {
        self.0.borrow_mut().vars.clear();
    }

    pub fn len(&self) -> usize {
        self.0.borrow().vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().vars.is_empty()
    }

    fn lookup(&self, key: &str) -> Option<Object> {
        let scope = self.0.borrow();
        match scope.vars.get(key) {
            Some(obj) => Some(obj.clone()),
            None => match &scope.outer {
                Some(outer) => outer.lookup(key),
                None => None,
            },
        }
    }

    /// Replaces the value where the name is bound, or binds it here.
    fn assign(&self, key: Rc<str>, value: Object) -> Result<()> {
        if self.0.borrow().vars.contains_key(&key) {
            self.0.borrow_mut().vars.insert(key, value);
            return Ok(());
        }
        let outer = self.0.borrow().outer.clone();
        match outer {
            Some(outer) if outer.lookup(&key).is_some() => outer.assign(key, value),
            _ => self.insert(key, value),
        }
    }

    fn insert(&self, key: Rc<str>, value: Object) -> Result<()> {
        let mut scope = self.0.borrow_mut();
        if scope.vars.len() > u16::max_value() as usize {
            return Err(error!(OutOfMemory));
        }
        scope.vars.insert(key, value);
        Ok(())
    }

    fn global(&self) -> Environment {
        match &self.0.borrow().outer {
            Some(outer) => outer.global(),
            None => self.clone(),
        }
    }

    pub fn get(&self, name: &str) -> Option<Object> {
        self.lookup(&key(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Binds without any type check, as plain names and functions are.
    pub fn set(&self, name: &str, value: Object) -> Result<()> {
        self.assign(key(name), value)
    }

    /// Binds in this scope only, shadowing any outer binding.
    pub fn define(&self, ident: &Ident, value: Object) -> Result<()> {
        let value = match ident.suffix() {
            Suffix::Plain => value,
            suffix => Object::Typed(Box::new(value.coerce(suffix)?), suffix),
        };
        self.insert(key(ident.name()), value)
    }

    /// The value of a variable, looking through any type tag.
    pub fn fetch(&self, ident: &Ident) -> Option<Object> {
        self.get(ident.name()).map(Object::into_value)
    }

    /// Saves under a name. Suffixed names only take values their suffix
    /// accepts and keep the type tag; plain names bind whatever they get.
    pub fn store(&self, ident: &Ident, value: Object) -> Result<()> {
        let suffix = ident.suffix();
        if suffix == Suffix::Plain {
            return self.set(ident.name(), value);
        }
        match self.get(ident.name()) {
            Some(Object::Typed(existing, tag)) if tag == suffix => {
                if !existing.is_compatible(&value) {
                    return Err(error!(TypeMismatch));
                }
            }
            Some(_) => return Err(error!(TypeMismatch)),
            None => {}
        }
        let value = value.coerce(suffix)?;
        self.assign(key(ident.name()), Object::Typed(Box::new(value), suffix))
    }

    pub fn array(&self, ident: &Ident) -> Option<Rc<RefCell<Array>>> {
        match self.lookup(&array_key(ident)) {
            Some(Object::Array(array)) => Some(array),
            _ => None,
        }
    }

    /// Arrays are always global.
    pub fn dimension(&self, ident: &Ident, sizes: &[usize]) -> Result<Rc<RefCell<Array>>> {
        if self.array(ident).is_some() {
            return Err(error!(RedimensionedArray));
        }
        let elements = sizes
            .iter()
            .try_fold(1usize, |n, &size| n.checked_mul(size));
        match elements {
            Some(n) if n <= MAX_ELEMENTS => {}
            _ => return Err(error!(OutOfMemory)),
        }
        let array = Array::dimension(ident.suffix(), sizes);
        self.global()
            .insert(array_key(ident), Object::Array(array.clone()))?;
        Ok(array)
    }

    fn array_or_default(&self, ident: &Ident, indices: &[i64]) -> Result<Rc<RefCell<Array>>> {
        match self.array(ident) {
            Some(array) => Ok(array),
            None => self.dimension(ident, &vec![DEFAULT_SLOTS; indices.len()]),
        }
    }

    pub fn fetch_array(&self, ident: &Ident, indices: &[i64]) -> Result<Object> {
        let array = self.array_or_default(ident, indices)?;
        let obj = array.borrow().fetch(indices)?;
        Ok(obj)
    }

    pub fn store_array(&self, ident: &Ident, indices: &[i64], value: Object) -> Result<()> {
        let array = self.array_or_default(ident, indices)?;
        array.borrow_mut().store(indices, value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;

    fn ident(s: &str) -> Ident {
        Ident::new(s)
    }

    #[test]
    fn test_names_are_case_insensitive() {
        let env = Environment::new();
        env.set("abc", Object::Integer(1)).unwrap();
        assert_eq!(env.get("ABC"), Some(Object::Integer(1)));
        assert!(env.contains("aBc"));
    }

    #[test]
    fn test_child_scope_shadows_and_writes_through() {
        let global = Environment::new();
        global.set("X", Object::Integer(1)).unwrap();
        global.set("Y", Object::Integer(2)).unwrap();
        let child = Environment::enclosed(&global);
        child.define(&ident("X"), Object::Integer(10)).unwrap();
        child.set("Y", Object::Integer(20)).unwrap();
        child.set("Z", Object::Integer(30)).unwrap();
        assert_eq!(child.get("X"), Some(Object::Integer(10)));
        assert_eq!(global.get("X"), Some(Object::Integer(1)));
        assert_eq!(global.get("Y"), Some(Object::Integer(20)));
        assert_eq!(global.get("Z"), None);
    }

    #[test]
    fn test_typed_store() {
        let env = Environment::new();
        env.store(&ident("A%"), Object::Single(5.4)).unwrap();
        assert_eq!(env.fetch(&ident("A%")), Some(Object::Integer(5)));
        assert_eq!(
            env.get("A%"),
            Some(Object::Typed(Box::new(Object::Integer(5)), Suffix::Integer))
        );
        assert_eq!(
            env.store(&ident("A%"), Object::String("X".into()))
                .unwrap_err()
                .code(),
            ErrorCode::TypeMismatch
        );
        assert_eq!(
            env.store(&ident("B%"), Object::Long(40000)).unwrap_err().code(),
            ErrorCode::Overflow
        );
    }

    #[test]
    fn test_plain_binds_anything() {
        let env = Environment::new();
        env.store(&ident("A"), Object::Integer(1)).unwrap();
        env.store(&ident("A"), Object::String("X".into())).unwrap();
        assert_eq!(env.fetch(&ident("A")), Some(Object::String("X".into())));
    }

    #[test]
    fn test_arrays() {
        let env = Environment::new();
        env.dimension(&ident("A"), &[4]).unwrap();
        assert_eq!(
            env.dimension(&ident("A"), &[4]).unwrap_err().code(),
            ErrorCode::RedimensionedArray
        );
        env.store_array(&ident("A"), &[3], Object::Integer(9)).unwrap();
        assert_eq!(env.fetch_array(&ident("A"), &[3]).unwrap(), Object::Integer(9));
        assert_eq!(
            env.store_array(&ident("A"), &[5], Object::Integer(1))
                .unwrap_err()
                .code(),
            ErrorCode::SubscriptOutOfRange
        );
        assert_eq!(env.fetch_array(&ident("B$"), &[10]).unwrap(), Object::String("".into()));
        assert_eq!(
            env.fetch_array(&ident("B$"), &[11]).unwrap_err().code(),
            ErrorCode::SubscriptOutOfRange
        );
        assert!(env.get("A").is_none());
    }

    #[test]
    fn test_array_size_limit() {
        let env = Environment::new();
        env.dimension(&ident("A"), &[65536]).unwrap();
        assert_eq!(
            env.dimension(&ident("B"), &[65536, 65536]).unwrap_err().code(),
            ErrorCode::OutOfMemory
        );
        assert_eq!(
            env.dimension(&ident("C"), &[usize::max_value(), 2]).unwrap_err().code(),
            ErrorCode::OutOfMemory
        );
        assert!(env.array(&ident("B")).is_none());
    }

    #[test]
    fn test_arrays_are_global() {
        let global = Environment::new();
        let child = Environment::enclosed(&global);
        child.store_array(&ident("Q"), &[1, 1], Object::Integer(2)).unwrap();
        assert_eq!(global.fetch_array(&ident("Q"), &[1, 1]).unwrap(), Object::Integer(2));
    }
}
